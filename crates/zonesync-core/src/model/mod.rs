//! Provider-neutral zone and record model

pub mod record;
pub mod zone;

pub use record::{CaaValue, MxValue, NaptrValue, Record, RecordData, RecordType, SrvValue};
pub use zone::Zone;

//! Diff engine and plans
//!
//! A [`Plan`] is the ordered list of [`Change`]s that turns the existing
//! zone into the desired one.
//!
//! ## Ordering
//!
//! Changes are always ordered Creates → Updates → Deletes. Within a group
//! the order is the zone's (name, type) order, so plans are deterministic.
//! [`Plan::new`] re-sorts (stably) whatever it is handed, so a plan built
//! from an externally computed change list still honors the ordering.

use std::fmt;

use crate::model::{Record, Zone};

/// A single create/update/delete of one canonical record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Record present in desired, absent in existing
    Create(Record),
    /// Same (name, type) on both sides with different ttl or values
    Update {
        /// Record as it exists on the provider
        existing: Record,
        /// Record as it should become
        new: Record,
    },
    /// Record present in existing, absent in desired
    Delete(Record),
}

impl Change {
    /// The record this change leaves behind (or removes, for deletes)
    pub fn record(&self) -> &Record {
        match self {
            Change::Create(new) | Change::Update { new, .. } => new,
            Change::Delete(existing) => existing,
        }
    }

    /// The record currently on the provider, if any
    pub fn existing(&self) -> Option<&Record> {
        match self {
            Change::Create(_) => None,
            Change::Update { existing, .. } | Change::Delete(existing) => Some(existing),
        }
    }

    /// Short name of the change kind
    pub fn kind(&self) -> &'static str {
        match self {
            Change::Create(_) => "Create",
            Change::Update { .. } => "Update",
            Change::Delete(_) => "Delete",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Change::Create(_) => 0,
            Change::Update { .. } => 1,
            Change::Delete(_) => 2,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Create(new) => write!(f, "Create {}", new),
            Change::Update { existing, new } => write!(f, "Update {} -> {}", existing, new),
            Change::Delete(existing) => write!(f, "Delete {}", existing),
        }
    }
}

/// Compute the changes that turn `existing` into `desired`
///
/// Identity is (name, type); a record present on both sides becomes an
/// Update only when its ttl or values differ.
pub fn diff(existing: &Zone, desired: &Zone) -> Vec<Change> {
    let mut creates = Vec::new();
    let mut updates = Vec::new();
    let mut deletes = Vec::new();

    for new in desired.records() {
        match existing.get(new.name(), new.record_type()) {
            Some(current) if current == new => {}
            Some(current) => updates.push(Change::Update {
                existing: current.clone(),
                new: new.clone(),
            }),
            None => creates.push(Change::Create(new.clone())),
        }
    }

    for current in existing.records() {
        if desired.get(current.name(), current.record_type()).is_none() {
            deletes.push(Change::Delete(current.clone()));
        }
    }

    creates.extend(updates);
    creates.extend(deletes);
    creates
}

/// Ordered changes between an existing and a desired zone
#[derive(Debug, Clone)]
pub struct Plan {
    existing: Zone,
    desired: Zone,
    changes: Vec<Change>,
    exists: bool,
}

impl Plan {
    /// Build a plan from an already computed change list
    ///
    /// # Parameters
    ///
    /// - `existing`: Zone as populated from the provider
    /// - `desired`: Zone the provider should converge to
    /// - `changes`: Changes, re-sorted stably into Creates → Updates → Deletes
    /// - `exists`: Whether populate found the zone on the provider
    pub fn new(existing: Zone, desired: Zone, mut changes: Vec<Change>, exists: bool) -> Self {
        changes.sort_by_key(Change::rank);
        Self {
            existing,
            desired,
            changes,
            exists,
        }
    }

    /// Diff `existing` against `desired` and wrap the result
    pub fn between(existing: Zone, desired: Zone, exists: bool) -> Self {
        let changes = diff(&existing, &desired);
        Self::new(existing, desired, changes, exists)
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn existing(&self) -> &Zone {
        &self.existing
    }

    pub fn desired(&self) -> &Zone {
        &self.desired
    }

    /// Fully-qualified name of the zone being changed
    pub fn zone_name(&self) -> &str {
        self.desired.name()
    }

    /// Whether the zone was found on the provider when planning
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordData;
    use std::net::Ipv4Addr;

    fn a(name: &str, ttl: u32, last: u8) -> Record {
        Record::new(name, ttl, RecordData::A(vec![Ipv4Addr::new(1, 2, 3, last)])).unwrap()
    }

    fn zone(records: Vec<Record>) -> Zone {
        Zone::with_records("unit.tests.", records).unwrap()
    }

    #[test]
    fn test_identical_zones_produce_no_changes() {
        let current = zone(vec![a("", 300, 4), a("www", 300, 5)]);
        assert!(diff(&current, &current).is_empty());
        assert!(Plan::between(current.clone(), current, true).is_empty());
    }

    #[test]
    fn test_create_update_delete_classification() {
        let existing = zone(vec![a("keep", 300, 1), a("ttl", 600, 2), a("gone", 300, 3)]);
        let desired = zone(vec![a("keep", 300, 1), a("ttl", 300, 2), a("new", 300, 4)]);

        let changes = diff(&existing, &desired);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], Change::Create(a("new", 300, 4)));
        assert_eq!(
            changes[1],
            Change::Update {
                existing: a("ttl", 600, 2),
                new: a("ttl", 300, 2),
            }
        );
        assert_eq!(changes[2], Change::Delete(a("gone", 300, 3)));
    }

    #[test]
    fn test_plan_reorders_external_change_lists() {
        let changes = vec![
            Change::Delete(a("d", 300, 1)),
            Change::Update {
                existing: a("u", 600, 1),
                new: a("u", 300, 1),
            },
            Change::Create(a("c2", 300, 1)),
            Change::Create(a("c1", 300, 1)),
        ];
        let plan = Plan::new(zone(vec![]), zone(vec![]), changes, false);
        let kinds: Vec<_> = plan.changes().iter().map(Change::kind).collect();
        assert_eq!(kinds, vec!["Create", "Create", "Update", "Delete"]);
        // Stable within a group
        assert_eq!(plan.changes()[0].record().name(), "c2");
        assert!(!plan.exists());
    }

    #[test]
    fn test_change_accessors() {
        let update = Change::Update {
            existing: a("x", 600, 1),
            new: a("x", 300, 1),
        };
        assert_eq!(update.record().ttl(), 300);
        assert_eq!(update.existing().map(Record::ttl), Some(600));
        assert!(Change::Create(a("x", 1, 1)).existing().is_none());
        assert!(update.to_string().starts_with("Update x A"));
    }
}

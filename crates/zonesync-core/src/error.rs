//! Error types for zone synchronization
//!
//! This module defines all error types used throughout the workspace, plus
//! [`Lookup`], which carries "absent" as data rather than as an error.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zone synchronization
#[derive(Error, Debug)]
pub enum Error {
    /// Domain or record absent on the provider side
    #[error("Not Found: {0}")]
    NotFound(String),

    /// Bad or missing credentials (HTTP 401, or 403 without a lock marker)
    #[error("Unauthorized")]
    Unauthorized,

    /// Provider rejected the payload (HTTP 400); carries the validation messages
    #[error("{0}")]
    BadRequest(String),

    /// Any other non-success HTTP status, surfaced verbatim
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A canonical record cannot be expressed in the provider's native schema
    #[error("Cannot translate record: {0}")]
    Translation(String),

    /// Connection-level failures (DNS resolution, TLS, timeouts)
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a bad request error from the provider's validation messages
    ///
    /// Messages are rendered one per line, each prefixed with `"\n  - "`.
    pub fn bad_request<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rendered: String = messages
            .into_iter()
            .map(|m| format!("\n  - {}", m.as_ref()))
            .collect();
        Self::BadRequest(rendered)
    }

    /// Create a generic HTTP error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a translation error
    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Outcome of a lookup that may legitimately find nothing
///
/// Callers branch on the variant; genuine failures travel in the
/// surrounding [`Result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The value exists
    Found(T),
    /// The provider reports no such object
    NotFound,
}

impl<T> Lookup<T> {
    /// Map the found value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }

    /// Convert into an `Option`
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }

    /// Whether the lookup found a value
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_renders_message_list() {
        let err = Error::bad_request(["\"unittests\" is not a valid domain name"]);
        assert_eq!(
            err.to_string(),
            "\n  - \"unittests\" is not a valid domain name"
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_unauthorized_display() {
        assert_eq!(Error::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(Error::Unauthorized.status(), None);
    }

    #[test]
    fn test_http_error_keeps_status_and_body() {
        let err = Error::http(502, "Things caught fire");
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("Things caught fire"));
    }

    #[test]
    fn test_lookup_helpers() {
        let found: Lookup<u64> = Lookup::Found(7);
        assert!(found.is_found());
        assert_eq!(found.map(|v| v * 2).found(), Some(14));

        let missing: Lookup<u64> = Lookup::NotFound;
        assert!(!missing.is_found());
        assert_eq!(missing.found(), None);
    }
}

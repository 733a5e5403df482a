//! Crate-wide error type.
//!
//! Errors here describe *internal* failures. The public cache surface is
//! fail-open: `CacheClient` and the invalidation pipeline log these and return
//! empty values instead of propagating them. `Result` only crosses the API
//! boundary from constructors (bad configuration) and from the backend trait.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes of the caching subsystem.
#[derive(Debug)]
pub enum Error {
    /// Invalid or missing configuration (bad store URL, empty server list).
    ConfigError(String),
    /// The remote key-value store failed or timed out.
    BackendError(String),
    /// A value could not be serialized for storage or parsed back out.
    SerializationError(String),
    /// Revalidation or edge-purge HTTP call failed (network error or non-2xx).
    HttpError(String),
    /// Caller handed us something structurally invalid (empty key, bad path).
    ValidationError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
            Error::BackendError(msg) => write!(f, "cache backend error: {}", msg),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
            Error::HttpError(msg) => write!(f, "http error: {}", msg),
            Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::HttpError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = Error::BackendError("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = Error::ConfigError("no store URL".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn test_from_serde_json() {
        let bad = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = bad.into();
        assert!(matches!(err, Error::SerializationError(_)));
    }
}

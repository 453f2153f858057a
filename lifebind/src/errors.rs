//! Error types for lifebind.
//!
//! The release path never surfaces errors to callers of
//! [`retain_until_release_of`](crate::retain_until_release_of); these types are
//! used for reporting release failures and for configuration problems.

use std::collections::HashMap;
use thiserror::Error;

/// The main error type for lifebind operations.
#[derive(Debug, Error)]
pub enum LifebindError {
    /// A resource failed to release.
    #[error("{0}")]
    Release(#[from] ReleaseError),

    /// The process-wide registry was already created.
    #[error("Global registry already initialized")]
    AlreadyInitialized,

    /// The supplied configuration is not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The background sweeper could not be started.
    #[error("Failed to start sweeper: {0}")]
    SweeperStart(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LifebindError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Error reported by [`Resource::release`](crate::resource::Resource::release).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Release failed{}: {message}", .resource.as_ref().map(|r| format!(" for '{r}'")).unwrap_or_default())]
pub struct ReleaseError {
    /// The error message.
    pub message: String,
    /// Label of the resource that failed, if known.
    pub resource: Option<String>,
}

impl ReleaseError {
    /// Creates a new release error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource: None,
        }
    }

    /// Sets the resource label.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Builds a release error from a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());
        Self::new(format!("release panicked: {detail}"))
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("ReleaseError"));
        map.insert("message".to_string(), serde_json::json!(self.message));
        if let Some(ref resource) = self.resource {
            map.insert("resource".to_string(), serde_json::json!(resource));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_error_display() {
        let err = ReleaseError::new("socket closed");
        assert_eq!(err.to_string(), "Release failed: socket closed");

        let err = err.with_resource("feed");
        assert_eq!(err.to_string(), "Release failed for 'feed': socket closed");
    }

    #[test]
    fn test_release_error_to_dict() {
        let err = ReleaseError::new("boom").with_resource("ticker");
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "ReleaseError");
        assert_eq!(dict.get("message").unwrap(), "boom");
        assert_eq!(dict.get("resource").unwrap(), "ticker");
    }

    #[test]
    fn test_release_error_from_panic() {
        let payload = std::panic::catch_unwind(|| panic!("kaput")).unwrap_err();
        let err = ReleaseError::from_panic(payload.as_ref());
        assert_eq!(err.message, "release panicked: kaput");

        let payload = std::panic::catch_unwind(|| panic!("{}", String::from("owned"))).unwrap_err();
        let err = ReleaseError::from_panic(payload.as_ref());
        assert_eq!(err.message, "release panicked: owned");
    }

    #[test]
    fn test_lifebind_error_from_release() {
        let err: LifebindError = ReleaseError::new("nope").into();
        assert!(matches!(err, LifebindError::Release(_)));
        assert_eq!(err.to_string(), "Release failed: nope");
    }

    #[test]
    fn test_lifebind_error_from_json() {
        let err: LifebindError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}

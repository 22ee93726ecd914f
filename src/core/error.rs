//! Error types for the service host.

use crate::service::ServiceError;
use thiserror::Error;

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading and driving services.
#[derive(Error, Debug)]
pub enum Error {
    // Contract errors
    #[error(transparent)]
    Service(#[from] ServiceError),

    // Module table errors
    #[error("Service module not found: {0}")]
    ModuleNotFound(String),

    #[error("Service module already loaded: {0}")]
    AlreadyLoaded(String),

    #[error("Service table full ({0} modules)")]
    CapacityExceeded(usize),

    #[error("Method {method} not supported by service {service}")]
    UnsupportedMethod { service: String, method: String },

    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::FailureKind;

    #[test]
    fn test_service_error_is_transparent() {
        let err: Error = ServiceError::preview("bad magic").into();
        assert_eq!(err.to_string(), "Preview failed: bad magic");

        match err {
            Error::Service(inner) => assert_eq!(inner.kind(), FailureKind::Preview),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let err: Error = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_unsupported_method_display() {
        let err = Error::UnsupportedMethod {
            service: "echo".to_string(),
            method: "OPTIONS".to_string(),
        };
        assert_eq!(err.to_string(), "Method OPTIONS not supported by service echo");
    }
}

//! Error types for the trove pipeline.

use thiserror::Error;

/// Result type alias using trove's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for trove operations.
///
/// Parse failures inside the standardizer are recovered locally and never
/// surface here; everything else propagates to the calling action.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Tag catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Text-generation model unreachable or errored
    #[error("Generation error: {0}")]
    Generation(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_catalog() {
        let err = Error::Catalog("Tags.csv missing".to_string());
        assert_eq!(err.to_string(), "Catalog error: Tags.csv missing");
    }

    #[test]
    fn test_error_display_generation() {
        let err = Error::Generation("model timeout".to_string());
        assert_eq!(err.to_string(), "Generation error: model timeout");
    }

    #[test]
    fn test_error_display_embedding() {
        let err = Error::Embedding("service unreachable".to_string());
        assert_eq!(err.to_string(), "Embedding error: service unreachable");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("k must be >= 1".to_string());
        assert_eq!(err.to_string(), "Invalid input: k must be >= 1");
    }

    #[test]
    fn test_embedding_and_database_are_distinct() {
        // Insert/search callers must be able to tell the two failure kinds apart.
        let emb = Error::Embedding("x".to_string());
        let db = Error::Database(sqlx::Error::PoolClosed);
        assert!(matches!(emb, Error::Embedding(_)));
        assert!(matches!(db, Error::Database(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}

//! Error types for the irrigation Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the backing stores.
#[derive(Error, Debug)]
pub enum Error {
    /// User-device registry (DynamoDB) error
    #[error("Registry error: {0}")]
    Registry(String),

    /// Device shadow (IoT Data Plane) error
    #[error("Shadow error: {0}")]
    Shadow(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

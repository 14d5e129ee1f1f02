//! Storage trait abstraction.

use async_trait::async_trait;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Key/value store holding the serialized database.
///
/// Backends hold exactly one payload. Writes overwrite it wholesale.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the stored payload, `None` if nothing has been stored.
    async fn read(&self) -> Result<Option<String>>;

    /// Overwrite the stored payload.
    async fn write(&mut self, payload: &str) -> Result<()>;

    /// Erase the stored payload. Erasing an empty store is not an error.
    async fn remove(&mut self) -> Result<()>;
}

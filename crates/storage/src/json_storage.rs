//! JSON file storage implementation.
//!
//! Keeps the payload as a single JSON file inside the data directory, one
//! file per storage key.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use super::{Result, Storage, StorageConfig};

/// File-based JSON storage backend.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    /// Create storage. This creates the data directory if needed but does
    /// not create the payload file until the first write.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.root).await?;
        Ok(Self {
            path: config.payload_path(),
        })
    }

    /// Path of the payload file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Storage for JsonStorage {
    async fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&mut self, payload: &str) -> Result<()> {
        fs::write(&self.path, payload.as_bytes()).await?;
        debug!(path = %self.path.display(), bytes = payload.len(), "payload written");
        Ok(())
    }

    async fn remove(&mut self) -> Result<()> {
        fs::remove_file(&self.path).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        Ok(())
    }
}

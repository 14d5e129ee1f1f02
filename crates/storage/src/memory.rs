//! In-memory storage backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::Mutex;
use super::{Result, Storage, StorageError};

/// Storage that keeps the payload in memory.
///
/// Clones share the same payload, so a test can keep a handle and inspect
/// what the gateway wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    payload: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-loaded with `payload`.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Arc::new(Mutex::new(Some(payload.into()))),
            ..Default::default()
        }
    }

    /// Make subsequent writes fail, as a full disk would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current payload.
    pub async fn payload(&self) -> Option<String> {
        self.payload.lock().await.clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self) -> Result<Option<String>> {
        Ok(self.payload.lock().await.clone())
    }

    async fn write(&mut self, payload: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Other("write refused".to_string()));
        }
        *self.payload.lock().await = Some(payload.to_string());
        Ok(())
    }

    async fn remove(&mut self) -> Result<()> {
        *self.payload.lock().await = None;
        Ok(())
    }
}

//! Storage configuration.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

/// Default data directory, relative to the working directory.
pub const DEFAULT_ROOT: &str = ".coursetrack";

/// Default key the payload is stored under.
pub const DEFAULT_KEY: &str = "coursetrack-webdb-v1";

/// Suggested file name for exports.
pub const EXPORT_FILE_NAME: &str = "coursetrack_webdb.json";

/// Where the payload lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory
    pub root: PathBuf,

    /// Storage key; the payload file is `<root>/<key>.json`
    pub key: String,
}

impl StorageConfig {
    /// Configuration rooted at `root` with the default key.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Override the storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Full path of the payload file.
    pub fn payload_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.key))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

//! Storage abstraction and persistence gateway for CourseTrack.
//!
//! The whole database lives in a single JSON payload stored under one key,
//! the way the browser tracker kept it in local storage. This crate provides
//! the key/value [`Storage`] trait, a file-backed and an in-memory backend,
//! document validation for imports, and the [`PersistenceGateway`] that the
//! tracker saves through.

#![warn(missing_docs)]

pub mod trait_;
pub mod config;
pub mod json_storage;
pub mod memory;
pub mod schema;
pub mod gateway;

pub use trait_::{Storage, StorageError, Result};
pub use config::{StorageConfig, DEFAULT_KEY, DEFAULT_ROOT, EXPORT_FILE_NAME};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
pub use schema::{parse_document, ImportError};
pub use gateway::PersistenceGateway;

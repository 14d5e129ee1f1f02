//! Document validation for stored and imported payloads.
//!
//! A payload goes through three gates: it must be valid JSON, its top level
//! must be an object, and it must deserialize into the typed [`Database`]
//! and satisfy the cross-record invariants. Missing progress records are
//! filled in afterwards.

use coursetrack_core::{CoreError, Database};
use serde_json::Value;
use crate::StorageError;

/// Why a payload could not be imported.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Not valid JSON
    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Valid JSON, but not an object
    #[error("expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),

    /// An object that does not have the document's shape
    #[error("document does not match the expected shape: {0}")]
    Schema(#[source] serde_json::Error),

    /// Well-formed records that contradict each other
    #[error("inconsistent document: {0}")]
    Inconsistent(#[from] CoreError),

    /// The validated document could not be persisted
    #[error("failed to persist imported document: {0}")]
    Storage(#[from] StorageError),
}

/// Parse and validate a raw document.
pub fn parse_document(raw: &str) -> Result<Database, ImportError> {
    let value: Value = serde_json::from_str(raw).map_err(ImportError::Parse)?;
    if !value.is_object() {
        return Err(ImportError::NotAnObject(kind_of(&value)));
    }

    let mut db: Database = serde_json::from_value(value).map_err(ImportError::Schema)?;
    db.check_consistency()?;
    db.fill_missing_progress();
    Ok(db)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

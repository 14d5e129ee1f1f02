//! CourseTrack core data models.
//!
//! This crate defines the course lifecycle states, the per-course progress
//! records, the milestone catalog and the in-memory database that the
//! tracker mutates and the storage layer persists.

#![warn(missing_docs)]

// Core identities
mod id;
mod error;

// Lifecycle
mod state;
mod catalog;

// Records
mod course;
mod progress;
mod database;

// Re-exports
pub use id::*;
pub use error::{CoreError, ParseStateError, Result};

pub use state::{CourseState, EXCEPTIONAL_STATES, ORDERED_STATES};
pub use catalog::{MilestoneCatalog, MILESTONES_PER_STATE};

pub use course::{Course, CourseFilter, CourseSpec};
pub use progress::{MilestoneFlags, ProgressRecord};
pub use database::Database;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

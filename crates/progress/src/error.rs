//! Tracker errors.

use coursetrack_core::{CoreError, CourseId, CourseState};
use coursetrack_storage::{ImportError, StorageError};

/// Result alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors reported by tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The course identifier does not reference an existing course
    #[error("course not found: {0}")]
    CourseNotFound(CourseId),

    /// A course needs a non-empty name
    #[error("course name must not be empty")]
    EmptyName,

    /// Course duration must be a finite, non-negative number of hours
    #[error("hours must be a finite number >= 0, got {0}")]
    InvalidHours(f64),

    /// Sub-milestones are numbered 1 to 4
    #[error("milestone must be between 1 and 4, got {0}")]
    InvalidMilestone(usize),

    /// Diversion target must be Suspended or Postponed
    #[error("{0} is not an exceptional state")]
    NotExceptional(CourseState),

    /// Database invariant violated
    #[error(transparent)]
    Core(CoreError),

    /// Import rejected
    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    /// Persisting failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CoreError> for TrackerError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::CourseNotFound(id) => Self::CourseNotFound(id),
            other => Self::Core(other),
        }
    }
}

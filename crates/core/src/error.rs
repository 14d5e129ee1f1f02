//! Error types for the core model.

use crate::{CourseId, CourseState};

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Violations of the database invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// No course with this identifier
    #[error("course not found: {0}")]
    CourseNotFound(CourseId),

    /// Two courses share an identifier
    #[error("duplicate course id: {0}")]
    DuplicateCourse(CourseId),

    /// A course carries an empty identifier
    #[error("course id must not be empty")]
    EmptyId,

    /// A progress record references a course that does not exist
    #[error("progress record {0} has no matching course")]
    OrphanProgress(CourseId),

    /// Course state and progress state disagree
    #[error("course {id} is {course} but its progress record says {progress}")]
    StateMismatch {
        /// Course identifier
        id: CourseId,
        /// State on the course
        course: CourseState,
        /// State on the progress record
        progress: CourseState,
    },

    /// Milestones only exist for the ordered states
    #[error("milestones are only defined for ordered states, got {0}")]
    NotOrdered(CourseState),
}

/// Unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown course state: {0}")]
pub struct ParseStateError(pub String);

//! Course progress tracking.
//!
//! The state-progression engine: transition rules, the tracker service that
//! applies them and persists the result, and read-side summaries.

#![warn(missing_docs)]

pub mod error;
pub mod machine;
pub mod tracker;
pub mod snapshot;

pub use error::{Result, TrackerError};
pub use machine::{Transition, TransitionKind};
pub use tracker::{BasicCourseTracker, CourseTracker};
pub use snapshot::{MilestoneView, TrackerSnapshot};

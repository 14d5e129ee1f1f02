//! Read-side views: per-state counts and the manage view of one course.

use std::collections::BTreeSet;
use chrono::{DateTime, Utc};
use coursetrack_core::{CourseId, CourseState, Database, MilestoneFlags};
use serde::Serialize;
use crate::error::{Result, TrackerError};

/// A summary of the database at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerSnapshot {
    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Courses per state, in flow order, states without courses omitted
    pub counts: Vec<(CourseState, usize)>,

    /// Total number of courses
    pub total: usize,

    /// Distinct non-empty organizational units, sorted
    pub units: Vec<String>,
}

impl TrackerSnapshot {
    /// Summarize `db`.
    pub fn from_database(db: &Database) -> Self {
        let courses = db.courses();
        let counts = CourseState::ALL
            .iter()
            .map(|state| (*state, courses.iter().filter(|c| c.state() == *state).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        let units: BTreeSet<&str> = courses
            .iter()
            .map(|c| c.unit.as_str())
            .filter(|u| !u.is_empty())
            .collect();

        Self {
            timestamp: Utc::now(),
            counts,
            total: courses.len(),
            units: units.into_iter().map(String::from).collect(),
        }
    }

    /// Number of courses in `state`.
    pub fn count(&self, state: CourseState) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// One course's current state with its milestone texts and flags.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneView {
    /// Course identifier
    pub course_id: CourseId,

    /// Course name
    pub name: String,

    /// Current state
    pub state: CourseState,

    /// Milestone texts of the current state (empty when exceptional)
    pub texts: Vec<String>,

    /// Sub-milestone flags
    pub flags: MilestoneFlags,

    /// Last progress update
    pub updated_at: DateTime<Utc>,
}

impl MilestoneView {
    /// Build the view of course `id`.
    pub fn for_course(db: &Database, id: &CourseId) -> Result<Self> {
        let course = db
            .course(id)
            .ok_or_else(|| TrackerError::CourseNotFound(id.clone()))?;
        let record = db
            .progress(id)
            .ok_or_else(|| TrackerError::CourseNotFound(id.clone()))?;

        Ok(Self {
            course_id: id.clone(),
            name: course.name.clone(),
            state: record.current_state(),
            texts: db.milestones().milestones_for(record.current_state()).to_vec(),
            flags: record.flags(),
            updated_at: record.updated_at(),
        })
    }
}

//! The whole tracker database: courses, progress records and catalog.

use std::collections::{BTreeMap, HashSet};
use serde::{Deserialize, Serialize};
use crate::catalog::MilestoneCatalog;
use crate::course::Course;
use crate::error::{CoreError, Result};
use crate::id::CourseId;
use crate::progress::{MilestoneFlags, ProgressRecord};
use crate::state::CourseState;

/// In-memory database, serialized as one JSON document.
///
/// Field names of the browser tracker's exports (`cursos`, `progreso`,
/// `hitos`) are accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default, alias = "cursos")]
    courses: Vec<Course>,

    #[serde(default, alias = "progreso")]
    progress: BTreeMap<CourseId, ProgressRecord>,

    #[serde(default, alias = "hitos")]
    milestones: MilestoneCatalog,
}

impl Database {
    /// All courses, in insertion order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Look up a course.
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| &c.id == id)
    }

    /// Look up a progress record.
    pub fn progress(&self, id: &CourseId) -> Option<&ProgressRecord> {
        self.progress.get(id)
    }

    /// All progress records by course.
    pub fn progress_records(&self) -> &BTreeMap<CourseId, ProgressRecord> {
        &self.progress
    }

    /// The milestone catalog.
    pub fn milestones(&self) -> &MilestoneCatalog {
        &self.milestones
    }

    /// Mutable access to the milestone catalog.
    pub fn milestones_mut(&mut self) -> &mut MilestoneCatalog {
        &mut self.milestones
    }

    /// Add a course together with a fresh progress record.
    pub fn insert_course(&mut self, course: Course) -> Result<&ProgressRecord> {
        if course.id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        if self.course(&course.id).is_some() {
            return Err(CoreError::DuplicateCourse(course.id));
        }
        let id = course.id.clone();
        let record = ProgressRecord::new(course.state);
        self.courses.push(course);
        Ok(&*self.progress.entry(id).or_insert(record))
    }

    /// Remove a course and its progress record.
    pub fn remove_course(&mut self, id: &CourseId) -> Result<Course> {
        let idx = self
            .courses
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| CoreError::CourseNotFound(id.clone()))?;
        self.progress.remove(id);
        Ok(self.courses.remove(idx))
    }

    /// Return the progress record of a course, creating it if absent.
    ///
    /// The boolean is true when a record was created.
    pub fn ensure_progress(&mut self, id: &CourseId) -> Result<(&ProgressRecord, bool)> {
        let state = self
            .course(id)
            .map(Course::state)
            .ok_or_else(|| CoreError::CourseNotFound(id.clone()))?;
        let mut created = false;
        let record: &ProgressRecord = self.progress.entry(id.clone()).or_insert_with(|| {
            created = true;
            ProgressRecord::new(state)
        });
        Ok((record, created))
    }

    /// Move a course to `state`.
    ///
    /// This is the only writer of both the course state and the progress
    /// state. The flags are cleared and the timestamp refreshed.
    pub fn set_state(&mut self, id: &CourseId, state: CourseState) -> Result<&ProgressRecord> {
        let course = self
            .courses
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| CoreError::CourseNotFound(id.clone()))?;
        course.state = state;

        let record = self
            .progress
            .entry(id.clone())
            .or_insert_with(|| ProgressRecord::new(state));
        record.current_state = state;
        record.set_flags(MilestoneFlags::default());
        Ok(&*record)
    }

    /// Overwrite the flags of a course, refreshing the timestamp.
    pub fn set_flags(&mut self, id: &CourseId, flags: MilestoneFlags) -> Result<&ProgressRecord> {
        self.ensure_progress(id)?;
        let record = self
            .progress
            .get_mut(id)
            .ok_or_else(|| CoreError::CourseNotFound(id.clone()))?;
        record.set_flags(flags);
        Ok(&*record)
    }

    /// Create the progress records an imported document lacks.
    ///
    /// Returns the courses that received a new record.
    pub fn fill_missing_progress(&mut self) -> Vec<CourseId> {
        let mut filled = Vec::new();
        for course in &self.courses {
            if !self.progress.contains_key(&course.id) {
                self.progress
                    .insert(course.id.clone(), ProgressRecord::new(course.state));
                filled.push(course.id.clone());
            }
        }
        filled
    }

    /// Courses whose progress record is unstable (see [`ProgressRecord::is_unstable`]).
    pub fn unstable_courses(&self) -> Vec<CourseId> {
        self.progress
            .iter()
            .filter(|(_, record)| record.is_unstable())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Verify the cross-record invariants.
    pub fn check_consistency(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for course in &self.courses {
            if course.id.is_empty() {
                return Err(CoreError::EmptyId);
            }
            if !seen.insert(&course.id) {
                return Err(CoreError::DuplicateCourse(course.id.clone()));
            }
            if let Some(record) = self.progress.get(&course.id) {
                if record.current_state != course.state {
                    return Err(CoreError::StateMismatch {
                        id: course.id.clone(),
                        course: course.state,
                        progress: record.current_state,
                    });
                }
            }
        }

        if let Some(orphan) = self.progress.keys().find(|id| !seen.contains(id)) {
            return Err(CoreError::OrphanProgress(orphan.clone()));
        }

        self.milestones.validate()
    }
}

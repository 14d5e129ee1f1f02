//! Course tracking service.

use std::path::Path;
use async_trait::async_trait;
use coursetrack_core::{
    Course, CourseFilter, CourseId, CourseSpec, CourseState, Database, MilestoneFlags,
    ProgressRecord, MILESTONES_PER_STATE,
};
use coursetrack_storage::{PersistenceGateway, Storage};
use tracing::{debug, info};
use crate::error::{Result, TrackerError};
use crate::machine::{self, Transition, TransitionKind};
use crate::snapshot::{MilestoneView, TrackerSnapshot};

/// Course tracking service.
///
/// Every mutating operation either applies and persists completely or
/// leaves both the in-memory and the stored database untouched.
#[async_trait]
pub trait CourseTracker: Send + Sync {
    /// Add a course in the `Pending` state with cleared flags.
    async fn add_course(&mut self, spec: CourseSpec) -> Result<Course>;

    /// Delete a course and its progress record.
    async fn remove_course(&mut self, id: &CourseId) -> Result<Course>;

    /// Get the progress record of a course, creating it if absent.
    async fn ensure(&mut self, id: &CourseId) -> Result<ProgressRecord>;

    /// Overwrite the four flags, then run the auto-advance check. Both are
    /// saved in one write.
    ///
    /// Returns the record as it stands after the check.
    async fn set_flags(&mut self, id: &CourseId, flags: MilestoneFlags) -> Result<ProgressRecord>;

    /// Tick or untick sub-milestone `milestone` (1 to 4).
    async fn toggle_flag(
        &mut self,
        id: &CourseId,
        milestone: usize,
        checked: bool,
    ) -> Result<ProgressRecord>;

    /// Clear all four flags without changing state.
    async fn reset(&mut self, id: &CourseId) -> Result<ProgressRecord>;

    /// Step forward in the ordered flow.
    async fn advance(&mut self, id: &CourseId) -> Result<Option<Transition>>;

    /// Step back in the ordered flow.
    async fn regress(&mut self, id: &CourseId) -> Result<Option<Transition>>;

    /// Move into Suspended or Postponed.
    async fn divert(&mut self, id: &CourseId, target: CourseState) -> Result<Transition>;

    /// Persist `flags`, then auto-advance when all four are ticked and the
    /// state is ordered.
    async fn on_flags_changed(
        &mut self,
        id: &CourseId,
        flags: MilestoneFlags,
    ) -> Result<Option<Transition>>;

    /// Replace the whole database with an imported document.
    ///
    /// Returns the auto-advances applied to records that arrived with all
    /// four flags ticked.
    async fn import(&mut self, raw: &str) -> Result<Vec<Transition>>;

    /// Erase the stored database and start over from defaults.
    async fn reset_all(&mut self) -> Result<()>;

    /// Current in-memory database.
    fn database(&self) -> &Database;

    /// Courses matching `filter`, sorted by name.
    fn list(&self, filter: &CourseFilter) -> Vec<Course>;

    /// Per-state counts.
    fn snapshot(&self) -> TrackerSnapshot;

    /// Manage view of one course.
    fn milestones(&self, id: &CourseId) -> Result<MilestoneView>;

    /// Pretty-printed document.
    fn export(&self) -> Result<String>;
}

/// Tracker that owns the database and saves through a [`PersistenceGateway`].
pub struct BasicCourseTracker<S: Storage> {
    db: Database,
    gateway: PersistenceGateway<S>,
}

impl<S: Storage> BasicCourseTracker<S> {
    /// Load the stored database (or defaults) and normalize it.
    ///
    /// Unstable records are advanced in memory and saved in one write.
    pub async fn open(storage: S) -> Result<Self> {
        let gateway = PersistenceGateway::new(storage);
        let db = gateway.load().await?;
        let mut tracker = Self { db, gateway };
        if !tracker.db.unstable_courses().is_empty() {
            let applied = tracker.commit(machine::normalize).await?;
            Self::log_applied(&applied);
        }
        Ok(tracker)
    }

    /// The persistence gateway.
    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    /// Write the pretty-printed document to `path`.
    pub async fn export_to(&self, path: impl AsRef<Path>) -> Result<()> {
        self.gateway.export_to(&self.db, path).await?;
        Ok(())
    }

    /// Read `path` and import it, replacing the database.
    pub async fn import_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Transition>> {
        let raw = self.gateway.read_document(path).await?;
        self.replace_from(&raw).await
    }

    /// Apply `change` to a copy of the database, persist the copy, and only
    /// then make it current.
    async fn commit<T, F>(&mut self, change: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut Database) -> Result<T> + Send,
    {
        let mut next = self.db.clone();
        let out = change(&mut next)?;
        self.gateway.save(&next).await?;
        self.db = next;
        Ok(out)
    }

    /// Validate `raw`, normalize it, persist it once, then swap it in.
    async fn replace_from(&mut self, raw: &str) -> Result<Vec<Transition>> {
        let (db, applied) = self.gateway.import_replace(raw, machine::normalize).await?;
        self.db = db;
        Self::log_applied(&applied);
        Ok(applied)
    }

    /// Overwrite the flags and run the auto-advance check in one commit.
    async fn apply_flags(
        &mut self,
        id: &CourseId,
        flags: MilestoneFlags,
    ) -> Result<(ProgressRecord, Option<Transition>)> {
        let (record, t) = self
            .commit(|db| {
                db.set_flags(id, flags)?;
                let t = machine::on_flags_changed(db, id, flags)?;
                let record = db
                    .progress(id)
                    .cloned()
                    .ok_or_else(|| TrackerError::CourseNotFound(id.clone()))?;
                Ok((record, t))
            })
            .await?;
        debug!(course = %id, done = flags.completed(), "flags updated");
        if t.is_some() {
            Self::log_transition(&t, id, "auto-advance");
        }
        Ok((record, t))
    }

    fn log_transition(t: &Option<Transition>, id: &CourseId, op: &str) {
        match t {
            Some(t) => info!(course = %t.course_id, from = %t.from, to = %t.to, kind = ?t.kind, "state changed"),
            None => debug!(course = %id, op, "no transition"),
        }
    }

    fn log_applied(applied: &[Transition]) {
        for t in applied {
            info!(course = %t.course_id, from = %t.from, to = %t.to, kind = ?t.kind, "state changed");
        }
    }
}

#[async_trait]
impl<S: Storage + 'static> CourseTracker for BasicCourseTracker<S> {
    async fn add_course(&mut self, spec: CourseSpec) -> Result<Course> {
        if spec.name.trim().is_empty() {
            return Err(TrackerError::EmptyName);
        }
        if !spec.hours.is_finite() || spec.hours < 0.0 {
            return Err(TrackerError::InvalidHours(spec.hours));
        }
        let course = Course::new(spec);
        let added = course.clone();
        self.commit(move |db| {
            db.insert_course(course)?;
            Ok(())
        })
        .await?;
        info!(course = %added.id, name = %added.name, "course added");
        Ok(added)
    }

    async fn remove_course(&mut self, id: &CourseId) -> Result<Course> {
        let removed = self.commit(|db| Ok(db.remove_course(id)?)).await?;
        info!(course = %id, name = %removed.name, "course removed");
        Ok(removed)
    }

    async fn ensure(&mut self, id: &CourseId) -> Result<ProgressRecord> {
        if self.db.course(id).is_none() {
            return Err(TrackerError::CourseNotFound(id.clone()));
        }
        if let Some(record) = self.db.progress(id) {
            return Ok(record.clone());
        }
        let record = self
            .commit(|db| Ok(db.ensure_progress(id)?.0.clone()))
            .await?;
        debug!(course = %id, "progress record created");
        Ok(record)
    }

    async fn set_flags(&mut self, id: &CourseId, flags: MilestoneFlags) -> Result<ProgressRecord> {
        Ok(self.apply_flags(id, flags).await?.0)
    }

    async fn toggle_flag(
        &mut self,
        id: &CourseId,
        milestone: usize,
        checked: bool,
    ) -> Result<ProgressRecord> {
        if !(1..=MILESTONES_PER_STATE).contains(&milestone) {
            return Err(TrackerError::InvalidMilestone(milestone));
        }
        let mut flags = self.ensure(id).await?.flags();
        flags.set(milestone - 1, checked);
        self.set_flags(id, flags).await
    }

    async fn reset(&mut self, id: &CourseId) -> Result<ProgressRecord> {
        let record = self
            .commit(|db| Ok(db.set_flags(id, MilestoneFlags::default())?.clone()))
            .await?;
        debug!(course = %id, "flags reset");
        Ok(record)
    }

    async fn advance(&mut self, id: &CourseId) -> Result<Option<Transition>> {
        let t = self
            .commit(|db| machine::advance(db, id, TransitionKind::Advance))
            .await?;
        Self::log_transition(&t, id, "advance");
        Ok(t)
    }

    async fn regress(&mut self, id: &CourseId) -> Result<Option<Transition>> {
        let t = self.commit(|db| machine::regress(db, id)).await?;
        Self::log_transition(&t, id, "regress");
        Ok(t)
    }

    async fn divert(&mut self, id: &CourseId, target: CourseState) -> Result<Transition> {
        let t = self.commit(|db| machine::divert(db, id, target)).await?;
        info!(course = %id, from = %t.from, to = %t.to, "course diverted");
        Ok(t)
    }

    async fn on_flags_changed(
        &mut self,
        id: &CourseId,
        flags: MilestoneFlags,
    ) -> Result<Option<Transition>> {
        Ok(self.apply_flags(id, flags).await?.1)
    }

    async fn import(&mut self, raw: &str) -> Result<Vec<Transition>> {
        self.replace_from(raw).await
    }

    async fn reset_all(&mut self) -> Result<()> {
        self.gateway.clear().await?;
        self.db = self.gateway.load().await?;
        info!("database reset to defaults");
        Ok(())
    }

    fn database(&self) -> &Database {
        &self.db
    }

    fn list(&self, filter: &CourseFilter) -> Vec<Course> {
        let mut courses: Vec<Course> = self
            .db
            .courses()
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        courses
    }

    fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot::from_database(&self.db)
    }

    fn milestones(&self, id: &CourseId) -> Result<MilestoneView> {
        MilestoneView::for_course(&self.db, id)
    }

    fn export(&self) -> Result<String> {
        Ok(self.gateway.export(&self.db)?)
    }
}

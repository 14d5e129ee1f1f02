//! Transition rules over the in-memory database.
//!
//! These functions decide and apply a transition but do not persist it;
//! [`crate::BasicCourseTracker`] wraps each call in a save.

use coursetrack_core::{CourseId, CourseState, Database, MilestoneFlags};
use serde::{Deserialize, Serialize};
use crate::error::{Result, TrackerError};

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Manual step forward
    Advance,
    /// Step forward after all four sub-milestones were ticked
    AutoAdvance,
    /// Manual step back
    Regress,
    /// Exit into Suspended or Postponed
    Divert,
}

/// A state change applied to a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Course that moved
    pub course_id: CourseId,
    /// State before
    pub from: CourseState,
    /// State after
    pub to: CourseState,
    /// Trigger
    pub kind: TransitionKind,
}

fn current_state(db: &Database, id: &CourseId) -> Result<CourseState> {
    db.course(id)
        .map(|c| c.state())
        .ok_or_else(|| TrackerError::CourseNotFound(id.clone()))
}

fn step(
    db: &mut Database,
    id: &CourseId,
    kind: TransitionKind,
    next: fn(CourseState) -> CourseState,
) -> Result<Option<Transition>> {
    let from = current_state(db, id)?;
    let to = next(from);
    // Exceptional states and the ends of the line map to themselves. Flags
    // are only cleared when the state actually changes.
    if !from.is_ordered() || to == from {
        return Ok(None);
    }
    db.set_state(id, to)?;
    Ok(Some(Transition { course_id: id.clone(), from, to, kind }))
}

/// Move an ordered course to its successor and clear its flags.
///
/// No-op for `Completed` and for exceptional states.
pub fn advance(db: &mut Database, id: &CourseId, kind: TransitionKind) -> Result<Option<Transition>> {
    step(db, id, kind, CourseState::successor)
}

/// Move an ordered course to its predecessor and clear its flags.
///
/// No-op for `Pending` and for exceptional states.
pub fn regress(db: &mut Database, id: &CourseId) -> Result<Option<Transition>> {
    step(db, id, TransitionKind::Regress, CourseState::predecessor)
}

/// Put a course into an exceptional state from wherever it is.
pub fn divert(db: &mut Database, id: &CourseId, target: CourseState) -> Result<Transition> {
    if !target.is_exceptional() {
        return Err(TrackerError::NotExceptional(target));
    }
    let from = current_state(db, id)?;
    db.set_state(id, target)?;
    Ok(Transition {
        course_id: id.clone(),
        from,
        to: target,
        kind: TransitionKind::Divert,
    })
}

/// Auto-advance check run after the flags of a course changed.
pub fn on_flags_changed(
    db: &mut Database,
    id: &CourseId,
    flags: MilestoneFlags,
) -> Result<Option<Transition>> {
    let state = current_state(db, id)?;
    if flags.all_done() && state.is_ordered() {
        return advance(db, id, TransitionKind::AutoAdvance);
    }
    Ok(None)
}

/// Auto-advance every course whose record has all four flags ticked in a
/// state that still has a successor.
pub fn normalize(db: &mut Database) -> Result<Vec<Transition>> {
    let mut applied = Vec::new();
    for id in db.unstable_courses() {
        let flags = db
            .progress(&id)
            .map(|r| r.flags())
            .ok_or_else(|| TrackerError::CourseNotFound(id.clone()))?;
        if let Some(t) = on_flags_changed(db, &id, flags)? {
            applied.push(t);
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursetrack_core::{Course, CourseSpec, ORDERED_STATES};

    fn db_in(state: CourseState) -> (Database, CourseId) {
        let mut db = Database::default();
        let course = Course::new(CourseSpec::named("Test course"));
        let id = course.id.clone();
        db.insert_course(course).unwrap();
        if state != CourseState::Pending {
            db.set_state(&id, state).unwrap();
        }
        (db, id)
    }

    fn assert_in_sync(db: &Database, id: &CourseId) {
        assert_eq!(
            db.course(id).unwrap().state(),
            db.progress(id).unwrap().current_state()
        );
    }

    #[test]
    fn test_advance_walks_the_whole_line() {
        let (mut db, id) = db_in(CourseState::Pending);
        for window in ORDERED_STATES.windows(2) {
            db.set_flags(&id, [true, false, true, false].into()).unwrap();
            let t = advance(&mut db, &id, TransitionKind::Advance).unwrap().unwrap();
            assert_eq!((t.from, t.to), (window[0], window[1]));
            assert_eq!(db.progress(&id).unwrap().flags(), MilestoneFlags::default());
            assert_in_sync(&db, &id);
        }
        assert!(advance(&mut db, &id, TransitionKind::Advance).unwrap().is_none());
        assert_eq!(db.course(&id).unwrap().state(), CourseState::Completed);
    }

    #[test]
    fn test_regress_from_scheduled() {
        let (mut db, id) = db_in(CourseState::Scheduled);
        db.set_flags(&id, [true, true, false, false].into()).unwrap();

        let t = regress(&mut db, &id).unwrap().unwrap();
        assert_eq!(t.to, CourseState::InProgress);
        assert_eq!(t.kind, TransitionKind::Regress);
        assert_eq!(db.progress(&id).unwrap().flags().completed(), 0);
        assert_in_sync(&db, &id);
    }

    #[test]
    fn test_regress_at_pending_keeps_flags() {
        let (mut db, id) = db_in(CourseState::Pending);
        db.set_flags(&id, [true, false, false, false].into()).unwrap();
        assert!(regress(&mut db, &id).unwrap().is_none());
        assert_eq!(db.progress(&id).unwrap().flags().completed(), 1);
    }

    #[test]
    fn test_divert_from_any_state_and_idempotent() {
        for state in CourseState::ALL {
            let (mut db, id) = db_in(state);
            db.set_flags(&id, [false, true, true, false].into()).unwrap();

            let t = divert(&mut db, &id, CourseState::Suspended).unwrap();
            assert_eq!((t.from, t.to), (state, CourseState::Suspended));
            let once = db.progress(&id).unwrap().clone();

            divert(&mut db, &id, CourseState::Suspended).unwrap();
            let twice = db.progress(&id).unwrap();
            assert_eq!(twice.current_state(), once.current_state());
            assert_eq!(twice.flags(), once.flags());
            assert_eq!(twice.flags(), MilestoneFlags::default());
            assert_in_sync(&db, &id);
        }
    }

    #[test]
    fn test_divert_rejects_ordered_target() {
        let (mut db, id) = db_in(CourseState::Planned);
        assert!(matches!(
            divert(&mut db, &id, CourseState::Completed),
            Err(TrackerError::NotExceptional(CourseState::Completed))
        ));
        assert_eq!(db.course(&id).unwrap().state(), CourseState::Planned);
    }

    #[test]
    fn test_exceptional_states_absorb() {
        let (mut db, id) = db_in(CourseState::InProgress);
        divert(&mut db, &id, CourseState::Postponed).unwrap();
        assert!(advance(&mut db, &id, TransitionKind::Advance).unwrap().is_none());
        assert!(regress(&mut db, &id).unwrap().is_none());

        db.set_flags(&id, MilestoneFlags::DONE).unwrap();
        assert!(on_flags_changed(&mut db, &id, MilestoneFlags::DONE).unwrap().is_none());
        assert_eq!(db.course(&id).unwrap().state(), CourseState::Postponed);
        assert!(db.progress(&id).unwrap().flags().all_done());
    }

    #[test]
    fn test_flags_complete_advances_once() {
        let (mut db, id) = db_in(CourseState::Pending);
        db.set_flags(&id, MilestoneFlags::DONE).unwrap();
        let t = on_flags_changed(&mut db, &id, MilestoneFlags::DONE).unwrap().unwrap();
        assert_eq!(t.to, CourseState::Planned);
        assert_eq!(t.kind, TransitionKind::AutoAdvance);
        assert_eq!(db.progress(&id).unwrap().flags(), MilestoneFlags::default());
    }

    #[test]
    fn test_flags_complete_in_completed_stays() {
        let (mut db, id) = db_in(CourseState::Completed);
        db.set_flags(&id, MilestoneFlags::DONE).unwrap();
        assert!(on_flags_changed(&mut db, &id, MilestoneFlags::DONE).unwrap().is_none());
        assert_eq!(db.course(&id).unwrap().state(), CourseState::Completed);
        assert!(db.progress(&id).unwrap().flags().all_done());
    }

    #[test]
    fn test_partial_flags_do_nothing() {
        let (mut db, id) = db_in(CourseState::Planned);
        let flags = MilestoneFlags::from([true, true, true, false]);
        db.set_flags(&id, flags).unwrap();
        assert!(on_flags_changed(&mut db, &id, flags).unwrap().is_none());
        assert_eq!(db.course(&id).unwrap().state(), CourseState::Planned);
    }

    #[test]
    fn test_normalize_advances_unstable_records_once() {
        let (mut db, ticked) = db_in(CourseState::Planned);
        db.set_flags(&ticked, MilestoneFlags::DONE).unwrap();

        let done = Course::new(CourseSpec::named("Done"));
        let done_id = done.id.clone();
        db.insert_course(done).unwrap();
        db.set_state(&done_id, CourseState::Completed).unwrap();
        db.set_flags(&done_id, MilestoneFlags::DONE).unwrap();

        let applied = normalize(&mut db).unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!((applied[0].from, applied[0].to), (CourseState::Planned, CourseState::InProgress));
        assert!(db.unstable_courses().is_empty());
        assert!(db.progress(&done_id).unwrap().flags().all_done());
        assert!(normalize(&mut db).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_course() {
        let mut db = Database::default();
        let ghost = CourseId::from("ghost");
        assert!(matches!(
            advance(&mut db, &ghost, TransitionKind::Advance),
            Err(TrackerError::CourseNotFound(_))
        ));
        assert!(matches!(
            divert(&mut db, &ghost, CourseState::Suspended),
            Err(TrackerError::CourseNotFound(_))
        ));
    }
}

//! Progress records - sub-milestone flags per course.

use serde::{Deserialize, Serialize};
use crate::catalog::MILESTONES_PER_STATE;
use crate::state::CourseState;
use crate::Time;

/// The four sub-milestone checkboxes of the current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneFlags {
    /// First sub-milestone
    #[serde(default)]
    pub h1: bool,
    /// Second sub-milestone
    #[serde(default)]
    pub h2: bool,
    /// Third sub-milestone
    #[serde(default)]
    pub h3: bool,
    /// Fourth sub-milestone
    #[serde(default)]
    pub h4: bool,
}

impl MilestoneFlags {
    /// All four flags set.
    pub const DONE: Self = Self { h1: true, h2: true, h3: true, h4: true };

    /// Flags as an array, first milestone first.
    pub fn as_array(self) -> [bool; MILESTONES_PER_STATE] {
        [self.h1, self.h2, self.h3, self.h4]
    }

    /// Whether every sub-milestone is ticked.
    pub fn all_done(self) -> bool {
        self.as_array().iter().all(|f| *f)
    }

    /// Number of ticked sub-milestones.
    pub fn completed(self) -> usize {
        self.as_array().iter().filter(|f| **f).count()
    }

    /// Flag at zero-based `index`.
    pub fn get(self, index: usize) -> Option<bool> {
        self.as_array().get(index).copied()
    }

    /// Set the flag at zero-based `index`. Returns false if out of range.
    pub fn set(&mut self, index: usize, value: bool) -> bool {
        let slot = match index {
            0 => &mut self.h1,
            1 => &mut self.h2,
            2 => &mut self.h3,
            3 => &mut self.h4,
            _ => return false,
        };
        *slot = value;
        true
    }
}

impl From<[bool; MILESTONES_PER_STATE]> for MilestoneFlags {
    fn from(flags: [bool; MILESTONES_PER_STATE]) -> Self {
        let [h1, h2, h3, h4] = flags;
        Self { h1, h2, h3, h4 }
    }
}

/// Per-course progress: the state mirror, the flags and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Mirror of the course state
    #[serde(alias = "estadoActual")]
    pub(crate) current_state: CourseState,

    /// Sub-milestone flags
    #[serde(flatten)]
    pub(crate) flags: MilestoneFlags,

    /// Last modification
    #[serde(alias = "ts")]
    pub(crate) updated_at: Time,
}

impl ProgressRecord {
    pub(crate) fn new(state: CourseState) -> Self {
        Self {
            current_state: state,
            flags: MilestoneFlags::default(),
            updated_at: chrono::Utc::now(),
        }
    }

    /// State the course is in.
    pub fn current_state(&self) -> CourseState {
        self.current_state
    }

    /// Current sub-milestone flags.
    pub fn flags(&self) -> MilestoneFlags {
        self.flags
    }

    /// When the record last changed.
    pub fn updated_at(&self) -> Time {
        self.updated_at
    }

    /// All flags ticked in a state that still has somewhere to go.
    ///
    /// Such a record must be advanced before anyone observes it. A record in
    /// `Completed` with every flag ticked is stable.
    pub fn is_unstable(&self) -> bool {
        self.flags.all_done() && self.current_state.successor() != self.current_state
    }

    pub(crate) fn set_flags(&mut self, flags: MilestoneFlags) {
        self.flags = flags;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_indexing() {
        let mut flags = MilestoneFlags::default();
        assert_eq!(flags.completed(), 0);
        assert!(flags.set(2, true));
        assert!(!flags.set(4, true));
        assert_eq!(flags.get(2), Some(true));
        assert_eq!(flags.get(4), None);
        assert_eq!(flags.as_array(), [false, false, true, false]);
        assert!(MilestoneFlags::from([true; 4]).all_done());
    }

    #[test]
    fn test_unstable_only_when_a_successor_exists() {
        let mut record = ProgressRecord::new(CourseState::Planned);
        assert!(!record.is_unstable());
        record.set_flags(MilestoneFlags::DONE);
        assert!(record.is_unstable());

        let mut done = ProgressRecord::new(CourseState::Completed);
        done.set_flags(MilestoneFlags::DONE);
        assert!(!done.is_unstable());

        let mut held = ProgressRecord::new(CourseState::Suspended);
        held.set_flags(MilestoneFlags::DONE);
        assert!(!held.is_unstable());
    }

    #[test]
    fn test_legacy_record_shape() {
        let json = r#"{"estadoActual": "Pendiente", "h1": true, "h2": false, "h3": true, "h4": false,
                       "ts": "2024-05-02T13:45:00.000Z"}"#;
        let record: ProgressRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.current_state(), CourseState::Pending);
        assert_eq!(record.flags().as_array(), [true, false, true, false]);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["current_state"], "Pending");
        assert_eq!(value["h3"], true);
        assert!(value.get("updated_at").is_some());
    }
}

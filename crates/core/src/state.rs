//! Course lifecycle states.
//!
//! Six ordered primary states form a line that a course walks forward (and
//! occasionally backward) one step at a time. Two exceptional states sit off
//! that line: any ordered state can divert into them, and nothing leads out.

use serde::{Deserialize, Serialize};
use crate::error::ParseStateError;

/// Lifecycle state of a course.
///
/// Names used by older exports of the browser tracker are accepted as
/// aliases when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CourseState {
    /// Requirement received, not yet planned
    #[serde(alias = "Pendiente")]
    Pending,
    /// Proposal and budget settled
    #[serde(alias = "Planificado")]
    Planned,
    /// Dates, rosters and materials being prepared
    #[serde(alias = "En Proceso")]
    InProgress,
    /// Logistics and invitations sent
    #[serde(alias = "Programado")]
    Scheduled,
    /// Course is running
    #[serde(alias = "En Ejecución")]
    InExecution,
    /// Course delivered; closing paperwork
    #[serde(alias = "Realizado")]
    Completed,
    /// Stopped indefinitely
    #[serde(alias = "Suspendido")]
    Suspended,
    /// Pushed to a later date
    #[serde(alias = "Postergado")]
    Postponed,
}

/// The ordered primary states, first to last.
pub const ORDERED_STATES: [CourseState; 6] = [
    CourseState::Pending,
    CourseState::Planned,
    CourseState::InProgress,
    CourseState::Scheduled,
    CourseState::InExecution,
    CourseState::Completed,
];

/// The exceptional states.
pub const EXCEPTIONAL_STATES: [CourseState; 2] = [CourseState::Suspended, CourseState::Postponed];

impl CourseState {
    /// Every state, ordered states first.
    pub const ALL: [CourseState; 8] = [
        CourseState::Pending,
        CourseState::Planned,
        CourseState::InProgress,
        CourseState::Scheduled,
        CourseState::InExecution,
        CourseState::Completed,
        CourseState::Suspended,
        CourseState::Postponed,
    ];

    /// Position in the ordered flow, `None` for exceptional states.
    pub fn position(self) -> Option<usize> {
        ORDERED_STATES.iter().position(|s| *s == self)
    }

    /// Whether this is one of the ordered primary states.
    pub fn is_ordered(self) -> bool {
        self.position().is_some()
    }

    /// Whether this is Suspended or Postponed.
    pub fn is_exceptional(self) -> bool {
        !self.is_ordered()
    }

    /// Next state in the ordered flow.
    ///
    /// `Completed` and the exceptional states map to themselves.
    pub fn successor(self) -> Self {
        match self.position() {
            Some(i) if i + 1 < ORDERED_STATES.len() => ORDERED_STATES[i + 1],
            _ => self,
        }
    }

    /// Previous state in the ordered flow.
    ///
    /// `Pending` and the exceptional states map to themselves.
    pub fn predecessor(self) -> Self {
        match self.position() {
            Some(i) if i > 0 => ORDERED_STATES[i - 1],
            _ => self,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Planned => "Planned",
            Self::InProgress => "In-Progress",
            Self::Scheduled => "Scheduled",
            Self::InExecution => "In-Execution",
            Self::Completed => "Completed",
            Self::Suspended => "Suspended",
            Self::Postponed => "Postponed",
        }
    }
}

impl std::fmt::Display for CourseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for CourseState {
    type Err = ParseStateError;

    /// Accepts labels, variant names and the legacy names, ignoring case,
    /// spaces, dashes and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        let state = match key.as_str() {
            "pending" | "pendiente" => Self::Pending,
            "planned" | "planificado" => Self::Planned,
            "inprogress" | "enproceso" => Self::InProgress,
            "scheduled" | "programado" => Self::Scheduled,
            "inexecution" | "enejecución" | "enejecucion" => Self::InExecution,
            "completed" | "realizado" => Self::Completed,
            "suspended" | "suspendido" => Self::Suspended,
            "postponed" | "postergado" => Self::Postponed,
            _ => return Err(ParseStateError(s.to_string())),
        };
        Ok(state)
    }
}

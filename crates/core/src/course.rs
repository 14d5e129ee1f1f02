//! Course model - a trackable training item.

use serde::{Deserialize, Serialize};
use crate::id::CourseId;
use crate::state::CourseState;

/// A training course moving through the lifecycle.
///
/// The state is only written through [`crate::Database::set_state`], which
/// keeps it equal to the progress record's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Course name
    #[serde(alias = "nombre")]
    pub name: String,

    /// Learning objective
    #[serde(default, alias = "objetivo")]
    pub objective: String,

    /// Owning organizational unit
    #[serde(default, alias = "gerencia")]
    pub unit: String,

    /// Current lifecycle state
    #[serde(alias = "estado")]
    pub(crate) state: CourseState,

    /// Delivery modality (in-person, online, ...)
    #[serde(default, alias = "modalidad")]
    pub modality: String,

    /// Duration in hours
    #[serde(default, alias = "horas")]
    pub hours: f64,

    /// Expected participants
    #[serde(default, alias = "participantes")]
    pub participants: u32,

    /// External training provider
    #[serde(default, alias = "otec")]
    pub provider: String,
}

impl Course {
    /// Create a course in the `Pending` state with a fresh identifier.
    pub fn new(spec: CourseSpec) -> Self {
        Self {
            id: CourseId::new(),
            name: spec.name.trim().to_string(),
            objective: spec.objective.trim().to_string(),
            unit: spec.unit.trim().to_string(),
            state: CourseState::Pending,
            modality: spec.modality,
            hours: spec.hours,
            participants: spec.participants,
            provider: spec.provider.trim().to_string(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CourseState {
        self.state
    }
}

/// Specification for creating a course.
#[derive(Debug, Clone, Default)]
pub struct CourseSpec {
    /// Course name (required)
    pub name: String,
    /// Learning objective
    pub objective: String,
    /// Owning organizational unit
    pub unit: String,
    /// Delivery modality
    pub modality: String,
    /// Duration in hours
    pub hours: f64,
    /// Expected participants
    pub participants: u32,
    /// External training provider
    pub provider: String,
}

impl CourseSpec {
    /// A `CourseSpec` with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Filter for querying courses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseFilter {
    /// Only courses owned by this unit
    pub unit: Option<String>,

    /// Only courses in this state
    pub state: Option<CourseState>,

    /// Case-insensitive match on name or provider
    pub search: Option<String>,
}

impl CourseFilter {
    /// Whether `course` passes every set criterion.
    pub fn matches(&self, course: &Course) -> bool {
        if let Some(unit) = self.unit.as_deref().filter(|u| !u.is_empty()) {
            if course.unit != unit {
                return false;
            }
        }
        if let Some(state) = self.state {
            if course.state != state {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                course.name.to_lowercase().contains(&term)
                    || course.provider.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

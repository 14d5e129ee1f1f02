//! Milestone catalog - the four sub-milestones of each ordered state.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::error::{CoreError, Result};
use crate::state::{CourseState, ORDERED_STATES};

/// Number of sub-milestones per ordered state.
pub const MILESTONES_PER_STATE: usize = 4;

/// Descriptions of the sub-milestones that gate each ordered state.
///
/// Serialized as a JSON object keyed by state name. An entry must hold
/// exactly four texts; anything else fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneCatalog(BTreeMap<CourseState, [String; MILESTONES_PER_STATE]>);

impl MilestoneCatalog {
    /// A catalog with no entries.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Milestone texts for `state`, in order.
    ///
    /// Empty for exceptional states and for states the catalog lacks.
    pub fn milestones_for(&self, state: CourseState) -> &[String] {
        self.0.get(&state).map(|m| m.as_slice()).unwrap_or(&[])
    }

    /// Replace the texts of an ordered state, returning the previous ones.
    pub fn set_milestones(
        &mut self,
        state: CourseState,
        texts: [String; MILESTONES_PER_STATE],
    ) -> Result<Option<[String; MILESTONES_PER_STATE]>> {
        if !state.is_ordered() {
            return Err(CoreError::NotOrdered(state));
        }
        Ok(self.0.insert(state, texts))
    }

    /// Iterate over the entries in flow order.
    pub fn iter(&self) -> impl Iterator<Item = (CourseState, &[String])> {
        self.0.iter().map(|(state, texts)| (*state, texts.as_slice()))
    }

    /// Check that only ordered states carry milestones.
    pub fn validate(&self) -> Result<()> {
        match self.0.keys().find(|s| !s.is_ordered()) {
            Some(state) => Err(CoreError::NotOrdered(*state)),
            None => Ok(()),
        }
    }
}

impl Default for MilestoneCatalog {
    fn default() -> Self {
        let texts: [[&str; MILESTONES_PER_STATE]; 6] = [
            [
                "Receive requirements from the training team",
                "Validate with the technical lead (process owners)",
                "Analyse needs and scope",
                "Preliminary approval of the requirement",
            ],
            [
                "Request technical and commercial proposals from providers",
                "Comparison matrix and final proposal",
                "Validate the proposal with process owners",
                "Assign budget",
            ],
            [
                "Review shifts and operating conditions",
                "Lay out execution dates",
                "Final validation of participant rosters",
                "Prepare materials and resources",
            ],
            [
                "Coordinate additional logistics",
                "Prepare and send invitations",
                "Coordinate with the provider",
                "Confirm attendance",
            ],
            [
                "Supervise effective delivery",
                "Track daily attendance",
                "Performance evaluation",
                "Log incidents and notes",
            ],
            [
                "Upload attendance to the LMS",
                "Collect satisfaction surveys",
                "Issue certificates",
                "Administrative close-out and filing",
            ],
        ];

        Self(
            ORDERED_STATES
                .iter()
                .zip(texts)
                .map(|(state, t)| (*state, t.map(String::from)))
                .collect(),
        )
    }
}

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};

use crate::Compartments;

/// A snapshot of the epidemic at one instant of a run.
///
/// `policy` is the social-distancing strength that was applied over the step
/// arriving at this snapshot; for the initial snapshot it is the first
/// strength of the policy path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(rename = "T")]
    pub time: DateTime,
    #[serde(rename = "P")]
    pub policy: f64,
    #[serde(flatten)]
    pub compartments: Compartments,
}

/// Input to the [`FlowModel`](crate::FlowModel) as carried through the solver.
///
/// Besides the snapshot itself, it records the strength in force for the
/// step leaving this snapshot, which the flows are computed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    /// Number of steps taken so far.
    pub step: usize,
    pub time: DateTime,
    /// Strength applied on the step that arrived here.
    pub applied_policy: f64,
    /// Strength in force for the step leaving here.
    pub social_distancing: f64,
    pub compartments: Compartments,
}

impl Conditions {
    /// The snapshot recorded in the trajectory.
    #[must_use]
    pub fn state(&self) -> State {
        State {
            time: self.time,
            policy: self.applied_policy,
            compartments: self.compartments,
        }
    }
}

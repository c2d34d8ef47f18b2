use contagion_solvers::transient::euler::{Solution, Status};
use jiff::civil::DateTime;
use serde::Serialize;

use crate::{Compartment, Conditions, Flows, State, StepSize};

/// The full history of one simulation run.
///
/// Holds one [`State`] per integration step plus the initial condition, in
/// time order. A completed run has `policy path length + 1` snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    step_size: StepSize,
    states: Vec<State>,
    #[serde(skip)]
    status: Status,
}

impl Trajectory {
    pub(crate) fn from_solution(solution: Solution<Conditions, Flows>, step_size: StepSize) -> Self {
        Self {
            step_size,
            states: solution
                .history
                .iter()
                .map(|snapshot| snapshot.input.state())
                .collect(),
            status: solution.status,
        }
    }

    /// Snapshots in time order.
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`: a trajectory holds at least its initial condition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn step_size(&self) -> StepSize {
        self.step_size
    }

    /// Whether the run covered the whole policy path.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// The initial condition.
    #[must_use]
    pub fn initial(&self) -> &State {
        &self.states[0]
    }

    /// The last snapshot.
    #[must_use]
    pub fn final_state(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    /// Timestamps of every snapshot.
    #[must_use]
    pub fn times(&self) -> Vec<DateTime> {
        self.states.iter().map(|state| state.time).collect()
    }

    /// Applied policy strength of every snapshot.
    #[must_use]
    pub fn policy(&self) -> Vec<f64> {
        self.states.iter().map(|state| state.policy).collect()
    }

    /// One compartment's population at every snapshot.
    #[must_use]
    pub fn series(&self, compartment: Compartment) -> Vec<f64> {
        self.states
            .iter()
            .map(|state| state.compartments.get(compartment))
            .collect()
    }

    /// Total population at every snapshot.
    #[must_use]
    pub fn totals(&self) -> Vec<f64> {
        self.states
            .iter()
            .map(|state| state.compartments.total())
            .collect()
    }

    /// Largest relative deviation of the total population from its initial value.
    #[must_use]
    pub fn conservation_drift(&self) -> f64 {
        let initial = self.initial().compartments.total();
        self.totals()
            .into_iter()
            .map(|total| ((total - initial) / initial).abs())
            .fold(0.0, f64::max)
    }
}

use contagion_core::{DerivativeOf, OdeProblem};
use serde::{Deserialize, Serialize};

use crate::{Compartments, Conditions, Flows, policy::PolicyError, policy::PolicyPath};

/// How the stepped compartments are post-processed after each Euler update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clamping {
    /// Keep the raw Euler update; large steps may leave small negative values.
    #[default]
    Off,
    /// Raise negative compartments to zero. Breaks exact conservation.
    NonNegative,
}

/// The SEIR model as an initial value problem driven by a policy path.
///
/// Step `k` moves from snapshot `k` to `k + 1` using the strength of path
/// entry `k`. The strength for the next step is applied in
/// [`finalize_step`](OdeProblem::finalize_step), once the new snapshot exists.
#[derive(Debug, Clone, Copy)]
pub struct SeirProblem<'a> {
    path: &'a PolicyPath,
    clamping: Clamping,
}

impl<'a> SeirProblem<'a> {
    #[must_use]
    pub fn new(path: &'a PolicyPath, clamping: Clamping) -> Self {
        Self { path, clamping }
    }

    /// Model input for the initial condition.
    #[must_use]
    pub fn initial_conditions(&self, compartments: Compartments) -> Conditions {
        Conditions {
            step: 0,
            time: self.path.start(),
            applied_policy: self.path.initial_strength(),
            social_distancing: self.path.strength_for_step(0),
            compartments,
        }
    }
}

impl OdeProblem for SeirProblem<'_> {
    type Input = Conditions;
    type Output = Flows;
    type Delta = f64;
    type State = Compartments;
    type Error = PolicyError;

    fn state(&self, input: &Conditions) -> Result<Compartments, PolicyError> {
        Ok(input.compartments)
    }

    fn derivative(
        &self,
        _input: &Conditions,
        output: &Flows,
    ) -> Result<DerivativeOf<Compartments, f64>, PolicyError> {
        Ok(*output)
    }

    fn build_input(
        &self,
        base: &Conditions,
        state: &Compartments,
        _delta: &f64,
    ) -> Result<Conditions, PolicyError> {
        let step = base.step + 1;

        Ok(Conditions {
            step,
            time: self.path.time_at(step)?,
            applied_policy: base.social_distancing,
            social_distancing: base.social_distancing,
            compartments: *state,
        })
    }

    fn finalize_step(
        &self,
        mut next_input: Conditions,
        _prev_input: &Conditions,
        _prev_output: &Flows,
        _step_delta: &f64,
    ) -> Result<Conditions, PolicyError> {
        next_input.social_distancing = self.path.strength_for_step(next_input.step);

        if self.clamping == Clamping::NonNegative {
            next_input.compartments = next_input.compartments.clamp_non_negative();
        }

        Ok(next_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::StepSize;

    fn path() -> PolicyPath {
        PolicyPath::from_steps(
            [("2020-03-01", 0.0), ("2020-03-02", 0.8), ("2020-03-03", 0.4)],
            StepSize::days(0.5).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn next_step_picks_up_the_following_entry() {
        let path = path();
        let problem = SeirProblem::new(&path, Clamping::Off);
        let initial = problem.initial_conditions(Compartments::default());

        let mut input = initial;
        let mut applied = Vec::new();
        for _ in 0..path.len() {
            let next = problem
                .build_input(&input, &input.compartments, &0.5)
                .unwrap();
            input = problem
                .finalize_step(next, &input, &Flows::default(), &0.5)
                .unwrap();
            applied.push(input.applied_policy);
        }

        assert_eq!(initial.social_distancing, 0.0);
        assert_eq!(applied, vec![0.0, 0.0, 0.8, 0.8]);
        assert_eq!(input.social_distancing, 0.4);
        assert_eq!(input.time, path.time_at(4).unwrap());
    }

    #[test]
    fn clamping_removes_negative_populations() {
        let path = path();
        let problem = SeirProblem::new(&path, Clamping::NonNegative);
        let base = problem.initial_conditions(Compartments::default());
        let overshoot = Compartments {
            exposed: -0.001,
            susceptible: 1.0,
            ..Compartments::default()
        };

        let next = problem.build_input(&base, &overshoot, &0.5).unwrap();
        let next = problem
            .finalize_step(next, &base, &Flows::default(), &0.5)
            .unwrap();

        assert_eq!(next.compartments.exposed, 0.0);
        assert_eq!(next.compartments.susceptible, 1.0);
    }
}

//! Forward Euler solver for ODE problems.
//!
//! Steps a model forward with the explicit Euler rule:
//!
//! ```text
//! state_{n+1} = state_n + derivative_n * dt
//! ```
//!
//! The step size is fixed for the whole run; there is no error control.
//!
//! # Example
//!
//! ```ignore
//! use contagion_solvers::transient::euler;
//!
//! let solution = euler::solve_unobserved(&model, &problem, initial_input, dt, steps)?;
//!
//! for snapshot in &solution.history {
//!     println!("{:?} -> {:?}", snapshot.input, snapshot.output);
//! }
//! ```

mod action;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use contagion_core::{Model, Observer, OdeProblem, Snapshot, StepIntegrable};

/// Integrates an ODE problem using forward Euler.
///
/// # Algorithm
///
/// 1. Call the model with the initial input to get the initial snapshot.
/// 2. For each step:
///    - Extract the state from the current input.
///    - Compute the derivative from the current input and output.
///    - Step the state forward: `state + derivative * dt`.
///    - Build the next input from the stepped state.
///    - Finalize the step (discrete controls, constraints).
///    - Call the model to get the next output.
///    - Emit an [`Event`] to the observer.
///    - If the observer returns [`Action::StopEarly`], terminate.
/// 3. Return the solution with the full history.
///
/// # Errors
///
/// Returns an error tagged with the failing step if the model or problem
/// returns an error at any point. No partial history is returned.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: P::Delta,
    steps: usize,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
    P::Delta: Clone,
    Obs: Observer<Event<M::Input, M::Output>, Action>,
{
    let initial_output = model.call(&initial).map_err(Error::model(0))?;
    let initial_snapshot = Snapshot::new(initial, initial_output);

    let mut history = Vec::with_capacity(steps + 1);
    history.push(initial_snapshot.clone());

    let event = Event {
        step: 0,
        snapshot: initial_snapshot.clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            history,
            steps: 0,
        });
    }

    let mut current = initial_snapshot;

    for step in 1..=steps {
        let state = problem.state(&current.input).map_err(Error::problem(step))?;
        let derivative = problem
            .derivative(&current.input, &current.output)
            .map_err(Error::problem(step))?;

        let next_state = state.step(derivative, dt.clone());

        let next_input = problem
            .build_input(&current.input, &next_state, &dt)
            .map_err(Error::problem(step))?;
        let next_input = problem
            .finalize_step(next_input, &current.input, &current.output, &dt)
            .map_err(Error::problem(step))?;

        let next_output = model.call(&next_input).map_err(Error::model(step))?;
        let next_snapshot = Snapshot::new(next_input, next_output);

        history.push(next_snapshot.clone());

        let event = Event {
            step,
            snapshot: next_snapshot.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                steps: step,
            });
        }

        current = next_snapshot;
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        steps,
    })
}

/// Integrates an ODE problem using forward Euler without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error if the model or problem returns an error at any point.
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: P::Delta,
    steps: usize,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
    P::Delta: Clone,
{
    solve(model, problem, initial, dt, steps, ())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;
    use contagion_core::DerivativeOf;

    // --- Test fixtures ---

    /// Two-compartment chain: infected drain into recovered.
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Populations {
        infected: f64,
        recovered: f64,
    }

    #[derive(Debug, Clone, Copy)]
    struct Flows {
        infected: f64,
        recovered: f64,
    }

    impl StepIntegrable<f64> for Populations {
        type Derivative = Flows;

        fn step(&self, flows: Flows, dt: f64) -> Self {
            Populations {
                infected: self.infected + flows.infected * dt,
                recovered: self.recovered + flows.recovered * dt,
            }
        }
    }

    #[derive(Debug, Clone)]
    struct Input {
        populations: Populations,
        day: f64,
    }

    /// Recovery at a fixed per-day rate.
    struct Recovery {
        rate: f64,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("population went negative")]
    struct NegativePopulation;

    impl Model for Recovery {
        type Input = Input;
        type Output = Flows;
        type Error = NegativePopulation;

        fn call(&self, input: &Input) -> Result<Flows, NegativePopulation> {
            if input.populations.infected < 0.0 {
                return Err(NegativePopulation);
            }
            let recovering = self.rate * input.populations.infected;
            Ok(Flows {
                infected: -recovering,
                recovered: recovering,
            })
        }
    }

    struct RecoveryProblem;

    impl OdeProblem for RecoveryProblem {
        type Input = Input;
        type Output = Flows;
        type Delta = f64;
        type State = Populations;
        type Error = Infallible;

        fn state(&self, input: &Input) -> Result<Populations, Infallible> {
            Ok(input.populations)
        }

        fn derivative(
            &self,
            _input: &Input,
            output: &Flows,
        ) -> Result<DerivativeOf<Populations, f64>, Infallible> {
            Ok(*output)
        }

        fn build_input(
            &self,
            base: &Input,
            state: &Populations,
            delta: &f64,
        ) -> Result<Input, Infallible> {
            Ok(Input {
                populations: *state,
                day: base.day + delta,
            })
        }
    }

    fn initial() -> Input {
        Input {
            populations: Populations {
                infected: 100.0,
                recovered: 0.0,
            },
            day: 0.0,
        }
    }

    // --- Tests ---

    #[test]
    fn exponential_recovery() {
        let model = Recovery { rate: 0.5 };

        let solution =
            solve_unobserved(&model, &RecoveryProblem, initial(), 0.5, 4).expect("should solve");

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(solution.steps, 4);
        assert_eq!(solution.history.len(), 5);

        // Each step keeps 1 - 0.5 * 0.5 = 0.75 of the infected.
        let last = solution.history.last().unwrap();
        assert_relative_eq!(last.input.populations.infected, 100.0 * 0.75_f64.powi(4));
        assert_relative_eq!(
            last.input.populations.infected + last.input.populations.recovered,
            100.0
        );
        assert_relative_eq!(last.input.day, 2.0);
    }

    #[test]
    fn observer_can_stop_early() {
        let model = Recovery { rate: 0.1 };

        let observer = |event: &Event<Input, Flows>| (event.step >= 5).then_some(Action::StopEarly);

        let solution = solve(&model, &RecoveryProblem, initial(), 1.0, 100, observer)
            .expect("should stop early");

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.steps, 5);
        assert_eq!(solution.history.len(), 6);
    }

    #[test]
    fn zero_steps_returns_initial() {
        let model = Recovery { rate: 0.1 };

        let solution = solve_unobserved(&model, &RecoveryProblem, initial(), 1.0, 0)
            .expect("should return initial");

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(solution.history.len(), 1);
        assert_relative_eq!(solution.history[0].input.populations.infected, 100.0);
    }

    #[test]
    fn step_numbers_start_at_zero() {
        let model = Recovery { rate: 0.1 };

        let mut steps_seen = Vec::new();
        solve(
            &model,
            &RecoveryProblem,
            initial(),
            0.25,
            4,
            |event: &Event<Input, Flows>| {
                steps_seen.push(event.step);
                None
            },
        )
        .expect("should solve");

        assert_eq!(steps_seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn model_error_reports_failing_step() {
        // A step of 2 days at rate 1.0 overshoots to -100 infected on step 1,
        // which the model rejects when evaluated at the new input.
        let model = Recovery { rate: 1.0 };

        let error = solve_unobserved(&model, &RecoveryProblem, initial(), 2.0, 3).unwrap_err();

        assert!(matches!(error, Error::Model { step: 1, .. }));
        assert!(error.into_source().downcast::<NegativePopulation>().is_ok());
    }
}

use std::collections::BTreeMap;

use contagion_core::Observer;
use contagion_solvers::transient::euler::{self, Action, Event};
use tracing::{debug, trace};

use crate::{
    Clamping, Compartments, Conditions, FlowModel, Flows, Parameters, SeirProblem, StepSize,
    Trajectory,
    error::Error,
    policy::{PolicyError, PolicyPath, PolicySchedule},
};

/// Event emitted once per snapshot of a run.
pub type SeirEvent = Event<Conditions, Flows>;

/// A configured SEIR simulation, ready to run against policy scenarios.
///
/// Construction validates everything that does not depend on the policy, so
/// a run can only fail on the policy itself or on a numeric blow-up. A
/// `Simulation` holds no per-run state and can be shared across threads to
/// run several scenarios in parallel.
///
/// # Examples
///
/// ```
/// use contagion_seir::{Compartments, Parameters, Simulation, StepSize};
///
/// let parameters = Parameters {
///     beta: 0.5,
///     t_incubation: 5.0,
///     t_presymptomatic: 1.0,
///     t_recovery_asymptomatic: 6.0,
///     t_recovery_mild: 6.0,
///     t_recovery_severe: 18.0,
///     t_hospital_lag: 5.0,
///     t_death: 10.0,
///     p_self_quarantine: 0.5,
///     p_asymptomatic: 0.2,
///     p_severe: 0.1,
///     p_fatal: 0.05,
///     p_icu_given_hospital: 0.3,
/// };
/// let initial = Compartments {
///     susceptible: 0.999,
///     infectious: 0.001,
///     ..Compartments::default()
/// };
///
/// let simulation =
///     Simulation::from_parts(parameters, initial, StepSize::days(0.1).unwrap()).unwrap();
/// let trajectory = simulation
///     .run([("2020-03-01", 0.0), ("2020-03-15", 0.5), ("2020-04-01", 0.2)])
///     .unwrap();
///
/// assert_eq!(trajectory.len(), 311);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    parameters: Parameters,
    model: FlowModel,
    initial: Compartments,
    step_size: StepSize,
    clamping: Clamping,
}

impl Simulation {
    /// Creates a simulation from string-keyed parameter and initial-state maps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if a required key is absent,
    /// [`Error::InvalidParameter`] for an out-of-range value, or
    /// [`Error::InvalidPolicy`] for a non-positive step size.
    pub fn new(
        parameters: &BTreeMap<String, f64>,
        initial_state: &BTreeMap<String, f64>,
        step_size_days: f64,
    ) -> Result<Self, Error> {
        Self::from_parts(
            Parameters::from_map(parameters)?,
            Compartments::from_map(initial_state)?,
            StepSize::days(step_size_days)?,
        )
    }

    /// Creates a simulation from typed parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the parameters or initial
    /// compartments fail validation.
    pub fn from_parts(
        parameters: Parameters,
        initial: Compartments,
        step_size: StepSize,
    ) -> Result<Self, Error> {
        let model = FlowModel::new(&parameters)?;
        initial.validate()?;

        Ok(Self {
            parameters,
            model,
            initial,
            step_size,
            clamping: Clamping::Off,
        })
    }

    /// Sets how compartments are post-processed after each step.
    #[must_use]
    pub fn with_clamping(self, clamping: Clamping) -> Self {
        Self { clamping, ..self }
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn model(&self) -> &FlowModel {
        &self.model
    }

    #[must_use]
    pub fn initial(&self) -> &Compartments {
        &self.initial
    }

    #[must_use]
    pub fn step_size(&self) -> StepSize {
        self.step_size
    }

    #[must_use]
    pub fn clamping(&self) -> Clamping {
        self.clamping
    }

    /// Runs the simulation over `(ISO 8601 date, strength)` breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicy`] if the breakpoints are invalid, or
    /// [`Error::NumericDomain`] if a flow becomes non-finite.
    pub fn run<I, S>(&self, policy_steps: I) -> Result<Trajectory, Error>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        self.run_schedule(&PolicySchedule::parse(policy_steps)?)
    }

    /// Runs the simulation over a validated schedule.
    ///
    /// # Errors
    ///
    /// See [`Simulation::run`].
    pub fn run_schedule(&self, schedule: &PolicySchedule) -> Result<Trajectory, Error> {
        self.run_path(&PolicyPath::expand(schedule, self.step_size)?)
    }

    /// Runs the simulation over an expanded path, one step per entry.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::StepSizeMismatch`] if the path was expanded at a
    /// different step size, or any error from [`Simulation::run`].
    pub fn run_path(&self, path: &PolicyPath) -> Result<Trajectory, Error> {
        self.run_observed(path, ())
    }

    /// Runs the simulation, reporting every snapshot to `observer`.
    ///
    /// The observer may return [`Action::StopEarly`] to end the run; the
    /// returned trajectory then holds the snapshots produced so far and its
    /// [`status`](Trajectory::status) says so.
    ///
    /// # Errors
    ///
    /// See [`Simulation::run_path`].
    pub fn run_observed<O>(&self, path: &PolicyPath, mut observer: O) -> Result<Trajectory, Error>
    where
        O: Observer<SeirEvent, Action>,
    {
        if path.step_size() != self.step_size {
            return Err(PolicyError::StepSizeMismatch {
                path_days: path.step_size().as_days(),
                simulation_days: self.step_size.as_days(),
            }
            .into());
        }

        let problem = SeirProblem::new(path, self.clamping);
        let initial = problem.initial_conditions(self.initial);

        debug!(
            start = %path.start(),
            steps = path.len(),
            step_days = self.step_size.as_days(),
            clamping = ?self.clamping,
            "starting run"
        );

        let logged = |event: &SeirEvent| {
            let conditions = &event.snapshot.input;
            trace!(
                step = event.step,
                time = %conditions.time,
                policy = conditions.applied_policy,
                susceptible = conditions.compartments.susceptible,
                infected = conditions.compartments.infected(),
                "snapshot"
            );
            observer.observe(event)
        };

        let solution = euler::solve(
            &self.model,
            &problem,
            initial,
            self.step_size.as_days(),
            path.len(),
            logged,
        )?;
        let trajectory = Trajectory::from_solution(solution, self.step_size);

        debug!(
            snapshots = trajectory.len(),
            status = ?trajectory.status(),
            end = %trajectory.final_state().time,
            conservation_drift = trajectory.conservation_drift(),
            "finished run"
        );

        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use contagion_solvers::transient::euler::Status;
    use jiff::civil::date;

    use crate::{Compartment, parameters::tests::covid_like};

    fn seeded() -> Compartments {
        Compartments {
            susceptible: 0.999,
            infectious: 0.001,
            ..Compartments::default()
        }
    }

    fn simulation(step_days: f64) -> Simulation {
        Simulation::from_parts(covid_like(), seeded(), StepSize::days(step_days).unwrap())
            .unwrap()
    }

    #[test]
    fn trajectory_has_one_snapshot_per_entry_plus_initial() {
        let sim = simulation(0.5);
        let path = PolicyPath::from_steps(
            [("2020-03-01", 0.0), ("2020-03-11", 0.5)],
            sim.step_size(),
        )
        .unwrap();

        let trajectory = sim.run_path(&path).unwrap();

        assert_eq!(trajectory.len(), path.len() + 1);
        assert_eq!(trajectory.status(), Status::Complete);
        assert_eq!(trajectory.initial().time, date(2020, 3, 1).at(0, 0, 0, 0));
        assert_eq!(trajectory.final_state().time, date(2020, 3, 11).at(0, 0, 0, 0));
        assert_eq!(trajectory.initial().compartments, seeded());
    }

    #[test]
    fn snapshots_are_tagged_with_the_strength_that_produced_them() {
        let trajectory = simulation(1.0)
            .run([("2020-03-01", 0.1), ("2020-03-03", 0.9), ("2020-03-05", 0.0)])
            .unwrap();

        assert_eq!(trajectory.policy(), vec![0.1, 0.1, 0.1, 0.9, 0.9]);
    }

    #[test]
    fn first_step_matches_hand_computed_euler_update() {
        let sim = simulation(0.1);
        let trajectory = sim.run([("2020-03-01", 0.2), ("2020-03-02", 0.2)]).unwrap();

        // dS = -beta * (1 - 0.2)^2 * I * S * dT
        let exposure = 0.5 * 0.64 * 0.001 * 0.999;
        let second = &trajectory.states()[1].compartments;
        assert_relative_eq!(second.susceptible, 0.999 - exposure * 0.1, max_relative = 1e-12);
        assert_relative_eq!(second.exposed, exposure * 0.1, max_relative = 1e-12);
        assert_relative_eq!(second.infectious, 0.001 - 0.001 * 0.1, max_relative = 1e-12);
        assert_relative_eq!(second.mild, 0.65 * 0.001 * 0.1, max_relative = 1e-9);
    }

    #[test]
    fn observer_can_stop_a_run() {
        let sim = simulation(0.1);
        let path = PolicyPath::from_steps(
            [("2020-03-01", 0.0), ("2020-06-01", 0.0)],
            sim.step_size(),
        )
        .unwrap();

        let trajectory = sim
            .run_observed(&path, |event: &SeirEvent| {
                (event.snapshot.input.compartments.infected() > 0.01).then_some(Action::StopEarly)
            })
            .unwrap();

        assert_eq!(trajectory.status(), Status::StoppedByObserver);
        assert!(trajectory.len() < path.len() + 1);
        assert!(trajectory.final_state().compartments.infected() > 0.01);
    }

    #[test]
    fn mismatched_path_step_size_is_rejected() {
        let path = PolicyPath::from_steps(
            [("2020-03-01", 0.0), ("2020-03-11", 0.5)],
            StepSize::days(1.0).unwrap(),
        )
        .unwrap();

        let result = simulation(0.5).run_path(&path);

        assert!(matches!(
            result,
            Err(Error::InvalidPolicy(PolicyError::StepSizeMismatch { .. }))
        ));
    }

    #[test]
    fn invalid_policy_is_reported_before_running() {
        let result = simulation(1.0).run([("2020-03-01", 0.0)]);

        assert!(matches!(
            result,
            Err(Error::InvalidPolicy(PolicyError::TooFewBreakpoints { count: 1 }))
        ));
    }

    #[test]
    fn overflowing_flows_abort_the_run() {
        // An absurd transmission rate with a coarse step makes the Euler
        // update oscillate with growing amplitude until it overflows.
        let parameters = Parameters {
            beta: 1e150,
            ..covid_like()
        };
        let sim = Simulation::from_parts(parameters, seeded(), StepSize::days(1.0).unwrap())
            .unwrap();

        let result = sim.run([("2020-03-01", 0.0), ("2021-03-01", 0.0)]);

        assert!(matches!(result, Err(Error::NumericDomain(_))));
    }

    #[test]
    fn clamping_keeps_every_compartment_non_negative() {
        let parameters = Parameters {
            beta: 50.0,
            ..covid_like()
        };
        let sim = Simulation::from_parts(parameters, seeded(), StepSize::days(1.0).unwrap())
            .unwrap()
            .with_clamping(Clamping::NonNegative);

        let trajectory = sim.run([("2020-03-01", 0.0), ("2020-03-08", 0.0)]).unwrap();

        for compartment in Compartment::ALL {
            assert!(
                trajectory.series(compartment).iter().all(|&v| v >= 0.0),
                "{compartment} went negative"
            );
        }
    }
}

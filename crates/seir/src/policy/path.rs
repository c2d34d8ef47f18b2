use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PolicyError, PolicySchedule};
use crate::StepSize;

/// One integration step's worth of policy: the strength applied from `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    pub time: DateTime,
    pub strength: f64,
}

/// A policy schedule expanded to one entry per integration step.
///
/// Each bounded regime `[d_i, d_{i+1})` contributes
/// `floor(whole_days / dT)` entries at `d_i, d_i + dT, d_i + 2dT, ...`, all
/// carrying that regime's strength. The last breakpoint only bounds the
/// previous regime, so the path covers `[first_date, last_date)`.
///
/// # Examples
///
/// ```
/// use contagion_seir::{StepSize, policy::PolicyPath};
///
/// let path = PolicyPath::from_steps(
///     [("2020-03-01", 0.0), ("2020-03-11", 0.5)],
///     StepSize::days(1.0).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(path.len(), 10);
/// assert!(path.entries().iter().all(|entry| entry.strength == 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyPath {
    entries: Vec<PathEntry>,
    step_size: StepSize,
    terminal_strength: f64,
}

impl PolicyPath {
    /// Expands a schedule at the given step size.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyPath`] if no regime is long enough to hold
    /// a single step, or [`PolicyError::TimeOverflow`] if a timestamp leaves
    /// the supported date range.
    pub fn expand(schedule: &PolicySchedule, step_size: StepSize) -> Result<Self, PolicyError> {
        let mut entries = Vec::new();

        for regime in schedule.regimes() {
            let Some(days) = regime.whole_days() else {
                continue;
            };
            let count = (days as f64 / step_size.as_days()).floor() as usize;

            entries.reserve(count);
            for n in 0..count {
                entries.push(PathEntry {
                    time: step_size.advance(regime.start(), n)?,
                    strength: regime.strength(),
                });
            }
        }

        if entries.is_empty() {
            return Err(PolicyError::EmptyPath {
                span_days: schedule.end().duration_since(schedule.start()).as_secs() / 86_400,
                step_days: step_size.as_days(),
            });
        }

        debug!(
            start = %schedule.start(),
            end = %schedule.end(),
            regimes = schedule.regimes().len() - 1,
            entries = entries.len(),
            step_days = step_size.as_days(),
            "expanded policy path"
        );

        Ok(Self {
            entries,
            step_size,
            terminal_strength: schedule.terminal_strength(),
        })
    }

    /// Parses `(ISO 8601 date, strength)` breakpoints and expands them.
    ///
    /// # Errors
    ///
    /// Returns any error from [`PolicySchedule::parse`] or [`PolicyPath::expand`].
    pub fn from_steps<I, S>(steps: I, step_size: StepSize) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self::expand(&PolicySchedule::parse(steps)?, step_size)
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// Number of entries, which is the number of integration steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; expansion rejects empty paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn step_size(&self) -> StepSize {
        self.step_size
    }

    /// Timestamp of the first entry, where the simulation starts.
    #[must_use]
    pub fn start(&self) -> DateTime {
        self.entries[0].time
    }

    /// Strength of the first entry.
    #[must_use]
    pub fn initial_strength(&self) -> f64 {
        self.entries[0].strength
    }

    /// Strength applied on the step leaving snapshot `step`.
    ///
    /// Past the end of the path this is the last breakpoint's strength,
    /// which holds from the final breakpoint date onward.
    #[must_use]
    pub fn strength_for_step(&self, step: usize) -> f64 {
        self.entries
            .get(step)
            .map_or(self.terminal_strength, |entry| entry.strength)
    }

    /// Simulated time after `step` steps: `start + step * dT`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::TimeOverflow`] if the time is not representable.
    pub fn time_at(&self, step: usize) -> Result<DateTime, PolicyError> {
        self.step_size.advance(self.start(), step)
    }
}

use jiff::{SignedDuration, civil::DateTime};
use serde::{Deserialize, Serialize};

use crate::policy::PolicyError;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Fixed integration step, in days.
///
/// Timestamps are always derived from an integer step count, as
/// `origin + steps * dT`, so they do not drift over long runs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct StepSize(f64);

impl StepSize {
    /// Creates a step size of the given number of days.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidStepSize`] if `days` is not finite and positive.
    pub fn days(days: f64) -> Result<Self, PolicyError> {
        if days.is_finite() && days > 0.0 {
            Ok(Self(days))
        } else {
            Err(PolicyError::InvalidStepSize { days })
        }
    }

    /// The step size in days.
    #[must_use]
    pub fn as_days(self) -> f64 {
        self.0
    }

    /// Duration covered by `steps` steps, rounded to the microsecond.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::TimeOverflow`] if the duration is not representable.
    pub fn offset(self, steps: usize) -> Result<SignedDuration, PolicyError> {
        let micros = (steps as f64 * self.0 * MICROS_PER_DAY).round();
        if micros >= i64::MAX as f64 {
            return Err(PolicyError::TimeOverflow { steps, days: self.0 });
        }
        Ok(SignedDuration::from_micros(micros as i64))
    }

    /// Timestamp reached after `steps` steps from `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::TimeOverflow`] if the result leaves the supported
    /// date range.
    pub fn advance(self, origin: DateTime, steps: usize) -> Result<DateTime, PolicyError> {
        origin
            .checked_add(self.offset(steps)?)
            .map_err(|_| PolicyError::TimeOverflow { steps, days: self.0 })
    }
}

impl TryFrom<f64> for StepSize {
    type Error = PolicyError;

    fn try_from(days: f64) -> Result<Self, Self::Error> {
        Self::days(days)
    }
}

impl From<StepSize> for f64 {
    fn from(step_size: StepSize) -> Self {
        step_size.0
    }
}

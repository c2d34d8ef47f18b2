//! Social-distancing policy: sparse breakpoints and their dense expansion.
//!
//! A policy is written as a few dated breakpoints, each holding a
//! social-distancing strength until the next one. [`PolicySchedule`]
//! validates the breakpoints and [`PolicyPath`] expands them into one entry
//! per integration step.

mod path;
mod schedule;

use jiff::civil::{Date, DateTime, Time};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use path::{PathEntry, PolicyPath};
pub use schedule::{PolicySchedule, Regime};

/// A policy breakpoint: `strength` takes effect at `date`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyStep {
    pub date: DateTime,
    /// Social-distancing strength, normally in `[0, 1]`.
    pub strength: f64,
}

/// Errors raised while building or expanding a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("a policy needs at least 2 breakpoints, got {count}")]
    TooFewBreakpoints { count: usize },

    #[error("cannot parse `{date}` as an ISO 8601 date")]
    InvalidDate {
        date: String,
        #[source]
        source: jiff::Error,
    },

    #[error("breakpoint {index} ({date}) does not come after the previous one ({previous})")]
    NonChronological {
        index: usize,
        previous: DateTime,
        date: DateTime,
    },

    #[error("step size must be finite and positive, got {days} days")]
    InvalidStepSize { days: f64 },

    #[error("policy spanning {span_days} whole days has no steps of {step_days} days")]
    EmptyPath { span_days: i64, step_days: f64 },

    #[error("path step size of {path_days} days differs from the simulation's {simulation_days}")]
    StepSizeMismatch { path_days: f64, simulation_days: f64 },

    #[error("{steps} steps of {days} days leave the supported date range")]
    TimeOverflow { steps: usize, days: f64 },
}

impl PolicyStep {
    /// Creates a breakpoint at `date`.
    #[must_use]
    pub fn new(date: DateTime, strength: f64) -> Self {
        Self { date, strength }
    }

    /// Creates a breakpoint from an ISO 8601 date (`2020-03-01`) or
    /// date-time (`2020-03-01T12:00:00`). Dates start at midnight.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidDate`] if `date` cannot be parsed.
    pub fn parse(date: &str, strength: f64) -> Result<Self, PolicyError> {
        let text = date.trim();
        let date = text
            .parse::<DateTime>()
            .or_else(|_| {
                text.parse::<Date>()
                    .map(|date| date.to_datetime(Time::midnight()))
            })
            .map_err(|source| PolicyError::InvalidDate {
                date: text.to_string(),
                source,
            })?;

        Ok(Self::new(date, strength))
    }
}

//! Coarse-grained reporting over a raw trajectory.
//!
//! A run at `dT = 0.01` produces a hundred snapshots per day. A [`Report`]
//! keeps the first snapshot of each reporting bin and adds the aggregate
//! series used for charts: hospital load, ICU load, and combined infected and
//! recovered counts.

use jiff::{
    SignedDuration,
    civil::{DateTime, Time},
};
use serde::Serialize;
use thiserror::Error;

use crate::{Compartments, Parameters, Trajectory};

/// One reporting bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportRow {
    /// Start of the bin.
    #[serde(rename = "T")]
    pub time: DateTime,
    #[serde(rename = "Policy Strength")]
    pub policy: f64,
    #[serde(flatten)]
    pub compartments: Compartments,
    /// `I_severe_hospital + I_fatal_hospital`.
    #[serde(rename = "Hospitalized")]
    pub hospitalized: f64,
    /// `Hospitalized * p_icu_given_hospital`.
    #[serde(rename = "ICU")]
    pub icu: f64,
    #[serde(rename = "R_combined")]
    pub recovered: f64,
    #[serde(rename = "I_combined")]
    pub infected: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("report bin must be positive, got {bin}")]
pub struct InvalidBinError {
    pub bin: SignedDuration,
}

/// A trajectory resampled to a fixed reporting cadence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    /// Resamples to one row per calendar day.
    #[must_use]
    pub fn daily(trajectory: &Trajectory, parameters: &Parameters) -> Self {
        Self::bin_states(trajectory, parameters, SignedDuration::from_hours(24))
    }

    /// Resamples to bins of width `bin`, anchored at midnight of the first
    /// snapshot's date.
    ///
    /// Each row carries the first snapshot inside its bin. Bins that contain
    /// no snapshot, which happens only when the step size exceeds `bin`, are
    /// left out.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBinError`] if `bin` is zero or negative.
    pub fn resample(
        trajectory: &Trajectory,
        parameters: &Parameters,
        bin: SignedDuration,
    ) -> Result<Self, InvalidBinError> {
        if bin.is_zero() || bin.is_negative() {
            return Err(InvalidBinError { bin });
        }
        Ok(Self::bin_states(trajectory, parameters, bin))
    }

    fn bin_states(trajectory: &Trajectory, parameters: &Parameters, bin: SignedDuration) -> Self {
        let origin = trajectory.initial().time.date().to_datetime(Time::midnight());
        let width = bin.as_nanos();

        let mut rows: Vec<ReportRow> = Vec::new();
        let mut last_index = None;

        for state in trajectory.states() {
            let index = state.time.duration_since(origin).as_nanos().div_euclid(width);
            if last_index == Some(index) {
                continue;
            }
            last_index = Some(index);

            // Bin starts lie between the origin and the snapshot, so they are
            // representable whenever the multiple itself is.
            let time = i32::try_from(index)
                .ok()
                .and_then(|index| bin.checked_mul(index))
                .and_then(|offset| origin.checked_add(offset).ok())
                .unwrap_or(state.time);

            let compartments = state.compartments;
            let hospitalized = compartments.hospitalized();
            rows.push(ReportRow {
                time,
                policy: state.policy,
                compartments,
                hospitalized,
                icu: hospitalized * parameters.p_icu_given_hospital,
                recovered: compartments.recovered(),
                infected: compartments.infected(),
            });
        }

        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row with the highest hospital load.
    #[must_use]
    pub fn peak_hospitalized(&self) -> Option<&ReportRow> {
        self.rows
            .iter()
            .max_by(|a, b| a.hospitalized.total_cmp(&b.hospitalized))
    }
}

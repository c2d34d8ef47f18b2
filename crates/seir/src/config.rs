//! Scenario files.
//!
//! A scenario bundles everything a run needs: step size, parameter and
//! initial-state maps, and the policy breakpoints. Files are read as TOML or
//! JSON depending on their extension.
//!
//! ```toml
//! step_size_days = 0.01
//!
//! [parameters]
//! beta = 0.5
//! # ... the remaining parameter keys
//!
//! [initial_state]
//! S = 0.9999
//! I = 0.0001
//! # ... the remaining compartment keys
//!
//! [[policy]]
//! date = "2020-03-01"
//! strength = 0.0
//!
//! [[policy]]
//! date = "2020-06-01"
//! strength = 0.5
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{Clamping, Simulation, Trajectory, error::Error, policy::PolicySchedule};

/// Step size used when a scenario does not set one.
pub const DEFAULT_STEP_SIZE_DAYS: f64 = 0.01;

/// A complete, serializable simulation scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_step_size_days")]
    pub step_size_days: f64,
    pub parameters: BTreeMap<String, f64>,
    pub initial_state: BTreeMap<String, f64>,
    pub policy: Vec<Breakpoint>,
    #[serde(default)]
    pub clamping: Clamping,
}

/// A policy breakpoint as written in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakpoint {
    /// ISO 8601 date or date-time.
    pub date: String,
    pub strength: f64,
}

/// Errors raised while loading a scenario file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read scenario {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scenario {path} has no .toml or .json extension")]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid TOML scenario: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON scenario: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_step_size_days() -> f64 {
    DEFAULT_STEP_SIZE_DAYS
}

impl Scenario {
    /// Loads a scenario, choosing the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, has an
    /// unsupported extension, or does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let read = || {
            fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        };

        let scenario = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&read()?)?,
            Some("json") => Self::from_json_str(&read()?)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        debug!(
            path = %path.display(),
            breakpoints = scenario.policy.len(),
            step_days = scenario.step_size_days,
            "loaded scenario"
        );
        Ok(scenario)
    }

    /// Parses a TOML scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text does not describe a scenario.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parses a JSON scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text does not describe a scenario.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the simulation described by this scenario.
    ///
    /// # Errors
    ///
    /// See [`Simulation::new`].
    pub fn simulation(&self) -> Result<Simulation, Error> {
        Simulation::new(&self.parameters, &self.initial_state, self.step_size_days)
            .map(|simulation| simulation.with_clamping(self.clamping))
    }

    /// Parses and validates the policy breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicy`] if the breakpoints are invalid.
    pub fn schedule(&self) -> Result<PolicySchedule, Error> {
        let steps = self
            .policy
            .iter()
            .map(|breakpoint| (breakpoint.date.as_str(), breakpoint.strength));
        Ok(PolicySchedule::parse(steps)?)
    }

    /// Builds the simulation and runs it over the scenario's policy.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Scenario::simulation`],
    /// [`Scenario::schedule`], or the run itself.
    pub fn run(&self) -> Result<Trajectory, Error> {
        self.simulation()?.run_schedule(&self.schedule()?)
    }
}

//! Lookup helpers for the string-keyed maps accepted at the API boundary.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MissingFieldError;

/// Which input map a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Parameters,
    InitialState,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parameters => "parameters",
            Self::InitialState => "initial_state",
        })
    }
}

pub(crate) fn require(
    map: &BTreeMap<String, f64>,
    section: Section,
    key: &'static str,
) -> Result<f64, MissingFieldError> {
    map.get(key)
        .copied()
        .ok_or(MissingFieldError { section, key })
}

pub(crate) fn warn_unrecognized(map: &BTreeMap<String, f64>, section: Section, known: &[&str]) {
    for key in map.keys().filter(|key| !known.contains(&key.as_str())) {
        warn!(%section, key = key.as_str(), "ignoring unrecognized key");
    }
}

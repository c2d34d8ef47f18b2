use std::{collections::BTreeMap, fmt};

use contagion_core::StepIntegrable;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    fields::{self, Section},
    parameters::ParameterError,
};

/// One of the thirteen population compartments of the model.
///
/// The [`key`](Self::key) of each compartment is the name used in initial
/// state maps, scenario files, and serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Compartment {
    #[serde(rename = "S")]
    Susceptible,
    #[serde(rename = "E")]
    Exposed,
    #[serde(rename = "I")]
    Infectious,
    #[serde(rename = "I_asymptomatic")]
    Asymptomatic,
    #[serde(rename = "I_mild")]
    Mild,
    #[serde(rename = "I_severe_home")]
    SevereHome,
    #[serde(rename = "I_severe_hospital")]
    SevereHospital,
    #[serde(rename = "I_fatal_home")]
    FatalHome,
    #[serde(rename = "I_fatal_hospital")]
    FatalHospital,
    #[serde(rename = "R_from_asymptomatic")]
    RecoveredAsymptomatic,
    #[serde(rename = "R_from_mild")]
    RecoveredMild,
    #[serde(rename = "R_from_severe")]
    RecoveredSevere,
    #[serde(rename = "Dead")]
    Dead,
}

impl Compartment {
    /// Number of compartments.
    pub const COUNT: usize = 13;

    /// All compartments, in state-vector order.
    pub const ALL: [Compartment; Self::COUNT] = [
        Self::Susceptible,
        Self::Exposed,
        Self::Infectious,
        Self::Asymptomatic,
        Self::Mild,
        Self::SevereHome,
        Self::SevereHospital,
        Self::FatalHome,
        Self::FatalHospital,
        Self::RecoveredAsymptomatic,
        Self::RecoveredMild,
        Self::RecoveredSevere,
        Self::Dead,
    ];

    /// Returns the map key for this compartment.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Susceptible => "S",
            Self::Exposed => "E",
            Self::Infectious => "I",
            Self::Asymptomatic => "I_asymptomatic",
            Self::Mild => "I_mild",
            Self::SevereHome => "I_severe_home",
            Self::SevereHospital => "I_severe_hospital",
            Self::FatalHome => "I_fatal_home",
            Self::FatalHospital => "I_fatal_hospital",
            Self::RecoveredAsymptomatic => "R_from_asymptomatic",
            Self::RecoveredMild => "R_from_mild",
            Self::RecoveredSevere => "R_from_severe",
            Self::Dead => "Dead",
        }
    }

    /// Looks up a compartment by its map key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|compartment| compartment.key() == key)
    }

    /// Position of this compartment in [`Compartment::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Population of every compartment at a single instant.
///
/// Values are fractions or head counts, whichever the caller seeds with; the
/// model only requires that they share a unit. Their sum is the population
/// and is conserved by every Euler step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Compartments {
    #[serde(rename = "S")]
    pub susceptible: f64,
    #[serde(rename = "E")]
    pub exposed: f64,
    #[serde(rename = "I")]
    pub infectious: f64,
    #[serde(rename = "I_asymptomatic")]
    pub asymptomatic: f64,
    #[serde(rename = "I_mild")]
    pub mild: f64,
    #[serde(rename = "I_severe_home")]
    pub severe_home: f64,
    #[serde(rename = "I_severe_hospital")]
    pub severe_hospital: f64,
    #[serde(rename = "I_fatal_home")]
    pub fatal_home: f64,
    #[serde(rename = "I_fatal_hospital")]
    pub fatal_hospital: f64,
    #[serde(rename = "R_from_asymptomatic")]
    pub recovered_asymptomatic: f64,
    #[serde(rename = "R_from_mild")]
    pub recovered_mild: f64,
    #[serde(rename = "R_from_severe")]
    pub recovered_severe: f64,
    #[serde(rename = "Dead")]
    pub dead: f64,
}

impl Compartments {
    /// Builds compartments from a map keyed by [`Compartment::key`].
    ///
    /// Unrecognized keys are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if any compartment key is absent, or
    /// [`Error::InvalidParameter`] if a value is negative or not finite.
    pub fn from_map(map: &BTreeMap<String, f64>) -> Result<Self, Error> {
        fields::warn_unrecognized(
            map,
            Section::InitialState,
            &Compartment::ALL.map(Compartment::key),
        );

        let mut values = [0.0; Compartment::COUNT];
        for compartment in Compartment::ALL {
            values[compartment.index()] =
                fields::require(map, Section::InitialState, compartment.key())?;
        }

        let compartments = Self::from_array(values);
        compartments.validate()?;
        Ok(compartments)
    }

    /// Checks that every compartment is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns the first offending compartment as a [`ParameterError`].
    pub fn validate(&self) -> Result<(), ParameterError> {
        match Compartment::ALL
            .into_iter()
            .find(|&c| !(self.get(c).is_finite() && self.get(c) >= 0.0))
        {
            Some(compartment) => Err(ParameterError::InvalidInitialValue {
                compartment,
                value: self.get(compartment),
            }),
            None => Ok(()),
        }
    }

    /// Returns the population of one compartment.
    #[must_use]
    pub fn get(&self, compartment: Compartment) -> f64 {
        self.to_array()[compartment.index()]
    }

    /// Total population across all compartments.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.to_array().iter().sum()
    }

    /// Everyone currently infectious or ill, at home or in hospital.
    #[must_use]
    pub fn infected(&self) -> f64 {
        self.infectious
            + self.asymptomatic
            + self.mild
            + self.severe_home
            + self.severe_hospital
            + self.fatal_home
            + self.fatal_hospital
    }

    /// Severe and fatal cases currently admitted to hospital.
    #[must_use]
    pub fn hospitalized(&self) -> f64 {
        self.severe_hospital + self.fatal_hospital
    }

    /// Everyone recovered, across all courses of illness.
    #[must_use]
    pub fn recovered(&self) -> f64 {
        self.recovered_asymptomatic + self.recovered_mild + self.recovered_severe
    }

    /// Returns a copy with every negative compartment raised to zero.
    #[must_use]
    pub fn clamp_non_negative(&self) -> Self {
        Self::from_array(self.to_array().map(|value| value.max(0.0)))
    }

    /// Values in [`Compartment::ALL`] order.
    #[must_use]
    pub fn to_array(&self) -> [f64; Compartment::COUNT] {
        [
            self.susceptible,
            self.exposed,
            self.infectious,
            self.asymptomatic,
            self.mild,
            self.severe_home,
            self.severe_hospital,
            self.fatal_home,
            self.fatal_hospital,
            self.recovered_asymptomatic,
            self.recovered_mild,
            self.recovered_severe,
            self.dead,
        ]
    }

    /// Builds compartments from values in [`Compartment::ALL`] order.
    #[must_use]
    pub fn from_array(values: [f64; Compartment::COUNT]) -> Self {
        let [
            susceptible,
            exposed,
            infectious,
            asymptomatic,
            mild,
            severe_home,
            severe_hospital,
            fatal_home,
            fatal_hospital,
            recovered_asymptomatic,
            recovered_mild,
            recovered_severe,
            dead,
        ] = values;

        Self {
            susceptible,
            exposed,
            infectious,
            asymptomatic,
            mild,
            severe_home,
            severe_hospital,
            fatal_home,
            fatal_hospital,
            recovered_asymptomatic,
            recovered_mild,
            recovered_severe,
            dead,
        }
    }
}

/// Per-day rate of change of every compartment.
///
/// Produced by the [`FlowModel`](crate::FlowModel). Every outflow of one
/// compartment is the inflow of another, so the flows sum to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Flows(pub(crate) Compartments);

impl Flows {
    /// Returns the flow into (positive) or out of (negative) one compartment.
    #[must_use]
    pub fn get(&self, compartment: Compartment) -> f64 {
        self.0.get(compartment)
    }

    /// Sum of all flows; zero up to rounding.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.0.total()
    }

    /// Returns the first compartment whose flow is NaN or infinite.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<Compartment> {
        Compartment::ALL
            .into_iter()
            .find(|&compartment| !self.get(compartment).is_finite())
    }

    /// Flows in [`Compartment::ALL`] order.
    #[must_use]
    pub fn to_array(&self) -> [f64; Compartment::COUNT] {
        self.0.to_array()
    }
}

impl StepIntegrable<f64> for Compartments {
    type Derivative = Flows;

    fn step(&self, flows: Flows, days: f64) -> Self {
        let mut values = self.to_array();
        for (value, flow) in values.iter_mut().zip(flows.to_array()) {
            *value += flow * days;
        }
        Self::from_array(values)
    }
}

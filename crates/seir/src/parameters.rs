use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Compartment,
    error::Error,
    fields::{self, Section},
};

/// Tolerance applied when checking that branch probabilities sum to at most one.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-9;

/// Epidemiological constants of the model.
///
/// Durations are mean times in days; each becomes an exponential rate
/// constant `1 / duration`. Probabilities split the infectious compartment
/// into courses of illness, with the mild fraction taking the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Transmission rate per contact-weighted infectious person per day.
    pub beta: f64,
    /// Non-infectious incubation period (E to I).
    pub t_incubation: f64,
    /// Infectious period before the course of illness is known (I onward).
    pub t_presymptomatic: f64,
    pub t_recovery_asymptomatic: f64,
    pub t_recovery_mild: f64,
    /// Time in hospital before a severe case recovers.
    pub t_recovery_severe: f64,
    /// Delay between onset of a severe or fatal course and hospital admission.
    pub t_hospital_lag: f64,
    /// Time in hospital before a fatal case dies.
    pub t_death: f64,
    /// Share of mild cases that isolate and stop transmitting.
    pub p_self_quarantine: f64,
    pub p_asymptomatic: f64,
    pub p_severe: f64,
    pub p_fatal: f64,
    /// Share of hospitalized patients needing intensive care; reporting only.
    pub p_icu_given_hospital: f64,
}

/// A parameter value the model cannot integrate with.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParameterError {
    #[error("`beta` must be finite and non-negative, got {value}")]
    InvalidTransmissionRate { value: f64 },

    #[error("duration `{name}` must be finite and positive, got {value}")]
    NonPositiveDuration { name: &'static str, value: f64 },

    #[error("probability `{name}` must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("p_asymptomatic + p_severe + p_fatal must not exceed 1, got {sum}")]
    BranchProbabilitiesExceedOne { sum: f64 },

    #[error("initial value of `{compartment}` must be finite and non-negative, got {value}")]
    InvalidInitialValue { compartment: Compartment, value: f64 },
}

impl Parameters {
    /// Map keys, one per field.
    pub const KEYS: [&'static str; 13] = [
        "beta",
        "t_incubation",
        "t_presymptomatic",
        "t_recovery_asymptomatic",
        "t_recovery_mild",
        "t_recovery_severe",
        "t_hospital_lag",
        "t_death",
        "p_self_quarantine",
        "p_asymptomatic",
        "p_severe",
        "p_fatal",
        "p_icu_given_hospital",
    ];

    /// Builds parameters from a map keyed by [`Parameters::KEYS`].
    ///
    /// Unrecognized keys are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for the first absent key, or
    /// [`Error::InvalidParameter`] if the values fail [`Parameters::validate`].
    pub fn from_map(map: &BTreeMap<String, f64>) -> Result<Self, Error> {
        fields::warn_unrecognized(map, Section::Parameters, &Self::KEYS);
        let get = |key| fields::require(map, Section::Parameters, key);

        let parameters = Self {
            beta: get("beta")?,
            t_incubation: get("t_incubation")?,
            t_presymptomatic: get("t_presymptomatic")?,
            t_recovery_asymptomatic: get("t_recovery_asymptomatic")?,
            t_recovery_mild: get("t_recovery_mild")?,
            t_recovery_severe: get("t_recovery_severe")?,
            t_hospital_lag: get("t_hospital_lag")?,
            t_death: get("t_death")?,
            p_self_quarantine: get("p_self_quarantine")?,
            p_asymptomatic: get("p_asymptomatic")?,
            p_severe: get("p_severe")?,
            p_fatal: get("p_fatal")?,
            p_icu_given_hospital: get("p_icu_given_hospital")?,
        };

        parameters.validate()?;
        Ok(parameters)
    }

    /// Checks every parameter against its admissible range.
    ///
    /// # Errors
    ///
    /// Returns the first violation found as a [`ParameterError`].
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return Err(ParameterError::InvalidTransmissionRate { value: self.beta });
        }

        for (name, value) in [
            ("t_incubation", self.t_incubation),
            ("t_presymptomatic", self.t_presymptomatic),
            ("t_recovery_asymptomatic", self.t_recovery_asymptomatic),
            ("t_recovery_mild", self.t_recovery_mild),
            ("t_recovery_severe", self.t_recovery_severe),
            ("t_hospital_lag", self.t_hospital_lag),
            ("t_death", self.t_death),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParameterError::NonPositiveDuration { name, value });
            }
        }

        for (name, value) in [
            ("p_self_quarantine", self.p_self_quarantine),
            ("p_asymptomatic", self.p_asymptomatic),
            ("p_severe", self.p_severe),
            ("p_fatal", self.p_fatal),
            ("p_icu_given_hospital", self.p_icu_given_hospital),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParameterError::ProbabilityOutOfRange { name, value });
            }
        }

        let sum = self.p_asymptomatic + self.p_severe + self.p_fatal;
        if sum > 1.0 + PROBABILITY_SUM_TOLERANCE {
            return Err(ParameterError::BranchProbabilitiesExceedOne { sum });
        }

        Ok(())
    }

    /// Share of infections that take a mild course.
    #[must_use]
    pub fn p_mild(&self) -> f64 {
        1.0 - self.p_asymptomatic - self.p_severe - self.p_fatal
    }

    /// Validates the parameters and converts them into rate constants.
    ///
    /// # Errors
    ///
    /// Returns a [`ParameterError`] if validation fails.
    pub fn rates(&self) -> Result<Rates, ParameterError> {
        self.validate()?;

        Ok(Rates {
            beta: self.beta,
            incubation: 1.0 / self.t_incubation,
            presymptomatic: 1.0 / self.t_presymptomatic,
            recovery_asymptomatic: 1.0 / self.t_recovery_asymptomatic,
            recovery_mild: 1.0 / self.t_recovery_mild,
            recovery_severe: 1.0 / self.t_recovery_severe,
            hospital_admission: 1.0 / self.t_hospital_lag,
            death: 1.0 / self.t_death,
            p_self_quarantine: self.p_self_quarantine,
            p_asymptomatic: self.p_asymptomatic,
            p_mild: self.p_mild(),
            p_severe: self.p_severe,
            p_fatal: self.p_fatal,
        })
    }
}

/// Per-day rate constants derived from validated [`Parameters`].
///
/// Only obtainable through [`Parameters::rates`], so every rate is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub(crate) beta: f64,
    pub(crate) incubation: f64,
    pub(crate) presymptomatic: f64,
    pub(crate) recovery_asymptomatic: f64,
    pub(crate) recovery_mild: f64,
    pub(crate) recovery_severe: f64,
    pub(crate) hospital_admission: f64,
    pub(crate) death: f64,
    pub(crate) p_self_quarantine: f64,
    pub(crate) p_asymptomatic: f64,
    pub(crate) p_mild: f64,
    pub(crate) p_severe: f64,
    pub(crate) p_fatal: f64,
}

impl Rates {
    /// Rate at which exposed people become infectious (`a`).
    #[must_use]
    pub fn incubation(&self) -> f64 {
        self.incubation
    }

    /// Rate at which infectious people enter a course of illness (`gamma`).
    #[must_use]
    pub fn presymptomatic(&self) -> f64 {
        self.presymptomatic
    }

    /// Residual mild fraction used by the flow model.
    #[must_use]
    pub fn p_mild(&self) -> f64 {
        self.p_mild
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    use crate::error::MissingFieldError;

    /// A COVID-like parameter set used across the crate's tests.
    pub(crate) fn covid_like() -> Parameters {
        Parameters {
            beta: 0.5,
            t_incubation: 5.0,
            t_presymptomatic: 1.0,
            t_recovery_asymptomatic: 6.0,
            t_recovery_mild: 6.0,
            t_recovery_severe: 18.0,
            t_hospital_lag: 5.0,
            t_death: 10.0,
            p_self_quarantine: 0.5,
            p_asymptomatic: 0.2,
            p_severe: 0.1,
            p_fatal: 0.05,
            p_icu_given_hospital: 0.3,
        }
    }

    fn as_map(parameters: &Parameters) -> BTreeMap<String, f64> {
        let value = serde_json::to_value(parameters).unwrap();
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn mild_fraction_is_the_residual() {
        let rates = covid_like().rates().unwrap();

        assert_abs_diff_eq!(rates.p_mild(), 0.65, epsilon = 1e-12);
        assert_abs_diff_eq!(rates.incubation(), 0.2);
        assert_abs_diff_eq!(rates.presymptomatic(), 1.0);
    }

    #[test]
    fn from_map_matches_struct() {
        let parameters = covid_like();

        assert_eq!(Parameters::from_map(&as_map(&parameters)).unwrap(), parameters);
    }

    #[test]
    fn from_map_ignores_unrecognized_keys() {
        let mut map = as_map(&covid_like());
        map.insert("r0".to_string(), 2.5);

        assert!(Parameters::from_map(&map).is_ok());
    }

    #[test]
    fn from_map_reports_missing_key() {
        let mut map = as_map(&covid_like());
        map.remove("t_death");

        let error = Parameters::from_map(&map).unwrap_err();

        assert!(matches!(
            error,
            Error::MissingField(MissingFieldError {
                section: Section::Parameters,
                key: "t_death",
            })
        ));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let parameters = Parameters {
            t_hospital_lag: 0.0,
            ..covid_like()
        };

        assert_eq!(
            parameters.rates(),
            Err(ParameterError::NonPositiveDuration {
                name: "t_hospital_lag",
                value: 0.0,
            })
        );
    }

    #[test]
    fn branch_probabilities_may_not_exceed_one() {
        let parameters = Parameters {
            p_asymptomatic: 0.6,
            p_severe: 0.3,
            p_fatal: 0.2,
            ..covid_like()
        };

        assert!(matches!(
            parameters.validate(),
            Err(ParameterError::BranchProbabilitiesExceedOne { .. })
        ));
    }

    #[test]
    fn branch_probabilities_summing_to_one_leave_no_mild_cases() {
        let parameters = Parameters {
            p_asymptomatic: 0.7,
            p_severe: 0.2,
            p_fatal: 0.1,
            ..covid_like()
        };

        let rates = parameters.rates().unwrap();

        assert_abs_diff_eq!(rates.p_mild(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn negative_beta_is_rejected() {
        let parameters = Parameters {
            beta: -0.1,
            ..covid_like()
        };

        assert!(matches!(
            parameters.validate(),
            Err(ParameterError::InvalidTransmissionRate { .. })
        ));
    }

    #[test]
    fn probability_outside_unit_interval_is_rejected() {
        let parameters = Parameters {
            p_self_quarantine: 1.5,
            ..covid_like()
        };

        assert_eq!(
            parameters.validate(),
            Err(ParameterError::ProbabilityOutOfRange {
                name: "p_self_quarantine",
                value: 1.5,
            })
        );
    }
}

use contagion_solvers::transient::euler;
use thiserror::Error;

use crate::{Compartment, fields::Section, parameters::ParameterError, policy::PolicyError};

/// Errors produced while configuring or running a simulation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid policy: {0}")]
    InvalidPolicy(#[from] PolicyError),

    #[error(transparent)]
    MissingField(#[from] MissingFieldError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    #[error(transparent)]
    NumericDomain(#[from] NumericDomainError),

    #[error("integration failed: {0}")]
    Solver(#[source] euler::Error),
}

/// A required key is absent from a parameter or initial-state map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("missing required {section} key `{key}`")]
pub struct MissingFieldError {
    pub section: Section,
    pub key: &'static str,
}

/// A flow evaluated to NaN or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("non-finite flow for `{compartment}` at step {step}: {value}")]
pub struct NumericDomainError {
    pub step: usize,
    pub compartment: Compartment,
    pub value: f64,
}

impl From<euler::Error> for Error {
    /// Recovers the typed error raised by the flow model or the SEIR problem.
    fn from(err: euler::Error) -> Self {
        match err {
            euler::Error::Model { step, source } => match source.downcast::<NumericDomainError>() {
                Ok(err) => Self::NumericDomain(*err),
                Err(source) => Self::Solver(euler::Error::Model { step, source }),
            },
            euler::Error::Problem { step, source } => match source.downcast::<PolicyError>() {
                Ok(err) => Self::InvalidPolicy(*err),
                Err(source) => Self::Solver(euler::Error::Problem { step, source }),
            },
        }
    }
}

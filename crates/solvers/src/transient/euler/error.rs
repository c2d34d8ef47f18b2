use std::error::Error as StdError;

/// Errors that can occur during Euler integration.
///
/// The typed error of the failing model or problem is kept as the boxed
/// source, so callers that know the concrete type can downcast it back.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model error at step {step}: {source}")]
    Model {
        step: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("problem error at step {step}: {source}")]
    Problem {
        step: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn model<E: StdError + Send + Sync + 'static>(step: usize) -> impl FnOnce(E) -> Self {
        move |err| Self::Model {
            step,
            source: Box::new(err),
        }
    }

    pub(crate) fn problem<E: StdError + Send + Sync + 'static>(
        step: usize,
    ) -> impl FnOnce(E) -> Self {
        move |err| Self::Problem {
            step,
            source: Box::new(err),
        }
    }

    /// Returns the step at which integration failed.
    #[must_use]
    pub fn step(&self) -> usize {
        match self {
            Self::Model { step, .. } | Self::Problem { step, .. } => *step,
        }
    }

    /// Consumes the error and returns its boxed source.
    #[must_use]
    pub fn into_source(self) -> Box<dyn StdError + Send + Sync> {
        match self {
            Self::Model { source, .. } | Self::Problem { source, .. } => source,
        }
    }
}

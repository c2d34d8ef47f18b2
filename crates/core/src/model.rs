/// A callable model that maps a typed input to a typed output.
///
/// Models must be deterministic, always producing the same result for a given
/// input. Solvers rely on this to replay, record, and compare runs.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the model with the given input.
    ///
    /// # Errors
    ///
    /// Each model defines its own `Error` type to represent domain-specific failures.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// A captured input/output pair from a model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<I, O> {
    pub input: I,
    pub output: O,
}

impl<I, O> Snapshot<I, O> {
    /// Creates a new snapshot from input and output values.
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    /// Outflow of a single compartment draining at a fixed rate.
    struct Drain {
        rate: f64,
    }

    impl Model for Drain {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, population: &f64) -> Result<f64, Infallible> {
            Ok(-self.rate * population)
        }
    }

    #[test]
    fn snapshot_captures_call() {
        let model = Drain { rate: 0.25 };
        let output = model.call(&100.0).unwrap();
        let snapshot = Snapshot::new(100.0, output);

        assert_eq!(snapshot, Snapshot::new(100.0, -25.0));
    }
}

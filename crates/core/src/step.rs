/// A trait for types that can be stepped using their derivative.
///
/// Implementing this trait lets the generic solvers advance a state by
/// `derivative * delta`, where the derivative is taken with respect to
/// `Delta`. For the epidemic models `Delta` is a step size in days and the
/// derivative is a set of per-day flows between compartments.
pub trait StepIntegrable<Delta> {
    /// The derivative of the type with respect to `Delta`.
    type Derivative;

    /// Returns the value after stepping with a derivative and step size.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// Type alias for the derivative of a `StepIntegrable` type.
///
/// Shorthand for the fully qualified [`StepIntegrable::Derivative`].
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

#[cfg(test)]
mod tests {
    use super::*;

    // A single population and its net flow per day.
    #[derive(Debug, PartialEq)]
    struct Population(f64);
    struct NetFlow(f64);

    impl StepIntegrable<f64> for Population {
        type Derivative = NetFlow;

        fn step(&self, derivative: NetFlow, days: f64) -> Self {
            Population(self.0 + derivative.0 * days)
        }
    }

    // A chain of compartments moved together.
    #[derive(Debug, PartialEq)]
    struct Chain([f64; 3]);
    struct ChainFlows([f64; 3]);

    impl StepIntegrable<f64> for Chain {
        type Derivative = ChainFlows;

        fn step(&self, derivative: ChainFlows, days: f64) -> Self {
            let mut next = self.0;
            for (value, flow) in next.iter_mut().zip(derivative.0) {
                *value += flow * days;
            }
            Chain(next)
        }
    }

    #[test]
    fn step_single_population() {
        let population = Population(100.0);
        let next = population.step(NetFlow(-20.0), 0.5);

        assert_eq!(next, Population(90.0));
    }

    #[test]
    fn step_compartment_chain() {
        let chain = Chain([10.0, 0.0, 0.0]);
        let flows = ChainFlows([-4.0, 3.0, 1.0]);

        let next = chain.step(flows, 0.5);

        assert_eq!(next, Chain([8.0, 1.5, 0.5]));
    }
}

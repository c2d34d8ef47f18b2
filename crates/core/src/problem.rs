use crate::{DerivativeOf, StepIntegrable};

/// Defines an initial value problem for a time-stepping solver.
///
/// An ODE problem sits between a [`Model`](crate::Model) and a solver. It
/// pulls the integrable state out of a model input, turns the model's output
/// into a derivative, and rebuilds the next model input once the solver has
/// stepped the state. Any model whose state implements [`StepIntegrable`] can
/// be integrated this way.
pub trait OdeProblem {
    type Input;
    type Output;
    type Delta;
    type State: StepIntegrable<Self::Delta>;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extracts the integrable state from model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the state cannot be extracted from the input.
    fn state(&self, input: &Self::Input) -> Result<Self::State, Self::Error>;

    /// Computes the derivative of the state from model input and output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be computed.
    fn derivative(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<DerivativeOf<Self::State, Self::Delta>, Self::Error>;

    /// Builds the next model input from the previous input and the stepped state.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input cannot be constructed from the state.
    fn build_input(
        &self,
        base: &Self::Input,
        state: &Self::State,
        delta: &Self::Delta,
    ) -> Result<Self::Input, Self::Error>;

    /// Finalizes input after a successful integration step.
    ///
    /// Called once per accepted step, after [`build_input`](Self::build_input)
    /// and before the model is evaluated at the new input. This is where
    /// discrete controls (a policy switching on a given date) or constraint
    /// enforcement (clamping a population at zero) belong.
    ///
    /// The default implementation returns the input unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if finalization fails.
    fn finalize_step(
        &self,
        next_input: Self::Input,
        _prev_input: &Self::Input,
        _prev_output: &Self::Output,
        _step_delta: &Self::Delta,
    ) -> Result<Self::Input, Self::Error> {
        Ok(next_input)
    }
}

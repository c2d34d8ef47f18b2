use contagion_core::Snapshot;

/// Event emitted by the Euler solver for each snapshot.
///
/// Step 0 is the initial condition before any integration.
/// Steps 1..N are emitted after each integration step.
#[derive(Debug, Clone)]
pub struct Event<I, O> {
    /// The step number (0 for the initial condition).
    pub step: usize,

    /// Snapshot of the model input and output at this step.
    pub snapshot: Snapshot<I, O>,
}

//! Core traits and types for the Contagion framework.
//!
//! This crate defines the abstractions that the solvers and the epidemic
//! models build on:
//!
//! - [`Model`]: a deterministic callable mapping a typed input to a typed output
//! - [`Snapshot`]: a captured input/output pair from a model call
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`OdeProblem`]: adapts a model to a generic time-stepping solver
//! - [`StepIntegrable`]: a state that can be stepped by its derivative

mod model;
mod observer;
mod problem;
mod step;

pub use observer::Observer;
pub use problem::OdeProblem;
pub use step::{DerivativeOf, StepIntegrable};
pub use {model::Model, model::Snapshot};

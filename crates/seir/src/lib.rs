//! A policy-driven SEIR epidemic model integrated with forward Euler.
//!
//! The model tracks thirteen compartments: susceptible, exposed, infectious,
//! four courses of illness (asymptomatic, mild, severe, fatal) with hospital
//! stages for the severe and fatal ones, three recovered compartments, and
//! the dead. A social-distancing policy, given as dated breakpoints, scales
//! down transmission over time.
//!
//! # Overview
//!
//! - [`Parameters`] and [`Compartments`] describe the epidemic and its
//!   initial condition.
//! - [`policy`] turns breakpoints into a [`PolicyPath`](policy::PolicyPath)
//!   with one entry per integration step.
//! - [`FlowModel`] computes the per-day flows between compartments.
//! - [`Simulation`] drives the generic Euler solver over a policy and returns
//!   a [`Trajectory`].
//! - [`report`] resamples a trajectory and derives the aggregate series.
//! - [`config`] loads complete scenarios from TOML or JSON.

mod compartments;
pub mod config;
mod error;
mod fields;
mod flow;
mod parameters;
pub mod policy;
mod problem;
pub mod report;
mod simulation;
mod state;
mod step_size;
mod trajectory;

pub use compartments::{Compartment, Compartments, Flows};
pub use contagion_solvers::transient::euler::{Action, Status};
pub use error::{Error, MissingFieldError, NumericDomainError};
pub use fields::Section;
pub use flow::FlowModel;
pub use parameters::{ParameterError, Parameters, Rates};
pub use problem::{Clamping, SeirProblem};
pub use simulation::{SeirEvent, Simulation};
pub use state::{Conditions, State};
pub use step_size::StepSize;
pub use trajectory::Trajectory;

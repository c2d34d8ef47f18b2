//! Solvers for Contagion models.
//!
//! - [`transient`]: fixed-step time integration of [`OdeProblem`]s
//!
//! [`OdeProblem`]: contagion_core::OdeProblem

pub mod transient;

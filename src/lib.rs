//! # A presolver for constrained quadratic models
//!
//! Constrained quadratic models are reduced to smaller, equivalent models before they are handed to
//! a solver. Variables are fixed or substituted, constraints are dropped or merged, and bounds are
//! tightened. Samples of the reduced model can be mapped back to samples of the original model.
#![warn(missing_docs)]

pub mod data;
pub mod presolve;

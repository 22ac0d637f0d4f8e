//! # Storing of constrained quadratic models in memory
//!
//! This module provides the data structures used to represent models at the boundary of the
//! presolver. The presolver introduces its own working representation in `presolve::store`.

pub mod model;

//! # Integration tests
//!
//! Integration tests completely external from the crate. All code written in this module could be
//! written by an external user of the crate.
use cqm_presolve::data::model::ConstrainedQuadraticModel;

mod assignment;
mod blending;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Check that a sample of the reduced model maps to a sample of the original model with the same
/// objective value that is feasible.
fn assert_restores(
    original: &ConstrainedQuadraticModel,
    reduced: &ConstrainedQuadraticModel,
    reduced_sample: &[f64],
    restored: &[f64],
) {
    assert!(reduced.is_feasible(reduced_sample, 1e-9));
    assert!(original.is_feasible(restored, 1e-9), "restored sample {restored:?} is infeasible");
    approx::assert_relative_eq!(original.energy(restored), reduced.energy(reduced_sample), epsilon = 1e-9);
}

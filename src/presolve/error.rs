//! # Presolve errors
//!
//! Infeasibility is reported as its own error kind, so that callers can tell "this model has no
//! feasible region" apart from misuse of the presolver.
use thiserror::Error;

/// Errors surfaced by the `Presolver`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PresolveError {
    /// The feasible region of the model is provably empty.
    #[error("given model is infeasible")]
    Infeasible,
    /// The model was taken out of the presolver by `detach_model` already.
    #[error("the model was already detached from the presolver")]
    UseAfterDetach,
    /// A technique was requested that does not exist.
    #[error("unknown presolve technique \"{0}\"")]
    InvalidConfiguration(String),
    /// The model handed to the presolver is malformed.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// A sample to restore does not have one value per variable of the reduced model.
    #[error("sample has {found} values, but the reduced model has {expected} variables")]
    SampleLength {
        #[allow(missing_docs)]
        expected: usize,
        #[allow(missing_docs)]
        found: usize,
    },
}

/// Signal raised inside the presolve rules when the model is proven infeasible.
///
/// Rules return `Result<bool, Infeasible>`; the loop converts the signal into
/// `PresolveError::Infeasible` at the boundary of the presolver.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Infeasible;

impl From<Infeasible> for PresolveError {
    fn from(_: Infeasible) -> Self {
        PresolveError::Infeasible
    }
}

//! # Presolving rules
//!
//! These rules, one per submodule, can be applied to simplify a constrained quadratic model. Each
//! of them adds a method to the `Reducer` that applies the rule to the entire model.
use crate::data::model::{BoundDirection, Sense};

mod domain_propagation;
mod duplicate;
mod fixed_variable;
mod singleton;
mod small_bias;
mod trivial_constraint;

/// Which side of the expression the right-hand side bounds.
///
/// `Upper` means `expression <= rhs`, `Lower` means `expression >= rhs`. An equality bounds both.
fn bounded_sides(sense: Sense) -> &'static [BoundDirection] {
    match sense {
        Sense::Le => &[BoundDirection::Upper],
        Sense::Ge => &[BoundDirection::Lower],
        Sense::Eq => &[BoundDirection::Lower, BoundDirection::Upper],
    }
}

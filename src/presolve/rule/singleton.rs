//! # Substitute free singleton variables
//!
//! A real variable that appears in a single equality constraint, and whose bounds are no tighter
//! than what that constraint implies, can always be given a value that satisfies the constraint.
//! The constraint is dropped and the variable is replaced in the objective by the value the
//! constraint implies.
use log::trace;

use crate::data::model::{BoundDirection, Sense, VariableType};
use crate::presolve::Reducer;
use crate::presolve::error::Infeasible;

impl<'a> Reducer<'a> {
    /// Eliminate (implied) free real variables that appear in exactly one linear equality
    /// constraint.
    ///
    /// For `a x + Σ c_j y_j == b`, the variable `x` is replaced by `b / a - Σ (c_j / a) y_j` in the
    /// objective.
    ///
    /// # Return value
    ///
    /// Whether any variable was eliminated, or `Infeasible` if a constraint was found that can't be
    /// satisfied.
    pub(in crate::presolve) fn presolve_singleton_substitution(&mut self) -> Result<bool, Infeasible> {
        let candidates = self.store.live_variables()
            .filter(|&variable| self.bounds.vartype(variable) == VariableType::Real)
            .collect::<Vec<_>>();

        let mut changed = false;
        for variable in candidates {
            changed |= self.presolve_singleton(variable)?;
        }

        Ok(changed)
    }

    /// Attempt to eliminate a single variable.
    fn presolve_singleton(&mut self, variable: usize) -> Result<bool, Infeasible> {
        let mut occurrences = self.store.occurrences(variable).iter();
        let (Some(&index), None) = (occurrences.next(), occurrences.next()) else { return Ok(false) };
        let Some(constraint) = self.store.constraint(index) else { return Ok(false) };

        let expression = &constraint.expression;
        let coefficient = expression.linear(variable);
        let tolerance = self.tolerance();
        if constraint.sense != Sense::Eq || !expression.is_linear() || coefficient.abs() <= tolerance {
            return Ok(false);
        }

        // The bounds of the variable should follow from the constraint and the other bounds
        let (mut lower, mut upper) = (f64::NEG_INFINITY, f64::INFINITY);
        for (j, direction, value) in self.implied_bounds(constraint)? {
            if j == variable {
                match direction {
                    BoundDirection::Lower => lower = lower.max(value),
                    BoundDirection::Upper => upper = upper.min(value),
                }
            }
        }
        if lower < self.bounds.lower(variable) - tolerance || upper > self.bounds.upper(variable) + tolerance {
            return Ok(false);
        }

        let constant = constraint.rhs / coefficient;
        let terms = expression.iter_linear()
            .filter(|&(j, _)| j != variable)
            .map(|(j, c)| (j, -c / coefficient))
            .collect::<Vec<_>>();

        trace!("substituting variable {} using constraint {}", variable, index);
        self.store.remove_constraint(index);
        self.store.substitute_variable(variable, constant, &terms);
        self.postsolve.record_substituted(variable, constant, terms);

        Ok(true)
    }
}

//! # Trivial constraints
//!
//! Constraints without variables, constraints that always hold, and constraints that are a bound on
//! a single variable.
use log::trace;

use crate::data::model::{BoundDirection, NonZeroSign};
use crate::presolve::Reducer;
use crate::presolve::activity::Activity;
use crate::presolve::error::Infeasible;
use crate::presolve::rule::bounded_sides;

impl<'a> Reducer<'a> {
    /// Remove constraints that don't restrict the model beyond the variable bounds.
    ///
    /// * A constraint that holds for all values within the variable bounds is removed.
    /// * A constraint that holds for no values within the variable bounds proves infeasibility.
    /// * A linear constraint on a single variable is turned into bounds on that variable.
    ///
    /// # Return value
    ///
    /// Whether any constraint was removed, or `Infeasible`.
    pub(in crate::presolve) fn presolve_trivial_constraints(&mut self) -> Result<bool, Infeasible> {
        let constraints = self.store.live_constraints().map(|(i, _)| i).collect::<Vec<_>>();

        let mut changed = false;
        for constraint in constraints {
            changed |= self.presolve_trivial_constraint(constraint)?;
        }

        Ok(changed)
    }

    fn presolve_trivial_constraint(&mut self, index: usize) -> Result<bool, Infeasible> {
        let Some(constraint) = self.store.constraint(index) else { return Ok(false) };
        let tolerance = self.tolerance();

        let activity = Activity::of(&constraint.expression, self.bounds);
        let (mut always, mut never) = (true, false);
        for &side in bounded_sides(constraint.sense) {
            let (extreme, opposite) = (activity.bound(side), activity.bound(!side));
            match side {
                BoundDirection::Upper => {
                    always &= extreme <= constraint.rhs + tolerance;
                    never |= opposite > constraint.rhs + tolerance;
                },
                BoundDirection::Lower => {
                    always &= extreme >= constraint.rhs - tolerance;
                    never |= opposite < constraint.rhs - tolerance;
                },
            }
        }

        if never {
            trace!("constraint {} can never hold", index);
            return Err(Infeasible);
        }
        if always {
            trace!("constraint {} always holds", index);
            self.store.remove_constraint(index);
            return Ok(true);
        }

        let expression = &constraint.expression;
        if expression.is_linear() && expression.nr_linear() == 1 {
            let first = expression.iter_linear().next();
            if let Some((variable, coefficient)) = first {
                let value = constraint.rhs / coefficient;
                let sign = NonZeroSign::of(coefficient);
                let changes = bounded_sides(constraint.sense).iter()
                    .map(|&side| (variable, side ^ sign, value))
                    .collect::<Vec<_>>();

                trace!("constraint {} is a bound on variable {}", index, variable);
                self.bounds.tighten_all(changes)?;
                self.store.remove_constraint(index);
                return Ok(true);
            }
        }

        Ok(false)
    }
}

//! # Domain propagation
//!
//! Use variable bounds to compute activity bounds of constraints, and use those to derive bounds
//! on the variables in them.
use fifo_set::FIFOSet;
use itertools::Itertools;
use log::{debug, trace};

use crate::data::model::{BoundDirection, Constraint, NonZeroSign};
use crate::presolve::Reducer;
use crate::presolve::activity::{Activity, linear_range};
use crate::presolve::error::Infeasible;
use crate::presolve::rule::bounded_sides;

impl<'a> Reducer<'a> {
    /// Tighten variable bounds using constraint activity bounds, until no bound changes anymore.
    ///
    /// All live constraints are visited once, and again each time a bound of one of their
    /// variables changed, until the work budget runs out.
    ///
    /// # Return value
    ///
    /// Whether any bound changed, or `Infeasible` if a constraint can't be satisfied within the
    /// variable bounds or a domain became empty.
    pub(in crate::presolve) fn presolve_domain_propagation(&mut self) -> Result<bool, Infeasible> {
        let mut queue = self.store.live_constraints()
            .map(|(i, _)| i)
            .collect::<FIFOSet<_>>();

        let mut changed = false;
        let mut visits = 0;
        while let Some(constraint) = queue.pop() {
            if visits == self.settings.propagation_budget {
                debug!("domain propagation ran out of budget with {} constraints queued", queue.len() + 1);
                break;
            }
            visits += 1;

            let Some(current) = self.store.constraint(constraint) else { continue };
            let changes = self.implied_bounds(current)?;
            if changes.is_empty() {
                continue;
            }

            let variables = changes.iter().map(|&(j, _, _)| j).unique().collect::<Vec<_>>();
            let before = variables.iter().map(|&j| self.bounds.interval(j)).collect::<Vec<_>>();
            if self.bounds.tighten_all(changes)? {
                changed = true;
                for (&variable, old) in variables.iter().zip(before) {
                    let new = self.bounds.interval(variable);
                    if new != old {
                        trace!("constraint {} tightens variable {} from {:?} to {:?}", constraint, variable, old, new);
                        for &other in self.store.occurrences(variable) {
                            queue.push(other);
                        }
                    }
                }
            }
        }

        Ok(changed)
    }

    /// Bounds implied by a single constraint.
    ///
    /// Bounds are only derived for variables that appear linearly. For such a variable `x` with
    /// coefficient `a` in `a x + r <= rhs`, it holds that `a x <= rhs - min r`.
    ///
    /// # Return value
    ///
    /// Tuples `(variable, direction, value)`, which might not all be improvements, or `Infeasible`
    /// if the activity bounds show that the constraint can't be satisfied.
    pub(in crate::presolve) fn implied_bounds(
        &self,
        constraint: &Constraint,
    ) -> Result<Vec<(usize, BoundDirection, f64)>, Infeasible> {
        let expression = &constraint.expression;
        let activity = Activity::of(expression, self.bounds);
        let sides = bounded_sides(constraint.sense);

        for &side in sides {
            let violated = match side {
                BoundDirection::Upper => activity.bound(BoundDirection::Lower) > constraint.rhs + self.tolerance(),
                BoundDirection::Lower => activity.bound(BoundDirection::Upper) < constraint.rhs - self.tolerance(),
            };
            if violated {
                trace!("activity bounds show that {} {} can't hold", constraint.sense, constraint.rhs);
                return Err(Infeasible);
            }
        }

        let mut changes = Vec::new();
        for (variable, coefficient) in expression.iter_linear() {
            if coefficient == 0_f64 || !expression.is_linear_in(variable) {
                continue;
            }

            let contribution = linear_range(coefficient, self.bounds.interval(variable));
            for &side in sides {
                let residual = activity.residual(!side, contribution[!side]);
                if residual.is_finite() {
                    let value = (constraint.rhs - residual) / coefficient;
                    changes.push((variable, side ^ NonZeroSign::of(coefficient), value));
                }
            }
        }

        Ok(changes)
    }
}

//! # Remove small biases
//!
//! Biases so small that they hardly influence the objective or a constraint are dropped. In
//! constraints, the right-hand side is moved such that the constraint only gets looser.
use log::trace;

use crate::data::model::Sense;
use crate::presolve::Reducer;
use crate::presolve::activity::{linear_range, quadratic_range};
use crate::presolve::error::Infeasible;
use crate::presolve::rule::bounded_sides;

/// A linear or quadratic term.
#[derive(Copy, Clone, Debug)]
enum Term {
    Linear(usize),
    Quadratic(usize, usize),
}

impl<'a> Reducer<'a> {
    /// Drop objective and constraint biases below the threshold.
    ///
    /// Objective biases are dropped when their absolute value is below the threshold. Constraint
    /// biases are dropped only when the term can't contribute more than the threshold within the
    /// (finite) variable bounds; equality constraints are left alone.
    ///
    /// # Return value
    ///
    /// Whether any bias was removed.
    pub(in crate::presolve) fn presolve_small_biases(&mut self) -> Result<bool, Infeasible> {
        let threshold = self.settings.small_bias_threshold;

        let objective = self.store.objective();
        let small = objective.iter_linear()
            .filter(|&(_, c)| c.abs() < threshold)
            .map(|(j, _)| Term::Linear(j))
            .chain(objective.iter_quadratic()
                .filter(|&(_, q)| q.abs() < threshold)
                .map(|((u, v), _)| Term::Quadratic(u, v)))
            .collect::<Vec<_>>();
        let mut changed = !small.is_empty();
        for term in small {
            trace!("removing small objective bias on {:?}", term);
            match term {
                Term::Linear(j) => self.store.objective_mut().remove_linear(j),
                Term::Quadratic(u, v) => self.store.objective_mut().remove_quadratic(u, v),
            };
        }

        let constraints = self.store.live_constraints()
            .filter(|(_, constraint)| constraint.sense != Sense::Eq)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        for index in constraints {
            changed |= self.remove_small_constraint_biases(index, threshold);
        }

        Ok(changed)
    }

    fn remove_small_constraint_biases(&mut self, index: usize, threshold: f64) -> bool {
        let Some(constraint) = self.store.constraint(index) else { return false };
        let [side] = bounded_sides(constraint.sense) else { return false };

        let expression = &constraint.expression;
        let ranges = expression.iter_linear()
            .map(|(j, c)| (Term::Linear(j), linear_range(c, self.bounds.interval(j))))
            .chain(expression.iter_quadratic().map(|((u, v), q)| {
                let range = quadratic_range(q, self.bounds.interval(u), self.bounds.interval(v), u == v);
                (Term::Quadratic(u, v), range)
            }))
            .filter(|(_, range)| range.values().all(|value| value.abs() < threshold))
            .collect::<Vec<_>>();
        if ranges.is_empty() {
            return false;
        }

        let mut reduced = constraint.clone();
        for (term, range) in ranges {
            trace!("removing small bias on {:?} from constraint {}", term, index);
            match term {
                Term::Linear(j) => reduced.expression.remove_linear(j),
                Term::Quadratic(u, v) => reduced.expression.remove_quadratic(u, v),
            };
            // expression - term <= rhs - term is implied by rhs - min term
            reduced.rhs -= range[!*side];
        }
        self.store.replace_constraint(index, reduced);

        true
    }
}


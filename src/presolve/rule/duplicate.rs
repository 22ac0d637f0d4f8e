//! # Duplicate constraints
//!
//! Constraints whose expressions are scalar multiples of each other restrict the same quantity.
//! They are merged into a single constraint when the combined restriction fits in one.
use itertools::Itertools;
use log::trace;

use crate::data::model::{Constraint, Sense};
use crate::presolve::Reducer;
use crate::presolve::error::Infeasible;

/// A constraint scaled such that its leading coefficient is one.
struct Normalized {
    index: usize,
    constraint: Constraint,
}

impl Normalized {
    /// Scale a constraint by the inverse of its leading coefficient.
    ///
    /// The leading coefficient is the first linear coefficient, or the first quadratic one if there
    /// are no linear terms. When it is negative, the sense flips.
    fn new(index: usize, constraint: &Constraint) -> Option<Self> {
        let expression = &constraint.expression;
        let leading = expression.iter_linear().map(|(_, c)| c)
            .chain(expression.iter_quadratic().map(|(_, q)| q))
            .find(|&c| c != 0_f64)?;

        let mut scaled = constraint.clone();
        scaled.expression.scale(leading.recip());
        scaled.rhs /= leading;
        if leading < 0_f64 {
            scaled.sense = scaled.sense.flipped();
        }

        Some(Self { index, constraint: scaled })
    }

    /// Variables and pairs of variables with a term.
    fn pattern(&self) -> (Vec<usize>, Vec<(usize, usize)>) {
        let expression = &self.constraint.expression;
        (
            expression.iter_linear().map(|(j, _)| j).collect(),
            expression.iter_quadratic().map(|(key, _)| key).collect(),
        )
    }

    fn same_expression(&self, other: &Self, tolerance: f64) -> bool {
        let (left, right) = (&self.constraint.expression, &other.constraint.expression);
        left.iter_linear().zip(right.iter_linear())
            .all(|((_, a), (_, b))| (a - b).abs() <= tolerance)
            && left.iter_quadratic().zip(right.iter_quadratic())
                .all(|((_, a), (_, b))| (a - b).abs() <= tolerance)
    }

    /// Interval of values the expression is restricted to.
    fn interval(&self) -> (f64, f64) {
        let rhs = self.constraint.rhs;
        match self.constraint.sense {
            Sense::Le => (f64::NEG_INFINITY, rhs),
            Sense::Ge => (rhs, f64::INFINITY),
            Sense::Eq => (rhs, rhs),
        }
    }
}

/// Combine two restrictions of the same expression.
///
/// # Return value
///
/// `Ok(Some)` with the combined constraint when it can be expressed as a single constraint,
/// `Ok(None)` if it can't (a range), `Infeasible` if the restrictions contradict each other.
fn merge(kept: &Normalized, other: &Normalized, tolerance: f64) -> Result<Option<Constraint>, Infeasible> {
    let (kept_lower, kept_upper) = kept.interval();
    let (other_lower, other_upper) = other.interval();
    let lower = kept_lower.max(other_lower);
    let upper = kept_upper.min(other_upper);

    if lower > upper + tolerance {
        return Err(Infeasible);
    }

    let expression = kept.constraint.expression.clone();
    let merged = if upper - lower <= tolerance {
        // At least one of them is an equality
        let equality = [kept, other].into_iter()
            .find(|normalized| normalized.constraint.sense == Sense::Eq)
            .map_or(lower, |normalized| normalized.constraint.rhs);
        Some(Constraint::new(expression, Sense::Eq, equality))
    } else if lower == f64::NEG_INFINITY {
        Some(Constraint::new(expression, Sense::Le, upper))
    } else if upper == f64::INFINITY {
        Some(Constraint::new(expression, Sense::Ge, lower))
    } else {
        None
    };

    Ok(merged)
}

impl<'a> Reducer<'a> {
    /// Merge constraints that are scalar multiples of each other.
    ///
    /// Of two inequalities in the same direction, the tighter one is kept. An equality and an
    /// inequality become the equality, if the inequality holds at its value. Two equalities with
    /// different right-hand sides are infeasible. Opposite inequalities that together form a range
    /// are both kept.
    ///
    /// # Return value
    ///
    /// Whether any constraint was removed, or `Infeasible`.
    pub(in crate::presolve) fn presolve_duplicate_constraints(&mut self) -> Result<bool, Infeasible> {
        let tolerance = self.tolerance();
        let groups = self.store.live_constraints()
            .filter_map(|(i, constraint)| Normalized::new(i, constraint))
            .into_group_map_by(Normalized::pattern)
            .into_values()
            .filter(|group| group.len() > 1)
            .sorted_by_key(|group| group[0].index)
            .collect::<Vec<_>>();

        let mut changed = false;
        for group in groups {
            let mut kept: Vec<Normalized> = Vec::with_capacity(group.len());
            for normalized in group {
                let mut merged_into = None;
                for (k, candidate) in kept.iter().enumerate() {
                    if !candidate.same_expression(&normalized, tolerance) {
                        continue;
                    }
                    if let Some(constraint) = merge(candidate, &normalized, tolerance)? {
                        merged_into = Some((k, constraint));
                        break;
                    }
                }

                match merged_into {
                    Some((k, constraint)) => {
                        trace!("constraint {} duplicates constraint {}", normalized.index, kept[k].index);
                        self.store.remove_constraint(normalized.index);
                        self.store.replace_constraint(kept[k].index, constraint.clone());
                        kept[k].constraint = constraint;
                        changed = true;
                    },
                    None => kept.push(normalized),
                }
            }
        }

        Ok(changed)
    }
}

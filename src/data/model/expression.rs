//! # Quadratic expressions
//!
//! Linear and quadratic terms over index-labeled variables, plus a constant offset. Used for both
//! the objective and the left-hand side of constraints.
use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use num_traits::Zero;

/// A quadratic expression `offset + Σ a_v x_v + Σ q_uv x_u x_v`.
///
/// Quadratic terms are keyed by the ordered pair `(min(u, v), max(u, v))`, a key `(v, v)` is the
/// square of `x_v`. Adding a term for a key that is already present sums the coefficients.
///
/// Coefficients that became zero are not removed automatically, see `prune_zeros`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expression {
    linear: BTreeMap<usize, f64>,
    quadratic: BTreeMap<(usize, usize), f64>,
    offset: f64,
}

fn pair(u: usize, v: usize) -> (usize, usize) {
    if u <= v { (u, v) } else { (v, u) }
}

impl Expression {
    /// Create an empty expression (no terms and a zero offset).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a linear expression from `(variable, coefficient)` tuples.
    ///
    /// Repeated variables have their coefficients summed.
    pub fn from_linear<I: IntoIterator<Item = (usize, f64)>>(terms: I) -> Self {
        let mut expression = Self::new();
        for (variable, coefficient) in terms {
            expression.add_linear(variable, coefficient);
        }
        expression
    }

    /// Builder style version of `add_quadratic`.
    #[must_use]
    pub fn with_quadratic(mut self, u: usize, v: usize, coefficient: f64) -> Self {
        self.add_quadratic(u, v, coefficient);
        self
    }

    /// Builder style version of `add_offset`.
    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset += offset;
        self
    }

    /// Add `coefficient * x_variable`.
    pub fn add_linear(&mut self, variable: usize, coefficient: f64) {
        *self.linear.entry(variable).or_insert(0_f64) += coefficient;
    }

    /// Add `coefficient * x_u * x_v`.
    pub fn add_quadratic(&mut self, u: usize, v: usize, coefficient: f64) {
        *self.quadratic.entry(pair(u, v)).or_insert(0_f64) += coefficient;
    }

    /// Add a constant.
    pub fn add_offset(&mut self, offset: f64) {
        self.offset += offset;
    }

    /// The constant of this expression.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Replace the constant of this expression.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// Linear coefficient of a variable, zero if it has none.
    pub fn linear(&self, variable: usize) -> f64 {
        self.linear.get(&variable).copied().unwrap_or(0_f64)
    }

    /// Quadratic coefficient of a pair of variables, zero if the pair has none.
    pub fn quadratic(&self, u: usize, v: usize) -> f64 {
        self.quadratic.get(&pair(u, v)).copied().unwrap_or(0_f64)
    }

    /// Iterate over the linear terms in increasing variable order.
    pub fn iter_linear(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.linear.iter().map(|(&variable, &coefficient)| (variable, coefficient))
    }

    /// Iterate over the quadratic terms in increasing pair order.
    pub fn iter_quadratic(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.quadratic.iter().map(|(&key, &coefficient)| (key, coefficient))
    }

    /// Number of linear terms stored (including explicit zeros).
    pub fn nr_linear(&self) -> usize {
        self.linear.len()
    }

    /// Number of quadratic terms stored (including explicit zeros).
    pub fn nr_quadratic(&self) -> usize {
        self.quadratic.len()
    }

    /// Whether the expression has no terms at all; the offset is not considered.
    pub fn is_empty(&self) -> bool {
        self.linear.is_empty() && self.quadratic.is_empty()
    }

    /// Whether there are no quadratic terms.
    pub fn is_linear(&self) -> bool {
        self.quadratic.is_empty()
    }

    /// All variables with a term in this expression, sorted and unique.
    pub fn variables(&self) -> Vec<usize> {
        self.linear.keys().copied()
            .chain(self.quadratic.keys().flat_map(|&(u, v)| [u, v]))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether a variable has any term in this expression.
    pub fn contains(&self, variable: usize) -> bool {
        self.linear.contains_key(&variable) || !self.is_linear_in(variable)
    }

    /// Whether the variable appears in no quadratic term.
    pub fn is_linear_in(&self, variable: usize) -> bool {
        self.quadratic.keys().all(|&(u, v)| u != variable && v != variable)
    }

    /// Whether all coefficients and the offset are finite.
    pub fn is_finite(&self) -> bool {
        self.offset.is_finite()
            && self.linear.values().all(|c| c.is_finite())
            && self.quadratic.values().all(|c| c.is_finite())
    }

    /// Evaluate the expression for values indexed by variable.
    pub fn evaluate(&self, sample: &[f64]) -> f64 {
        self.offset
            + self.linear.iter().map(|(&v, c)| c * sample[v]).sum::<f64>()
            + self.quadratic.iter().map(|(&(u, v), q)| q * sample[u] * sample[v]).sum::<f64>()
    }

    /// Multiply every coefficient and the offset by a factor.
    pub fn scale(&mut self, factor: f64) {
        self.offset *= factor;
        for coefficient in self.linear.values_mut().chain(self.quadratic.values_mut()) {
            *coefficient *= factor;
        }
    }

    /// Remove all terms with an exactly zero coefficient.
    pub fn prune_zeros(&mut self) {
        self.linear.retain(|_, c| !c.is_zero());
        self.quadratic.retain(|_, q| !q.is_zero());
    }

    /// Remove a single linear term, returning its coefficient.
    pub fn remove_linear(&mut self, variable: usize) -> Option<f64> {
        self.linear.remove(&variable)
    }

    /// Remove a single quadratic term, returning its coefficient.
    pub fn remove_quadratic(&mut self, u: usize, v: usize) -> Option<f64> {
        self.quadratic.remove(&pair(u, v))
    }

    /// Replace the square terms of some variables by linear terms.
    ///
    /// Valid for variables that only take the values 0 and 1, for which `x * x == x`.
    pub fn fold_squares<P: Fn(usize) -> bool>(&mut self, is_binary: P) {
        let squares = self.quadratic.keys()
            .filter(|&&(u, v)| u == v && is_binary(u))
            .copied()
            .collect::<Vec<_>>();
        for key in squares {
            if let Some(coefficient) = self.quadratic.remove(&key) {
                self.add_linear(key.0, coefficient);
            }
        }
    }

    /// Replace a variable by an affine function of other variables.
    ///
    /// The variable is replaced by `constant + Σ coefficient * x_j` for `(j, coefficient)` in
    /// `terms`. Quadratic terms containing the variable are expanded, so that the result is again
    /// a quadratic expression.
    ///
    /// # Arguments
    ///
    /// * `variable`: Variable to eliminate, may not appear in `terms`.
    /// * `constant`: Constant part of the affine function.
    /// * `terms`: Linear part of the affine function.
    pub fn substitute(&mut self, variable: usize, constant: f64, terms: &[(usize, f64)]) {
        debug_assert!(terms.iter().all(|&(j, _)| j != variable));

        if let Some(coefficient) = self.linear.remove(&variable) {
            self.offset += coefficient * constant;
            for &(j, a) in terms {
                self.add_linear(j, coefficient * a);
            }
        }

        let touching = self.quadratic.keys()
            .filter(|&&(u, v)| u == variable || v == variable)
            .copied()
            .collect::<Vec<_>>();
        for key in touching {
            let Some(q) = self.quadratic.remove(&key) else { continue };
            if key.0 == key.1 {
                // q (c + <a, z>)^2
                self.offset += q * constant * constant;
                for &(j, a) in terms {
                    self.add_linear(j, 2_f64 * q * constant * a);
                }
                for (&(i, a_i), &(j, a_j)) in terms.iter().tuple_combinations() {
                    self.add_quadratic(i, j, 2_f64 * q * a_i * a_j);
                }
                for &(j, a) in terms {
                    self.add_quadratic(j, j, q * a * a);
                }
            } else {
                // q (c + <a, z>) y
                let other = if key.0 == variable { key.1 } else { key.0 };
                self.add_linear(other, q * constant);
                for &(j, a) in terms {
                    self.add_quadratic(j, other, q * a);
                }
            }
        }
    }

    /// Give all variables new indices.
    ///
    /// # Arguments
    ///
    /// * `new_index`: For every old index, the new index. Should be defined for all variables in
    /// this expression.
    pub fn relabeled(&self, new_index: &[Option<usize>]) -> Self {
        let index = |v: usize| {
            debug_assert!(new_index[v].is_some(), "variable {v} has no new index");
            new_index[v].unwrap_or(v)
        };

        let mut relabeled = Self::new().with_offset(self.offset);
        for (&v, &c) in &self.linear {
            relabeled.add_linear(index(v), c);
        }
        for (&(u, v), &q) in &self.quadratic {
            relabeled.add_quadratic(index(u), index(v), q);
        }
        relabeled
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use crate::data::model::expression::Expression;

    #[test]
    fn duplicate_keys_are_summed() {
        let mut expression = Expression::from_linear([(0, 1.5), (1, 2.0), (0, 0.5)]);
        expression.add_quadratic(1, 0, 3.0);
        expression.add_quadratic(0, 1, -1.0);

        assert_eq!(expression.linear(0), 2.0);
        assert_eq!(expression.nr_linear(), 2);
        assert_eq!(expression.quadratic(0, 1), 2.0);
        assert_eq!(expression.quadratic(1, 0), 2.0);
        assert_eq!(expression.nr_quadratic(), 1);
        assert_eq!(expression.variables(), vec![0, 1]);
    }

    #[test]
    fn substitute_constant() {
        // 2x + 3xy + x^2 + 1 with x = 4
        let mut expression = Expression::from_linear([(0, 2.0)])
            .with_quadratic(0, 1, 3.0)
            .with_quadratic(0, 0, 1.0)
            .with_offset(1.0);
        expression.substitute(0, 4.0, &[]);

        assert!(!expression.contains(0));
        assert_eq!(expression.linear(1), 12.0);
        assert_relative_eq!(expression.offset(), 1.0 + 8.0 + 16.0);
        assert!(expression.is_linear());
    }

    #[test]
    fn substitute_affine_matches_evaluation() {
        // x0 = 1 + 2 x1 - x2
        let original = Expression::from_linear([(0, 3.0), (1, -1.0)])
            .with_quadratic(0, 0, 2.0)
            .with_quadratic(0, 2, -1.5)
            .with_quadratic(1, 2, 0.5)
            .with_offset(-2.0);
        let mut substituted = original.clone();
        substituted.substitute(0, 1.0, &[(1, 2.0), (2, -1.0)]);
        assert!(!substituted.contains(0));

        for &(x1, x2) in &[(0.0, 0.0), (1.0, -2.0), (0.5, 3.25), (-4.0, 1.0)] {
            let x0 = 1.0 + 2.0 * x1 - x2;
            assert_relative_eq!(
                original.evaluate(&[x0, x1, x2]),
                substituted.evaluate(&[0.0, x1, x2]),
                epsilon = 1e-9,
            );
        }
    }

    #[test]
    fn fold_squares_of_binaries() {
        let mut expression = Expression::new()
            .with_quadratic(0, 0, 2.0)
            .with_quadratic(1, 1, 3.0);
        expression.fold_squares(|v| v == 0);

        assert_eq!(expression.linear(0), 2.0);
        assert_eq!(expression.quadratic(0, 0), 0.0);
        assert_eq!(expression.quadratic(1, 1), 3.0);
    }

    #[test]
    fn relabel() {
        let expression = Expression::from_linear([(2, 1.0)]).with_quadratic(2, 4, 5.0);
        let relabeled = expression.relabeled(&[None, None, Some(1), None, Some(0)]);

        assert_eq!(relabeled.linear(1), 1.0);
        assert_eq!(relabeled.quadratic(0, 1), 5.0);
        assert_eq!(relabeled.variables(), vec![0, 1]);
    }
}

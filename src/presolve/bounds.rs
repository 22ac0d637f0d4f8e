//! # Variable bounds
//!
//! Bounds only ever get tighter during presolve. Every tightening is checked against the opposite
//! bound, so that an empty domain is detected as soon as it is derived.
use std::collections::BTreeMap;

use enum_map::{EnumMap, enum_map};

use crate::data::model::{BoundDirection, Variable, VariableType};
use crate::presolve::error::Infeasible;

/// Current bounds of all variables of the model being presolved.
///
/// Indexed by the original variable index. Entries of variables that were removed from the model
/// are kept, but no longer updated.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundTracker {
    vartypes: Vec<VariableType>,
    bounds: Vec<EnumMap<BoundDirection, f64>>,
    tolerance: f64,
}

impl BoundTracker {
    /// Create a new instance.
    ///
    /// # Arguments
    ///
    /// * `variables`: Variables with their initial bounds.
    /// * `tolerance`: Absolute tolerance for comparing bound values.
    pub fn new(variables: &[Variable], tolerance: f64) -> Self {
        Self {
            vartypes: variables.iter().map(|variable| variable.vartype).collect(),
            bounds: variables.iter()
                .map(|variable| enum_map! {
                    BoundDirection::Lower => variable.lower_bound,
                    BoundDirection::Upper => variable.upper_bound,
                })
                .collect(),
            tolerance,
        }
    }

    #[allow(missing_docs)]
    pub fn nr_variables(&self) -> usize {
        self.vartypes.len()
    }

    #[allow(missing_docs)]
    pub fn lower(&self, variable: usize) -> f64 {
        self.bounds[variable][BoundDirection::Lower]
    }

    #[allow(missing_docs)]
    pub fn upper(&self, variable: usize) -> f64 {
        self.bounds[variable][BoundDirection::Upper]
    }

    #[allow(missing_docs)]
    pub fn bound(&self, variable: usize, direction: BoundDirection) -> f64 {
        self.bounds[variable][direction]
    }

    #[allow(missing_docs)]
    pub fn vartype(&self, variable: usize) -> VariableType {
        self.vartypes[variable]
    }

    /// Lower and upper bound.
    pub fn interval(&self, variable: usize) -> (f64, f64) {
        (self.lower(variable), self.upper(variable))
    }

    /// Tolerance used in comparisons.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Replace the tolerance used in comparisons.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        debug_assert!(tolerance >= 0_f64);

        self.tolerance = tolerance;
    }

    /// The variable as it should appear in a model, with its current bounds.
    pub fn variable(&self, variable: usize) -> Variable {
        Variable {
            vartype: self.vartype(variable),
            lower_bound: self.lower(variable),
            upper_bound: self.upper(variable),
        }
    }

    /// Whether the variable can take only a single value.
    ///
    /// Real variables are fixed when their bounds are within tolerance of each other, integral
    /// variables only when they are exactly equal.
    pub fn is_fixed(&self, variable: usize) -> bool {
        self.fixed_value(variable).is_some()
    }

    /// The value of a fixed variable.
    pub fn fixed_value(&self, variable: usize) -> Option<f64> {
        let (lower, upper) = self.interval(variable);
        if !lower.is_finite() || !upper.is_finite() {
            return None;
        }

        if self.vartype(variable).is_integral() {
            (lower == upper).then_some(lower)
        } else {
            (upper - lower <= self.tolerance).then(|| (lower + upper) / 2_f64)
        }
    }

    /// Round bounds of integral variables inward and check that no domain is empty.
    ///
    /// Should be called once, before any rule is applied.
    pub fn check_domains(&mut self) -> Result<(), Infeasible> {
        for variable in 0..self.nr_variables() {
            let interval = self.interval(variable);
            let (lower, upper) = self.rounded(variable, interval);
            if lower > upper + self.real_slack(variable) {
                return Err(Infeasible);
            }
            let upper = upper.max(lower);
            self.bounds[variable] = enum_map! {
                BoundDirection::Lower => lower,
                BoundDirection::Upper => upper,
            };
        }

        Ok(())
    }

    #[allow(missing_docs)]
    pub fn tighten_lower(&mut self, variable: usize, value: f64) -> Result<bool, Infeasible> {
        self.tighten(variable, BoundDirection::Lower, value)
    }

    #[allow(missing_docs)]
    pub fn tighten_upper(&mut self, variable: usize, value: f64) -> Result<bool, Infeasible> {
        self.tighten(variable, BoundDirection::Upper, value)
    }

    /// Tighten a single bound.
    ///
    /// # Return value
    ///
    /// Whether the bound changed. If the new bound would make the domain empty, `Infeasible`, and
    /// nothing is changed.
    pub fn tighten(
        &mut self,
        variable: usize,
        direction: BoundDirection,
        value: f64,
    ) -> Result<bool, Infeasible> {
        self.tighten_all([(variable, direction, value)])
    }

    /// Tighten several bounds at once.
    ///
    /// All changes are validated before any of them is applied: when one of them proves the model
    /// infeasible, none of the bounds changed.
    ///
    /// # Arguments
    ///
    /// * `changes`: Tuples `(variable, direction, value)`.
    ///
    /// # Return value
    ///
    /// Whether any bound changed.
    pub fn tighten_all<I: IntoIterator<Item = (usize, BoundDirection, f64)>>(
        &mut self,
        changes: I,
    ) -> Result<bool, Infeasible> {
        let mut pending = BTreeMap::new();
        for (variable, direction, value) in changes {
            let current = pending.get(&variable).copied().unwrap_or_else(|| self.interval(variable));
            if let Some(interval) = self.candidate(variable, current, direction, value)? {
                pending.insert(variable, interval);
            }
        }

        let changed = !pending.is_empty();
        for (variable, (lower, upper)) in pending {
            debug_assert!(lower >= self.lower(variable), "lower bound of {variable} decreased");
            debug_assert!(upper <= self.upper(variable), "upper bound of {variable} increased");

            self.bounds[variable][BoundDirection::Lower] = lower;
            self.bounds[variable][BoundDirection::Upper] = upper;
        }

        Ok(changed)
    }

    /// Compute the interval after a tightening, if it is an improvement.
    fn candidate(
        &self,
        variable: usize,
        (lower, upper): (f64, f64),
        direction: BoundDirection,
        value: f64,
    ) -> Result<Option<(f64, f64)>, Infeasible> {
        if value.is_nan() {
            return Ok(None);
        }

        let (new_lower, new_upper) = match direction {
            BoundDirection::Lower => {
                let (value, _) = self.rounded(variable, (value, upper));
                if !self.improves(variable, value - lower) {
                    return Ok(None);
                }
                (value, upper)
            },
            BoundDirection::Upper => {
                let (_, value) = self.rounded(variable, (lower, value));
                if !self.improves(variable, upper - value) {
                    return Ok(None);
                }
                (lower, value)
            },
        };

        if new_lower == f64::INFINITY || new_upper == f64::NEG_INFINITY {
            return Err(Infeasible);
        }
        if new_lower <= new_upper {
            Ok(Some((new_lower, new_upper)))
        } else if new_lower - new_upper <= self.real_slack(variable) {
            // Crossed within tolerance, collapse onto the bound that was already there
            let point = match direction {
                BoundDirection::Lower => new_upper,
                BoundDirection::Upper => new_lower,
            };
            Ok(Some((point, point)))
        } else {
            Err(Infeasible)
        }
    }

    fn improves(&self, variable: usize, difference: f64) -> bool {
        if difference.is_nan() {
            // Both infinite with the same sign
            false
        } else if self.vartype(variable).is_integral() {
            difference > 0_f64
        } else {
            difference > self.tolerance
        }
    }

    fn real_slack(&self, variable: usize) -> f64 {
        if self.vartype(variable).is_integral() { 0_f64 } else { self.tolerance }
    }

    fn rounded(&self, variable: usize, (lower, upper): (f64, f64)) -> (f64, f64) {
        if self.vartype(variable).is_integral() {
            ((lower - self.tolerance).ceil(), (upper + self.tolerance).floor())
        } else {
            (lower, upper)
        }
    }
}

#[cfg(test)]
mod test {
    use crate::data::model::{BoundDirection, Variable, VariableType};
    use crate::presolve::bounds::BoundTracker;
    use crate::presolve::error::Infeasible;

    fn tracker() -> BoundTracker {
        BoundTracker::new(
            &[
                Variable { vartype: VariableType::Real, lower_bound: f64::NEG_INFINITY, upper_bound: f64::INFINITY },
                Variable { vartype: VariableType::Integer, lower_bound: -5.0, upper_bound: 5.0 },
                Variable { vartype: VariableType::Binary, lower_bound: 0.0, upper_bound: 1.0 },
            ],
            1e-6,
        )
    }

    #[test]
    fn tighten_real() {
        let mut bounds = tracker();
        assert_eq!(bounds.tighten_upper(0, 3.0), Ok(true));
        assert_eq!(bounds.tighten_upper(0, 4.0), Ok(false));
        assert_eq!(bounds.tighten_upper(0, 3.0 - 1e-9), Ok(false));
        assert_eq!(bounds.interval(0), (f64::NEG_INFINITY, 3.0));
        assert!(!bounds.is_fixed(0));

        assert_eq!(bounds.tighten_lower(0, 5.0), Err(Infeasible));
        assert_eq!(bounds.interval(0), (f64::NEG_INFINITY, 3.0));

        assert_eq!(bounds.tighten_lower(0, 3.0 + 1e-7), Ok(true));
        assert_eq!(bounds.interval(0), (3.0, 3.0));
        assert_eq!(bounds.fixed_value(0), Some(3.0));
    }

    #[test]
    fn tighten_integer_rounds_inward() {
        let mut bounds = tracker();
        assert_eq!(bounds.tighten_lower(1, 1.5), Ok(true));
        assert_eq!(bounds.lower(1), 2.0);
        assert_eq!(bounds.tighten_upper(1, 2.000_000_1), Ok(true));
        assert_eq!(bounds.upper(1), 2.0);
        assert_eq!(bounds.fixed_value(1), Some(2.0));

        assert_eq!(bounds.tighten_upper(2, 0.5), Ok(true));
        assert!(bounds.is_fixed(2));
        assert_eq!(bounds.tighten_lower(2, 0.2), Err(Infeasible));
    }

    #[test]
    fn tighten_all_is_atomic() {
        let mut bounds = tracker();
        let result = bounds.tighten_all([
            (0, BoundDirection::Lower, 1.0),
            (1, BoundDirection::Upper, 0.0),
            (1, BoundDirection::Lower, 1.0),
        ]);
        assert_eq!(result, Err(Infeasible));
        assert_eq!(bounds, tracker());

        let result = bounds.tighten_all([
            (0, BoundDirection::Lower, 1.0),
            (1, BoundDirection::Upper, 0.0),
            (1, BoundDirection::Upper, 3.0),
        ]);
        assert_eq!(result, Ok(true));
        assert_eq!(bounds.interval(0), (1.0, f64::INFINITY));
        assert_eq!(bounds.interval(1), (-5.0, 0.0));
    }

    #[test]
    fn check_domains() {
        let mut bounds = BoundTracker::new(
            &[Variable { vartype: VariableType::Integer, lower_bound: 0.2, upper_bound: 0.8 }],
            1e-6,
        );
        assert_eq!(bounds.check_domains(), Err(Infeasible));

        let mut bounds = BoundTracker::new(
            &[Variable { vartype: VariableType::Integer, lower_bound: 0.2, upper_bound: 1.8 }],
            1e-6,
        );
        assert_eq!(bounds.check_domains(), Ok(()));
        assert_eq!(bounds.fixed_value(0), Some(1.0));
    }
}

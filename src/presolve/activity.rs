//! # Activity bounds
//!
//! Range of values an expression can take given the current variable bounds. Infinite
//! contributions are counted rather than summed, so that the activity of an expression without one
//! of its terms can still be computed when that term was the only unbounded one.
use enum_map::{EnumMap, enum_map};

use crate::data::model::{BoundDirection, Expression, NonZeroSign};
use crate::presolve::bounds::BoundTracker;

/// Bounds on the value of an expression, excluding its offset.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Activity {
    /// Sum of all finite contributions.
    finite: EnumMap<BoundDirection, f64>,
    /// Number of contributions that are infinite in that direction.
    infinite: EnumMap<BoundDirection, usize>,
}

impl Activity {
    /// Compute the activity bounds of an expression.
    pub fn of(expression: &Expression, bounds: &BoundTracker) -> Self {
        let mut activity = Self {
            finite: enum_map! { _ => 0_f64 },
            infinite: enum_map! { _ => 0 },
        };

        for (variable, coefficient) in expression.iter_linear() {
            activity.add(linear_range(coefficient, bounds.interval(variable)));
        }
        for ((u, v), coefficient) in expression.iter_quadratic() {
            activity.add(quadratic_range(coefficient, bounds.interval(u), bounds.interval(v), u == v));
        }

        activity
    }

    fn add(&mut self, range: EnumMap<BoundDirection, f64>) {
        for (direction, value) in range {
            if value.is_infinite() {
                self.infinite[direction] += 1;
            } else {
                self.finite[direction] += value;
            }
        }
    }

    /// Smallest or largest value the expression can take, possibly infinite.
    pub fn bound(&self, direction: BoundDirection) -> f64 {
        if self.infinite[direction] > 0 {
            unbounded(direction)
        } else {
            self.finite[direction]
        }
    }

    /// Activity bound of the expression without one of its terms.
    ///
    /// # Arguments
    ///
    /// * `direction`: Which activity bound.
    /// * `contribution`: Contribution of the left out term to that activity bound.
    pub fn residual(&self, direction: BoundDirection, contribution: f64) -> f64 {
        let infinite = self.infinite[direction];
        if contribution.is_infinite() {
            debug_assert!(infinite > 0);

            if infinite == 1 { self.finite[direction] } else { unbounded(direction) }
        } else if infinite == 0 {
            self.finite[direction] - contribution
        } else {
            unbounded(direction)
        }
    }
}

fn unbounded(direction: BoundDirection) -> f64 {
    match direction {
        BoundDirection::Lower => f64::NEG_INFINITY,
        BoundDirection::Upper => f64::INFINITY,
    }
}

/// Multiplication where zero times infinity is zero.
fn times(a: f64, b: f64) -> f64 {
    if a == 0_f64 || b == 0_f64 { 0_f64 } else { a * b }
}

fn bound_of((lower, upper): (f64, f64), direction: BoundDirection) -> f64 {
    match direction {
        BoundDirection::Lower => lower,
        BoundDirection::Upper => upper,
    }
}

/// Range of `coefficient * x` for `x` in `interval`.
pub(crate) fn linear_range(coefficient: f64, interval: (f64, f64)) -> EnumMap<BoundDirection, f64> {
    if coefficient == 0_f64 {
        return enum_map! { _ => 0_f64 };
    }

    let sign = NonZeroSign::of(coefficient);
    enum_map! {
        direction => times(coefficient, bound_of(interval, direction ^ sign)),
    }
}

/// Range of `coefficient * x * y`, or of `coefficient * x^2` if `square`.
pub(crate) fn quadratic_range(
    coefficient: f64,
    (x_lower, x_upper): (f64, f64),
    (y_lower, y_upper): (f64, f64),
    square: bool,
) -> EnumMap<BoundDirection, f64> {
    let (lower, upper) = if square {
        if x_lower >= 0_f64 {
            (times(x_lower, x_lower), times(x_upper, x_upper))
        } else if x_upper <= 0_f64 {
            (times(x_upper, x_upper), times(x_lower, x_lower))
        } else {
            (0_f64, times(x_lower, x_lower).max(times(x_upper, x_upper)))
        }
    } else {
        let corners = [
            times(x_lower, y_lower),
            times(x_lower, y_upper),
            times(x_upper, y_lower),
            times(x_upper, y_upper),
        ];
        (
            corners.iter().copied().fold(f64::INFINITY, f64::min),
            corners.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    linear_range(coefficient, (lower, upper))
}

#[cfg(test)]
mod test {
    use enum_map::enum_map;

    use crate::data::model::{BoundDirection, Expression, Variable, VariableType};
    use crate::presolve::activity::{Activity, linear_range, quadratic_range};
    use crate::presolve::bounds::BoundTracker;

    #[test]
    fn ranges() {
        assert_eq!(
            linear_range(-2.0, (1.0, f64::INFINITY)),
            enum_map! { BoundDirection::Lower => f64::NEG_INFINITY, BoundDirection::Upper => -2.0 },
        );
        assert_eq!(
            quadratic_range(1.0, (-2.0, 3.0), (-2.0, 3.0), true),
            enum_map! { BoundDirection::Lower => 0.0, BoundDirection::Upper => 9.0 },
        );
        assert_eq!(
            quadratic_range(-1.0, (-2.0, 3.0), (1.0, 4.0), false),
            enum_map! { BoundDirection::Lower => -12.0, BoundDirection::Upper => 8.0 },
        );
        assert_eq!(
            quadratic_range(1.0, (0.0, 0.0), (f64::NEG_INFINITY, f64::INFINITY), false),
            enum_map! { BoundDirection::Lower => 0.0, BoundDirection::Upper => 0.0 },
        );
    }

    #[test]
    fn residuals() {
        let bounds = BoundTracker::new(
            &[
                Variable { vartype: VariableType::Real, lower_bound: 0.0, upper_bound: f64::INFINITY },
                Variable { vartype: VariableType::Real, lower_bound: 1.0, upper_bound: 2.0 },
            ],
            1e-6,
        );
        // x0 + 3 x1
        let activity = Activity::of(&Expression::from_linear([(0, 1.0), (1, 3.0)]), &bounds);

        assert_eq!(activity.bound(BoundDirection::Lower), 3.0);
        assert_eq!(activity.bound(BoundDirection::Upper), f64::INFINITY);
        assert_eq!(activity.residual(BoundDirection::Upper, f64::INFINITY), 6.0);
        assert_eq!(activity.residual(BoundDirection::Upper, 6.0), f64::INFINITY);
        assert_eq!(activity.residual(BoundDirection::Lower, 3.0), 0.0);
    }
}

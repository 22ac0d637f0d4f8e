//! # Building blocks to describe constrained quadratic models.
use std::fmt;
use std::ops::{BitXor, Not};

use enum_map::Enum;

/// Domain of a variable.
///
/// Binary variables always have bounds `[0, 1]`. Integer variables take integral values between
/// their bounds, real variables any value.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VariableType {
    Real,
    Integer,
    Binary,
}

impl VariableType {
    /// Whether only integral values are allowed.
    pub fn is_integral(self) -> bool {
        match self {
            VariableType::Real => false,
            VariableType::Integer | VariableType::Binary => true,
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            VariableType::Real => "REAL",
            VariableType::Integer => "INTEGER",
            VariableType::Binary => "BINARY",
        })
    }
}

/// Comparison between the expression of a constraint and its right-hand side.
///
/// Read "from expression to right-hand side":
/// * `Le` means `expression <= rhs`
/// * `Ge` means `expression >= rhs`
/// * `Eq` means `expression == rhs`
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl Sense {
    /// The sense after multiplying both sides of the constraint by a negative number.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Sense::Le => Sense::Ge,
            Sense::Ge => Sense::Le,
            Sense::Eq => Sense::Eq,
        }
    }

    /// Whether `activity` satisfies `activity (sense) rhs` up to `tolerance`.
    pub fn holds(self, activity: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Sense::Le => activity <= rhs + tolerance,
            Sense::Ge => activity >= rhs - tolerance,
            Sense::Eq => (activity - rhs).abs() <= tolerance,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "==",
        })
    }
}

/// Direction of a bound.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Enum)]
pub enum BoundDirection {
    /// Values should be at least this bound.
    Lower,
    /// Values should be at most this bound.
    Upper,
}

impl Not for BoundDirection {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
        }
    }
}

/// Sign of a nonzero coefficient.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NonZeroSign {
    Positive,
    Negative,
}

impl NonZeroSign {
    /// Sign of a coefficient that is known to be nonzero.
    pub fn of(value: f64) -> Self {
        debug_assert!(value != 0_f64 && !value.is_nan());

        if value > 0_f64 { NonZeroSign::Positive } else { NonZeroSign::Negative }
    }
}

/// Analogue to multiplying signs of values.
///
/// A lower activity bound is built from the lower bounds of the variables with a positive
/// coefficient and the upper bounds of those with a negative coefficient.
impl BitXor<NonZeroSign> for BoundDirection {
    type Output = Self;

    fn bitxor(self, sign: NonZeroSign) -> Self::Output {
        match sign {
            NonZeroSign::Positive => self,
            NonZeroSign::Negative => !self,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::data::model::elements::{BoundDirection, NonZeroSign, Sense};

    #[test]
    fn direction_times_sign() {
        assert_eq!(BoundDirection::Lower ^ NonZeroSign::Positive, BoundDirection::Lower);
        assert_eq!(BoundDirection::Lower ^ NonZeroSign::Negative, BoundDirection::Upper);
        assert_eq!(BoundDirection::Upper ^ NonZeroSign::of(-3.5), BoundDirection::Lower);
    }

    #[test]
    fn sense_holds() {
        assert!(Sense::Le.holds(3.0, 3.0, 0.0));
        assert!(!Sense::Le.holds(3.1, 3.0, 0.0));
        assert!(Sense::Ge.holds(2.999_999_9, 3.0, 1e-6));
        assert!(Sense::Eq.holds(3.0, 3.0, 0.0));
        assert_eq!(Sense::Le.flipped(), Sense::Ge);
        assert_eq!(Sense::Eq.flipped(), Sense::Eq);
    }
}

//! # Presolve settings
//!
//! Which techniques run, how long the loop may go on, and the numerical tolerances used while
//! reducing.
use std::fmt;
use std::str::FromStr;

use enum_map::{Enum, EnumMap, enum_map};

use crate::presolve::error::PresolveError;

/// A reduction technique.
///
/// The declaration order is the order in which the presolve loop applies the enabled techniques
/// within one round.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Enum)]
pub enum Technique {
    /// Derive variable bounds from constraint activity bounds.
    DomainPropagation,
    /// Replace variables with equal bounds by their value.
    FixedVariables,
    /// Remove constraints without variables, constraints that always hold and constraints on a
    /// single variable (which become bounds).
    TrivialConstraints,
    /// Eliminate a free real variable through the single equality constraint it appears in.
    SingletonSubstitution,
    /// Merge constraints that are scalar multiples of each other.
    DuplicateConstraints,
    /// Drop biases too small to matter. Not enabled by default.
    RemoveSmallBiases,
}

impl Technique {
    /// All techniques, in application order.
    pub const ALL: [Technique; 6] = [
        Technique::DomainPropagation,
        Technique::FixedVariables,
        Technique::TrivialConstraints,
        Technique::SingletonSubstitution,
        Technique::DuplicateConstraints,
        Technique::RemoveSmallBiases,
    ];

    /// Whether the technique is part of the default configuration.
    pub fn is_default(self) -> bool {
        !matches!(self, Technique::RemoveSmallBiases)
    }

    fn name(self) -> &'static str {
        match self {
            Technique::DomainPropagation => "domain_propagation",
            Technique::FixedVariables => "fixed_variables",
            Technique::TrivialConstraints => "trivial_constraints",
            Technique::SingletonSubstitution => "singleton_substitution",
            Technique::DuplicateConstraints => "duplicate_constraints",
            Technique::RemoveSmallBiases => "remove_small_biases",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Technique {
    type Err = PresolveError;

    /// Parse either the snake case name (as displayed) or the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Technique::ALL.into_iter()
            .find(|technique| technique.name() == s || format!("{technique:?}") == s)
            .ok_or_else(|| PresolveError::InvalidConfiguration(s.to_string()))
    }
}

/// Settings of a `Presolver`.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Upper limit on the number of rounds over all enabled techniques.
    pub max_rounds: usize,
    /// Absolute tolerance for comparisons of activities, right-hand sides and bounds.
    pub feasibility_tolerance: f64,
    /// Biases with a smaller (maximum) contribution are removed by `RemoveSmallBiases`.
    pub small_bias_threshold: f64,
    /// Maximum number of constraint visits of one domain propagation pass.
    pub propagation_budget: usize,
    /// Which techniques are enabled.
    pub techniques: EnumMap<Technique, bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            feasibility_tolerance: 1e-6,
            small_bias_threshold: 1e-10,
            propagation_budget: 10_000,
            techniques: enum_map! {
                technique => technique.is_default(),
            },
        }
    }
}

impl Settings {
    #[allow(missing_docs)]
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_feasibility_tolerance(mut self, tolerance: f64) -> Self {
        debug_assert!(tolerance >= 0_f64);

        self.feasibility_tolerance = tolerance;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_small_bias_threshold(mut self, threshold: f64) -> Self {
        debug_assert!(threshold >= 0_f64);

        self.small_bias_threshold = threshold;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_propagation_budget(mut self, budget: usize) -> Self {
        self.propagation_budget = budget;
        self
    }

    /// Enable exactly the given techniques.
    pub fn enable_only<I: IntoIterator<Item = Technique>>(&mut self, techniques: I) {
        self.techniques = EnumMap::default();
        for technique in techniques {
            self.techniques[technique] = true;
        }
    }

    /// Enable the default set of techniques, and only those.
    pub fn enable_defaults(&mut self) {
        self.enable_only(Technique::ALL.into_iter().filter(|t| t.is_default()));
    }

    /// Enabled techniques, in application order.
    pub fn enabled(&self) -> impl Iterator<Item = Technique> + '_ {
        self.techniques.iter()
            .filter(|&(_, &enabled)| enabled)
            .map(|(technique, _)| technique)
    }
}

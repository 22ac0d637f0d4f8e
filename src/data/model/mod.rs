//! # Constrained quadratic models
//!
//! An index-labeled representation of a constrained quadratic model: variables with a type and
//! bounds, a quadratic objective that is minimized and a list of quadratic constraints. This is the
//! format in which models are handed to and received from the presolver.
use std::fmt;

pub use elements::{BoundDirection, NonZeroSign, Sense, VariableType};
pub use expression::Expression;

pub mod elements;
pub mod expression;

/// A variable of a constrained quadratic model.
///
/// Bounds can be infinite for real and integer variables. Binary variables always have bounds
/// `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Variable {
    /// Domain of the variable.
    pub vartype: VariableType,
    /// Smallest value allowed, may be `f64::NEG_INFINITY`.
    pub lower_bound: f64,
    /// Largest value allowed, may be `f64::INFINITY`.
    pub upper_bound: f64,
}

impl Variable {
    /// Whether a value lies within the domain of this variable.
    pub fn admits(&self, value: f64, tolerance: f64) -> bool {
        let in_bounds = self.lower_bound - tolerance <= value && value <= self.upper_bound + tolerance;
        let integral = !self.vartype.is_integral() || (value - value.round()).abs() <= tolerance;

        in_bounds && integral
    }
}

/// A constraint `expression (<= >= ==) rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    /// Left-hand side.
    pub expression: Expression,
    /// How the left-hand side relates to the right-hand side.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

impl Constraint {
    /// Create a new constraint.
    pub fn new(expression: Expression, sense: Sense, rhs: f64) -> Self {
        Self { expression, sense, rhs }
    }

    /// Whether a sample satisfies the constraint up to a tolerance.
    pub fn is_satisfied(&self, sample: &[f64], tolerance: f64) -> bool {
        self.sense.holds(self.expression.evaluate(sample), self.rhs, tolerance)
    }
}

/// A constrained quadratic model with a minimization objective.
///
/// Variables are labeled by their index, `0..num_variables()`. Constraints are labeled by their
/// index `0..num_constraints()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstrainedQuadraticModel {
    variables: Vec<Variable>,
    objective: Expression,
    constraints: Vec<Constraint>,
}

impl ConstrainedQuadraticModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from its parts.
    ///
    /// No validation happens here, the presolver validates the model on ingestion.
    pub fn from_parts(
        variables: Vec<Variable>,
        objective: Expression,
        constraints: Vec<Constraint>,
    ) -> Self {
        Self { variables, objective, constraints }
    }

    /// Split the model into its parts.
    pub fn into_parts(self) -> (Vec<Variable>, Expression, Vec<Constraint>) {
        (self.variables, self.objective, self.constraints)
    }

    /// Add a variable and get its index.
    ///
    /// For binary variables the bounds are ignored and set to `[0, 1]`.
    pub fn add_variable(&mut self, vartype: VariableType, lower_bound: f64, upper_bound: f64) -> usize {
        let (lower_bound, upper_bound) = match vartype {
            VariableType::Binary => (0_f64, 1_f64),
            VariableType::Integer | VariableType::Real => (lower_bound, upper_bound),
        };
        self.variables.push(Variable { vartype, lower_bound, upper_bound });
        self.variables.len() - 1
    }

    /// Add a binary variable and get its index.
    pub fn add_binary(&mut self) -> usize {
        self.add_variable(VariableType::Binary, 0_f64, 1_f64)
    }

    /// Add an integer variable and get its index.
    pub fn add_integer(&mut self, lower_bound: f64, upper_bound: f64) -> usize {
        self.add_variable(VariableType::Integer, lower_bound, upper_bound)
    }

    /// Add a real variable and get its index.
    pub fn add_real(&mut self, lower_bound: f64, upper_bound: f64) -> usize {
        self.add_variable(VariableType::Real, lower_bound, upper_bound)
    }

    /// Replace the objective.
    pub fn set_objective(&mut self, objective: Expression) {
        self.objective = objective;
    }

    /// Add a constraint and get its index.
    pub fn add_constraint(&mut self, expression: Expression, sense: Sense, rhs: f64) -> usize {
        self.constraints.push(Constraint::new(expression, sense, rhs));
        self.constraints.len() - 1
    }

    /// The objective, which is minimized.
    pub fn objective(&self) -> &Expression {
        &self.objective
    }

    /// Mutable access to the objective.
    pub fn objective_mut(&mut self) -> &mut Expression {
        &mut self.objective
    }

    /// All variables, ordered by index.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// All constraints, ordered by index.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[allow(missing_docs)]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    #[allow(missing_docs)]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the model has no variables, constraints or objective terms.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.constraints.is_empty() && self.objective.is_empty()
    }

    /// Objective value of a sample.
    ///
    /// # Panics
    ///
    /// If the sample has fewer values than the model has variables.
    pub fn energy(&self, sample: &[f64]) -> f64 {
        assert_eq!(sample.len(), self.num_variables(), "sample length doesn't match the number of variables");

        self.objective.evaluate(sample)
    }

    /// Whether a sample respects all variable domains and all constraints.
    pub fn is_feasible(&self, sample: &[f64], tolerance: f64) -> bool {
        sample.len() == self.num_variables()
            && self.variables.iter().zip(sample).all(|(variable, &value)| variable.admits(value, tolerance))
            && self.constraints.iter().all(|constraint| constraint.is_satisfied(sample, tolerance))
    }
}

impl fmt::Display for ConstrainedQuadraticModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Minimize {} linear and {} quadratic terms", self.objective.nr_linear(), self.objective.nr_quadratic())?;
        writeln!(f, "Subject to")?;
        for (i, constraint) in self.constraints.iter().enumerate() {
            writeln!(
                f,
                "  c{}: {} terms {} {}",
                i, constraint.expression.nr_linear() + constraint.expression.nr_quadratic(),
                constraint.sense, constraint.rhs,
            )?;
        }
        writeln!(f, "Variables")?;
        for (j, variable) in self.variables.iter().enumerate() {
            writeln!(f, "  x{}: {} [{}, {}]", j, variable.vartype, variable.lower_bound, variable.upper_bound)?;
        }
        Ok(())
    }
}

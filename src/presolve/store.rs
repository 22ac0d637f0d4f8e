//! # Model store
//!
//! The model being presolved. Variables and constraints keep the index they had in the model that
//! was handed to the presolver; removed constraints leave an empty slot behind. Indices are only
//! compacted when the reduced model is detached.
use std::collections::BTreeSet;

use itertools::Itertools;

use crate::data::model::{ConstrainedQuadraticModel, Constraint, Expression, Variable, VariableType};
use crate::presolve::bounds::BoundTracker;
use crate::presolve::error::PresolveError;

/// Working copy of a model during presolve.
#[derive(Clone, Debug)]
pub struct ModelStore {
    /// Variables as they were given, bounds are maintained separately in a `BoundTracker`.
    variables: Vec<Variable>,
    /// Whether a variable is still part of the model.
    variable_alive: Vec<bool>,
    nr_live_variables: usize,

    objective: Expression,
    /// Constraints by original index, `None` if removed.
    constraints: Vec<Option<Constraint>>,
    nr_live_constraints: usize,

    /// For each variable, the live constraints it appears in.
    occurrences: Vec<BTreeSet<usize>>,
}

impl ModelStore {
    /// Validate and normalize a model, and index it.
    ///
    /// Constraint offsets are moved into the right-hand side, squares of binary variables become
    /// linear terms and zero coefficients are removed.
    ///
    /// # Errors
    ///
    /// `PresolveError::InvalidModel` if an expression refers to a variable that doesn't exist, a
    /// coefficient or right-hand side is not finite, or a variable has invalid bounds. Binary
    /// variables should have bounds [0, 1].
    pub fn new(model: ConstrainedQuadraticModel) -> Result<Self, PresolveError> {
        let (variables, mut objective, constraints) = model.into_parts();
        let nr_variables = variables.len();

        for (j, variable) in variables.iter().enumerate() {
            if variable.lower_bound.is_nan() || variable.upper_bound.is_nan() {
                return Err(PresolveError::InvalidModel(format!("variable {j} has a NaN bound")));
            }
            if variable.lower_bound == f64::INFINITY || variable.upper_bound == f64::NEG_INFINITY {
                return Err(PresolveError::InvalidModel(format!(
                    "variable {j} has an empty domain [{}, {}]", variable.lower_bound, variable.upper_bound,
                )));
            }
            if variable.vartype == VariableType::Binary
                && (variable.lower_bound != 0_f64 || variable.upper_bound != 1_f64) {
                return Err(PresolveError::InvalidModel(format!(
                    "binary variable {j} has bounds [{}, {}] instead of [0, 1]",
                    variable.lower_bound, variable.upper_bound,
                )));
            }
            if variable.lower_bound > variable.upper_bound {
                return Err(PresolveError::InvalidModel(format!(
                    "variable {j} has lower bound {} above upper bound {}",
                    variable.lower_bound, variable.upper_bound,
                )));
            }
        }

        let check = |expression: &Expression, name: &str| {
            if let Some(j) = expression.variables().into_iter().find(|&j| j >= nr_variables) {
                return Err(PresolveError::InvalidModel(format!(
                    "{name} refers to variable {j}, but there are only {nr_variables} variables",
                )));
            }
            if !expression.is_finite() {
                return Err(PresolveError::InvalidModel(format!("{name} has a coefficient that is not finite")));
            }
            Ok(())
        };
        let is_binary = |j: usize| variables[j].vartype == VariableType::Binary;

        check(&objective, "objective")?;
        objective.fold_squares(is_binary);
        objective.prune_zeros();

        let constraints = constraints.into_iter()
            .enumerate()
            .map(|(i, mut constraint)| {
                check(&constraint.expression, &format!("constraint {i}"))?;
                if !constraint.rhs.is_finite() {
                    return Err(PresolveError::InvalidModel(format!("constraint {i} has a right-hand side that is not finite")));
                }

                constraint.rhs -= constraint.expression.offset();
                constraint.expression.set_offset(0_f64);
                constraint.expression.fold_squares(is_binary);
                constraint.expression.prune_zeros();

                Ok(Some(constraint))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut occurrences = vec![BTreeSet::new(); nr_variables];
        for (i, constraint) in constraints.iter().enumerate() {
            if let Some(constraint) = constraint {
                for j in constraint.expression.variables() {
                    occurrences[j].insert(i);
                }
            }
        }

        Ok(Self {
            variable_alive: vec![true; nr_variables],
            nr_live_variables: nr_variables,
            variables,

            objective,
            nr_live_constraints: constraints.len(),
            constraints,

            occurrences,
        })
    }

    /// Variables as they were given to the presolver, including removed ones.
    pub fn original_variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Number of variables of the model that was ingested.
    pub fn nr_original_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of variables still in the model.
    pub fn variable_count(&self) -> usize {
        self.nr_live_variables
    }

    /// Number of constraints still in the model.
    pub fn constraint_count(&self) -> usize {
        self.nr_live_constraints
    }

    #[allow(missing_docs)]
    pub fn is_variable_live(&self, variable: usize) -> bool {
        self.variable_alive[variable]
    }

    #[allow(missing_docs)]
    pub fn is_constraint_live(&self, constraint: usize) -> bool {
        self.constraints[constraint].is_some()
    }

    /// Indices of the variables still in the model, ascending.
    pub fn live_variables(&self) -> impl Iterator<Item = usize> + '_ {
        self.variable_alive.iter().positions(|&alive| alive)
    }

    /// Constraints still in the model with their index, ascending.
    pub fn live_constraints(&self) -> impl Iterator<Item = (usize, &Constraint)> + '_ {
        self.constraints.iter()
            .enumerate()
            .filter_map(|(i, constraint)| constraint.as_ref().map(|constraint| (i, constraint)))
    }

    /// A constraint, if it wasn't removed.
    pub fn constraint(&self, constraint: usize) -> Option<&Constraint> {
        self.constraints[constraint].as_ref()
    }

    #[allow(missing_docs)]
    pub fn objective(&self) -> &Expression {
        &self.objective
    }

    /// Mutable access to the objective.
    ///
    /// Should not be used to introduce new variables into the objective.
    pub fn objective_mut(&mut self) -> &mut Expression {
        &mut self.objective
    }

    /// Live constraints in which a variable appears.
    pub fn occurrences(&self, variable: usize) -> &BTreeSet<usize> {
        &self.occurrences[variable]
    }

    /// Replace a constraint by an equivalent one, keeping the index up to date.
    pub fn replace_constraint(&mut self, index: usize, mut constraint: Constraint) {
        debug_assert!(self.is_constraint_live(index));
        debug_assert!(constraint.expression.variables().iter().all(|&j| self.is_variable_live(j)));

        constraint.expression.prune_zeros();
        if let Some(old) = self.constraints[index].take() {
            for j in old.expression.variables() {
                self.occurrences[j].remove(&index);
            }
        }
        for j in constraint.expression.variables() {
            self.occurrences[j].insert(index);
        }
        self.constraints[index] = Some(constraint);
    }

    /// Remove a constraint.
    ///
    /// The slot stays empty, the index of other constraints doesn't change.
    pub fn remove_constraint(&mut self, index: usize) -> Option<Constraint> {
        let removed = self.constraints[index].take();
        if let Some(constraint) = &removed {
            for j in constraint.expression.variables() {
                self.occurrences[j].remove(&index);
            }
            self.nr_live_constraints -= 1;
        }

        removed
    }

    /// Remove a variable that no longer appears anywhere.
    pub fn remove_variable(&mut self, variable: usize) {
        debug_assert!(self.is_variable_live(variable));
        debug_assert!(self.occurrences[variable].is_empty());
        debug_assert!(!self.objective.contains(variable));
        debug_assert!(self.live_constraints().all(|(_, c)| !c.expression.contains(variable)));

        self.variable_alive[variable] = false;
        self.nr_live_variables -= 1;
    }

    /// Replace a variable by an affine function of other variables everywhere and remove it.
    ///
    /// # Arguments
    ///
    /// * `variable`: Variable to eliminate.
    /// * `constant`: Constant part of the function.
    /// * `terms`: Linear part of the function, in live variables other than `variable`.
    pub fn substitute_variable(&mut self, variable: usize, constant: f64, terms: &[(usize, f64)]) {
        debug_assert!(terms.iter().all(|&(j, _)| j != variable && self.is_variable_live(j)));

        self.objective.substitute(variable, constant, terms);
        self.objective.prune_zeros();

        let affected = self.occurrences[variable].iter().copied().collect::<Vec<_>>();
        for i in affected {
            let Some(mut constraint) = self.constraints[i].take() else { continue };
            for j in constraint.expression.variables() {
                self.occurrences[j].remove(&i);
            }

            constraint.expression.substitute(variable, constant, terms);
            constraint.rhs -= constraint.expression.offset();
            constraint.expression.set_offset(0_f64);
            constraint.expression.prune_zeros();

            for j in constraint.expression.variables() {
                self.occurrences[j].insert(i);
            }
            self.constraints[i] = Some(constraint);
        }

        self.remove_variable(variable);
    }

    /// Build the reduced model.
    ///
    /// Live variables keep their relative order, as do live constraints. Binary variables whose
    /// bounds were tightened away from `[0, 1]` become integer variables with those bounds.
    pub fn detach(self, bounds: &BoundTracker) -> ConstrainedQuadraticModel {
        let mut new_index = vec![None; self.nr_original_variables()];
        let mut variables = Vec::with_capacity(self.nr_live_variables);
        for j in self.live_variables() {
            new_index[j] = Some(variables.len());

            let mut variable = bounds.variable(j);
            if variable.vartype == VariableType::Binary
                && (variable.lower_bound != 0_f64 || variable.upper_bound != 1_f64)
            {
                variable.vartype = VariableType::Integer;
            }
            variables.push(variable);
        }

        let objective = self.objective.relabeled(&new_index);
        let constraints = self.constraints.into_iter()
            .flatten()
            .map(|constraint| Constraint::new(
                constraint.expression.relabeled(&new_index),
                constraint.sense,
                constraint.rhs,
            ))
            .collect();

        ConstrainedQuadraticModel::from_parts(variables, objective, constraints)
    }
}

#[cfg(test)]
mod test {
    use crate::data::model::{ConstrainedQuadraticModel, Expression, Sense, Variable, VariableType};
    use crate::presolve::bounds::BoundTracker;
    use crate::presolve::error::PresolveError;
    use crate::presolve::store::ModelStore;

    fn model() -> ConstrainedQuadraticModel {
        let mut model = ConstrainedQuadraticModel::new();
        let x = model.add_binary();
        let y = model.add_real(0.0, 10.0);
        let z = model.add_integer(-3.0, 3.0);
        model.set_objective(Expression::from_linear([(x, 1.0), (y, 2.0)]).with_quadratic(x, x, 4.0));
        model.add_constraint(Expression::from_linear([(x, 1.0), (y, 1.0)]).with_offset(2.0), Sense::Le, 5.0);
        model.add_constraint(Expression::from_linear([(y, 1.0), (z, 0.0)]).with_quadratic(y, z, 1.0), Sense::Ge, 1.0);
        model.add_constraint(Expression::from_linear([(z, 3.0)]), Sense::Eq, 3.0);
        model
    }

    #[test]
    fn ingest_normalizes() {
        let store = ModelStore::new(model()).unwrap();

        assert_eq!(store.variable_count(), 3);
        assert_eq!(store.constraint_count(), 3);
        assert_eq!(store.objective().linear(0), 5.0);
        assert!(store.objective().is_linear());
        let first = store.constraint(0).unwrap();
        assert_eq!(first.rhs, 3.0);
        assert_eq!(first.expression.offset(), 0.0);
        assert_eq!(store.constraint(1).unwrap().expression.nr_linear(), 1);
        assert_eq!(store.occurrences(1).iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(store.occurrences(2).iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn ingest_rejects() {
        let mut model = model();
        model.add_constraint(Expression::from_linear([(7, 1.0)]), Sense::Le, 1.0);
        assert!(matches!(ModelStore::new(model), Err(PresolveError::InvalidModel(_))));

        let mut model = ConstrainedQuadraticModel::new();
        model.add_real(2.0, 1.0);
        assert!(matches!(ModelStore::new(model), Err(PresolveError::InvalidModel(_))));

        let mut model = ConstrainedQuadraticModel::new();
        let x = model.add_real(0.0, 1.0);
        model.add_constraint(Expression::from_linear([(x, 1.0)]), Sense::Le, f64::NAN);
        assert!(matches!(ModelStore::new(model), Err(PresolveError::InvalidModel(_))));

        // Squares of binary variables are folded, which needs values 0 and 1
        let variables = vec![Variable { vartype: VariableType::Binary, lower_bound: -1.0, upper_bound: 1.0 }];
        let model = ConstrainedQuadraticModel::from_parts(variables, Expression::new().with_quadratic(0, 0, 1.0), Vec::new());
        assert!(matches!(ModelStore::new(model), Err(PresolveError::InvalidModel(_))));

        for (lower_bound, upper_bound) in [(f64::INFINITY, f64::INFINITY), (f64::NEG_INFINITY, f64::NEG_INFINITY)] {
            let variables = vec![Variable { vartype: VariableType::Real, lower_bound, upper_bound }];
            let model = ConstrainedQuadraticModel::from_parts(variables, Expression::new(), Vec::new());
            assert!(matches!(ModelStore::new(model), Err(PresolveError::InvalidModel(_))));
        }
    }

    #[test]
    fn remove_and_detach() {
        let mut store = ModelStore::new(model()).unwrap();
        let bounds = BoundTracker::new(store.original_variables(), 1e-6);

        assert!(store.remove_constraint(2).is_some());
        assert!(store.remove_constraint(2).is_none());
        assert_eq!(store.constraint_count(), 2);
        assert!(store.occurrences(2).iter().eq([1].iter()));

        // z = 1
        store.substitute_variable(2, 1.0, &[]);
        assert_eq!(store.variable_count(), 2);
        let second = store.constraint(1).unwrap();
        assert_eq!(second.expression.linear(1), 2.0);
        assert!(second.expression.is_linear());

        let reduced = store.detach(&bounds);
        assert_eq!(reduced.num_variables(), 2);
        assert_eq!(reduced.num_constraints(), 2);
        assert_eq!(reduced.variables()[0].vartype, VariableType::Binary);
        assert_eq!(reduced.constraints()[1].expression.linear(1), 2.0);
        assert_eq!(reduced.constraints()[1].sense, Sense::Ge);
    }

    #[test]
    fn substitute_affine() {
        let mut model = ConstrainedQuadraticModel::new();
        let x = model.add_real(f64::NEG_INFINITY, f64::INFINITY);
        let y = model.add_real(0.0, 1.0);
        let z = model.add_real(0.0, 1.0);
        model.set_objective(Expression::from_linear([(x, 1.0)]).with_quadratic(x, y, 1.0));
        model.add_constraint(Expression::from_linear([(x, 1.0), (z, 1.0)]), Sense::Le, 1.0);
        let mut store = ModelStore::new(model).unwrap();

        // x = 2 - y
        store.substitute_variable(x, 2.0, &[(y, -1.0)]);
        assert_eq!(store.objective().linear(y), -1.0 + 2.0);
        assert_eq!(store.objective().quadratic(y, y), -1.0);
        assert_eq!(store.objective().offset(), 2.0);
        let constraint = store.constraint(0).unwrap();
        assert_eq!(constraint.rhs, -1.0);
        assert_eq!(constraint.expression.linear(y), -1.0);
        assert!(store.occurrences(y).contains(&0));
        assert!(store.occurrences(z).contains(&0));
    }
}

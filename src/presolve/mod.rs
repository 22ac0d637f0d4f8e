//! # Presolving constrained quadratic models
//!
//! A `ConstrainedQuadraticModel` can be presolved by loading it into a `Presolver`, applying the
//! enabled reduction techniques until nothing changes anymore, and detaching the reduced model.
//! Samples of the reduced model can be mapped back to samples of the original model.
//!
//! ```
//! use cqm_presolve::data::model::{ConstrainedQuadraticModel, Expression, Sense};
//! use cqm_presolve::presolve::Presolver;
//!
//! let mut cqm = ConstrainedQuadraticModel::new();
//! let i = cqm.add_integer(-5.0, 5.0);
//! let j = cqm.add_integer(5.0, 10.0);
//! cqm.set_objective(Expression::from_linear([(i, 1.0), (j, 1.0)]));
//! cqm.add_constraint(Expression::from_linear([(j, 1.0)]), Sense::Le, 5.0);
//!
//! let mut presolver = Presolver::new(&mut cqm, false)?;
//! presolver.apply()?;
//! let reduced = presolver.detach_model()?;
//! assert_eq!(reduced.num_variables(), 1);
//! assert_eq!(reduced.num_constraints(), 0);
//! assert_eq!(presolver.restore(&[-2.0])?, vec![-2.0, 5.0]);
//! # Ok::<(), cqm_presolve::presolve::PresolveError>(())
//! ```
use log::{debug, info, trace, warn};

use crate::data::model::ConstrainedQuadraticModel;
use crate::presolve::bounds::BoundTracker;
use crate::presolve::error::Infeasible;
pub use crate::presolve::error::PresolveError;
use crate::presolve::postsolve::Postsolve;
pub use crate::presolve::settings::{Settings, Technique};
use crate::presolve::store::ModelStore;

pub mod bounds;
pub mod error;
pub mod postsolve;
pub mod settings;
pub mod store;
mod activity;
mod rule;

#[cfg(test)]
mod test;

/// Where the presolver is in its lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    /// The techniques have not (yet) been applied with the current configuration.
    Ready,
    /// No enabled technique changes the model anymore, or the round limit was reached.
    Converged,
    /// The model was proven infeasible. This state is final.
    Infeasible,
}

/// Reduces a constrained quadratic model.
///
/// The presolver owns a working copy of the model until it is detached. After that, only the
/// mapping of samples back to the original model remains available.
#[derive(Debug)]
pub struct Presolver {
    /// `None` after the model was detached.
    store: Option<ModelStore>,
    bounds: BoundTracker,
    postsolve: Postsolve,
    settings: Settings,
    status: Status,
}

impl Presolver {
    /// Create a new presolver for a model.
    ///
    /// # Arguments
    ///
    /// * `model`: Model to presolve.
    /// * `move_model`: If `true`, the model is taken and `model` is left empty. Otherwise, the
    /// model is copied and left untouched.
    ///
    /// # Errors
    ///
    /// `PresolveError::InvalidModel` if the model is malformed. When the model was moved, it is
    /// lost in that case.
    pub fn new(model: &mut ConstrainedQuadraticModel, move_model: bool) -> Result<Self, PresolveError> {
        let model = if move_model { std::mem::take(model) } else { model.clone() };

        Self::from_model(model)
    }

    /// Create a new presolver, taking ownership of a model.
    pub fn from_model(model: ConstrainedQuadraticModel) -> Result<Self, PresolveError> {
        let settings = Settings::default();
        let store = ModelStore::new(model)?;
        let bounds = BoundTracker::new(store.original_variables(), settings.feasibility_tolerance);
        let postsolve = Postsolve::new(store.nr_original_variables());

        Ok(Self {
            store: Some(store),
            bounds,
            postsolve,
            settings,
            status: Status::Ready,
        })
    }

    /// Replace the settings.
    ///
    /// Should be called before `apply`, the bounds are compared with the new tolerance only from
    /// then on.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.bounds.set_tolerance(settings.feasibility_tolerance);
        self.settings = settings;
        self
    }

    /// Enable the default techniques.
    pub fn load_default_presolvers(&mut self) {
        self.settings.enable_defaults();
        self.reset_convergence();
    }

    /// Enable exactly these techniques.
    pub fn configure<I: IntoIterator<Item = Technique>>(&mut self, techniques: I) {
        self.settings.enable_only(techniques);
        self.reset_convergence();
    }

    /// Enable exactly the techniques with these names.
    ///
    /// # Errors
    ///
    /// `PresolveError::InvalidConfiguration` if a name is not known. Nothing changes in that case.
    pub fn configure_by_name<'a, I: IntoIterator<Item = &'a str>>(&mut self, names: I) -> Result<(), PresolveError> {
        let techniques = names.into_iter()
            .map(str::parse::<Technique>)
            .collect::<Result<Vec<_>, _>>()?;
        self.configure(techniques);

        Ok(())
    }

    fn reset_convergence(&mut self) {
        if self.status == Status::Converged {
            self.status = Status::Ready;
        }
    }

    #[allow(missing_docs)]
    pub fn status(&self) -> Status {
        self.status
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The model in its current state.
    ///
    /// Variable bounds are not part of the store, see `bounds`.
    pub fn model(&self) -> Result<&ModelStore, PresolveError> {
        self.store.as_ref().ok_or(PresolveError::UseAfterDetach)
    }

    /// Current variable bounds, by original variable index.
    pub fn bounds(&self) -> &BoundTracker {
        &self.bounds
    }

    /// Variables removed so far.
    pub fn postsolve(&self) -> &Postsolve {
        &self.postsolve
    }

    /// Apply the enabled techniques until the model doesn't change anymore.
    ///
    /// Every round applies all enabled techniques once, in the order of `Technique`. Calling this
    /// method again after convergence does nothing.
    ///
    /// # Errors
    ///
    /// `PresolveError::Infeasible` if the model was found to be infeasible (also on every later
    /// call), `PresolveError::UseAfterDetach` if the model was detached.
    pub fn apply(&mut self) -> Result<(), PresolveError> {
        let store = self.store.as_mut().ok_or(PresolveError::UseAfterDetach)?;
        match self.status {
            Status::Infeasible => return Err(PresolveError::Infeasible),
            Status::Converged => return Ok(()),
            Status::Ready => {},
        }

        let nr_variables = store.variable_count();
        let nr_constraints = store.constraint_count();
        let mut reducer = Reducer {
            store,
            bounds: &mut self.bounds,
            postsolve: &mut self.postsolve,
            settings: &self.settings,
        };

        match reducer.run() {
            Ok(rounds) => {
                info!(
                    "presolve converged after {} rounds: variables {} -> {}, constraints {} -> {}",
                    rounds,
                    nr_variables, reducer.store.variable_count(),
                    nr_constraints, reducer.store.constraint_count(),
                );
                self.status = Status::Converged;
                Ok(())
            },
            Err(Infeasible) => {
                info!("presolve proved the model infeasible");
                self.status = Status::Infeasible;
                Err(PresolveError::Infeasible)
            },
        }
    }

    /// Take the (reduced) model out of the presolver.
    ///
    /// Variables and constraints are renumbered, keeping their relative order. This can happen only
    /// once.
    ///
    /// # Errors
    ///
    /// * `PresolveError::Infeasible` if presolve proved the model infeasible. The model stays in
    /// the presolver.
    /// * `PresolveError::UseAfterDetach` if the model was detached already.
    pub fn detach_model(&mut self) -> Result<ConstrainedQuadraticModel, PresolveError> {
        if self.status == Status::Infeasible {
            return Err(PresolveError::Infeasible);
        }
        let store = self.store.take().ok_or(PresolveError::UseAfterDetach)?;
        debug!("detaching model with {} variables and {} constraints", store.variable_count(), store.constraint_count());

        Ok(store.detach(&self.bounds))
    }

    /// Map a sample of the reduced model to a sample of the original model.
    ///
    /// Available both before and after the model is detached.
    pub fn restore(&self, sample: &[f64]) -> Result<Vec<f64>, PresolveError> {
        self.postsolve.restore(sample)
    }
}

/// State shared by all presolve rules.
///
/// Borrows the parts of a `Presolver` that rules read and modify. All variable and constraint
/// indices are those of the model as it was ingested.
pub(crate) struct Reducer<'a> {
    pub store: &'a mut ModelStore,
    pub bounds: &'a mut BoundTracker,
    pub postsolve: &'a mut Postsolve,
    pub settings: &'a Settings,
}

impl<'a> Reducer<'a> {
    /// Apply rounds of techniques until nothing changes or the round limit is hit.
    ///
    /// # Return value
    ///
    /// The number of rounds, or `Infeasible`.
    fn run(&mut self) -> Result<usize, Infeasible> {
        self.bounds.check_domains()?;

        let techniques = self.settings.enabled().collect::<Vec<_>>();
        for round in 1..=self.settings.max_rounds {
            let mut changed = false;
            for &technique in &techniques {
                if self.apply(technique)? {
                    debug!(
                        "round {}: {} left {} variables and {} constraints",
                        round, technique, self.store.variable_count(), self.store.constraint_count(),
                    );
                    changed = true;
                }
            }

            if !changed {
                return Ok(round);
            }
        }

        warn!("presolve stopped after reaching the limit of {} rounds", self.settings.max_rounds);
        Ok(self.settings.max_rounds)
    }

    /// Apply a single technique to the whole model.
    ///
    /// # Return value
    ///
    /// Whether anything changed, or `Infeasible` if the model was shown to be infeasible.
    pub(crate) fn apply(&mut self, technique: Technique) -> Result<bool, Infeasible> {
        match technique {
            Technique::DomainPropagation => self.presolve_domain_propagation(),
            Technique::FixedVariables => self.presolve_fixed_variables(),
            Technique::TrivialConstraints => self.presolve_trivial_constraints(),
            Technique::SingletonSubstitution => self.presolve_singleton_substitution(),
            Technique::DuplicateConstraints => self.presolve_duplicate_constraints(),
            Technique::RemoveSmallBiases => self.presolve_small_biases(),
        }
    }

    /// Remove a variable with a known value from the model.
    fn fix_variable(&mut self, variable: usize, value: f64) {
        trace!("fixing variable {} to {}", variable, value);

        self.store.substitute_variable(variable, value, &[]);
        self.postsolve.record_fixed(variable, value);
    }

    fn tolerance(&self) -> f64 {
        self.settings.feasibility_tolerance
    }
}

use crate::data::model::ConstrainedQuadraticModel;
use crate::presolve::Reducer;
use crate::presolve::bounds::BoundTracker;
use crate::presolve::postsolve::Postsolve;
use crate::presolve::settings::Settings;
use crate::presolve::store::ModelStore;


/// Owns everything a `Reducer` borrows, so that single rules can be applied in tests.
struct Harness {
    store: ModelStore,
    bounds: BoundTracker,
    postsolve: Postsolve,
    settings: Settings,
}

impl Harness {
    fn new(model: ConstrainedQuadraticModel) -> Self {
        let settings = Settings::default();
        let store = ModelStore::new(model).unwrap();
        let mut bounds = BoundTracker::new(store.original_variables(), settings.feasibility_tolerance);
        bounds.check_domains().unwrap();
        let postsolve = Postsolve::new(store.nr_original_variables());

        Self { store, bounds, postsolve, settings }
    }

    fn reducer(&mut self) -> Reducer<'_> {
        Reducer {
            store: &mut self.store,
            bounds: &mut self.bounds,
            postsolve: &mut self.postsolve,
            settings: &self.settings,
        }
    }
}

/// All samples with integral values within the bounds of the variables.
///
/// The model should have finite bounds only.
fn enumerate(model: &ConstrainedQuadraticModel) -> Vec<Vec<f64>> {
    let mut samples = vec![Vec::new()];
    for variable in model.variables() {
        assert!(variable.lower_bound.is_finite() && variable.upper_bound.is_finite());
        let values = (variable.lower_bound.ceil() as i64)..=(variable.upper_bound.floor() as i64);

        samples = samples.into_iter()
            .flat_map(|sample| values.clone().map(move |value| {
                let mut extended = sample.clone();
                extended.push(value as f64);
                extended
            }))
            .collect();
    }

    samples
}

use cqm_presolve::data::model::{ConstrainedQuadraticModel, Expression, Sense, VariableType};
use cqm_presolve::presolve::{PresolveError, Presolver, Settings};

use crate::{assert_restores, init_logging};

/// Two ingredients `p` and `q`, and their weighted sum `s` which is penalized quadratically.
fn model() -> ConstrainedQuadraticModel {
    let mut model = ConstrainedQuadraticModel::new();
    let p = model.add_real(0.0, 100.0);
    let q = model.add_real(0.0, 100.0);
    let s = model.add_real(f64::NEG_INFINITY, f64::INFINITY);
    model.set_objective(
        Expression::from_linear([(p, 1.0), (q, -1.0)]).with_quadratic(s, s, 1.0),
    );
    model.add_constraint(Expression::from_linear([(s, 1.0), (p, -1.0), (q, -2.0)]), Sense::Eq, 0.0);
    model.add_constraint(Expression::from_linear([(p, 1.0), (q, 1.0)]), Sense::Le, 50.0);
    model.add_constraint(Expression::from_linear([(p, 2.0), (q, 2.0)]), Sense::Le, 120.0);
    model.add_constraint(Expression::from_linear([(p, 1.0)]), Sense::Ge, 5.0);
    model
}

#[test]
fn substitutes_definition() {
    init_logging();

    let original = model();
    let settings = Settings::default().with_feasibility_tolerance(1e-9);
    let mut presolver = Presolver::from_model(original.clone()).unwrap().with_settings(settings);
    presolver.apply().unwrap();
    let reduced = presolver.detach_model().unwrap();

    assert_eq!(reduced.num_variables(), 2);
    assert_eq!(reduced.num_constraints(), 1);
    assert!(reduced.variables().iter().all(|variable| variable.vartype == VariableType::Real));
    assert_eq!(reduced.variables()[0].lower_bound, 5.0);
    assert_eq!(reduced.variables()[0].upper_bound, 50.0);
    assert_eq!(reduced.constraints()[0].sense, Sense::Le);
    assert_eq!(reduced.constraints()[0].rhs, 50.0);

    for sample in [[5.0, 0.0], [10.0, 20.0], [25.0, 25.0], [50.0, 0.0]] {
        let restored = presolver.restore(&sample).unwrap();
        assert_restores(&original, &reduced, &sample, &restored);
        approx::assert_relative_eq!(restored[2], sample[0] + 2.0 * sample[1]);
    }
    assert_eq!(
        presolver.restore(&[1.0, 2.0, 3.0]),
        Err(PresolveError::SampleLength { expected: 2, found: 3 }),
    );
}

#[test]
fn invalid_model() {
    let mut model = model();
    model.add_constraint(Expression::from_linear([(3, 1.0)]), Sense::Ge, 0.0);

    assert!(matches!(Presolver::from_model(model), Err(PresolveError::InvalidModel(_))));
}

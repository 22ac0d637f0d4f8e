use cqm_presolve::data::model::{ConstrainedQuadraticModel, Expression, Sense};
use cqm_presolve::presolve::{PresolveError, Presolver, Status};

use crate::{assert_restores, init_logging};

/// Two workers, two tasks, worker 0 can't do task 1.
///
/// Variable `x_wt` is 1 when worker `w` does task `t`, in the order x00, x01, x10, x11.
fn model() -> ConstrainedQuadraticModel {
    let mut model = ConstrainedQuadraticModel::new();
    let x = (0..4).map(|_| model.add_binary()).collect::<Vec<_>>();
    model.set_objective(
        Expression::from_linear([(x[0], 3.0), (x[1], 1.0), (x[2], 2.0), (x[3], 4.0)])
            .with_quadratic(x[0], x[3], 1.0),
    );
    // Every task is done by exactly one worker
    model.add_constraint(Expression::from_linear([(x[0], 1.0), (x[2], 1.0)]), Sense::Eq, 1.0);
    model.add_constraint(Expression::from_linear([(x[1], 1.0), (x[3], 1.0)]), Sense::Eq, 1.0);
    // Every worker does at most one task
    model.add_constraint(Expression::from_linear([(x[0], 1.0), (x[1], 1.0)]), Sense::Le, 1.0);
    model.add_constraint(Expression::from_linear([(x[2], 1.0), (x[3], 1.0)]), Sense::Le, 1.0);
    model.add_constraint(Expression::from_linear([(x[1], 1.0)]), Sense::Le, 0.0);
    model
}

#[test]
fn solved_by_presolve() {
    init_logging();

    let original = model();
    let mut presolver = Presolver::new(&mut model(), true).unwrap();
    presolver.apply().unwrap();
    assert_eq!(presolver.status(), Status::Converged);
    let reduced = presolver.detach_model().unwrap();

    assert!(reduced.is_empty());
    assert_eq!(reduced.objective().offset(), 8.0);
    let restored = presolver.restore(&[]).unwrap();
    assert_eq!(restored, vec![1.0, 0.0, 0.0, 1.0]);
    assert_restores(&original, &reduced, &[], &restored);
}

#[test]
fn over_constrained() {
    init_logging();

    let mut model = model();
    // Worker 1 can't do task 1 either
    model.add_constraint(Expression::from_linear([(3, 1.0)]), Sense::Le, 0.0);
    let mut presolver = Presolver::new(&mut model, false).unwrap();

    let error = presolver.apply().unwrap_err();
    assert_eq!(error, PresolveError::Infeasible);
    assert_eq!(error.to_string(), "given model is infeasible");
    assert_eq!(presolver.status(), Status::Infeasible);
}

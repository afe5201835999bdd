mod common;

use std::sync::Arc;

use common::{ProblemBuilder, cid};
use irarc_rust_reconfiguration::domain::config::ReconfigurationConfig;
use irarc_rust_reconfiguration::domain::decoder::plan::ReconfigurationStatus;
use irarc_rust_reconfiguration::domain::model::config::ModelConfig;
use irarc_rust_reconfiguration::domain::network::topology::NetworkTopology;
use irarc_rust_reconfiguration::domain::reconfigurator::Reconfigurator;
use irarc_rust_reconfiguration::domain::solver::solver_mock::ScriptedSolver;
use irarc_rust_reconfiguration::domain::solver::solver_trait::{PrimalValues, SolveOutcome};
use irarc_rust_reconfiguration::error::{DecodingError, Error, ModelConstructionError, SolverError};

fn topology() -> NetworkTopology {
    ProblemBuilder::new().link("l1", 10).existing("a", 4, &[("l1", 0, 3)]).candidate("b", 4, &["l1"]).build()
}

fn reconfigurator(config: ReconfigurationConfig, solver: &Arc<ScriptedSolver>) -> Reconfigurator {
    Reconfigurator::new(config, solver.clone())
}

#[test]
fn test_small_big_m_is_rejected_before_solving() {
    let solver = Arc::new(ScriptedSolver::new());
    let config = ReconfigurationConfig { model: ModelConfig { big_m: 8.0, ..ModelConfig::default() }, ..ReconfigurationConfig::default() };

    let result = reconfigurator(config, &solver).run(&topology());

    assert!(matches!(result, Err(Error::ModelConstruction(ModelConstructionError::FlowBigMTooSmall { capacity: 10, .. }))));
    assert_eq!(solver.calls(), 0);
}

#[test]
fn test_solver_verdicts_become_statuses() {
    let cases = [
        (SolveOutcome::Infeasible, ReconfigurationStatus::Infeasible),
        (SolveOutcome::Unbounded, ReconfigurationStatus::Unbounded),
        (SolveOutcome::TimedOut, ReconfigurationStatus::TimedOut),
    ];

    for (outcome, status) in cases {
        let solver = Arc::new(ScriptedSolver::returning(outcome));
        let result = reconfigurator(ReconfigurationConfig::default(), &solver).run(&topology()).unwrap();

        assert_eq!(result.status, status);
        assert_eq!(result.objective_value, None);
        assert!(result.move_order.is_empty());
        assert_eq!(solver.calls(), 1);
    }
}

#[test]
fn test_backend_failure_is_an_error() {
    let solver = Arc::new(ScriptedSolver::failing(SolverError::Backend { solver: "scripted".to_string(), message: "license expired".to_string() }));

    let result = reconfigurator(ReconfigurationConfig::default(), &solver).run(&topology());

    assert!(matches!(result, Err(Error::Solver(SolverError::Backend { .. }))));
}

#[test]
fn test_incomplete_solution_is_a_decoding_error() {
    let solver = Arc::new(ScriptedSolver::returning(SolveOutcome::Solved(PrimalValues::new())));

    let result = reconfigurator(ReconfigurationConfig::default(), &solver).run(&topology());

    assert!(matches!(result, Err(Error::Decoding(DecodingError::MissingVariable { name })) if name == "disc[a]"));
}

#[test]
fn test_scripted_solution_is_decoded() {
    let topology = topology();
    let mut values = PrimalValues::new();
    // a keeps [0,3], b takes [4,7] from the free pool; everything else stays zero.
    for slot in 0..10 {
        values.insert(format!("x[a,l1,{}]", slot), if slot <= 3 { 1.0 } else { 0.0 });
        values.insert(format!("x[b,l1,{}]", slot), if (4..=7).contains(&slot) { 1.0 } else { 0.0 });
        values.insert(format!("start[a,l1,{}]", slot), if slot == 0 { 1.0 } else { 0.0 });
        values.insert(format!("start[b,l1,{}]", slot), if slot == 4 { 1.0 } else { 0.0 });
    }
    for (name, value) in [
        ("disc[a]", 0.0),
        ("e[a,b]", 0.0),
        ("rs[a,a,l1]", 4.0),
        ("rs[a,b,l1]", 0.0),
        ("ns[a,l1]", 0.0),
        ("ns[b,l1]", 4.0),
        ("order[a]", 0.0),
        ("order[b]", 0.0),
    ] {
        values.insert(name, value);
    }
    let solver = Arc::new(ScriptedSolver::returning(SolveOutcome::Solved(values)));

    let result = reconfigurator(ReconfigurationConfig::default(), &solver).run(&topology).unwrap();

    assert_eq!(result.status, ReconfigurationStatus::Optimal);
    assert_eq!(result.objective_value, Some(0.0));
    assert_eq!(result.move_order, vec![cid("b")]);
    assert_eq!(result.assignments.len(), 2);
}

#[test]
fn test_result_serializes_to_camel_case_json() {
    let solver = Arc::new(ScriptedSolver::returning(SolveOutcome::TimedOut));
    let result = reconfigurator(ReconfigurationConfig::default(), &solver).run(&topology()).unwrap();

    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["status"], "TimedOut");
    assert!(json["objectiveValue"].is_null());
    assert!(json["moveOrder"].as_array().unwrap().is_empty());
}

use good_lp::{Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint, variable};
use std::sync::mpsc;
use std::thread;

use crate::domain::model::program::{Program, Relation, Sense, VarId, VariableKind};
use crate::domain::solver::solver_trait::{MilpSolver, PrimalValues, SolveOutcome, Tolerances};
use crate::error::SolverError;

const SOLVER_NAME: &str = "microlp";

/// Bundled pure-Rust branch-and-bound backend, driven through `good_lp`.
///
/// microlp proves optimality exactly, so `optimality_gap` and `feasibility_tol` are accepted but
/// have no effect. It has no interrupt either: with a time limit the solve runs on a worker
/// thread and is abandoned when the limit expires.
///
/// An abandoned worker is detached, not stopped. It keeps a core busy until microlp returns, so
/// repeated `TimedOut` solves in one process accumulate running threads.
#[derive(Debug, Clone, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        MicroLpSolver
    }
}

impl MilpSolver for MicroLpSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    fn solve(&self, program: &Program, tolerances: &Tolerances) -> Result<SolveOutcome, SolverError> {
        log::debug!(
            "Handing {} variables and {} constraints to {} (gap: {}, feasibility: {}, time limit: {:?}).",
            program.variable_count(),
            program.constraint_count(),
            SOLVER_NAME,
            tolerances.optimality_gap,
            tolerances.feasibility_tol,
            tolerances.time_limit
        );

        let Some(time_limit) = tolerances.time_limit else {
            return solve_blocking(program);
        };

        let (sender, receiver) = mpsc::channel();
        let owned = program.clone();
        thread::spawn(move || {
            // The receiver is gone once the caller timed out.
            let _ = sender.send(solve_blocking(&owned));
        });

        match receiver.recv_timeout(time_limit) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::warn!("{} did not finish within {:?}; abandoning the solve.", SOLVER_NAME, time_limit);
                Ok(SolveOutcome::TimedOut)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SolverError::WorkerDisconnected { solver: SOLVER_NAME.to_string() }),
        }
    }
}

fn solve_blocking(program: &Program) -> Result<SolveOutcome, SolverError> {
    // 1. Declare variables in program order so positions line up with VarId.
    let mut problem_variables = ProblemVariables::new();
    let variables: Vec<Variable> = program
        .variables()
        .iter()
        .map(|def| {
            let definition = match def.kind {
                VariableKind::Binary => variable().binary(),
                VariableKind::Integer => variable().integer().min(def.lower).max(def.upper),
            };
            problem_variables.add(definition)
        })
        .collect();

    let linear = |terms: &[(VarId, f64)]| {
        let mut expression = Expression::from(0.0);
        for (var, coefficient) in terms {
            expression += *coefficient * variables[var.index()];
        }
        expression
    };

    // 2. Objective.
    let objective = linear(program.objective());
    let mut model = match program.sense() {
        Sense::Minimize => problem_variables.minimise(objective).using(good_lp::microlp),
    };

    // 3. Constraints.
    for linear_constraint in program.constraints() {
        let lhs = linear(&linear_constraint.terms);
        let rhs = Expression::from(linear_constraint.rhs);
        let backend_constraint = match linear_constraint.relation {
            Relation::LessEqual => constraint::leq(lhs, rhs),
            Relation::Equal => constraint::eq(lhs, rhs),
            Relation::GreaterEqual => constraint::geq(lhs, rhs),
        };
        model = model.with(backend_constraint);
    }

    // 4. Solve and map the verdict back onto variable names.
    match model.solve() {
        Ok(solution) => {
            let values: PrimalValues =
                program.variables().iter().zip(variables.iter()).map(|(def, var)| (def.name.clone(), solution.value(*var))).collect();
            Ok(SolveOutcome::Solved(values))
        }
        Err(ResolutionError::Infeasible) => Ok(SolveOutcome::Infeasible),
        Err(ResolutionError::Unbounded) => Ok(SolveOutcome::Unbounded),
        Err(error) => Err(SolverError::Backend { solver: SOLVER_NAME.to_string(), message: error.to_string() }),
    }
}

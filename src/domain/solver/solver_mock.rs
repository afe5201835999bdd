use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::model::program::Program;
use crate::domain::solver::solver_trait::{MilpSolver, SolveOutcome, Tolerances};
use crate::error::SolverError;

/// Solver stand-in that replays queued outcomes and counts how often it was invoked.
///
/// Once the queue is drained every further call reports `Infeasible`.
#[derive(Debug, Default)]
pub struct ScriptedSolver {
    outcomes: Mutex<VecDeque<Result<SolveOutcome, SolverError>>>,
    calls: AtomicUsize,
}

impl ScriptedSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(outcome: SolveOutcome) -> Self {
        let solver = Self::new();
        solver.push(Ok(outcome));
        solver
    }

    pub fn failing(error: SolverError) -> Self {
        let solver = Self::new();
        solver.push(Err(error));
        solver
    }

    pub fn push(&self, outcome: Result<SolveOutcome, SolverError>) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MilpSolver for ScriptedSolver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(&self, program: &Program, _tolerances: &Tolerances) -> Result<SolveOutcome, SolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        log::debug!("Scripted solver called with {} variables.", program.variable_count());

        let next = self.outcomes.lock().ok().and_then(|mut outcomes| outcomes.pop_front());
        next.unwrap_or(Ok(SolveOutcome::Infeasible))
    }
}

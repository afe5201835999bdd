use std::collections::HashMap;
use std::time::Duration;

use crate::domain::model::program::Program;
use crate::error::SolverError;

/// Relative optimality gap accepted by the solver.
pub const DEFAULT_OPTIMALITY_GAP: f64 = 2e-4;

/// Primal feasibility tolerance passed to the solver.
pub const DEFAULT_FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// Maximum distance to the nearest integer the decoder accepts for integer variables.
pub const DEFAULT_INTEGRALITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Tolerances {
    pub optimality_gap: f64,
    pub feasibility_tol: f64,
    pub integrality_tol: f64,

    /// Wall-clock budget of a single solve. `None` waits for the solver indefinitely.
    pub time_limit: Option<Duration>,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            optimality_gap: DEFAULT_OPTIMALITY_GAP,
            feasibility_tol: DEFAULT_FEASIBILITY_TOLERANCE,
            integrality_tol: DEFAULT_INTEGRALITY_TOLERANCE,
            time_limit: None,
        }
    }
}

/// Flat variable name -> value table, keyed by the names the model builder generated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimalValues {
    values: HashMap<String, f64>,
}

impl PrimalValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl FromIterator<(String, f64)> for PrimalValues {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        PrimalValues { values: iter.into_iter().collect() }
    }
}

/// Verdict of a solver run. Everything except `Solved` is an expected business outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Optimal within the configured gap.
    Solved(PrimalValues),
    Infeasible,
    Unbounded,
    /// The wall-clock limit expired before the solver reported a verdict.
    TimedOut,
}

impl std::fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveOutcome::Solved(values) => write!(f, "Solved({} values)", values.len()),
            SolveOutcome::Infeasible => write!(f, "Infeasible"),
            SolveOutcome::Unbounded => write!(f, "Unbounded"),
            SolveOutcome::TimedOut => write!(f, "TimedOut"),
        }
    }
}

/// Contract to an external MILP solver.
///
/// Implementations only translate the canonical `Program` into their backend and map the result
/// back; they never interpret what a variable means.
pub trait MilpSolver: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, program: &Program, tolerances: &Tolerances) -> Result<SolveOutcome, SolverError>;
}

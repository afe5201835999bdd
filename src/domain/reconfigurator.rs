use std::sync::Arc;

use crate::domain::config::ReconfigurationConfig;
use crate::domain::decoder::decoder::SolutionDecoder;
use crate::domain::decoder::plan::{ReconfigurationResult, ReconfigurationStatus};
use crate::domain::model::builder::ModelBuilder;
use crate::domain::network::topology::NetworkTopology;
use crate::domain::solver::microlp_solver::MicroLpSolver;
use crate::domain::solver::solver_trait::{MilpSolver, SolveOutcome, Tolerances};
use crate::error::Result;

/// Runs the whole pipeline for one instance: build the model, solve it, decode the answer.
///
/// Holds no state between runs; the same `Reconfigurator` can be reused for any number of
/// topologies.
pub struct Reconfigurator {
    builder: ModelBuilder,
    tolerances: Tolerances,
    solver: Arc<dyn MilpSolver>,
}

impl Reconfigurator {
    pub fn new(config: ReconfigurationConfig, solver: Arc<dyn MilpSolver>) -> Self {
        Reconfigurator { builder: ModelBuilder::new(config.model), tolerances: config.tolerances, solver }
    }

    /// Uses the bundled microlp backend.
    pub fn with_default_solver(config: ReconfigurationConfig) -> Self {
        Self::new(config, Arc::new(MicroLpSolver::new()))
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    pub fn run(&self, topology: &NetworkTopology) -> Result<ReconfigurationResult> {
        log::info!(
            "Starting reconfiguration: {} links, {} existing and {} candidate connections.",
            topology.links().count(),
            topology.existing_connections().count(),
            topology.candidate_connections().count()
        );

        // 1. Model
        let model = self.builder.build(topology)?;

        // 2. Solve
        log::info!("Solving with '{}'.", self.solver.name());
        let outcome = self.solver.solve(&model.program, &self.tolerances)?;

        // 3. Decode
        let values = match outcome {
            SolveOutcome::Solved(values) => values,
            SolveOutcome::Infeasible => {
                log::warn!("No reconfiguration satisfies the constraints.");
                return Ok(ReconfigurationResult::without_plan(ReconfigurationStatus::Infeasible));
            }
            SolveOutcome::Unbounded => {
                log::warn!("Solver reported the reconfiguration model as unbounded.");
                return Ok(ReconfigurationResult::without_plan(ReconfigurationStatus::Unbounded));
            }
            SolveOutcome::TimedOut => {
                log::warn!("Solver hit the time limit of {:?} before proving optimality.", self.tolerances.time_limit);
                return Ok(ReconfigurationResult::without_plan(ReconfigurationStatus::TimedOut));
            }
        };

        let plan = SolutionDecoder::new(topology, &model, &self.tolerances).decode(&values).inspect_err(|e| {
            log::error!("Rejecting solver output from '{}': {}", self.solver.name(), e);
        })?;

        log::info!(
            "Reconfiguration found: {} disruptions, {} moves, objective {:.6}.",
            plan.disruptions.len(),
            plan.move_order.len(),
            plan.objective_value
        );

        Ok(ReconfigurationResult::optimal(plan))
    }
}

use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::network::slot_range::SlotRange;
use crate::domain::utils::id::{ConnectionId, LinkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconfigurationStatus {
    Optimal,
    Infeasible,
    Unbounded,
    TimedOut,
}

impl std::fmt::Display for ReconfigurationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReconfigurationStatus::Optimal => "Optimal",
            ReconfigurationStatus::Infeasible => "Infeasible",
            ReconfigurationStatus::Unbounded => "Unbounded",
            ReconfigurationStatus::TimedOut => "TimedOut",
        };
        write!(f, "{}", label)
    }
}

/// Slots a served connection holds on one link after the reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAssignment {
    pub connection: ConnectionId,
    pub link: LinkId,
    pub slots: SlotRange,

    /// Slots inherited from ranges existing connections held before (`Σ rs`).
    pub carried_over: u32,

    /// Slots taken from the pre-reconfiguration free pool (`ns`).
    pub fresh: u32,
}

/// `source` must release slots before `target` can take them over.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DependencyEdge {
    pub source: ConnectionId,
    pub target: ConnectionId,
}

/// Decoded solution of one reconfiguration run.
///
/// Executing it means tearing down every disrupted connection, then establishing or moving the
/// connections of `move_order` one after the other.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconfigurationPlan {
    pub objective_value: f64,
    pub disruptions: BTreeSet<ConnectionId>,

    /// Sorted by connection, then link.
    pub assignments: Vec<SlotAssignment>,
    pub dependencies: Vec<DependencyEdge>,

    /// Candidates and relocated existing connections, dependencies first.
    pub move_order: Vec<ConnectionId>,
}

/// Outcome handed back to callers. Only `Optimal` carries a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconfigurationResult {
    pub status: ReconfigurationStatus,
    pub objective_value: Option<f64>,
    pub disruptions: BTreeSet<ConnectionId>,
    pub assignments: Vec<SlotAssignment>,
    pub dependencies: Vec<DependencyEdge>,
    pub move_order: Vec<ConnectionId>,
}

impl ReconfigurationResult {
    pub fn optimal(plan: ReconfigurationPlan) -> Self {
        ReconfigurationResult {
            status: ReconfigurationStatus::Optimal,
            objective_value: Some(plan.objective_value),
            disruptions: plan.disruptions,
            assignments: plan.assignments,
            dependencies: plan.dependencies,
            move_order: plan.move_order,
        }
    }

    pub fn without_plan(status: ReconfigurationStatus) -> Self {
        ReconfigurationResult {
            status,
            objective_value: None,
            disruptions: BTreeSet::new(),
            assignments: Vec::new(),
            dependencies: Vec::new(),
            move_order: Vec::new(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == ReconfigurationStatus::Optimal
    }

    pub fn assignment(&self, connection: &ConnectionId, link: &LinkId) -> Option<&SlotAssignment> {
        self.assignments.iter().find(|assignment| &assignment.connection == connection && &assignment.link == link)
    }

    pub fn is_disrupted(&self, connection: &ConnectionId) -> bool {
        self.disruptions.contains(connection)
    }

    pub fn disruption_count(&self) -> usize {
        self.disruptions.len()
    }

    pub fn move_position(&self, connection: &ConnectionId) -> Option<usize> {
        self.move_order.iter().position(|id| id == connection)
    }
}

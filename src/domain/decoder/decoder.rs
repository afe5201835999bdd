use std::collections::{BTreeMap, BTreeSet};

use crate::domain::decoder::dependency_graph::DependencyGraph;
use crate::domain::decoder::plan::{DependencyEdge, ReconfigurationPlan, SlotAssignment};
use crate::domain::model::builder::ReconfigurationModel;
use crate::domain::model::program::VarId;
use crate::domain::model::variable_index::edge_name;
use crate::domain::network::connection::Connection;
use crate::domain::network::slot_range::SlotRange;
use crate::domain::network::topology::NetworkTopology;
use crate::domain::solver::solver_trait::{PrimalValues, Tolerances};
use crate::domain::utils::id::{ConnectionId, LinkId};
use crate::error::DecodingError;

/// Maps raw solver values back onto the network and checks them against the invariants the model
/// was built to enforce.
///
/// A violation is never repaired: it means the solver or the model is wrong, and the first one
/// found is returned as a `DecodingError`.
pub struct SolutionDecoder<'a> {
    topology: &'a NetworkTopology,
    model: &'a ReconfigurationModel,
    tolerances: &'a Tolerances,
}

impl<'a> SolutionDecoder<'a> {
    pub fn new(topology: &'a NetworkTopology, model: &'a ReconfigurationModel, tolerances: &'a Tolerances) -> Self {
        Self { topology, model, tolerances }
    }

    pub fn decode(&self, values: &PrimalValues) -> Result<ReconfigurationPlan, DecodingError> {
        // 1. Integral values in program order
        let rounded = self.round_values(values)?;

        // 2. Disruptions
        let disruptions: BTreeSet<ConnectionId> = self
            .model
            .index
            .disruptions()
            .filter(|(_, var)| rounded[var.index()] > 0.5)
            .map(|(connection, _)| connection.clone())
            .collect();

        // 3. Slot positions per connection and link
        let positions = self.decode_positions(&rounded, &disruptions)?;
        self.check_exclusivity(&positions)?;

        // 4. Aggregate counts must agree with the positions
        let mut assignments = Vec::new();
        for connection in self.topology.connections() {
            for link in &connection.path {
                let range = positions.get(&(connection.id.clone(), link.clone())).copied().flatten();
                let (carried_over, fresh) = self.reconcile(&rounded, connection, link, range)?;

                if let Some(slots) = range {
                    assignments.push(SlotAssignment { connection: connection.id.clone(), link: link.clone(), slots, carried_over, fresh });
                }
            }
        }
        assignments.sort_by(|a, b| (&a.connection, &a.link).cmp(&(&b.connection, &b.link)));

        // 5. Every transfer is backed by a dependency edge
        self.check_transfers_linked(&rounded)?;

        // 6. Dependency graph among connections that stay in service
        let mut graph = DependencyGraph::new();
        for connection in self.topology.connections().filter(|c| !disruptions.contains(&c.id)) {
            graph.add_node(connection.id.clone());
        }

        let mut dependencies = Vec::new();
        for (source, target, edge) in self.model.index.edges() {
            if rounded[edge.index()] < 0.5 || disruptions.contains(source) || disruptions.contains(target) {
                continue;
            }
            graph.add_edge(source.clone(), target.clone());
            dependencies.push(DependencyEdge { source: source.clone(), target: target.clone() });
        }

        let order = graph.topological_order()?;
        let move_order: Vec<ConnectionId> = order.into_iter().filter(|id| self.is_mover(id, &assignments)).collect();

        let objective_value = self.model.program.evaluate_objective(&rounded);

        log::debug!(
            "Decoded plan: {} disruptions, {} assignments, {} dependencies, {} moves.",
            disruptions.len(),
            assignments.len(),
            dependencies.len(),
            move_order.len()
        );

        Ok(ReconfigurationPlan { objective_value, disruptions, assignments, dependencies, move_order })
    }

    fn round_values(&self, values: &PrimalValues) -> Result<Vec<f64>, DecodingError> {
        let tolerance = self.tolerances.integrality_tol;
        let mut rounded = Vec::with_capacity(self.model.program.variable_count());

        for def in self.model.program.variables() {
            let value = values.get(&def.name).ok_or_else(|| DecodingError::MissingVariable { name: def.name.clone() })?;

            let nearest = value.round();
            if !value.is_finite() || (value - nearest).abs() > tolerance {
                return Err(DecodingError::FractionalValue { name: def.name.clone(), value, tolerance });
            }

            if nearest < def.lower || nearest > def.upper {
                return Err(DecodingError::OutOfBounds { name: def.name.clone(), value, lower: def.lower, upper: def.upper });
            }

            rounded.push(nearest);
        }

        Ok(rounded)
    }

    /// `None` marks a disrupted connection that correctly holds nothing on the link.
    fn decode_positions(
        &self,
        rounded: &[f64],
        disruptions: &BTreeSet<ConnectionId>,
    ) -> Result<BTreeMap<(ConnectionId, LinkId), Option<SlotRange>>, DecodingError> {
        let mut positions = BTreeMap::new();

        for connection in self.topology.connections() {
            let disrupted = disruptions.contains(&connection.id);
            let expected = if disrupted { 0 } else { connection.required_slots };

            for link in &connection.path {
                let variables = self.model.index.occupancy(&connection.id, link).ok_or_else(|| DecodingError::MissingVariable {
                    name: format!("x[{},{},*]", connection.id, link),
                })?;

                let slots: Vec<u32> = variables.iter().enumerate().filter(|(_, var)| rounded[var.index()] > 0.5).map(|(slot, _)| slot as u32).collect();

                if slots.len() as u32 != expected {
                    return Err(DecodingError::SlotCountMismatch {
                        connection: connection.id.clone(),
                        link: link.clone(),
                        expected,
                        actual: slots.len() as u32,
                    });
                }

                let range = if slots.is_empty() {
                    None
                } else {
                    let range = SlotRange::from_sorted_slots(&slots)
                        .ok_or_else(|| DecodingError::NonContiguousSlots { connection: connection.id.clone(), link: link.clone(), slots: slots.clone() })?;
                    Some(range)
                };

                positions.insert((connection.id.clone(), link.clone()), range);
            }
        }

        Ok(positions)
    }

    fn check_exclusivity(&self, positions: &BTreeMap<(ConnectionId, LinkId), Option<SlotRange>>) -> Result<(), DecodingError> {
        let mut owners: BTreeMap<(&LinkId, u32), &ConnectionId> = BTreeMap::new();

        for ((connection, link), range) in positions {
            let Some(range) = range else {
                continue;
            };

            for slot in range.slots() {
                if let Some(first) = owners.insert((link, slot), connection) {
                    return Err(DecodingError::SlotConflict { link: link.clone(), slot, first: first.clone(), second: connection.clone() });
                }
            }
        }

        Ok(())
    }

    /// Returns `(carried_over, fresh)` for `connection` on `link`.
    fn reconcile(&self, rounded: &[f64], connection: &Connection, link: &LinkId, range: Option<SlotRange>) -> Result<(u32, u32), DecodingError> {
        let index = &self.model.index;
        let positional = range.map(|r| r.len()).unwrap_or(0);

        let mut flows: Vec<(&Connection, VarId, u32)> = Vec::new();
        for source in self.topology.existing_connections() {
            if let Some(var) = index.flow(&source.id, &connection.id, link) {
                flows.push((source, var, rounded[var.index()] as u32));
            }
        }

        let carried_over: u32 = flows.iter().map(|(_, _, value)| value).sum();
        let fresh = index.fresh(&connection.id, link).map(|var| rounded[var.index()] as u32).unwrap_or(0);

        if carried_over + fresh != positional {
            return Err(DecodingError::ReconciliationMismatch {
                connection: connection.id.clone(),
                link: link.clone(),
                carried_over,
                fresh,
                positional,
            });
        }

        for (source, var, value) in flows {
            let overlap = match (source.occupied_on(link), range) {
                (Some(old), Some(new)) => old.intersection_len(&new),
                _ => 0,
            };

            if value != overlap {
                return Err(DecodingError::FlowMismatch { name: self.model.program.name(var).to_string(), value, positional: overlap });
            }
        }

        Ok((carried_over, fresh))
    }

    fn check_transfers_linked(&self, rounded: &[f64]) -> Result<(), DecodingError> {
        let index = &self.model.index;

        for (source, target, _, flow) in index.flows() {
            if source == target || rounded[flow.index()] < 0.5 {
                continue;
            }

            let edge_set = index.edge(source, target).map(|edge| rounded[edge.index()] > 0.5).unwrap_or(false);
            if !edge_set {
                return Err(DecodingError::UnlinkedTransfer { flow: self.model.program.name(flow).to_string(), edge: edge_name(source, target) });
            }
        }

        Ok(())
    }

    /// Candidates always have to be set up; existing connections only when a range changed.
    fn is_mover(&self, connection: &ConnectionId, assignments: &[SlotAssignment]) -> bool {
        let Some(connection) = self.topology.connection(connection) else {
            return false;
        };

        if !connection.is_existing() {
            return true;
        }

        assignments.iter().filter(|a| a.connection == connection.id).any(|a| connection.occupied_on(&a.link) != Some(a.slots))
    }
}

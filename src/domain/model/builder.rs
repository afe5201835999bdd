use crate::domain::model::config::ModelConfig;
use crate::domain::model::program::{ConstraintFamily, Program, Relation, Sense, VarId, VariableKind};
use crate::domain::model::variable_index::{
    VariableIndex, block_start_name, disruption_name, edge_name, flow_name, fresh_name, occupancy_name, order_name,
};
use crate::domain::network::connection::Connection;
use crate::domain::network::topology::NetworkTopology;
use crate::domain::utils::id::LinkId;
use crate::error::ModelConstructionError;

/// The generated MILP together with the index needed to decode its solution.
#[derive(Debug, Clone)]
pub struct ReconfigurationModel {
    pub program: Program,
    pub index: VariableIndex,
}

/// Turns a `NetworkTopology` into the reconfiguration MILP.
///
/// Building is a pure function of the topology and the configuration: the same input always
/// yields the same variables and constraints in the same order. Variables are generated family
/// by family (`disc`, `e`, `rs`, `ns`, `order`, `x`, `start`), each in ascending connection id
/// order, then path order, then slot index.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    config: ModelConfig,
}

impl ModelBuilder {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn build(&self, topology: &NetworkTopology) -> Result<ReconfigurationModel, ModelConstructionError> {
        // 0. Reject configurations the linearizations cannot represent.
        self.check_preconditions(topology)?;
        let tie_break_weight = self.config.effective_tie_break_weight(Self::edge_variable_count(topology));

        let connections: Vec<&Connection> = topology.connections().collect();
        let existing: Vec<&Connection> = topology.existing_connections().collect();

        let mut program = Program::new(Sense::Minimize);
        let mut index = VariableIndex::default();

        // 1. Variables
        Self::add_disruption_variables(&mut program, &mut index, &existing)?;
        Self::add_edge_variables(&mut program, &mut index, &existing, &connections)?;
        Self::add_flow_variables(&mut program, &mut index, &existing, &connections)?;
        Self::add_fresh_variables(&mut program, &mut index, &connections, topology)?;
        Self::add_order_variables(&mut program, &mut index, &connections)?;
        Self::add_positional_variables(&mut program, &mut index, &connections, topology)?;

        // 2. Objective: disruptions first, dependency edges only break ties.
        let mut objective: Vec<(VarId, f64)> = index.disruptions().map(|(_, var)| (var, 1.0)).collect();
        objective.extend(index.edges().map(|(_, _, var)| (var, tie_break_weight)));
        program.set_objective(objective);

        // 3. Constraints
        Self::add_demand_constraints(&mut program, &index, &existing, &connections);
        Self::add_source_capacity_constraints(&mut program, &index, &existing, &connections);
        Self::add_fresh_capacity_constraints(&mut program, &index, &existing, topology);
        self.add_disruption_linkage_constraints(&mut program, &index, &existing, &connections);
        self.add_ordering_constraints(&mut program, &index);
        Self::add_slot_exclusivity_constraints(&mut program, &index, topology);
        Self::add_slot_count_constraints(&mut program, &index, &connections);
        Self::add_contiguity_constraints(&mut program, &index, &connections);
        Self::add_flow_linking_constraints(&mut program, &index, &existing, &connections, topology);
        if self.config.spectrum_continuity {
            Self::add_spectrum_continuity_constraints(&mut program, &index, &connections);
        }

        log::info!(
            "Reconfiguration model built: {} variables, {} constraints ({} existing, {} candidate connections).",
            program.variable_count(),
            program.constraint_count(),
            existing.len(),
            connections.len() - existing.len()
        );
        for (family, count) in program.family_counts() {
            log::debug!("  {:?}: {} constraints", family, count);
        }

        Ok(ReconfigurationModel { program, index })
    }

    fn check_preconditions(&self, topology: &NetworkTopology) -> Result<(), ModelConstructionError> {
        for connection in topology.connections() {
            for link in &connection.path {
                let capacity = topology.capacity(link);
                if connection.required_slots > capacity {
                    return Err(ModelConstructionError::RequirementExceedsCapacity {
                        connection: connection.id.clone(),
                        link: link.clone(),
                        required: connection.required_slots,
                        capacity,
                    });
                }
            }
        }

        let max_capacity = topology.max_capacity();
        let flow_big_m = self.config.effective_flow_big_m();
        if flow_big_m < max_capacity as f64 {
            return Err(ModelConstructionError::FlowBigMTooSmall { big_m: flow_big_m, capacity: max_capacity });
        }

        // order[cj] - order[ci] ranges down to -|C|, so relaxing `>= 1` needs |C| + 1.
        let required_order_gap = topology.connection_count() as f64 + 1.0;
        let order_big_m = self.config.effective_order_big_m();
        if order_big_m < required_order_gap {
            return Err(ModelConstructionError::OrderBigMTooSmall { big_m: order_big_m, required: required_order_gap });
        }

        let edge_variables = Self::edge_variable_count(topology);
        let weight = self.config.effective_tie_break_weight(edge_variables);
        if !weight.is_finite() || weight <= 0.0 || weight * edge_variables as f64 >= 1.0 {
            return Err(ModelConstructionError::InvalidTieBreakWeight { weight, edge_variables, bound: 1.0 / edge_variables.max(1) as f64 });
        }

        Ok(())
    }

    /// One `e[ci,cj]` per existing `ci` and every other connection `cj`.
    fn edge_variable_count(topology: &NetworkTopology) -> usize {
        topology.existing_connections().count() * topology.connection_count().saturating_sub(1)
    }

    fn add_disruption_variables(program: &mut Program, index: &mut VariableIndex, existing: &[&Connection]) -> Result<(), ModelConstructionError> {
        for connection in existing {
            let var = program.add_variable(disruption_name(&connection.id), VariableKind::Binary, 0.0, 1.0)?;
            index.disruption.insert(connection.id.clone(), var);
        }
        Ok(())
    }

    fn add_edge_variables(
        program: &mut Program,
        index: &mut VariableIndex,
        existing: &[&Connection],
        connections: &[&Connection],
    ) -> Result<(), ModelConstructionError> {
        for source in existing {
            for target in connections.iter().filter(|c| c.id != source.id) {
                let var = program.add_variable(edge_name(&source.id, &target.id), VariableKind::Binary, 0.0, 1.0)?;
                index.edges.insert((source.id.clone(), target.id.clone()), var);
            }
        }
        Ok(())
    }

    fn add_flow_variables(
        program: &mut Program,
        index: &mut VariableIndex,
        existing: &[&Connection],
        connections: &[&Connection],
    ) -> Result<(), ModelConstructionError> {
        for source in existing {
            for target in connections {
                for link in &target.path {
                    // A source that never held slots on this link cannot hand any over.
                    let held = source.occupied_on(link).map(|range| range.len()).unwrap_or(0);
                    let upper = held.min(target.required_slots) as f64;

                    let var = program.add_variable(flow_name(&source.id, &target.id, link), VariableKind::Integer, 0.0, upper)?;
                    index.flows.insert((source.id.clone(), target.id.clone(), link.clone()), var);
                }
            }
        }
        Ok(())
    }

    fn add_fresh_variables(
        program: &mut Program,
        index: &mut VariableIndex,
        connections: &[&Connection],
        topology: &NetworkTopology,
    ) -> Result<(), ModelConstructionError> {
        for connection in connections {
            for link in &connection.path {
                let free = topology.free_slots(link).len() as u32;
                let upper = free.min(connection.required_slots) as f64;

                let var = program.add_variable(fresh_name(&connection.id, link), VariableKind::Integer, 0.0, upper)?;
                index.fresh.insert((connection.id.clone(), link.clone()), var);
            }
        }
        Ok(())
    }

    fn add_order_variables(program: &mut Program, index: &mut VariableIndex, connections: &[&Connection]) -> Result<(), ModelConstructionError> {
        let upper = connections.len() as f64;
        for connection in connections {
            let var = program.add_variable(order_name(&connection.id), VariableKind::Integer, 0.0, upper)?;
            index.order.insert(connection.id.clone(), var);
        }
        Ok(())
    }

    fn add_positional_variables(
        program: &mut Program,
        index: &mut VariableIndex,
        connections: &[&Connection],
        topology: &NetworkTopology,
    ) -> Result<(), ModelConstructionError> {
        for connection in connections {
            for link in &connection.path {
                let capacity = topology.capacity(link);
                let mut occupancy = Vec::with_capacity(capacity as usize);
                for slot in 0..capacity {
                    occupancy.push(program.add_variable(occupancy_name(&connection.id, link, slot), VariableKind::Binary, 0.0, 1.0)?);
                }
                index.occupancy.insert((connection.id.clone(), link.clone()), occupancy);
            }
        }

        for connection in connections {
            for link in &connection.path {
                let capacity = topology.capacity(link);
                let mut starts = Vec::with_capacity(capacity as usize);
                for slot in 0..capacity {
                    starts.push(program.add_variable(block_start_name(&connection.id, link, slot), VariableKind::Binary, 0.0, 1.0)?);
                }
                index.block_start.insert((connection.id.clone(), link.clone()), starts);
            }
        }
        Ok(())
    }

    /// Demand: `Σ_ci rs[ci,cj,nl] + ns[cj,nl] = CBc[cj]`, released for a disrupted existing `cj`.
    fn add_demand_constraints(program: &mut Program, index: &VariableIndex, existing: &[&Connection], connections: &[&Connection]) {
        for target in connections {
            for link in &target.path {
                let mut terms: Vec<(VarId, f64)> = existing.iter().filter_map(|source| index.flow(&source.id, &target.id, link)).map(|var| (var, 1.0)).collect();

                if let Some(fresh) = index.fresh(&target.id, link) {
                    terms.push((fresh, 1.0));
                }

                if let Some(disc) = index.disruption(&target.id) {
                    terms.push((disc, target.required_slots as f64));
                }

                program.add_constraint(
                    format!("demand[{},{}]", target.id, link),
                    ConstraintFamily::Demand,
                    terms,
                    Relation::Equal,
                    target.required_slots as f64,
                );
            }
        }
    }

    /// Slots handed over by `ci` on `nl` never exceed what `ci` held there.
    fn add_source_capacity_constraints(program: &mut Program, index: &VariableIndex, existing: &[&Connection], connections: &[&Connection]) {
        for source in existing {
            for link in &source.path {
                let terms: Vec<(VarId, f64)> = connections
                    .iter()
                    .filter(|target| target.id != source.id)
                    .filter_map(|target| index.flow(&source.id, &target.id, link))
                    .map(|var| (var, 1.0))
                    .collect();

                if terms.is_empty() {
                    continue;
                }

                program.add_constraint(
                    format!("source[{},{}]", source.id, link),
                    ConstraintFamily::SourceCapacity,
                    terms,
                    Relation::LessEqual,
                    source.required_slots as f64,
                );
            }
        }
    }

    /// Fresh allocation on `nl` is bounded by the slots no existing connection held.
    fn add_fresh_capacity_constraints(program: &mut Program, index: &VariableIndex, existing: &[&Connection], topology: &NetworkTopology) {
        for link in topology.links() {
            let terms: Vec<(VarId, f64)> = topology.connections_on_link(&link.id).filter_map(|c| index.fresh(&c.id, &link.id)).map(|var| (var, 1.0)).collect();

            if terms.is_empty() {
                continue;
            }

            let held: u32 = existing.iter().filter(|c| c.traverses(&link.id)).map(|c| c.required_slots).sum();

            program.add_constraint(
                format!("fresh[{}]", link.id),
                ConstraintFamily::FreshCapacity,
                terms,
                Relation::LessEqual,
                link.capacity.saturating_sub(held) as f64,
            );
        }
    }

    /// Any transfer from `ci` to `cj` forces the dependency edge `e[ci,cj]`.
    fn add_disruption_linkage_constraints(&self, program: &mut Program, index: &VariableIndex, existing: &[&Connection], connections: &[&Connection]) {
        let big_m = self.config.effective_flow_big_m();

        for source in existing {
            for target in connections.iter().filter(|c| c.id != source.id) {
                let Some(edge) = index.edge(&source.id, &target.id) else {
                    continue;
                };

                for link in source.path.iter().filter(|link| target.traverses(link)) {
                    let Some(flow) = index.flow(&source.id, &target.id, link) else {
                        continue;
                    };

                    program.add_constraint(
                        format!("linkage[{},{},{}]", source.id, target.id, link),
                        ConstraintFamily::DisruptionLinkage,
                        vec![(flow, 1.0), (edge, -big_m)],
                        Relation::LessEqual,
                        0.0,
                    );
                }
            }
        }
    }

    /// Ordering: `order[cj] - order[ci] + M·disc[ci] + M·(1 - e[ci,cj]) >= 1`.
    ///
    /// An edge `ci -> cj` means `cj` takes slots `ci` held, so `ci` has to leave first unless it is
    /// disrupted.
    fn add_ordering_constraints(&self, program: &mut Program, index: &VariableIndex) {
        let big_m = self.config.effective_order_big_m();

        for (source, target, edge) in index.edges() {
            let (Some(source_order), Some(target_order), Some(disc)) = (index.order(source), index.order(target), index.disruption(source)) else {
                continue;
            };

            program.add_constraint(
                format!("acyclic[{},{}]", source, target),
                ConstraintFamily::AcyclicOrdering,
                vec![(target_order, 1.0), (source_order, -1.0), (disc, big_m), (edge, -big_m)],
                Relation::GreaterEqual,
                1.0 - big_m,
            );
        }
    }

    /// Every slot of a link is held by at most one connection after the reconfiguration.
    fn add_slot_exclusivity_constraints(program: &mut Program, index: &VariableIndex, topology: &NetworkTopology) {
        for link in topology.links() {
            let holders: Vec<&[VarId]> = topology.connections_on_link(&link.id).filter_map(|c| index.occupancy(&c.id, &link.id)).collect();

            if holders.is_empty() {
                continue;
            }

            for slot in link.slots() {
                let terms = holders.iter().map(|slots| (slots[slot as usize], 1.0)).collect();
                program.add_constraint(format!("exclusive[{},{}]", link.id, slot), ConstraintFamily::SlotExclusivity, terms, Relation::LessEqual, 1.0);
            }
        }
    }

    fn add_slot_count_constraints(program: &mut Program, index: &VariableIndex, connections: &[&Connection]) {
        for connection in connections {
            for link in &connection.path {
                let Some(slots) = index.occupancy(&connection.id, link) else {
                    continue;
                };

                let mut terms: Vec<(VarId, f64)> = slots.iter().map(|var| (*var, 1.0)).collect();
                if let Some(disc) = index.disruption(&connection.id) {
                    terms.push((disc, connection.required_slots as f64));
                }

                program.add_constraint(
                    format!("count[{},{}]", connection.id, link),
                    ConstraintFamily::SlotCount,
                    terms,
                    Relation::Equal,
                    connection.required_slots as f64,
                );
            }
        }
    }

    /// `start[c,nl,k]` is exactly the indicator of a block beginning at `k`; at most one block per link.
    fn add_contiguity_constraints(program: &mut Program, index: &VariableIndex, connections: &[&Connection]) {
        for connection in connections {
            for link in &connection.path {
                let (Some(slots), Some(starts)) = (index.occupancy(&connection.id, link), index.block_start(&connection.id, link)) else {
                    continue;
                };

                for (slot, (&x, &start)) in slots.iter().zip(starts.iter()).enumerate() {
                    let name = |rule: &str| format!("{}[{},{},{}]", rule, connection.id, link, slot);

                    // start >= x[k] - x[k-1]
                    let mut opens = vec![(start, 1.0), (x, -1.0)];
                    if slot > 0 {
                        opens.push((slots[slot - 1], 1.0));
                    }
                    program.add_constraint(name("block_open"), ConstraintFamily::Contiguity, opens, Relation::GreaterEqual, 0.0);

                    // start <= x[k]
                    program.add_constraint(name("block_held"), ConstraintFamily::Contiguity, vec![(start, 1.0), (x, -1.0)], Relation::LessEqual, 0.0);

                    // start <= 1 - x[k-1]
                    if slot > 0 {
                        program.add_constraint(
                            name("block_edge"),
                            ConstraintFamily::Contiguity,
                            vec![(start, 1.0), (slots[slot - 1], 1.0)],
                            Relation::LessEqual,
                            1.0,
                        );
                    }
                }

                program.add_constraint(
                    format!("single_block[{},{}]", connection.id, link),
                    ConstraintFamily::Contiguity,
                    starts.iter().map(|var| (*var, 1.0)).collect(),
                    Relation::LessEqual,
                    1.0,
                );
            }
        }
    }

    /// Ties the aggregate counts to positions: `rs[ci,cj,nl]` counts the slots of `cj` inside the
    /// old range of `ci`, `ns[cj,nl]` the slots of `cj` no existing connection held.
    fn add_flow_linking_constraints(
        program: &mut Program,
        index: &VariableIndex,
        existing: &[&Connection],
        connections: &[&Connection],
        topology: &NetworkTopology,
    ) {
        for target in connections {
            for link in &target.path {
                let Some(slots) = index.occupancy(&target.id, link) else {
                    continue;
                };

                for source in existing {
                    let Some(flow) = index.flow(&source.id, &target.id, link) else {
                        continue;
                    };

                    let mut terms = vec![(flow, 1.0)];
                    if let Some(range) = source.occupied_on(link) {
                        terms.extend(range.slots().map(|slot| (slots[slot as usize], -1.0)));
                    }

                    program.add_constraint(
                        format!("flow[{},{},{}]", source.id, target.id, link),
                        ConstraintFamily::FlowLinking,
                        terms,
                        Relation::Equal,
                        0.0,
                    );
                }

                if let Some(fresh) = index.fresh(&target.id, link) {
                    let mut terms = vec![(fresh, 1.0)];
                    terms.extend(topology.free_slots(link).into_iter().map(|slot| (slots[slot as usize], -1.0)));

                    program.add_constraint(
                        format!("fresh_slots[{},{}]", target.id, link),
                        ConstraintFamily::FlowLinking,
                        terms,
                        Relation::Equal,
                        0.0,
                    );
                }
            }
        }
    }

    /// Same first slot on consecutive links of a path.
    fn add_spectrum_continuity_constraints(program: &mut Program, index: &VariableIndex, connections: &[&Connection]) {
        for connection in connections {
            for pair in connection.path.windows(2) {
                let (from, to): (&LinkId, &LinkId) = (&pair[0], &pair[1]);
                let (Some(from_starts), Some(to_starts)) = (index.block_start(&connection.id, from), index.block_start(&connection.id, to)) else {
                    continue;
                };

                let mut terms: Vec<(VarId, f64)> = from_starts.iter().enumerate().skip(1).map(|(slot, var)| (*var, slot as f64)).collect();
                terms.extend(to_starts.iter().enumerate().skip(1).map(|(slot, var)| (*var, -(slot as f64))));

                program.add_constraint(
                    format!("continuity[{},{},{}]", connection.id, from, to),
                    ConstraintFamily::SpectrumContinuity,
                    terms,
                    Relation::Equal,
                    0.0,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network::network_link::NetworkLink;
    use crate::domain::network::slot_range::SlotRange;
    use crate::domain::utils::id::ConnectionId;
    use std::collections::HashSet;

    fn single_link_topology(capacity: u32, existing: Vec<(&str, u32, u32)>, candidates: Vec<(&str, u32)>) -> NetworkTopology {
        let l1 = LinkId::new("l1");
        let mut connections: Vec<Connection> = existing
            .into_iter()
            .map(|(id, first, last)| {
                let range = SlotRange::new(first, last).unwrap();
                Connection::existing(ConnectionId::new(id), range.len(), vec![l1.clone()], vec![(l1.clone(), range)])
            })
            .collect();
        connections.extend(candidates.into_iter().map(|(id, required)| Connection::candidate(ConnectionId::new(id), required, vec![l1.clone()])));

        NetworkTopology::new(vec![NetworkLink::new(l1.clone(), capacity)], connections).unwrap()
    }

    /// Dense value vector for a plan where every connection is served on `l1` at the given range.
    fn values_for_plan(model: &ReconfigurationModel, topology: &NetworkTopology, plan: &[(&str, u32, u32)], order: &[(&str, f64)]) -> Vec<f64> {
        let l1 = LinkId::new("l1");
        let mut values = vec![0.0; model.program.variable_count()];

        for (id, first, last) in plan {
            let connection = ConnectionId::new(*id);
            let range = SlotRange::new(*first, *last).unwrap();
            let slots = model.index.occupancy(&connection, &l1).unwrap();
            for slot in range.slots() {
                values[slots[slot as usize].index()] = 1.0;
            }
            values[model.index.block_start(&connection, &l1).unwrap()[*first as usize].index()] = 1.0;

            let mut carried = 0;
            for source in topology.existing_connections() {
                let held = source.occupied_on(&l1).map(|r| r.intersection_len(&range)).unwrap_or(0);
                values[model.index.flow(&source.id, &connection, &l1).unwrap().index()] = held as f64;
                carried += held;
                if held > 0 && source.id != connection {
                    values[model.index.edge(&source.id, &connection).unwrap().index()] = 1.0;
                }
            }
            values[model.index.fresh(&connection, &l1).unwrap().index()] = (range.len() - carried) as f64;
        }

        for (id, rank) in order {
            values[model.index.order(&ConnectionId::new(*id)).unwrap().index()] = *rank;
        }

        values
    }

    #[test]
    fn test_variable_families_and_counts() {
        let topology = single_link_topology(10, vec![("a", 0, 3)], vec![("b", 4)]);
        let model = ModelBuilder::default().build(&topology).unwrap();

        // disc 1, e 1, rs 2, ns 2, order 2, x 20, start 20
        assert_eq!(model.program.variable_count(), 48);
        assert_eq!(model.index.edge_count(), 1);
        assert!(model.program.var_id("disc[a]").is_some());
        assert!(model.program.var_id("e[a,b]").is_some());
        assert!(model.program.var_id("e[b,a]").is_none());
        assert!(model.program.var_id("rs[a,a,l1]").is_some());
        assert!(model.program.var_id("x[b,l1,9]").is_some());
        assert_eq!(model.program.variable(model.index.order(&ConnectionId::new("a")).unwrap()).upper, 2.0);
    }

    #[test]
    fn test_objective_weights_disruptions_over_edges() {
        let topology = single_link_topology(10, vec![("a", 0, 3)], vec![("b", 4)]);
        let model = ModelBuilder::default().build(&topology).unwrap();

        let disc = model.index.disruption(&ConnectionId::new("a")).unwrap();
        let edge = model.index.edge(&ConnectionId::new("a"), &ConnectionId::new("b")).unwrap();
        assert!(model.program.objective().contains(&(disc, 1.0)));
        assert!(model.program.objective().contains(&(edge, 1e-4)));
    }

    #[test]
    fn test_build_is_deterministic() {
        let topology = single_link_topology(12, vec![("a", 0, 3), ("c", 6, 7)], vec![("b", 4), ("d", 2)]);
        let builder = ModelBuilder::default();

        let first = builder.build(&topology).unwrap();
        let second = builder.build(&topology).unwrap();

        assert_eq!(first.program.variables(), second.program.variables());
        assert_eq!(first.program.constraints(), second.program.constraints());
        assert_eq!(first.program.objective(), second.program.objective());
    }

    #[test]
    fn test_undisturbed_plan_satisfies_every_constraint() {
        let topology = single_link_topology(10, vec![("a", 0, 3)], vec![("b", 4)]);
        let model = ModelBuilder::default().build(&topology).unwrap();

        let values = values_for_plan(&model, &topology, &[("a", 0, 3), ("b", 4, 7)], &[]);
        let violated: Vec<&str> = model.program.violated_constraints(&values, 1e-9).map(|c| c.name.as_str()).collect();

        assert!(violated.is_empty(), "Unexpected violations: {:?}", violated);
        assert_eq!(model.program.evaluate_objective(&values), 0.0);
    }

    #[test]
    fn test_shift_requires_consistent_order() {
        let topology = single_link_topology(10, vec![("a", 3, 6)], vec![("b", 6)]);
        let model = ModelBuilder::default().build(&topology).unwrap();

        // a moves to the top, b takes its old slots: a must come first.
        let ordered = values_for_plan(&model, &topology, &[("a", 6, 9), ("b", 0, 5)], &[("a", 0.0), ("b", 1.0)]);
        assert_eq!(model.program.violated_constraints(&ordered, 1e-9).count(), 0);

        let reversed = values_for_plan(&model, &topology, &[("a", 6, 9), ("b", 0, 5)], &[("a", 1.0), ("b", 0.0)]);
        let violated: Vec<&str> = model.program.violated_constraints(&reversed, 1e-9).map(|c| c.name.as_str()).collect();
        assert_eq!(violated, vec!["acyclic[a,b]"]);
    }

    #[test]
    fn test_overlapping_plan_violates_exclusivity() {
        let topology = single_link_topology(10, vec![("a", 0, 3)], vec![("b", 4)]);
        let model = ModelBuilder::default().build(&topology).unwrap();

        let values = values_for_plan(&model, &topology, &[("a", 0, 3), ("b", 2, 5)], &[("a", 0.0), ("b", 1.0)]);
        assert!(model.program.violated_constraints(&values, 1e-9).any(|c| c.family == ConstraintFamily::SlotExclusivity));
    }

    #[test]
    fn test_flow_bound_is_zero_off_the_source_path() {
        let (l1, l2) = (LinkId::new("l1"), LinkId::new("l2"));
        let topology = NetworkTopology::new(
            vec![NetworkLink::new(l1.clone(), 8), NetworkLink::new(l2.clone(), 8)],
            vec![
                Connection::existing(ConnectionId::new("a"), 2, vec![l1.clone()], vec![(l1.clone(), SlotRange::new(0, 1).unwrap())]),
                Connection::candidate(ConnectionId::new("b"), 3, vec![l2.clone()]),
            ],
        )
        .unwrap();

        let model = ModelBuilder::default().build(&topology).unwrap();
        let flow = model.index.flow(&ConnectionId::new("a"), &ConnectionId::new("b"), &l2).unwrap();
        assert_eq!(model.program.variable(flow).upper, 0.0);
    }

    #[test]
    fn test_big_m_below_capacity_is_rejected() {
        let topology = single_link_topology(10, vec![("a", 0, 3)], vec![("b", 4)]);
        let builder = ModelBuilder::new(ModelConfig { big_m: 8.0, ..ModelConfig::default() });

        let result = builder.build(&topology);
        assert_eq!(result.unwrap_err(), ModelConstructionError::FlowBigMTooSmall { big_m: 8.0, capacity: 10 });
    }

    #[test]
    fn test_order_big_m_must_cover_connection_count() {
        let topology = single_link_topology(10, vec![("a", 0, 3)], vec![("b", 2), ("c", 2)]);
        let builder = ModelBuilder::new(ModelConfig { order_big_m: Some(3.0), ..ModelConfig::default() });

        let result = builder.build(&topology);
        assert_eq!(result.unwrap_err(), ModelConstructionError::OrderBigMTooSmall { big_m: 3.0, required: 4.0 });
    }

    #[test]
    fn test_requirement_above_capacity_is_rejected() {
        let topology = single_link_topology(4, vec![], vec![("b", 5)]);

        let result = ModelBuilder::default().build(&topology);
        assert!(matches!(result, Err(ModelConstructionError::RequirementExceedsCapacity { required: 5, capacity: 4, .. })));
    }

    #[test]
    fn test_tie_break_weight_must_not_outweigh_a_disruption() {
        let topology = single_link_topology(10, vec![("a", 0, 3)], vec![("b", 2), ("c", 2)]);
        let builder = ModelBuilder::new(ModelConfig { tie_break_weight: Some(0.5), ..ModelConfig::default() });

        let result = builder.build(&topology);
        assert_eq!(result.unwrap_err(), ModelConstructionError::InvalidTieBreakWeight { weight: 0.5, edge_variables: 2, bound: 0.5 });
    }

    #[test]
    fn test_default_tie_break_weight_fits_mid_size_networks() {
        let names: Vec<String> = (0..100).map(|i| format!("a{:03}", i)).collect();
        let existing: Vec<(&str, u32, u32)> = names.iter().zip(0u32..).map(|(name, slot)| (name.as_str(), slot, slot)).collect();
        let topology = single_link_topology(102, existing, vec![("b", 1), ("c", 1)]);

        let model = ModelBuilder::default().build(&topology).unwrap();

        let edges: HashSet<VarId> = model.index.edges().map(|(_, _, var)| var).collect();
        let edge_weight: f64 = model.program.objective().iter().filter(|(var, _)| edges.contains(var)).map(|(_, coefficient)| coefficient).sum();
        assert_eq!(edges.len(), 10_100);
        assert!(edge_weight < 1.0);
    }

    #[test]
    fn test_spectrum_continuity_is_opt_in() {
        let (l1, l2) = (LinkId::new("l1"), LinkId::new("l2"));
        let topology = NetworkTopology::new(
            vec![NetworkLink::new(l1.clone(), 6), NetworkLink::new(l2.clone(), 6)],
            vec![Connection::candidate(ConnectionId::new("b"), 2, vec![l1, l2])],
        )
        .unwrap();

        let plain = ModelBuilder::default().build(&topology).unwrap();
        assert!(!plain.program.family_counts().contains_key(&ConstraintFamily::SpectrumContinuity));

        let continuous = ModelBuilder::new(ModelConfig { spectrum_continuity: true, ..ModelConfig::default() }).build(&topology).unwrap();
        assert_eq!(continuous.program.family_counts().get(&ConstraintFamily::SpectrumContinuity), Some(&1));
    }
}

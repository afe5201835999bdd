use std::collections::{BTreeMap, BTreeSet};

use crate::domain::utils::id::ConnectionId;
use crate::error::DecodingError;

/// "Must move before" relation between connections that stay in service.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    outgoing: BTreeMap<ConnectionId, BTreeSet<ConnectionId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: ConnectionId) {
        self.outgoing.entry(node).or_default();
    }

    /// Adds `source -> target`; both endpoints become nodes.
    pub fn add_edge(&mut self, source: ConnectionId, target: ConnectionId) {
        self.outgoing.entry(target.clone()).or_default();
        self.outgoing.entry(source).or_default().insert(target);
    }

    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeSet::len).sum()
    }

    pub fn successors(&self, node: &ConnectionId) -> impl Iterator<Item = &ConnectionId> {
        self.outgoing.get(node).into_iter().flatten()
    }

    /// Kahn's algorithm. Among nodes that are ready at the same time the smallest id goes first,
    /// so the order is deterministic.
    pub fn topological_order(&self) -> Result<Vec<ConnectionId>, DecodingError> {
        // 1. Count incoming edges
        let mut in_degree: BTreeMap<&ConnectionId, usize> = self.outgoing.keys().map(|node| (node, 0)).collect();
        for targets in self.outgoing.values() {
            for target in targets {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree += 1;
                }
            }
        }

        // 2. Seed the ready set with all sources
        let mut ready: BTreeSet<&ConnectionId> = in_degree.iter().filter(|(_, degree)| **degree == 0).map(|(node, _)| *node).collect();
        let mut order = Vec::with_capacity(self.outgoing.len());

        // 3. Release successors as their last predecessor is placed
        while let Some(node) = ready.pop_first() {
            order.push(node.clone());
            for target in self.successors(node) {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(target);
                    }
                }
            }
        }

        // 4. Whatever was never released sits on or behind a cycle
        if order.len() < self.outgoing.len() {
            let stuck: Vec<ConnectionId> = in_degree.into_iter().filter(|(_, degree)| *degree > 0).map(|(node, _)| node.clone()).collect();
            return Err(DecodingError::CyclicDependency { connections: stuck });
        }

        Ok(order)
    }
}

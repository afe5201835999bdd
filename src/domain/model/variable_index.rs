use std::collections::BTreeMap;

use crate::domain::model::program::VarId;
use crate::domain::utils::id::{ConnectionId, LinkId};

pub fn disruption_name(connection: &ConnectionId) -> String {
    format!("disc[{}]", connection)
}

pub fn edge_name(source: &ConnectionId, target: &ConnectionId) -> String {
    format!("e[{},{}]", source, target)
}

pub fn flow_name(source: &ConnectionId, target: &ConnectionId, link: &LinkId) -> String {
    format!("rs[{},{},{}]", source, target, link)
}

pub fn fresh_name(connection: &ConnectionId, link: &LinkId) -> String {
    format!("ns[{},{}]", connection, link)
}

pub fn order_name(connection: &ConnectionId) -> String {
    format!("order[{}]", connection)
}

pub fn occupancy_name(connection: &ConnectionId, link: &LinkId, slot: u32) -> String {
    format!("x[{},{},{}]", connection, link, slot)
}

pub fn block_start_name(connection: &ConnectionId, link: &LinkId, slot: u32) -> String {
    format!("start[{},{},{}]", connection, link, slot)
}

/// Structured lookup from model entities to the variables generated for them.
///
/// The decoder inverts the solver output through this index; variable names are only used at the
/// solver boundary.
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    pub(crate) disruption: BTreeMap<ConnectionId, VarId>,
    pub(crate) edges: BTreeMap<(ConnectionId, ConnectionId), VarId>,
    pub(crate) flows: BTreeMap<(ConnectionId, ConnectionId, LinkId), VarId>,
    pub(crate) fresh: BTreeMap<(ConnectionId, LinkId), VarId>,
    pub(crate) order: BTreeMap<ConnectionId, VarId>,

    /// `x[c,nl,k]` indexed by slot `k`.
    pub(crate) occupancy: BTreeMap<(ConnectionId, LinkId), Vec<VarId>>,

    /// `start[c,nl,k]` indexed by slot `k`.
    pub(crate) block_start: BTreeMap<(ConnectionId, LinkId), Vec<VarId>>,
}

impl VariableIndex {
    pub fn disruption(&self, connection: &ConnectionId) -> Option<VarId> {
        self.disruption.get(connection).copied()
    }

    pub fn edge(&self, source: &ConnectionId, target: &ConnectionId) -> Option<VarId> {
        self.edges.get(&(source.clone(), target.clone())).copied()
    }

    pub fn flow(&self, source: &ConnectionId, target: &ConnectionId, link: &LinkId) -> Option<VarId> {
        self.flows.get(&(source.clone(), target.clone(), link.clone())).copied()
    }

    pub fn fresh(&self, connection: &ConnectionId, link: &LinkId) -> Option<VarId> {
        self.fresh.get(&(connection.clone(), link.clone())).copied()
    }

    pub fn order(&self, connection: &ConnectionId) -> Option<VarId> {
        self.order.get(connection).copied()
    }

    pub fn occupancy(&self, connection: &ConnectionId, link: &LinkId) -> Option<&[VarId]> {
        self.occupancy.get(&(connection.clone(), link.clone())).map(Vec::as_slice)
    }

    pub fn block_start(&self, connection: &ConnectionId, link: &LinkId) -> Option<&[VarId]> {
        self.block_start.get(&(connection.clone(), link.clone())).map(Vec::as_slice)
    }

    pub fn disruptions(&self) -> impl Iterator<Item = (&ConnectionId, VarId)> {
        self.disruption.iter().map(|(connection, var)| (connection, *var))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&ConnectionId, &ConnectionId, VarId)> {
        self.edges.iter().map(|((source, target), var)| (source, target, *var))
    }

    pub fn flows(&self) -> impl Iterator<Item = (&ConnectionId, &ConnectionId, &LinkId, VarId)> {
        self.flows.iter().map(|((source, target, link), var)| (source, target, link, *var))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

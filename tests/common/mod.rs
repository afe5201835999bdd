#![allow(dead_code)]

use irarc_rust_reconfiguration::api::network_dto::{ConnectionDto, ConnectionKindDto, NetworkLinkDto, OccupiedSlotsDto, ReconfigurationProblemDto};
use irarc_rust_reconfiguration::domain::decoder::plan::ReconfigurationResult;
use irarc_rust_reconfiguration::domain::network::topology::NetworkTopology;
use irarc_rust_reconfiguration::domain::utils::id::{ConnectionId, LinkId};

/// Fluent builder for problem DTOs, converted through the same path as JSON input.
#[derive(Default)]
pub struct ProblemBuilder {
    links: Vec<NetworkLinkDto>,
    connections: Vec<ConnectionDto>,
}

impl ProblemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(mut self, id: &str, capacity: u32) -> Self {
        self.links.push(NetworkLinkDto { id: id.to_string(), capacity });
        self
    }

    /// Existing connection holding `(link, first, last)` on every link of its path.
    pub fn existing(mut self, id: &str, required_slots: u32, occupied: &[(&str, u32, u32)]) -> Self {
        self.connections.push(ConnectionDto {
            id: id.to_string(),
            kind: ConnectionKindDto::Existing,
            required_slots,
            links: occupied.iter().map(|(link, _, _)| link.to_string()).collect(),
            occupied_slots: Some(occupied.iter().map(|(link, first, last)| OccupiedSlotsDto { link: link.to_string(), first: *first, last: *last }).collect()),
        });
        self
    }

    pub fn candidate(mut self, id: &str, required_slots: u32, path: &[&str]) -> Self {
        self.connections.push(ConnectionDto {
            id: id.to_string(),
            kind: ConnectionKindDto::Candidate,
            required_slots,
            links: path.iter().map(|link| link.to_string()).collect(),
            occupied_slots: None,
        });
        self
    }

    pub fn dto(self) -> ReconfigurationProblemDto {
        ReconfigurationProblemDto { links: self.links, connections: self.connections }
    }

    pub fn build(self) -> NetworkTopology {
        NetworkTopology::try_from(self.dto()).expect("test topology must be valid")
    }
}

pub fn cid(id: &str) -> ConnectionId {
    ConnectionId::new(id)
}

pub fn lid(id: &str) -> LinkId {
    LinkId::new(id)
}

/// Checks the structural guarantees every optimal plan must satisfy.
pub fn assert_plan_is_consistent(topology: &NetworkTopology, result: &ReconfigurationResult) {
    for connection in topology.connections() {
        for link in &connection.path {
            match result.assignment(&connection.id, link) {
                Some(assignment) => {
                    assert!(!result.is_disrupted(&connection.id), "disrupted '{}' still holds slots", connection.id);
                    assert_eq!(assignment.slots.len(), connection.required_slots, "'{}' on '{}'", connection.id, link);
                    assert_eq!(assignment.carried_over + assignment.fresh, connection.required_slots);
                    assert!(assignment.slots.last < topology.capacity(link));
                }
                None => assert!(result.is_disrupted(&connection.id), "served '{}' has no slots on '{}'", connection.id, link),
            }
        }
    }

    for (i, a) in result.assignments.iter().enumerate() {
        for b in result.assignments.iter().skip(i + 1) {
            if a.link == b.link {
                assert!(!a.slots.overlaps(&b.slots), "'{}' and '{}' overlap on '{}'", a.connection, b.connection, a.link);
            }
        }
    }

    for edge in &result.dependencies {
        let source = result.move_position(&edge.source);
        let target = result.move_position(&edge.target);
        if let (Some(source), Some(target)) = (source, target) {
            assert!(source < target, "'{}' must move before '{}'", edge.source, edge.target);
        }
    }
}

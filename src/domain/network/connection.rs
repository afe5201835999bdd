use serde::Serialize;

use crate::domain::network::slot_range::SlotRange;
use crate::domain::utils::id::{ConnectionId, LinkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    /// Present before the reconfiguration and currently holding slots.
    Existing,
    /// New connection to be admitted by the reconfiguration.
    Candidate,
}

/// A connection requesting `required_slots` contiguous slots on every link of its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub kind: ConnectionKind,
    pub required_slots: u32,

    /// Links in traversal order.
    pub path: Vec<LinkId>,

    /// Slot ranges held before the reconfiguration, one per traversed link. Empty for candidates.
    pub occupied: Vec<(LinkId, SlotRange)>,
}

impl Connection {
    pub fn existing(id: ConnectionId, required_slots: u32, path: Vec<LinkId>, occupied: Vec<(LinkId, SlotRange)>) -> Self {
        Self { id, kind: ConnectionKind::Existing, required_slots, path, occupied }
    }

    pub fn candidate(id: ConnectionId, required_slots: u32, path: Vec<LinkId>) -> Self {
        Self { id, kind: ConnectionKind::Candidate, required_slots, path, occupied: Vec::new() }
    }

    pub fn is_existing(&self) -> bool {
        self.kind == ConnectionKind::Existing
    }

    pub fn traverses(&self, link: &LinkId) -> bool {
        self.path.contains(link)
    }

    pub fn occupied_on(&self, link: &LinkId) -> Option<SlotRange> {
        self.occupied.iter().find(|(occupied_link, _)| occupied_link == link).map(|(_, range)| *range)
    }
}

use crate::domain::utils::id::LinkId;

/// Largest slot capacity a link may declare. Every slot becomes a variable per connection.
pub const MAX_LINK_CAPACITY: u32 = 1 << 16;

/// A network link carrying `capacity` discrete transmission slots, indexed `0..capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkLink {
    pub id: LinkId,
    pub capacity: u32,
}

impl NetworkLink {
    pub fn new(id: LinkId, capacity: u32) -> Self {
        Self { id, capacity }
    }

    pub fn slots(&self) -> std::ops::Range<u32> {
        0..self.capacity
    }
}

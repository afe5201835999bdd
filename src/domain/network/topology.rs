use std::collections::{BTreeMap, HashSet};

use crate::api::network_dto::{ConnectionDto, ConnectionKindDto, ReconfigurationProblemDto};
use crate::domain::network::connection::{Connection, ConnectionKind};
use crate::domain::network::network_link::{MAX_LINK_CAPACITY, NetworkLink};
use crate::domain::network::slot_range::SlotRange;
use crate::domain::utils::id::{ConnectionId, Id, LinkId};
use crate::error::ValidationError;

/// Validated, immutable view of the network and its demand for one reconfiguration run.
///
/// Links and connections are kept in ascending identifier order, so every iteration over the
/// topology (and therefore every model generated from it) is deterministic.
#[derive(Debug, Clone)]
pub struct NetworkTopology {
    links: BTreeMap<LinkId, NetworkLink>,
    connections: BTreeMap<ConnectionId, Connection>,

    /// Per link and slot index, the existing connection holding the slot before reconfiguration.
    slot_owners: BTreeMap<LinkId, Vec<Option<ConnectionId>>>,
}

impl TryFrom<ReconfigurationProblemDto> for NetworkTopology {
    type Error = ValidationError;

    fn try_from(dto: ReconfigurationProblemDto) -> Result<Self, Self::Error> {
        let links = dto.links.into_iter().map(|link| NetworkLink::new(LinkId::new(link.id), link.capacity)).collect();

        let connections = dto.connections.into_iter().map(NetworkTopology::connection_from_dto).collect::<Result<Vec<_>, _>>()?;

        NetworkTopology::new(links, connections)
    }
}

impl NetworkTopology {
    /// Validates the records and builds the topology.
    pub fn new(links: Vec<NetworkLink>, connections: Vec<Connection>) -> Result<Self, ValidationError> {
        // 1. Links: unique, well-formed ids and a capacity in 1..=MAX_LINK_CAPACITY.
        let mut link_map: BTreeMap<LinkId, NetworkLink> = BTreeMap::new();
        for link in links {
            Self::validate_identifier(&link.id)?;

            if link.capacity == 0 {
                return Err(ValidationError::ZeroCapacity(link.id));
            }

            if link.capacity > MAX_LINK_CAPACITY {
                return Err(ValidationError::CapacityTooLarge { link: link.id, capacity: link.capacity, max: MAX_LINK_CAPACITY });
            }

            if link_map.contains_key(&link.id) {
                return Err(ValidationError::DuplicateLink(link.id));
            }

            link_map.insert(link.id.clone(), link);
        }

        // 2. Connections: requirement, path and declared footprint.
        let mut connection_map: BTreeMap<ConnectionId, Connection> = BTreeMap::new();
        for connection in connections {
            Self::validate_identifier(&connection.id)?;
            Self::validate_connection(&connection, &link_map)?;

            if connection_map.contains_key(&connection.id) {
                return Err(ValidationError::DuplicateConnection(connection.id));
            }

            connection_map.insert(connection.id.clone(), connection);
        }

        // 3. Pre-reconfiguration occupancy must be a valid slot plan on its own.
        let slot_owners = Self::build_slot_owners(&link_map, &connection_map)?;

        log::debug!(
            "Topology validated: {} links, {} existing and {} candidate connections.",
            link_map.len(),
            connection_map.values().filter(|c| c.is_existing()).count(),
            connection_map.values().filter(|c| !c.is_existing()).count()
        );

        Ok(NetworkTopology { links: link_map, connections: connection_map, slot_owners })
    }

    fn connection_from_dto(dto: ConnectionDto) -> Result<Connection, ValidationError> {
        let id = ConnectionId::new(dto.id);
        let path: Vec<LinkId> = dto.links.into_iter().map(LinkId::new).collect();

        let mut occupied = Vec::new();
        for slots in dto.occupied_slots.unwrap_or_default() {
            let link = LinkId::new(slots.link);
            let range = SlotRange::new(slots.first, slots.last).ok_or_else(|| ValidationError::InvalidSlotRange {
                connection: id.clone(),
                link: link.clone(),
                first: slots.first,
                last: slots.last,
            })?;
            occupied.push((link, range));
        }

        let kind = match dto.kind {
            ConnectionKindDto::Existing => ConnectionKind::Existing,
            ConnectionKindDto::Candidate => ConnectionKind::Candidate,
        };

        Ok(Connection { id, kind, required_slots: dto.required_slots, path, occupied })
    }

    fn validate_identifier<T>(id: &Id<T>) -> Result<(), ValidationError> {
        if id.as_str().trim().is_empty() {
            return Err(ValidationError::InvalidIdentifier { id: id.to_string(), reason: "identifier is empty".to_string() });
        }

        if let Some(c) = id.reserved_character() {
            return Err(ValidationError::InvalidIdentifier { id: id.to_string(), reason: format!("contains reserved character '{}'", c) });
        }

        Ok(())
    }

    fn validate_connection(connection: &Connection, links: &BTreeMap<LinkId, NetworkLink>) -> Result<(), ValidationError> {
        if connection.required_slots == 0 {
            return Err(ValidationError::ZeroRequiredSlots(connection.id.clone()));
        }

        if connection.path.is_empty() {
            return Err(ValidationError::EmptyPath(connection.id.clone()));
        }

        let mut seen: HashSet<&LinkId> = HashSet::new();
        for link in &connection.path {
            if !links.contains_key(link) {
                return Err(ValidationError::UnknownLink { connection: connection.id.clone(), link: link.clone() });
            }

            if !seen.insert(link) {
                return Err(ValidationError::RepeatedLink { connection: connection.id.clone(), link: link.clone() });
            }
        }

        match connection.kind {
            ConnectionKind::Candidate => {
                if !connection.occupied.is_empty() {
                    return Err(ValidationError::CandidateWithOccupiedSlots(connection.id.clone()));
                }
            }
            ConnectionKind::Existing => Self::validate_occupied_slots(connection, links)?,
        }

        Ok(())
    }

    fn validate_occupied_slots(connection: &Connection, links: &BTreeMap<LinkId, NetworkLink>) -> Result<(), ValidationError> {
        let mut declared: HashSet<&LinkId> = HashSet::new();

        for (link_id, range) in &connection.occupied {
            if !connection.traverses(link_id) {
                return Err(ValidationError::OccupiedSlotsOffPath { connection: connection.id.clone(), link: link_id.clone() });
            }

            if !declared.insert(link_id) {
                return Err(ValidationError::DuplicateOccupiedSlots { connection: connection.id.clone(), link: link_id.clone() });
            }

            // Path links were checked to exist before the footprint.
            let capacity = links.get(link_id).map(|link| link.capacity).unwrap_or(0);
            if range.last >= capacity {
                return Err(ValidationError::OccupiedOutOfRange {
                    connection: connection.id.clone(),
                    link: link_id.clone(),
                    range: *range,
                    capacity,
                });
            }

            if range.len() != connection.required_slots {
                return Err(ValidationError::OccupiedCountMismatch {
                    connection: connection.id.clone(),
                    link: link_id.clone(),
                    declared: range.len(),
                    required: connection.required_slots,
                });
            }
        }

        if let Some(missing) = connection.path.iter().find(|link| !declared.contains(link)) {
            return Err(ValidationError::MissingOccupiedSlots { connection: connection.id.clone(), link: missing.clone() });
        }

        Ok(())
    }

    fn build_slot_owners(
        links: &BTreeMap<LinkId, NetworkLink>,
        connections: &BTreeMap<ConnectionId, Connection>,
    ) -> Result<BTreeMap<LinkId, Vec<Option<ConnectionId>>>, ValidationError> {
        let mut slot_owners: BTreeMap<LinkId, Vec<Option<ConnectionId>>> =
            links.values().map(|link| (link.id.clone(), vec![None; link.capacity as usize])).collect();

        for connection in connections.values().filter(|c| c.is_existing()) {
            for (link_id, range) in &connection.occupied {
                let Some(owners) = slot_owners.get_mut(link_id) else {
                    continue;
                };

                for slot in range.slots() {
                    let owner = &mut owners[slot as usize];
                    if let Some(first) = owner {
                        return Err(ValidationError::OverlappingOccupancy {
                            link: link_id.clone(),
                            slot,
                            first: first.clone(),
                            second: connection.id.clone(),
                        });
                    }
                    *owner = Some(connection.id.clone());
                }
            }
        }

        Ok(slot_owners)
    }

    pub fn links(&self) -> impl Iterator<Item = &NetworkLink> {
        self.links.values()
    }

    pub fn link(&self, id: &LinkId) -> Option<&NetworkLink> {
        self.links.get(id)
    }

    pub fn capacity(&self, id: &LinkId) -> u32 {
        self.links.get(id).map(|link| link.capacity).unwrap_or(0)
    }

    pub fn max_capacity(&self) -> u32 {
        self.links.values().map(|link| link.capacity).max().unwrap_or(0)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connections present before the reconfiguration (`CE`).
    pub fn existing_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(|c| c.is_existing())
    }

    pub fn candidate_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(|c| !c.is_existing())
    }

    /// Existing connections holding slots on `link` before the reconfiguration (`CE_nl`).
    pub fn existing_on_link<'a>(&'a self, link: &'a LinkId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.existing_connections().filter(move |c| c.traverses(link))
    }

    /// All connections traversing `link` after the reconfiguration (`CAll_nl`).
    pub fn connections_on_link<'a>(&'a self, link: &'a LinkId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.traverses(link))
    }

    pub fn slot_owner(&self, link: &LinkId, slot: u32) -> Option<&ConnectionId> {
        self.slot_owners.get(link)?.get(slot as usize)?.as_ref()
    }

    /// Slots of `link` that no existing connection holds before the reconfiguration.
    pub fn free_slots(&self, link: &LinkId) -> Vec<u32> {
        self.slot_owners
            .get(link)
            .map(|owners| owners.iter().enumerate().filter(|(_, owner)| owner.is_none()).map(|(slot, _)| slot as u32).collect())
            .unwrap_or_default()
    }

    /// Number of slots held on `link` before the reconfiguration.
    pub fn preconfigured_load(&self, link: &LinkId) -> u32 {
        self.existing_on_link(link).map(|c| c.required_slots).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(id: &str, capacity: u32) -> NetworkLink {
        NetworkLink::new(LinkId::new(id), capacity)
    }

    fn existing(id: &str, required: u32, occupied: Vec<(&str, u32, u32)>) -> Connection {
        let path = occupied.iter().map(|(l, _, _)| LinkId::new(*l)).collect();
        let occupied = occupied.into_iter().map(|(l, first, last)| (LinkId::new(l), SlotRange::new(first, last).unwrap())).collect();
        Connection::existing(ConnectionId::new(id), required, path, occupied)
    }

    fn candidate(id: &str, required: u32, path: Vec<&str>) -> Connection {
        Connection::candidate(ConnectionId::new(id), required, path.into_iter().map(LinkId::new).collect())
    }

    #[test]
    fn test_valid_topology_accessors() {
        let topology = NetworkTopology::new(
            vec![link("l1", 10), link("l2", 8)],
            vec![existing("c1", 4, vec![("l1", 0, 3), ("l2", 2, 5)]), candidate("c2", 3, vec!["l1"])],
        )
        .unwrap();

        let l1 = LinkId::new("l1");
        assert_eq!(topology.connection_count(), 2);
        assert_eq!(topology.existing_on_link(&l1).count(), 1);
        assert_eq!(topology.connections_on_link(&l1).count(), 2);
        assert_eq!(topology.preconfigured_load(&l1), 4);
        assert_eq!(topology.free_slots(&l1), vec![4, 5, 6, 7, 8, 9]);
        assert_eq!(topology.slot_owner(&LinkId::new("l2"), 2), Some(&ConnectionId::new("c1")));
        assert_eq!(topology.slot_owner(&LinkId::new("l2"), 1), None);
        assert_eq!(topology.max_capacity(), 10);
    }

    #[test]
    fn test_connections_are_iterated_in_id_order() {
        let topology = NetworkTopology::new(
            vec![link("l1", 10)],
            vec![candidate("c3", 1, vec!["l1"]), candidate("c1", 1, vec!["l1"]), candidate("c2", 1, vec!["l1"])],
        )
        .unwrap();

        let ids: Vec<&str> = topology.connections().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_rejects_zero_required_slots() {
        let result = NetworkTopology::new(vec![link("l1", 10)], vec![candidate("c1", 0, vec!["l1"])]);
        assert_eq!(result.unwrap_err(), ValidationError::ZeroRequiredSlots(ConnectionId::new("c1")));
    }

    #[test]
    fn test_rejects_unknown_link() {
        let result = NetworkTopology::new(vec![link("l1", 10)], vec![candidate("c1", 2, vec!["l9"])]);
        assert!(matches!(result, Err(ValidationError::UnknownLink { .. })));
    }

    #[test]
    fn test_rejects_occupied_count_mismatch() {
        let result = NetworkTopology::new(vec![link("l1", 10)], vec![existing("c1", 4, vec![("l1", 0, 2)])]);
        assert!(matches!(result, Err(ValidationError::OccupiedCountMismatch { declared: 3, required: 4, .. })));
    }

    #[test]
    fn test_rejects_missing_footprint_on_traversed_link() {
        let mut connection = existing("c1", 2, vec![("l1", 0, 1)]);
        connection.path.push(LinkId::new("l2"));

        let result = NetworkTopology::new(vec![link("l1", 10), link("l2", 10)], vec![connection]);
        assert_eq!(result.unwrap_err(), ValidationError::MissingOccupiedSlots { connection: ConnectionId::new("c1"), link: LinkId::new("l2") });
    }

    #[test]
    fn test_rejects_overlapping_existing_connections() {
        let result = NetworkTopology::new(
            vec![link("l1", 10)],
            vec![existing("c1", 4, vec![("l1", 0, 3)]), existing("c2", 2, vec![("l1", 3, 4)])],
        );
        assert!(matches!(result, Err(ValidationError::OverlappingOccupancy { slot: 3, .. })));
    }

    #[test]
    fn test_rejects_occupancy_beyond_capacity() {
        let result = NetworkTopology::new(vec![link("l1", 4)], vec![existing("c1", 2, vec![("l1", 3, 4)])]);
        assert!(matches!(result, Err(ValidationError::OccupiedOutOfRange { capacity: 4, .. })));
    }

    #[test]
    fn test_rejects_duplicates_and_reserved_characters() {
        let duplicate_link = NetworkTopology::new(vec![link("l1", 4), link("l1", 5)], vec![]);
        assert_eq!(duplicate_link.unwrap_err(), ValidationError::DuplicateLink(LinkId::new("l1")));

        let duplicate_connection = NetworkTopology::new(vec![link("l1", 4)], vec![candidate("c1", 1, vec!["l1"]), candidate("c1", 1, vec!["l1"])]);
        assert_eq!(duplicate_connection.unwrap_err(), ValidationError::DuplicateConnection(ConnectionId::new("c1")));

        let reserved = NetworkTopology::new(vec![link("l[1]", 4)], vec![]);
        assert!(matches!(reserved, Err(ValidationError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_rejects_candidate_with_footprint_and_repeated_links() {
        let mut with_footprint = candidate("c1", 2, vec!["l1"]);
        with_footprint.occupied.push((LinkId::new("l1"), SlotRange::new(0, 1).unwrap()));
        let result = NetworkTopology::new(vec![link("l1", 4)], vec![with_footprint]);
        assert_eq!(result.unwrap_err(), ValidationError::CandidateWithOccupiedSlots(ConnectionId::new("c1")));

        let result = NetworkTopology::new(vec![link("l1", 4)], vec![candidate("c1", 2, vec!["l1", "l1"])]);
        assert!(matches!(result, Err(ValidationError::RepeatedLink { .. })));

        let result = NetworkTopology::new(vec![link("l1", 4)], vec![candidate("c1", 2, vec![])]);
        assert_eq!(result.unwrap_err(), ValidationError::EmptyPath(ConnectionId::new("c1")));
    }

    #[test]
    fn test_rejects_zero_and_oversized_capacity() {
        let result = NetworkTopology::new(vec![link("l1", 0)], vec![]);
        assert_eq!(result.unwrap_err(), ValidationError::ZeroCapacity(LinkId::new("l1")));

        let result = NetworkTopology::new(vec![link("l1", u32::MAX)], vec![]);
        assert_eq!(result.unwrap_err(), ValidationError::CapacityTooLarge { link: LinkId::new("l1"), capacity: u32::MAX, max: MAX_LINK_CAPACITY });

        assert!(NetworkTopology::new(vec![link("l1", MAX_LINK_CAPACITY)], vec![]).is_ok());
    }

    #[test]
    fn test_full_width_footprint_is_out_of_range() {
        let result = NetworkTopology::new(vec![link("l1", 10)], vec![existing("c1", 4, vec![("l1", 0, u32::MAX)])]);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::OccupiedOutOfRange {
                connection: ConnectionId::new("c1"),
                link: LinkId::new("l1"),
                range: SlotRange::new(0, u32::MAX).unwrap(),
                capacity: 10,
            }
        );
    }

    #[test]
    fn test_rejects_inverted_slot_range() {
        let dto: ReconfigurationProblemDto = serde_json::from_str(
            r#"{ "links": [{ "id": "l1", "capacity": 10 }],
                 "connections": [{ "id": "c1", "kind": "existing", "requiredSlots": 2, "links": ["l1"],
                                   "occupiedSlots": [{ "link": "l1", "first": 5, "last": 4 }] }] }"#,
        )
        .unwrap();

        let result = NetworkTopology::try_from(dto);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::InvalidSlotRange { connection: ConnectionId::new("c1"), link: LinkId::new("l1"), first: 5, last: 4 }
        );
    }

    #[test]
    fn test_rejects_footprint_off_path() {
        let mut connection = existing("c1", 2, vec![("l1", 0, 1)]);
        connection.occupied.push((LinkId::new("l2"), SlotRange::new(0, 1).unwrap()));

        let result = NetworkTopology::new(vec![link("l1", 10), link("l2", 10)], vec![connection]);
        assert_eq!(result.unwrap_err(), ValidationError::OccupiedSlotsOffPath { connection: ConnectionId::new("c1"), link: LinkId::new("l2") });
    }

    #[test]
    fn test_rejects_second_footprint_on_same_link() {
        let mut connection = existing("c1", 2, vec![("l1", 0, 1)]);
        connection.occupied.push((LinkId::new("l1"), SlotRange::new(4, 5).unwrap()));

        let result = NetworkTopology::new(vec![link("l1", 10)], vec![connection]);
        assert_eq!(result.unwrap_err(), ValidationError::DuplicateOccupiedSlots { connection: ConnectionId::new("c1"), link: LinkId::new("l1") });
    }
}

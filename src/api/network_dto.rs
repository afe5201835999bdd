use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconfigurationProblemDto {
    pub links: Vec<NetworkLinkDto>,
    pub connections: Vec<ConnectionDto>,
}

#[derive(Debug, Deserialize)]
pub struct NetworkLinkDto {
    pub id: String,
    pub capacity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKindDto {
    Existing,
    Candidate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDto {
    pub id: String,
    pub kind: ConnectionKindDto,
    pub required_slots: u32,
    pub links: Vec<String>,
    pub occupied_slots: Option<Vec<OccupiedSlotsDto>>,
}

/// Inclusive slot range held by an existing connection on one link.
#[derive(Debug, Deserialize)]
pub struct OccupiedSlotsDto {
    pub link: String,
    pub first: u32,
    pub last: u32,
}

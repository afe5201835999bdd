use thiserror::Error;

use crate::domain::network::slot_range::SlotRange;
use crate::domain::utils::id::{ConnectionId, LinkId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid topology or demand data: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to build reconfiguration model: {0}")]
    ModelConstruction(#[from] ModelConstructionError),

    #[error("Solver failure: {0}")]
    Solver(#[from] SolverError),

    #[error("Solver output is inconsistent with the model: {0}")]
    Decoding(#[from] DecodingError),

    #[error("Failed to write report: {0}")]
    ReportError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed or inconsistent topology/demand input. Raised before any model is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Identifier '{id}' is invalid: {reason}")]
    InvalidIdentifier { id: String, reason: String },

    #[error("Link '{0}' is declared more than once")]
    DuplicateLink(LinkId),

    #[error("Link '{0}' has a slot capacity of zero")]
    ZeroCapacity(LinkId),

    #[error("Link '{link}' declares {capacity} slots, more than the supported {max}")]
    CapacityTooLarge { link: LinkId, capacity: u32, max: u32 },

    #[error("Connection '{0}' is declared more than once")]
    DuplicateConnection(ConnectionId),

    #[error("Connection '{0}' requires zero slots")]
    ZeroRequiredSlots(ConnectionId),

    #[error("Connection '{0}' does not traverse any link")]
    EmptyPath(ConnectionId),

    #[error("Connection '{connection}' traverses link '{link}' more than once")]
    RepeatedLink { connection: ConnectionId, link: LinkId },

    #[error("Connection '{connection}' references unknown link '{link}'")]
    UnknownLink { connection: ConnectionId, link: LinkId },

    #[error("Candidate connection '{0}' must not declare occupied slots")]
    CandidateWithOccupiedSlots(ConnectionId),

    #[error("Existing connection '{connection}' declares no occupied slots on traversed link '{link}'")]
    MissingOccupiedSlots { connection: ConnectionId, link: LinkId },

    #[error("Existing connection '{connection}' declares occupied slots on link '{link}' more than once")]
    DuplicateOccupiedSlots { connection: ConnectionId, link: LinkId },

    #[error("Existing connection '{connection}' declares occupied slots on link '{link}' which it does not traverse")]
    OccupiedSlotsOffPath { connection: ConnectionId, link: LinkId },

    #[error("Existing connection '{connection}' declares an empty slot range {first}..={last} on link '{link}'")]
    InvalidSlotRange { connection: ConnectionId, link: LinkId, first: u32, last: u32 },

    #[error("Existing connection '{connection}' occupies {declared} slots on link '{link}' but requires {required}")]
    OccupiedCountMismatch { connection: ConnectionId, link: LinkId, declared: u32, required: u32 },

    #[error("Existing connection '{connection}' occupies {range} on link '{link}' which only has {capacity} slots")]
    OccupiedOutOfRange { connection: ConnectionId, link: LinkId, range: SlotRange, capacity: u32 },

    #[error("Slot {slot} on link '{link}' is occupied by both '{first}' and '{second}'")]
    OverlappingOccupancy { link: LinkId, slot: u32, first: ConnectionId, second: ConnectionId },
}

/// Configuration that is inconsistent with the problem instance. Raised before the solver is called.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelConstructionError {
    #[error("Connection '{connection}' requires {required} slots but link '{link}' only has {capacity}")]
    RequirementExceedsCapacity { connection: ConnectionId, link: LinkId, required: u32, capacity: u32 },

    #[error("Flow big-M {big_m} is smaller than the largest link capacity {capacity}")]
    FlowBigMTooSmall { big_m: f64, capacity: u32 },

    #[error("Ordering big-M {big_m} is smaller than the largest possible order gap {required}")]
    OrderBigMTooSmall { big_m: f64, required: f64 },

    #[error("Tie-break weight {weight} must be positive and below {bound} (1/{edge_variables}) so edges never outweigh a disruption; leave it unset to derive one")]
    InvalidTieBreakWeight { weight: f64, edge_variables: usize, bound: f64 },

    #[error("Variable name '{0}' was generated twice")]
    DuplicateVariable(String),
}

/// Failure of the solver backend itself, as opposed to a solver verdict like infeasibility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("Solver '{solver}' failed: {message}")]
    Backend { solver: String, message: String },

    #[error("Solver '{solver}' worker stopped without reporting a result")]
    WorkerDisconnected { solver: String },
}

/// Solver output that violates an invariant the model builder relies on. Always a defect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodingError {
    #[error("Variable '{name}' is missing from the solver output")]
    MissingVariable { name: String },

    #[error("Integer variable '{name}' has fractional value {value} (tolerance {tolerance})")]
    FractionalValue { name: String, value: f64, tolerance: f64 },

    #[error("Variable '{name}' has value {value} outside its bounds [{lower}, {upper}]")]
    OutOfBounds { name: String, value: f64, lower: f64, upper: f64 },

    #[error("Connection '{connection}' holds {actual} slots on link '{link}', expected {expected}")]
    SlotCountMismatch { connection: ConnectionId, link: LinkId, expected: u32, actual: u32 },

    #[error("Connection '{connection}' holds non-contiguous slots {slots:?} on link '{link}'")]
    NonContiguousSlots { connection: ConnectionId, link: LinkId, slots: Vec<u32> },

    #[error("Slot {slot} on link '{link}' is assigned to both '{first}' and '{second}'")]
    SlotConflict { link: LinkId, slot: u32, first: ConnectionId, second: ConnectionId },

    #[error(
        "Connection '{connection}' on link '{link}': carried-over {carried_over} + fresh {fresh} does not match {positional} assigned slots"
    )]
    ReconciliationMismatch { connection: ConnectionId, link: LinkId, carried_over: u32, fresh: u32, positional: u32 },

    #[error("Flow variable '{name}' has value {value} but the slot positions imply {positional}")]
    FlowMismatch { name: String, value: u32, positional: u32 },

    #[error("Transfer '{flow}' is positive but dependency edge '{edge}' is not set")]
    UnlinkedTransfer { flow: String, edge: String },

    #[error("Dependency graph among non-disrupted connections contains a cycle through {connections:?}")]
    CyclicDependency { connections: Vec<ConnectionId> },
}

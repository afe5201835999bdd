pub mod connection;
pub mod network_link;
pub mod slot_range;
pub mod topology;

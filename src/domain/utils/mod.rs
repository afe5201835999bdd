pub mod id;
pub mod report;

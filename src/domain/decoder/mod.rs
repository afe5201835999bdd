pub mod decoder;
pub mod dependency_graph;
pub mod plan;

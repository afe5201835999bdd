pub mod config;
pub mod decoder;
pub mod model;
pub mod network;
pub mod reconfigurator;
pub mod solver;
pub mod utils;

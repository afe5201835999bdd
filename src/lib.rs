use crate::api::network_dto::ReconfigurationProblemDto;
use crate::domain::config::ReconfigurationConfig;
use crate::domain::decoder::plan::ReconfigurationResult;
use crate::domain::network::topology::NetworkTopology;
use crate::domain::reconfigurator::Reconfigurator;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads and validates a problem instance from a JSON file.
pub fn load_topology(file_path: &str) -> Result<NetworkTopology> {
    let root_dto: ReconfigurationProblemDto = parse_json_file::<ReconfigurationProblemDto>(file_path)?;
    log::info!("JSON file '{}' parsed successfully.", file_path);

    let topology = NetworkTopology::try_from(root_dto)?;
    log::info!("Network topology constructed: {} links, {} connections.", topology.links().count(), topology.connection_count());

    Ok(topology)
}

/// Loads an instance and solves it with the bundled solver.
pub fn reconfigure_from_file(file_path: &str, config: ReconfigurationConfig) -> Result<(NetworkTopology, ReconfigurationResult)> {
    let topology = load_topology(file_path)?;
    let result = Reconfigurator::with_default_solver(config).run(&topology)?;

    Ok((topology, result))
}

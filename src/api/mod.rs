pub mod config_dto;
pub mod network_dto;

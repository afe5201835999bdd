pub mod builder;
pub mod config;
pub mod program;
pub mod variable_index;

pub mod microlp_solver;
pub mod solver_mock;
pub mod solver_trait;

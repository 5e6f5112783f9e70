// Operations module - ship jobs and the planning helpers they rely on

pub mod ship;
pub mod navigation;
pub mod jobs;
pub mod mining;
pub mod trading;
pub mod shipyard_operations;
pub mod ship_role_manager;
pub mod job_factory;

pub use ship::*;
pub use navigation::*;
pub use jobs::*;
pub use mining::*;
pub use trading::*;
pub use shipyard_operations::*;
pub use ship_role_manager::*;
pub use job_factory::*;

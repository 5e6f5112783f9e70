// Storage module - in-memory knowledge shared by the job handlers
pub mod system_map;

pub use system_map::*;

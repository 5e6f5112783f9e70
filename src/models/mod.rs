// Models module - API data structures

pub mod ship;
pub mod waypoint;
pub mod market;
pub mod transaction;
pub mod responses;

// Re-export all models for easier imports
pub use ship::*;
pub use waypoint::*;
pub use market::*;
pub use transaction::*;
pub use responses::*;

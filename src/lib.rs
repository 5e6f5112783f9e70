// SpaceTraders Fleet Autopilot Library
// Scheduler-driven ship jobs, fuel-aware routing and rate-limited API access

pub mod models;
pub mod client;
pub mod operations;
pub mod admiral;
pub mod storage;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod telemetry;
pub mod verbosity;

// Re-export commonly used types
pub use models::{
    ship::{Ship, ShipNav, ShipCargo, CargoItem},
    waypoint::Waypoint,
    market::Market,
    responses::*,
};

pub use client::{GameApi, RateThrottler, SpaceTradersClient, ThrottledClient};
pub use admiral::Admiral;
pub use config::AutopilotConfig;
pub use error::{AgentError, AgentResult};
pub use scheduler::{JobQueue, OperatorCommand, Scheduler};
pub use telemetry::{LogTelemetry, TelemetrySink};

// Constants
pub const API_BASE_URL: &str = "https://api.spacetraders.io/v2";
pub const AGENT_TOKEN_FILE: &str = "AGENT_TOKEN";
pub const DEFAULT_CONFIG_FILE: &str = "autopilot.toml";

// Error types shared by the client, planner and scheduler
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scheduler was asked to run with no jobs queued.
    #[error("Scheduler has no jobs - at least one ship must have an assignment")]
    EmptyScheduler,

    #[error("Agent owns no ships")]
    NoShips,
}

impl AgentError {
    /// True for HTTP 429 responses, which are worth retrying after a backoff.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AgentError::Api { status: 429, .. })
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

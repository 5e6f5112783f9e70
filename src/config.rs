use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AgentError, AgentResult};
use crate::v_info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutopilotConfig {
    pub api: ApiConfig,
    pub throttle: ThrottleConfig,
    pub fleet: FleetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the SpaceTraders v2 API
    pub base_url: String,
    /// File holding the agent bearer token
    pub token_file: String,
    /// Page size for paged listings (the API caps this at 20)
    pub page_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Independent quota windows; a call must fit all of them
    pub windows: Vec<ThrottleWindowConfig>,
    /// Retries after an HTTP 429 before the error is surfaced
    pub max_rate_limit_retries: u32,
    /// First backoff after a 429, doubled on each retry
    pub initial_backoff_ms: u64,
    /// Backoff ceiling
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleWindowConfig {
    /// Maximum calls inside one period
    pub quota: usize,
    /// Window length in milliseconds
    pub period_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Waypoint traits a miner will extract from, in preference order. The
    /// nearest site with the first trait found anywhere in the system wins.
    pub deposit_traits: Vec<String>,
    /// Trade goods never picked up for trade routes
    pub excluded_trade_goods: Vec<String>,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: crate::API_BASE_URL.to_string(),
                token_file: crate::AGENT_TOKEN_FILE.to_string(),
                page_limit: 20,
            },
            throttle: ThrottleConfig {
                windows: vec![
                    ThrottleWindowConfig { quota: 2, period_ms: 1_000 },
                    ThrottleWindowConfig { quota: 30, period_ms: 60_000 },
                ],
                max_rate_limit_retries: 3,
                initial_backoff_ms: 1_000,
                max_backoff_ms: 60_000,
            },
            fleet: FleetConfig {
                deposit_traits: crate::models::DEPOSIT_TRAITS.iter().map(|t| t.to_string()).collect(),
                excluded_trade_goods: vec!["FUEL".to_string()],
            },
        }
    }
}

impl AutopilotConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create(config_path: &str) -> AgentResult<Self> {
        if Path::new(config_path).exists() {
            v_info!("📋 Loading configuration from {}", config_path);
            let config_str = fs::read_to_string(config_path)?;
            let config: AutopilotConfig = toml::from_str(&config_str)?;
            Ok(config)
        } else {
            v_info!("📋 Creating default configuration at {}", config_path);
            let config = AutopilotConfig::default();
            config.save(config_path)?;
            v_info!("💡 Edit {} to customize autopilot behavior", config_path);
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &str) -> AgentResult<()> {
        if let Some(parent) = Path::new(config_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let config_str = toml::to_string_pretty(self)?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> AgentResult<()> {
        if self.throttle.windows.is_empty() {
            return Err(invalid("at least one throttle window is required"));
        }
        for window in &self.throttle.windows {
            if window.quota == 0 {
                return Err(invalid("throttle window quota must be greater than 0"));
            }
            if window.period_ms == 0 {
                return Err(invalid("throttle window period_ms must be greater than 0"));
            }
        }
        if self.throttle.initial_backoff_ms > self.throttle.max_backoff_ms {
            return Err(invalid("initial_backoff_ms cannot exceed max_backoff_ms"));
        }
        if self.api.page_limit == 0 || self.api.page_limit > 20 {
            return Err(invalid("page_limit must be between 1 and 20"));
        }
        if self.fleet.deposit_traits.is_empty() {
            return Err(invalid("deposit_traits cannot be empty"));
        }

        v_info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        v_info!("📋 Configuration Summary:");
        v_info!("   🌐 API: {} (page size {})", self.api.base_url, self.api.page_limit);
        for window in &self.throttle.windows {
            v_info!("   ⏱️  Throttle: {} requests / {}ms", window.quota, window.period_ms);
        }
        v_info!("   🔁 429 retries: {} (backoff {}ms → {}ms)",
                self.throttle.max_rate_limit_retries, self.throttle.initial_backoff_ms, self.throttle.max_backoff_ms);
        v_info!("   ⛏️  Deposit traits: {:?}", self.fleet.deposit_traits);
    }
}

fn invalid(message: &str) -> AgentError {
    AgentError::InvalidConfig(message.to_string())
}

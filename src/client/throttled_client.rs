// Throttled API client - every remote call is paced through the RateThrottler
use std::future::Future;
use std::sync::Arc;

use tokio::time::{Duration, sleep};

use crate::client::{GameApi, RateThrottler};
use crate::config::ThrottleConfig;
use crate::error::AgentResult;
use crate::models::*;
use crate::{v_trace, v_warn};

/// How 429 responses are retried. Each retry goes through the throttler again.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self {
            max_retries: config.max_rate_limit_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(60),
        }
    }
}

#[derive(Clone)]
pub struct ThrottledClient {
    api: Arc<dyn GameApi>,
    throttler: Arc<RateThrottler>,
    retry: RetryPolicy,
    page_limit: u32,
}

impl ThrottledClient {
    pub fn new(api: Arc<dyn GameApi>, throttler: Arc<RateThrottler>, retry: RetryPolicy, page_limit: u32) -> Self {
        Self {
            api,
            throttler,
            retry,
            page_limit: page_limit.max(1),
        }
    }

    pub fn throttler(&self) -> &Arc<RateThrottler> {
        &self.throttler
    }

    async fn call<T, F, Fut>(&self, description: &str, mut request: F) -> AgentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AgentResult<T>>,
    {
        let mut backoff = self.retry.initial_backoff;
        let mut attempt = 0;

        loop {
            v_trace!("📋 API: {}", description);
            match self.throttler.throttle(|| request()).await {
                Err(e) if e.is_rate_limited() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    v_warn!("🌐 429 Rate Limited on {} - backing off {:.1}s (retry {}/{})",
                            description, backoff.as_secs_f64(), attempt, self.retry.max_retries);
                    sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, self.retry.max_backoff);
                }
                result => return result,
            }
        }
    }

    pub async fn get_agent(&self) -> AgentResult<Agent> {
        let api = &self.api;
        self.call("get_agent", || api.get_agent()).await
    }

    /// Walk every page of the fleet listing.
    pub async fn get_all_ships(&self) -> AgentResult<Vec<Ship>> {
        let api = &self.api;
        let limit = self.page_limit;
        let mut ships = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.call(&format!("get_ships(page {})", page), || api.get_ships_page(page, limit)).await?;
            let last = batch.is_last();
            ships.extend(batch.data);
            if last {
                break;
            }
            page += 1;
        }

        Ok(ships)
    }

    pub async fn get_ship(&self, ship_symbol: &str) -> AgentResult<Ship> {
        let api = &self.api;
        self.call(&format!("get_ship({})", ship_symbol), || api.get_ship(ship_symbol)).await
    }

    /// Walk every page of a system's waypoint listing.
    pub async fn get_all_system_waypoints(&self, system_symbol: &str) -> AgentResult<Vec<Waypoint>> {
        let api = &self.api;
        let limit = self.page_limit;
        let mut waypoints = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .call(&format!("get_system_waypoints({}, page {})", system_symbol, page), || {
                    api.get_system_waypoints_page(system_symbol, page, limit)
                })
                .await?;
            let last = batch.is_last();
            waypoints.extend(batch.data);
            if last {
                break;
            }
            page += 1;
        }

        Ok(waypoints)
    }

    pub async fn get_market(&self, system_symbol: &str, waypoint_symbol: &str) -> AgentResult<Market> {
        let api = &self.api;
        self.call(&format!("get_market({})", waypoint_symbol), || api.get_market(system_symbol, waypoint_symbol)).await
    }

    pub async fn get_shipyard(&self, system_symbol: &str, waypoint_symbol: &str) -> AgentResult<Shipyard> {
        let api = &self.api;
        self.call(&format!("get_shipyard({})", waypoint_symbol), || api.get_shipyard(system_symbol, waypoint_symbol)).await
    }

    pub async fn navigate_ship(&self, ship_symbol: &str, destination: &str) -> AgentResult<NavigationData> {
        let api = &self.api;
        self.call(&format!("navigate_ship({} -> {})", ship_symbol, destination), || {
            api.navigate_ship(ship_symbol, destination)
        })
        .await
    }

    pub async fn dock_ship(&self, ship_symbol: &str) -> AgentResult<ShipNav> {
        let api = &self.api;
        self.call(&format!("dock_ship({})", ship_symbol), || api.dock_ship(ship_symbol)).await
    }

    pub async fn orbit_ship(&self, ship_symbol: &str) -> AgentResult<ShipNav> {
        let api = &self.api;
        self.call(&format!("orbit_ship({})", ship_symbol), || api.orbit_ship(ship_symbol)).await
    }

    pub async fn create_survey(&self, ship_symbol: &str) -> AgentResult<SurveyData> {
        let api = &self.api;
        self.call(&format!("create_survey({})", ship_symbol), || api.create_survey(ship_symbol)).await
    }

    pub async fn extract_resources(&self, ship_symbol: &str, survey: Option<&Survey>) -> AgentResult<ExtractionData> {
        let api = &self.api;
        let description = match survey {
            Some(s) => format!("extract_resources({}, {})", ship_symbol, s.signature),
            None => format!("extract_resources({})", ship_symbol),
        };
        self.call(&description, || api.extract_resources(ship_symbol, survey)).await
    }

    pub async fn purchase_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> AgentResult<CargoTradeData> {
        let api = &self.api;
        self.call(&format!("purchase_cargo({}, {}, {})", ship_symbol, trade_symbol, units), || {
            api.purchase_cargo(ship_symbol, trade_symbol, units)
        })
        .await
    }

    pub async fn sell_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> AgentResult<CargoTradeData> {
        let api = &self.api;
        self.call(&format!("sell_cargo({}, {}, {})", ship_symbol, trade_symbol, units), || {
            api.sell_cargo(ship_symbol, trade_symbol, units)
        })
        .await
    }

    pub async fn refuel_ship(&self, ship_symbol: &str) -> AgentResult<RefuelData> {
        let api = &self.api;
        self.call(&format!("refuel_ship({})", ship_symbol), || api.refuel_ship(ship_symbol)).await
    }

    pub async fn purchase_ship(&self, ship_type: &str, waypoint_symbol: &str) -> AgentResult<ShipPurchaseData> {
        let api = &self.api;
        self.call(&format!("purchase_ship({} @ {})", ship_type, waypoint_symbol), || {
            api.purchase_ship(ship_type, waypoint_symbol)
        })
        .await
    }
}

// Admiral module - bootstrap the fleet and hand it to the scheduler
use std::fs;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::client::{GameApi, RateThrottler, RetryPolicy, ThrottledClient};
use crate::config::AutopilotConfig;
use crate::error::{AgentError, AgentResult};
use crate::models::Ship;
use crate::operations::{FleetJobFactory, JobContext, JobFactory, RouteOracle};
use crate::scheduler::{OperatorCommand, Scheduler};
use crate::storage::SystemMap;
use crate::telemetry::TelemetrySink;
use crate::{v_info, v_summary, v_warn};

pub struct Admiral {
    ctx: JobContext,
    factory: Arc<dyn JobFactory>,
}

impl Admiral {
    pub fn new(config: &AutopilotConfig, api: Arc<dyn GameApi>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        let throttler = Arc::new(RateThrottler::from_config(&config.throttle));
        let client = ThrottledClient::new(api, throttler, RetryPolicy::from_config(&config.throttle), config.api.page_limit);
        let ctx = JobContext {
            client,
            oracle: Arc::new(RouteOracle::new()),
            system_map: Arc::new(SystemMap::default()),
            telemetry,
        };
        let factory: Arc<dyn JobFactory> = Arc::new(FleetJobFactory::new(ctx.clone(), &config.fleet));
        Self { ctx, factory }
    }

    pub fn context(&self) -> &JobContext {
        &self.ctx
    }

    /// Load agent, fleet and home system, then build the refuel graph.
    pub async fn initialize(&self) -> AgentResult<Vec<Ship>> {
        let client = &self.ctx.client;

        let agent = client.get_agent().await?;
        v_summary!("📊 Agent {} at {} with {} credits", agent.symbol, agent.headquarters, agent.credits);
        self.ctx.telemetry.credits(agent.credits);

        let ships = client.get_all_ships().await?;
        let Some(system_symbol) = ships.first().map(|ship| ship.nav.system_symbol.clone()) else {
            return Err(AgentError::NoShips);
        };

        let waypoints = client.get_all_system_waypoints(&system_symbol).await?;
        v_info!("🗺️  {} has {} waypoints", system_symbol, waypoints.len());
        self.ctx.system_map.replace_waypoints(waypoints);

        for waypoint in self.ctx.system_map.waypoints().iter().filter(|w| w.is_marketplace()) {
            match client.get_market(&system_symbol, &waypoint.symbol).await {
                Ok(market) => self.ctx.system_map.update_market(market),
                Err(e) => v_warn!("⚠️ Could not load market at {}: {}", waypoint.symbol, e),
            }
        }

        self.ctx.oracle.load_refuel_waypoints(&self.ctx.system_map.refuel_waypoints());
        v_info!("⛽ Refuel graph has {} waypoints", self.ctx.oracle.node_count());
        self.ctx.telemetry.fleet(&ships);

        Ok(ships)
    }

    /// A scheduler holding one initial job per ship that has a role.
    pub async fn build_scheduler(
        &self,
        ships: Vec<Ship>,
        commands: UnboundedReceiver<OperatorCommand>,
    ) -> AgentResult<Scheduler> {
        let mut scheduler = Scheduler::new(self.ctx.clone(), Arc::clone(&self.factory), commands);
        for ship in ships {
            scheduler.assign(ship).await?;
        }
        Ok(scheduler)
    }

    pub async fn run(&self, commands: UnboundedReceiver<OperatorCommand>) -> AgentResult<()> {
        let ships = self.initialize().await?;
        let mut scheduler = self.build_scheduler(ships, commands).await?;
        scheduler.run().await
    }
}

pub fn load_agent_token(path: &str) -> AgentResult<String> {
    let token = fs::read_to_string(path)?.trim().to_string();
    if token.is_empty() {
        return Err(AgentError::InvalidConfig(format!("agent token file {} is empty", path)));
    }
    Ok(token)
}

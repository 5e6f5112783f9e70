// Job factory - hands out the next task for a ship that just finished one
use async_trait::async_trait;
use tokio::time::Instant;

use crate::config::FleetConfig;
use crate::error::AgentResult;
use crate::models::{Ship, Waypoint, distance};
use crate::operations::{
    JobContext, MiningJob, PlannedRoute, PurchaseJob, ShipJob, ShipRole, TradeJob, build_trade_routes, classify,
};
use crate::{v_debug, v_info, v_warn};

#[async_trait]
pub trait JobFactory: Send + Sync {
    /// A role-appropriate job, or `None` if the ship has nothing to do.
    async fn assign(&self, ship: &Ship) -> AgentResult<Option<ShipJob>>;

    /// A job that takes the ship to a shipyard selling `ship_type` and buys
    /// one, or `None` if no such shipyard is reachable.
    async fn purchase(&self, ship: &Ship, ship_type: &str) -> AgentResult<Option<ShipJob>>;
}

/// Default factory: miners mine, traders trade, scouts idle.
pub struct FleetJobFactory {
    ctx: JobContext,
    deposit_traits: Vec<String>,
    excluded_trade_goods: Vec<String>,
}

impl FleetJobFactory {
    pub fn new(ctx: JobContext, fleet: &FleetConfig) -> Self {
        Self {
            ctx,
            deposit_traits: fleet.deposit_traits.clone(),
            excluded_trade_goods: fleet.excluded_trade_goods.clone(),
        }
    }

    /// Nearest site carrying the most preferred deposit trait that any
    /// known waypoint has.
    fn mining_job(&self, ship: &Ship) -> Option<ShipJob> {
        let position = ship.position();
        let site = self.deposit_traits.iter().find_map(|deposit| {
            self.ctx
                .system_map
                .deposit_sites(std::slice::from_ref(deposit))
                .into_iter()
                .min_by(|a, b| distance(position, (a.x, a.y)).total_cmp(&distance(position, (b.x, b.y))))
        })?;

        v_info!("⛏️ {} assigned to mine at {}", ship.symbol, site.symbol);
        Some(MiningJob::new(ship.clone(), site.symbol, Instant::now()).into())
    }

    fn trade_job(&self, ship: &Ship) -> Option<ShipJob> {
        let routes = build_trade_routes(
            &self.ctx.system_map.waypoints(),
            &self.ctx.system_map.markets(),
            &self.excluded_trade_goods,
        );
        let position = ship.position();
        let cost = |route: &crate::operations::TradeRoute| {
            distance(position, (route.export_waypoint.x, route.export_waypoint.y)) + route.distance()
        };

        let route = routes
            .into_iter()
            .filter(|route| route.is_possible(ship))
            .min_by(|a, b| cost(a).total_cmp(&cost(b)))?;

        v_info!("📈 {} assigned trade route {} -> {}", ship.symbol,
                route.export_waypoint.symbol, route.import_waypoint.symbol);
        Some(TradeJob::new(ship.clone(), route, Instant::now()).into())
    }
}

#[async_trait]
impl JobFactory for FleetJobFactory {
    async fn assign(&self, ship: &Ship) -> AgentResult<Option<ShipJob>> {
        let job = match classify(ship) {
            ShipRole::Miner => self.mining_job(ship),
            ShipRole::Trader => self.trade_job(ship),
            ShipRole::Scout => {
                v_debug!("🛰️ {} is a scout; no job assigned", ship.symbol);
                return Ok(None);
            }
        };

        if job.is_none() {
            v_warn!("⚠️ No {:?} job available for {}", classify(ship), ship.symbol);
        }
        Ok(job)
    }

    async fn purchase(&self, ship: &Ship, ship_type: &str) -> AgentResult<Option<ShipJob>> {
        let mut best: Option<(PlannedRoute, Waypoint)> = None;

        for waypoint in self.ctx.system_map.shipyards() {
            let shipyard = self.ctx.client.get_shipyard(&waypoint.system_symbol, &waypoint.symbol).await?;
            if !shipyard.sells(ship_type) {
                continue;
            }

            let Some(route) = self.ctx.oracle.shortest_route_for_ship(ship, &waypoint) else {
                v_debug!("🚫 No fuel-feasible route from {} to {}", ship.symbol, waypoint.symbol);
                continue;
            };
            if best.as_ref().is_none_or(|(current, _)| route.length < current.length) {
                best = Some((route, waypoint));
            }
        }

        let Some((route, shipyard)) = best else {
            v_warn!("⚠️ No reachable shipyard sells {} for {}; skipping purchase", ship_type, ship.symbol);
            return Ok(None);
        };

        v_info!("🏭 {} heading to {} to buy {} ({} hops, {:.1} units)", ship.symbol, shipyard.symbol,
                ship_type, route.waypoints.len(), route.length);
        Ok(Some(
            PurchaseJob::new(ship.clone(), route.symbols(), shipyard.symbol, ship_type.to_string(), Instant::now()).into(),
        ))
    }
}

// Trading operations module
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};

use tokio::time::Instant;

use crate::error::AgentResult;
use crate::models::*;
use crate::operations::{JobContext, JobOutcome};
use crate::{v_debug, v_info};

/// Buy goods where they are exported, sell them where they are imported.
#[derive(Debug, Clone)]
pub struct TradeRoute {
    pub export_waypoint: Waypoint,
    pub import_waypoint: Waypoint,
    pub goods: Vec<String>,
}

impl TradeRoute {
    pub fn distance(&self) -> f64 {
        self.export_waypoint.distance_to(&self.import_waypoint)
    }

    /// Whether the ship can fly to the export and on to the import on the
    /// fuel it has right now.
    pub fn is_possible(&self, ship: &Ship) -> bool {
        let to_export = distance(ship.position(), (self.export_waypoint.x, self.export_waypoint.y));
        ship.fuel.current as f64 > to_export + self.distance()
    }
}

impl PartialEq for TradeRoute {
    fn eq(&self, other: &Self) -> bool {
        self.export_waypoint.symbol == other.export_waypoint.symbol
            && self.import_waypoint.symbol == other.import_waypoint.symbol
    }
}

impl Eq for TradeRoute {}

impl Hash for TradeRoute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.export_waypoint.symbol.hash(state);
        self.import_waypoint.symbol.hash(state);
    }
}

/// Every ordered market pair with at least one good flowing from the first
/// to the second, shortest first.
pub fn build_trade_routes(waypoints: &[Waypoint], markets: &[Market], excluded_goods: &[String]) -> Vec<TradeRoute> {
    let by_symbol: HashMap<&str, &Waypoint> = waypoints.iter().map(|w| (w.symbol.as_str(), w)).collect();
    let mut routes = Vec::new();

    for export in markets {
        let Some(export_waypoint) = by_symbol.get(export.symbol.as_str()) else { continue };

        for import in markets {
            if import.symbol == export.symbol {
                continue;
            }
            let Some(import_waypoint) = by_symbol.get(import.symbol.as_str()) else { continue };

            let goods: Vec<String> = export
                .exports
                .iter()
                .filter(|good| !excluded_goods.contains(&good.symbol) && import.imports_good(&good.symbol))
                .map(|good| good.symbol.clone())
                .collect();

            if goods.is_empty() {
                continue;
            }

            routes.push(TradeRoute {
                export_waypoint: (*export_waypoint).clone(),
                import_waypoint: (*import_waypoint).clone(),
                goods,
            });
        }
    }

    routes.sort_by(|a, b| a.distance().total_cmp(&b.distance()));
    v_debug!("📈 Built {} trade routes from {} markets", routes.len(), markets.len());
    routes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeState {
    NotStarted,
    Traveling,
}

#[derive(Debug, Clone)]
pub struct TradeJob {
    pub ship: Ship,
    pub due_at: Instant,
    pub route: TradeRoute,
    pub remaining_waypoints: VecDeque<String>,
    pub accumulated_profit: i64,
    pub state: TradeState,
}

impl TradeJob {
    pub fn new(ship: Ship, route: TradeRoute, due_at: Instant) -> Self {
        Self {
            ship,
            due_at,
            route,
            remaining_waypoints: VecDeque::new(),
            accumulated_profit: 0,
            state: TradeState::NotStarted,
        }
    }

    pub async fn advance(mut self, ctx: &JobContext) -> AgentResult<JobOutcome> {
        match self.state {
            TradeState::NotStarted => {
                self.remaining_waypoints = VecDeque::from([
                    self.route.export_waypoint.symbol.clone(),
                    self.route.import_waypoint.symbol.clone(),
                ]);
                self.state = TradeState::Traveling;
                v_info!("📈 {} starting trade {} -> {} ({:?})", self.ship.symbol,
                        self.route.export_waypoint.symbol, self.route.import_waypoint.symbol, self.route.goods);
            }
            TradeState::Traveling => self.trade_here(ctx).await?,
        }

        match self.remaining_waypoints.pop_front() {
            Some(next) => {
                self.due_at = ctx.ship_ops().travel(&mut self.ship, &next).await?;
                Ok(JobOutcome::Continue(self.into()))
            }
            None => {
                v_info!("💰 {} trade {} -> {} finished with profit {}", self.ship.symbol,
                        self.route.export_waypoint.symbol, self.route.import_waypoint.symbol, self.accumulated_profit);
                ctx.telemetry.ship_event(&self.ship.symbol, &format!("trade profit {}", self.accumulated_profit));
                Ok(JobOutcome::Complete(self.ship))
            }
        }
    }

    /// Run the buy or sell leg for wherever the ship just arrived.
    async fn trade_here(&mut self, ctx: &JobContext) -> AgentResult<()> {
        let here = self.ship.current_waypoint().to_string();
        let is_export = here == self.route.export_waypoint.symbol;
        let is_import = here == self.route.import_waypoint.symbol;
        if !is_export && !is_import {
            return Ok(());
        }

        let ops = ctx.ship_ops();
        ops.dock(&mut self.ship).await?;
        let market = ctx.client.get_market(&self.ship.nav.system_symbol, &here).await?;
        ctx.system_map.update_market(market.clone());

        if is_export {
            self.buy_goods(ctx, &market).await?;
        }
        if is_import {
            let carried: Vec<CargoItem> = self
                .ship
                .cargo
                .inventory
                .iter()
                .filter(|item| item.units > 0 && self.route.goods.contains(&item.symbol))
                .cloned()
                .collect();
            for item in carried {
                self.accumulated_profit += ops.sell(&mut self.ship, Some(&market), &item.symbol, item.units).await?;
            }
        }

        ops.refuel_if_possible(&mut self.ship).await
    }

    async fn buy_goods(&mut self, ctx: &JobContext, market: &Market) -> AgentResult<()> {
        for good in self.route.goods.clone() {
            let free = self.ship.cargo_free();
            if free == 0 {
                break;
            }
            let volume = market.trade_good(&good).map(|g| g.trade_volume).unwrap_or(free);
            let units = free.min(volume);
            if units <= 0 {
                continue;
            }

            let data = ctx.client.purchase_cargo(&self.ship.symbol, &good, units).await?;
            v_info!("🛒 {} bought {} x{} for {} credits", self.ship.symbol, good, units, data.transaction.total_price);
            self.ship.cargo = data.cargo;
            self.accumulated_profit -= data.transaction.total_price as i64;
            ctx.telemetry.credits(data.agent.credits);
        }
        Ok(())
    }
}

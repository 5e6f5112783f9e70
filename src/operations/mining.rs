// Mining operations module
use chrono::Utc;
use tokio::time::{Duration, Instant};

use crate::error::AgentResult;
use crate::models::*;
use crate::operations::{JobContext, JobOutcome, cooldown_instant};
use crate::{v_debug, v_info, v_warn};

/// Retry delay when no known market takes anything in the hold.
const NO_MARKET_RETRY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningState {
    TravelingToResource,
    Surveying,
    Extracting,
    TravelingToMarket,
}

/// Fly to a deposit, survey it, extract until the hold is full, then sell.
#[derive(Debug, Clone)]
pub struct MiningJob {
    pub ship: Ship,
    pub due_at: Instant,
    pub extraction_waypoint: String,
    pub surveys: Option<Vec<Survey>>,
    pub selling_waypoint: Option<String>,
    pub state: MiningState,
}

impl MiningJob {
    pub fn new(ship: Ship, extraction_waypoint: String, due_at: Instant) -> Self {
        Self {
            ship,
            due_at,
            extraction_waypoint,
            surveys: None,
            selling_waypoint: None,
            state: MiningState::TravelingToResource,
        }
    }

    pub async fn advance(mut self, ctx: &JobContext) -> AgentResult<JobOutcome> {
        match self.state {
            MiningState::TravelingToResource => {
                let ops = ctx.ship_ops();
                self.due_at = ops.travel(&mut self.ship, &self.extraction_waypoint).await?;
                self.state = MiningState::Surveying;
            }
            MiningState::Surveying => self.survey(ctx).await?,
            MiningState::Extracting => self.extract(ctx).await?,
            MiningState::TravelingToMarket => {
                if let Some(selling_waypoint) = self.selling_waypoint.clone() {
                    if self.ship.current_waypoint() != selling_waypoint {
                        self.due_at = ctx.ship_ops().travel(&mut self.ship, &selling_waypoint).await?;
                        return Ok(JobOutcome::Continue(self.into()));
                    }
                }
                return self.sell_cargo(ctx).await;
            }
        }

        Ok(JobOutcome::Continue(self.into()))
    }

    async fn survey(&mut self, ctx: &JobContext) -> AgentResult<()> {
        self.state = MiningState::Extracting;

        if !self.ship.has_surveyor() {
            self.surveys = Some(Vec::new());
            self.due_at = Instant::now();
            return Ok(());
        }

        ctx.ship_ops().orbit(&mut self.ship).await?;
        let data = ctx.client.create_survey(&self.ship.symbol).await?;
        v_info!("🔍 {} found {} surveys at {}", self.ship.symbol, data.surveys.len(), self.extraction_waypoint);
        self.surveys = Some(data.surveys);
        self.due_at = cooldown_instant(&data.cooldown);
        Ok(())
    }

    async fn extract(&mut self, ctx: &JobContext) -> AgentResult<()> {
        if self.ship.cargo_full() {
            return self.head_to_market(ctx).await;
        }

        let now = Utc::now();
        let surveys = self.surveys.get_or_insert_with(Vec::new);
        surveys.retain(|survey| !survey.is_expired(now));
        let survey = surveys.first().cloned();

        ctx.ship_ops().orbit(&mut self.ship).await?;
        let data = ctx.client.extract_resources(&self.ship.symbol, survey.as_ref()).await?;
        let extracted = &data.extraction.extraction_yield;
        v_info!("⛏️ {} extracted: {} x{} (Cargo: {}/{})",
                self.ship.symbol, extracted.symbol, extracted.units, data.cargo.units, data.cargo.capacity);
        ctx.telemetry.ship_event(&self.ship.symbol, &format!("extracted {} x{}", extracted.symbol, extracted.units));

        self.ship.cargo = data.cargo;
        self.due_at = cooldown_instant(&data.cooldown);
        Ok(())
    }

    async fn head_to_market(&mut self, ctx: &JobContext) -> AgentResult<()> {
        let Some(market) = select_selling_market(&self.ship, ctx) else {
            v_warn!("⚠️ {} has a full hold but no known market accepts its cargo", self.ship.symbol);
            self.due_at = Instant::now() + NO_MARKET_RETRY;
            return Ok(());
        };

        v_info!("📦 {} cargo full, selling at {}", self.ship.symbol, market.symbol);
        self.due_at = ctx.ship_ops().travel(&mut self.ship, &market.symbol).await?;
        self.selling_waypoint = Some(market.symbol);
        self.state = MiningState::TravelingToMarket;
        Ok(())
    }

    async fn sell_cargo(mut self, ctx: &JobContext) -> AgentResult<JobOutcome> {
        let ops = ctx.ship_ops();
        ops.dock(&mut self.ship).await?;

        let waypoint = self.ship.current_waypoint().to_string();
        let market = ctx.client.get_market(&self.ship.nav.system_symbol, &waypoint).await?;
        ctx.system_map.update_market(market.clone());

        let sellable: Vec<CargoItem> = self
            .ship
            .cargo
            .inventory
            .iter()
            .filter(|item| item.units > 0 && market.accepts(&item.symbol))
            .cloned()
            .collect();

        let mut revenue = 0;
        for item in &sellable {
            revenue += ops.sell(&mut self.ship, Some(&market), &item.symbol, item.units).await?;
        }
        v_info!("💰 {} mining run complete: {} credits from {} goods", self.ship.symbol, revenue, sellable.len());

        ops.refuel_if_possible(&mut self.ship).await?;
        Ok(JobOutcome::Complete(self.ship))
    }
}

/// The market accepting the most units of the ship's cargo, nearest on ties.
pub fn select_selling_market(ship: &Ship, ctx: &JobContext) -> Option<Waypoint> {
    let position = ship.position();
    let mut best: Option<(i32, f64, Waypoint)> = None;

    for market in ctx.system_map.markets() {
        let accepted: i32 = ship
            .cargo
            .inventory
            .iter()
            .filter(|item| market.accepts(&item.symbol))
            .map(|item| item.units)
            .sum();
        if accepted == 0 {
            continue;
        }
        let Some(waypoint) = ctx.system_map.waypoint(&market.symbol) else {
            continue;
        };
        let dist = distance(position, (waypoint.x, waypoint.y));

        let better = match &best {
            None => true,
            Some((units, best_dist, _)) => accepted > *units || (accepted == *units && dist < *best_dist),
        };
        if better {
            best = Some((accepted, dist, waypoint));
        }
    }

    if let Some((units, _, waypoint)) = &best {
        v_debug!("🏪 {} accepts {} of {}'s units", waypoint.symbol, units, ship.symbol);
    }
    best.map(|(_, _, waypoint)| waypoint)
}

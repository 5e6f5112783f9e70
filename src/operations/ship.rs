// Individual ship operations module
use chrono::{DateTime, Utc};
use tokio::time::{Duration, Instant};

use crate::client::ThrottledClient;
use crate::error::AgentResult;
use crate::models::*;
use crate::operations::RouteOracle;
use crate::telemetry::TelemetrySink;
use crate::{v_debug, v_info};

/// Convert an API timestamp (e.g. a route arrival) into a local instant.
/// Past or unparseable timestamps map to "now".
pub fn instant_from_timestamp(timestamp: &str) -> Instant {
    let now = Instant::now();
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(at) => {
            let remaining = at.with_timezone(&Utc) - Utc::now();
            now + remaining.to_std().unwrap_or(Duration::ZERO)
        }
        Err(_) => now,
    }
}

pub fn cooldown_instant(cooldown: &ShipCooldown) -> Instant {
    Instant::now() + Duration::from_secs(cooldown.remaining_seconds.max(0) as u64)
}

/// Dock/orbit/refuel/navigate helpers that keep the local `Ship` copy in
/// sync with what the server reports back.
pub struct ShipOperations<'a> {
    client: &'a ThrottledClient,
    oracle: &'a RouteOracle,
    telemetry: &'a dyn TelemetrySink,
}

impl<'a> ShipOperations<'a> {
    pub fn new(client: &'a ThrottledClient, oracle: &'a RouteOracle, telemetry: &'a dyn TelemetrySink) -> Self {
        Self { client, oracle, telemetry }
    }

    pub async fn orbit(&self, ship: &mut Ship) -> AgentResult<()> {
        if ship.is_docked() {
            ship.nav = self.client.orbit_ship(&ship.symbol).await?;
        }
        Ok(())
    }

    pub async fn dock(&self, ship: &mut Ship) -> AgentResult<()> {
        if !ship.is_docked() {
            ship.nav = self.client.dock_ship(&ship.symbol).await?;
        }
        Ok(())
    }

    /// Top up the tank if the ship sits at a refuel point and isn't full.
    pub async fn refuel_if_possible(&self, ship: &mut Ship) -> AgentResult<()> {
        if ship.fuel.current >= ship.fuel.capacity || !self.oracle.is_refuel_point(ship.current_waypoint()) {
            return Ok(());
        }

        self.dock(ship).await?;
        let data = self.client.refuel_ship(&ship.symbol).await?;
        v_debug!("⛽ {} refueled at {} ({} credits)",
                 ship.symbol, ship.current_waypoint(), data.transaction.total_price);
        ship.fuel = data.fuel;
        self.telemetry.credits(data.agent.credits);
        Ok(())
    }

    /// Start a flight to `destination` and return when it lands. A ship
    /// already there lands immediately.
    pub async fn navigate(&self, ship: &mut Ship, destination: &str) -> AgentResult<Instant> {
        if ship.current_waypoint() == destination {
            return Ok(Instant::now());
        }

        self.orbit(ship).await?;
        let data = self.client.navigate_ship(&ship.symbol, destination).await?;
        ship.nav = data.nav;
        ship.fuel = data.fuel;

        v_info!("🚀 {} departing for {} (arrives {})", ship.symbol, destination, ship.nav.route.arrival);
        self.telemetry.ship_event(&ship.symbol, &format!("navigating to {}", destination));
        Ok(instant_from_timestamp(&ship.nav.route.arrival))
    }

    pub async fn travel(&self, ship: &mut Ship, destination: &str) -> AgentResult<Instant> {
        self.refuel_if_possible(ship).await?;
        self.navigate(ship, destination).await
    }

    /// Sell `units` of a good in chunks no larger than the market's trade
    /// volume. Returns the credits earned.
    pub async fn sell(&self, ship: &mut Ship, market: Option<&Market>, good: &str, units: i32) -> AgentResult<i64> {
        let volume = market
            .and_then(|m| m.trade_good(good))
            .map(|g| g.trade_volume)
            .filter(|v| *v > 0)
            .unwrap_or(units);

        let mut remaining = units;
        let mut revenue = 0i64;
        while remaining > 0 {
            let chunk = remaining.min(volume);
            let data = self.client.sell_cargo(&ship.symbol, good, chunk).await?;
            ship.cargo = data.cargo;
            revenue += data.transaction.total_price as i64;
            remaining -= chunk;
            self.telemetry.credits(data.agent.credits);
        }

        v_info!("💰 {} sold {} x{} for {} credits", ship.symbol, good, units, revenue);
        Ok(revenue)
    }
}

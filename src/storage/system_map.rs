// In-memory knowledge of the home system: waypoints plus last-seen market snapshots
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::models::{Market, Waypoint};
use crate::v_debug;

#[derive(Default)]
struct SystemKnowledge {
    waypoints: HashMap<String, Waypoint>,
    markets: HashMap<String, Market>,
}

/// Shared read-mostly view of the system. Market snapshots are refreshed
/// whenever a ship docks at a market.
#[derive(Default)]
pub struct SystemMap {
    inner: RwLock<SystemKnowledge>,
}

impl SystemMap {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        let waypoints = waypoints.into_iter().map(|w| (w.symbol.clone(), w)).collect();
        Self {
            inner: RwLock::new(SystemKnowledge {
                waypoints,
                markets: HashMap::new(),
            }),
        }
    }

    /// Swap in a fresh waypoint listing. Market snapshots are kept.
    pub fn replace_waypoints(&self, waypoints: Vec<Waypoint>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.waypoints = waypoints.into_iter().map(|w| (w.symbol.clone(), w)).collect();
    }

    pub fn waypoint(&self, symbol: &str) -> Option<Waypoint> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.waypoints.get(symbol).cloned()
    }

    pub fn waypoints(&self) -> Vec<Waypoint> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut waypoints: Vec<Waypoint> = inner.waypoints.values().cloned().collect();
        waypoints.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        waypoints
    }

    pub fn update_market(&self, market: Market) {
        v_debug!("🏪 Market snapshot updated for {}", market.symbol);
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.markets.insert(market.symbol.clone(), market);
    }

    pub fn market(&self, symbol: &str) -> Option<Market> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.markets.get(symbol).cloned()
    }

    pub fn markets(&self) -> Vec<Market> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut markets: Vec<Market> = inner.markets.values().cloned().collect();
        markets.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        markets
    }

    /// Waypoints a ship can refuel at. A known market decides by its FUEL
    /// listing; without a snapshot the MARKETPLACE trait is trusted.
    pub fn refuel_waypoints(&self) -> Vec<Waypoint> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut refuel: Vec<Waypoint> = inner
            .waypoints
            .values()
            .filter(|w| match inner.markets.get(&w.symbol) {
                Some(market) => market.sells_fuel(),
                None => w.is_marketplace(),
            })
            .cloned()
            .collect();
        refuel.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        refuel
    }

    pub fn shipyards(&self) -> Vec<Waypoint> {
        self.waypoints().into_iter().filter(|w| w.is_shipyard()).collect()
    }

    /// Waypoints carrying any of `traits`.
    pub fn deposit_sites(&self, traits: &[String]) -> Vec<Waypoint> {
        self.waypoints()
            .into_iter()
            .filter(|w| traits.iter().any(|t| w.has_trait(t)))
            .collect()
    }
}

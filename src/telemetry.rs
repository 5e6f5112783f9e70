// Telemetry sink - fire-and-forget mirror of credits, fleet and per-ship events
use std::collections::BTreeMap;

use crate::models::Ship;
use crate::operations::{ShipRole, classify};
use crate::{v_debug, v_summary};

/// Receives state updates worth showing to an operator. Calls must not block
/// the scheduler loop.
pub trait TelemetrySink: Send + Sync {
    fn credits(&self, credits: i64);

    fn fleet(&self, ships: &[Ship]);

    fn ship_event(&self, ship_symbol: &str, event: &str);
}

/// Count ships per role.
pub fn fleet_composition(ships: &[Ship]) -> BTreeMap<ShipRole, usize> {
    let mut composition = BTreeMap::new();
    for ship in ships {
        *composition.entry(classify(ship)).or_insert(0) += 1;
    }
    composition
}

/// Telemetry through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn credits(&self, credits: i64) {
        v_summary!("💰 Credits: {}", credits);
    }

    fn fleet(&self, ships: &[Ship]) {
        let composition = fleet_composition(ships);
        let parts: Vec<String> = composition
            .iter()
            .map(|(role, count)| format!("{} {:?}", count, role))
            .collect();
        v_summary!("🚢 Fleet: {} ships ({})", ships.len(), parts.join(", "));
    }

    fn ship_event(&self, ship_symbol: &str, event: &str) {
        v_debug!("📡 {}: {}", ship_symbol, event);
    }
}

// Ship Role Manager - decide what a ship is good for from its registration and mounts
use crate::models::Ship;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShipRole {
    Miner,
    Trader,
    Scout,
}

/// Mounts that can run `extract`. Laser cannons and gas siphons cannot.
const EXTRACTION_MOUNTS: [&str; 2] = ["MINING_LASER", "EXTRACTOR"];

pub fn has_mining_capability(ship: &Ship) -> bool {
    ship.mounts
        .iter()
        .any(|mount| EXTRACTION_MOUNTS.iter().any(|kind| mount.symbol.contains(kind)))
}

/// Mining hardware wins over everything else; satellites and cargo-less
/// hulls scout; the rest haul goods.
pub fn classify(ship: &Ship) -> ShipRole {
    if has_mining_capability(ship) || ship.registration.role == "EXCAVATOR" {
        ShipRole::Miner
    } else if ship.registration.role == "SATELLITE" || ship.cargo.capacity == 0 {
        ShipRole::Scout
    } else {
        ShipRole::Trader
    }
}

use serde::{Deserialize, Serialize};

use crate::models::ship::ShipRouteWaypoint;

/// Traits that mark a waypoint as worth extracting from.
pub const DEPOSIT_TRAITS: [&str; 4] = [
    "COMMON_METAL_DEPOSITS",
    "PRECIOUS_METAL_DEPOSITS",
    "RARE_METAL_DEPOSITS",
    "MINERAL_DEPOSITS",
];

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Waypoint {
    pub symbol: String,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    #[serde(rename = "systemSymbol")]
    pub system_symbol: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub traits: Vec<Trait>,
}

impl Waypoint {
    pub fn has_trait(&self, symbol: &str) -> bool {
        self.traits.iter().any(|t| t.symbol == symbol)
    }

    pub fn is_marketplace(&self) -> bool {
        self.has_trait("MARKETPLACE")
    }

    pub fn is_shipyard(&self) -> bool {
        self.has_trait("SHIPYARD")
    }

    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        distance((self.x, self.y), (other.x, other.y))
    }
}

impl From<&ShipRouteWaypoint> for Waypoint {
    fn from(point: &ShipRouteWaypoint) -> Self {
        Self {
            symbol: point.symbol.clone(),
            waypoint_type: point.waypoint_type.clone(),
            system_symbol: point.system_symbol.clone(),
            x: point.x,
            y: point.y,
            traits: Vec::new(),
        }
    }
}

/// Euclidean distance between two integer coordinates.
pub fn distance(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    (dx * dx + dy * dy).sqrt()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Trait {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

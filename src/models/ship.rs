use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Ship {
    pub symbol: String,
    pub registration: ShipRegistration,
    pub nav: ShipNav,
    #[serde(default)]
    pub mounts: Vec<ShipMount>,
    pub cargo: ShipCargo,
    pub fuel: ShipFuel,
}

impl Ship {
    /// Where the ship is (or will be once its current flight lands).
    pub fn current_waypoint(&self) -> &str {
        &self.nav.route.destination.symbol
    }

    pub fn position(&self) -> (i32, i32) {
        (self.nav.route.destination.x, self.nav.route.destination.y)
    }

    pub fn is_docked(&self) -> bool {
        self.nav.status == "DOCKED"
    }

    pub fn has_surveyor(&self) -> bool {
        self.mounts.iter().any(|m| m.symbol.contains("SURVEYOR"))
    }

    pub fn cargo_free(&self) -> i32 {
        (self.cargo.capacity - self.cargo.units).max(0)
    }

    pub fn cargo_full(&self) -> bool {
        self.cargo.units >= self.cargo.capacity
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipRegistration {
    pub name: String,
    #[serde(rename = "factionSymbol")]
    pub faction_symbol: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipNav {
    #[serde(rename = "systemSymbol")]
    pub system_symbol: String,
    #[serde(rename = "waypointSymbol")]
    pub waypoint_symbol: String,
    pub route: ShipRoute,
    pub status: String,
    #[serde(rename = "flightMode")]
    pub flight_mode: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipRoute {
    pub destination: ShipRouteWaypoint,
    pub origin: ShipRouteWaypoint,
    #[serde(rename = "departureTime")]
    pub departure_time: String,
    pub arrival: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipRouteWaypoint {
    pub symbol: String,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    #[serde(rename = "systemSymbol")]
    pub system_symbol: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipMount {
    pub symbol: String,
    pub name: String,
    pub strength: Option<i32>,
    pub deposits: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipCooldown {
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "totalSeconds")]
    pub total_seconds: i32,
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: i32,
    pub expiration: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipCargo {
    pub capacity: i32,
    pub units: i32,
    pub inventory: Vec<CargoItem>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CargoItem {
    pub symbol: String,
    pub name: String,
    pub units: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipFuel {
    pub current: i32,
    pub capacity: i32,
}

// Navigation-related structures
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NavigationData {
    pub fuel: ShipFuel,
    pub nav: ShipNav,
}

// Shipyard-related structures
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Shipyard {
    pub symbol: String,
    #[serde(rename = "shipTypes")]
    pub ship_types: Vec<ShipyardShipType>,
    #[serde(rename = "modificationsFee", default)]
    pub modifications_fee: i32,
}

impl Shipyard {
    pub fn sells(&self, ship_type: &str) -> bool {
        self.ship_types.iter().any(|t| t.ship_type == ship_type)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipyardShipType {
    #[serde(rename = "type")]
    pub ship_type: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipPurchaseData {
    pub agent: Agent,
    pub ship: Ship,
    pub transaction: ShipPurchaseTransaction,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipPurchaseTransaction {
    #[serde(rename = "waypointSymbol")]
    pub waypoint_symbol: String,
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "shipType")]
    pub ship_type: String,
    pub price: i32,
    pub timestamp: String,
}

// Agent structure (ship-related context)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Agent {
    #[serde(rename = "accountId", default)]
    pub account_id: String,
    pub symbol: String,
    pub headquarters: String,
    pub credits: i64,
    #[serde(rename = "startingFaction", default)]
    pub starting_faction: String,
    #[serde(rename = "shipCount", default)]
    pub ship_count: i32,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Mining and Survey structures
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Survey {
    pub signature: String,
    pub symbol: String,
    pub deposits: Vec<SurveyDeposit>,
    pub expiration: String,
    pub size: String,
}

impl Survey {
    /// Unparseable expirations count as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc3339(&self.expiration) {
            Ok(expiration) => expiration.with_timezone(&Utc) <= now,
            Err(_) => true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SurveyDeposit {
    pub symbol: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SurveyData {
    pub cooldown: crate::models::ShipCooldown,
    pub surveys: Vec<Survey>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractionData {
    pub cooldown: crate::models::ShipCooldown,
    pub extraction: ExtractionResult,
    pub cargo: crate::models::ShipCargo,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractionResult {
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "yield")]
    pub extraction_yield: ExtractionYield,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractionYield {
    pub symbol: String,
    pub units: i32,
}

// Refueling structures
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefuelData {
    pub agent: crate::models::Agent,
    pub fuel: crate::models::ShipFuel,
    pub transaction: RefuelTransaction,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefuelTransaction {
    #[serde(rename = "waypointSymbol")]
    pub waypoint_symbol: String,
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "totalPrice")]
    pub total_price: i32,
    pub units: i32,
    pub timestamp: String,
}

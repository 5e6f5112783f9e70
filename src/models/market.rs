use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Market {
    pub symbol: String,
    pub exports: Vec<TradeGood>,
    pub imports: Vec<TradeGood>,
    pub exchange: Vec<TradeGood>,
    #[serde(rename = "tradeGoods")]
    pub trade_goods: Option<Vec<MarketTradeGood>>,
}

impl Market {
    pub fn exports_good(&self, symbol: &str) -> bool {
        self.exports.iter().any(|g| g.symbol == symbol)
    }

    pub fn imports_good(&self, symbol: &str) -> bool {
        self.imports.iter().any(|g| g.symbol == symbol)
    }

    /// A market accepts a good for selling if it imports or exchanges it.
    pub fn accepts(&self, symbol: &str) -> bool {
        self.imports_good(symbol) || self.exchange.iter().any(|g| g.symbol == symbol)
    }

    pub fn sells_fuel(&self) -> bool {
        self.exports_good("FUEL") || self.exchange.iter().any(|g| g.symbol == "FUEL")
    }

    /// Live listing for a good; only present when a ship is at the market.
    pub fn trade_good(&self, symbol: &str) -> Option<&MarketTradeGood> {
        self.trade_goods
            .as_ref()
            .and_then(|goods| goods.iter().find(|g| g.symbol == symbol))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TradeGood {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketTradeGood {
    pub symbol: String,
    #[serde(rename = "tradeVolume")]
    pub trade_volume: i32,
    pub supply: String,
    #[serde(rename = "purchasePrice")]
    pub purchase_price: i32,
    #[serde(rename = "sellPrice")]
    pub sell_price: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketTransaction {
    #[serde(rename = "waypointSymbol")]
    pub waypoint_symbol: String,
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "tradeSymbol")]
    pub trade_symbol: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub units: i32,
    #[serde(rename = "pricePerUnit")]
    pub price_per_unit: i32,
    #[serde(rename = "totalPrice")]
    pub total_price: i32,
    pub timestamp: String,
}

/// Result of a buy or sell call; both share the same envelope.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CargoTradeData {
    pub agent: crate::models::Agent,
    pub cargo: crate::models::ship::ShipCargo,
    pub transaction: MarketTransaction,
}

// Shared fixtures: an in-memory game server and builders for its data
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};

use spacetraders_autopilot::client::{GameApi, RateThrottler, RetryPolicy, ThrottledClient};
use spacetraders_autopilot::error::{AgentError, AgentResult};
use spacetraders_autopilot::models::*;
use spacetraders_autopilot::operations::{JobContext, RouteOracle};
use spacetraders_autopilot::storage::SystemMap;
use spacetraders_autopilot::telemetry::TelemetrySink;

pub const SYSTEM: &str = "X1-TEST";
pub const BUY_PRICE: i32 = 10;
pub const SELL_PRICE: i32 = 20;
pub const TRADE_VOLUME: i32 = 10;
pub const EXTRACT_YIELD: i32 = 10;

pub fn waypoint(symbol: &str, x: i32, y: i32, traits: &[&str]) -> Waypoint {
    Waypoint {
        symbol: symbol.to_string(),
        waypoint_type: "PLANET".to_string(),
        system_symbol: SYSTEM.to_string(),
        x,
        y,
        traits: traits
            .iter()
            .map(|t| Trait {
                symbol: t.to_string(),
                name: t.to_string(),
                description: String::new(),
            })
            .collect(),
    }
}

pub fn route_point(at: &Waypoint) -> ShipRouteWaypoint {
    ShipRouteWaypoint {
        symbol: at.symbol.clone(),
        waypoint_type: at.waypoint_type.clone(),
        system_symbol: at.system_symbol.clone(),
        x: at.x,
        y: at.y,
    }
}

pub fn mount(symbol: &str) -> ShipMount {
    ShipMount {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        strength: Some(1),
        deposits: None,
    }
}

/// A hauler in orbit at `at` with 40 cargo and a full 100-unit tank.
pub fn ship(symbol: &str, at: &Waypoint) -> Ship {
    Ship {
        symbol: symbol.to_string(),
        registration: ShipRegistration {
            name: symbol.to_string(),
            faction_symbol: "COSMIC".to_string(),
            role: "HAULER".to_string(),
        },
        nav: ShipNav {
            system_symbol: SYSTEM.to_string(),
            waypoint_symbol: at.symbol.clone(),
            route: ShipRoute {
                destination: route_point(at),
                origin: route_point(at),
                departure_time: Utc::now().to_rfc3339(),
                arrival: Utc::now().to_rfc3339(),
            },
            status: "IN_ORBIT".to_string(),
            flight_mode: "CRUISE".to_string(),
        },
        mounts: Vec::new(),
        cargo: ShipCargo {
            capacity: 40,
            units: 0,
            inventory: Vec::new(),
        },
        fuel: ShipFuel {
            current: 100,
            capacity: 100,
        },
    }
}

pub fn miner(symbol: &str, at: &Waypoint) -> Ship {
    let mut miner = ship(symbol, at);
    miner.registration.role = "EXCAVATOR".to_string();
    miner.mounts = vec![mount("MOUNT_MINING_LASER_I"), mount("MOUNT_SURVEYOR_I")];
    miner.cargo.capacity = 20;
    miner
}

fn goods(symbols: &[&str]) -> Vec<TradeGood> {
    symbols
        .iter()
        .map(|s| TradeGood {
            symbol: s.to_string(),
            name: s.to_string(),
            description: String::new(),
        })
        .collect()
}

/// A market snapshot; every listed good trades at the fixture prices.
pub fn market(symbol: &str, exports: &[&str], imports: &[&str], exchange: &[&str]) -> Market {
    let trade_goods = exports
        .iter()
        .chain(imports)
        .chain(exchange)
        .map(|s| MarketTradeGood {
            symbol: s.to_string(),
            trade_volume: TRADE_VOLUME,
            supply: "MODERATE".to_string(),
            purchase_price: BUY_PRICE,
            sell_price: SELL_PRICE,
        })
        .collect();

    Market {
        symbol: symbol.to_string(),
        exports: goods(exports),
        imports: goods(imports),
        exchange: goods(exchange),
        trade_goods: Some(trade_goods),
    }
}

fn api_error(status: u16, body: &str) -> AgentError {
    AgentError::Api {
        status,
        body: body.to_string(),
    }
}

fn cooldown(ship_symbol: &str, seconds: i32) -> ShipCooldown {
    ShipCooldown {
        ship_symbol: ship_symbol.to_string(),
        total_seconds: seconds,
        remaining_seconds: seconds,
        expiration: Some((Utc::now() + ChronoDuration::seconds(seconds as i64)).to_rfc3339()),
    }
}

fn add_cargo(cargo: &mut ShipCargo, symbol: &str, units: i32) {
    match cargo.inventory.iter_mut().find(|item| item.symbol == symbol) {
        Some(item) => item.units += units,
        None => cargo.inventory.push(CargoItem {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            units,
        }),
    }
    cargo.units += units;
}

fn remove_cargo(cargo: &mut ShipCargo, symbol: &str, units: i32) -> bool {
    let Some(item) = cargo.inventory.iter_mut().find(|item| item.symbol == symbol) else {
        return false;
    };
    if item.units < units {
        return false;
    }
    item.units -= units;
    cargo.units -= units;
    cargo.inventory.retain(|item| item.units > 0);
    true
}

#[derive(Default)]
struct MockState {
    waypoints: Vec<Waypoint>,
    markets: HashMap<String, Market>,
    shipyards: HashMap<String, Shipyard>,
    ships: Vec<Ship>,
    credits: i64,
    calls: Vec<String>,
    failures: VecDeque<u16>,
    purchased: u32,
}

impl MockState {
    fn agent(&self) -> Agent {
        Agent {
            account_id: "account".to_string(),
            symbol: "TESTER".to_string(),
            headquarters: self.waypoints.first().map(|w| w.symbol.clone()).unwrap_or_default(),
            credits: self.credits,
            starting_faction: "COSMIC".to_string(),
            ship_count: self.ships.len() as i32,
        }
    }

    fn ship_mut(&mut self, symbol: &str) -> AgentResult<&mut Ship> {
        self.ships
            .iter_mut()
            .find(|ship| ship.symbol == symbol)
            .ok_or_else(|| api_error(404, "ship not found"))
    }

    fn waypoint(&self, symbol: &str) -> AgentResult<Waypoint> {
        self.waypoints
            .iter()
            .find(|w| w.symbol == symbol)
            .cloned()
            .ok_or_else(|| api_error(404, "waypoint not found"))
    }

    fn market_at(&self, symbol: &str) -> AgentResult<Market> {
        self.markets.get(symbol).cloned().ok_or_else(|| api_error(404, "no market"))
    }
}

/// In-memory game server. Enforces the rules handlers must respect (docked
/// to trade, undocked to fly, enough fuel) and logs every call.
pub struct MockGameApi {
    state: Mutex<MockState>,
}

impl MockGameApi {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self {
            state: Mutex::new(MockState {
                waypoints,
                credits: 100_000,
                ..MockState::default()
            }),
        }
    }

    pub fn with_market(self, market: Market) -> Self {
        self.lock().markets.insert(market.symbol.clone(), market);
        self
    }

    pub fn with_shipyard(self, symbol: &str, ship_types: &[&str]) -> Self {
        let shipyard = Shipyard {
            symbol: symbol.to_string(),
            ship_types: ship_types
                .iter()
                .map(|t| ShipyardShipType { ship_type: t.to_string() })
                .collect(),
            modifications_fee: 0,
        };
        self.lock().shipyards.insert(symbol.to_string(), shipyard);
        self
    }

    pub fn with_ship(self, ship: Ship) -> Self {
        self.lock().ships.push(ship);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Make the next call fail with `status`.
    pub fn fail_next(&self, status: u16) {
        self.lock().failures.push_back(status);
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.lock().waypoints.clone()
    }

    pub fn markets(&self) -> Vec<Market> {
        self.lock().markets.values().cloned().collect()
    }

    pub fn ship(&self, symbol: &str) -> Option<Ship> {
        self.lock().ships.iter().find(|s| s.symbol == symbol).cloned()
    }

    pub fn credits(&self) -> i64 {
        self.lock().credits
    }

    fn record(&self, state: &mut MockState, call: String) -> AgentResult<()> {
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(status) => Err(api_error(status, "scripted failure")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GameApi for MockGameApi {
    async fn get_agent(&self) -> AgentResult<Agent> {
        let mut state = self.lock();
        self.record(&mut state, "get_agent".to_string())?;
        Ok(state.agent())
    }

    async fn get_ships_page(&self, page: u32, limit: u32) -> AgentResult<Page<Ship>> {
        let mut state = self.lock();
        self.record(&mut state, format!("get_ships {}", page))?;
        let start = ((page - 1) * limit) as usize;
        let data: Vec<Ship> = state.ships.iter().skip(start).take(limit as usize).cloned().collect();
        Ok(Page {
            data,
            meta: PageMeta {
                total: state.ships.len() as u32,
                page,
                limit,
            },
        })
    }

    async fn get_ship(&self, ship_symbol: &str) -> AgentResult<Ship> {
        let mut state = self.lock();
        self.record(&mut state, format!("get_ship {}", ship_symbol))?;
        Ok(state.ship_mut(ship_symbol)?.clone())
    }

    async fn get_system_waypoints_page(
        &self,
        system_symbol: &str,
        page: u32,
        limit: u32,
    ) -> AgentResult<Page<Waypoint>> {
        let mut state = self.lock();
        self.record(&mut state, format!("get_waypoints {} {}", system_symbol, page))?;
        let start = ((page - 1) * limit) as usize;
        let data: Vec<Waypoint> = state.waypoints.iter().skip(start).take(limit as usize).cloned().collect();
        Ok(Page {
            data,
            meta: PageMeta {
                total: state.waypoints.len() as u32,
                page,
                limit,
            },
        })
    }

    async fn get_market(&self, _system_symbol: &str, waypoint_symbol: &str) -> AgentResult<Market> {
        let mut state = self.lock();
        self.record(&mut state, format!("get_market {}", waypoint_symbol))?;
        state.market_at(waypoint_symbol)
    }

    async fn get_shipyard(&self, _system_symbol: &str, waypoint_symbol: &str) -> AgentResult<Shipyard> {
        let mut state = self.lock();
        self.record(&mut state, format!("get_shipyard {}", waypoint_symbol))?;
        state
            .shipyards
            .get(waypoint_symbol)
            .cloned()
            .ok_or_else(|| api_error(404, "no shipyard"))
    }

    async fn navigate_ship(&self, ship_symbol: &str, waypoint_symbol: &str) -> AgentResult<NavigationData> {
        let mut state = self.lock();
        self.record(&mut state, format!("navigate {} {}", ship_symbol, waypoint_symbol))?;
        let target = state.waypoint(waypoint_symbol)?;
        let ship = state.ship_mut(ship_symbol)?;

        if ship.is_docked() {
            return Err(api_error(400, "ship is docked"));
        }
        let dist = distance(ship.position(), (target.x, target.y));
        let cost = dist.ceil() as i32;
        if ship.fuel.capacity > 0 {
            if cost > ship.fuel.current {
                return Err(api_error(400, "insufficient fuel"));
            }
            ship.fuel.current -= cost;
        }

        let now = Utc::now();
        ship.nav.route.origin = ship.nav.route.destination.clone();
        ship.nav.route.destination = route_point(&target);
        ship.nav.route.departure_time = now.to_rfc3339();
        ship.nav.route.arrival = (now + ChronoDuration::seconds(dist.ceil().max(1.0) as i64)).to_rfc3339();
        ship.nav.waypoint_symbol = target.symbol.clone();
        ship.nav.status = "IN_TRANSIT".to_string();

        Ok(NavigationData {
            fuel: ship.fuel.clone(),
            nav: ship.nav.clone(),
        })
    }

    async fn dock_ship(&self, ship_symbol: &str) -> AgentResult<ShipNav> {
        let mut state = self.lock();
        self.record(&mut state, format!("dock {}", ship_symbol))?;
        let ship = state.ship_mut(ship_symbol)?;
        ship.nav.status = "DOCKED".to_string();
        Ok(ship.nav.clone())
    }

    async fn orbit_ship(&self, ship_symbol: &str) -> AgentResult<ShipNav> {
        let mut state = self.lock();
        self.record(&mut state, format!("orbit {}", ship_symbol))?;
        let ship = state.ship_mut(ship_symbol)?;
        ship.nav.status = "IN_ORBIT".to_string();
        Ok(ship.nav.clone())
    }

    async fn create_survey(&self, ship_symbol: &str) -> AgentResult<SurveyData> {
        let mut state = self.lock();
        self.record(&mut state, format!("survey {}", ship_symbol))?;
        let ship = state.ship_mut(ship_symbol)?;
        if ship.is_docked() {
            return Err(api_error(400, "ship is docked"));
        }
        let at = ship.current_waypoint().to_string();
        Ok(SurveyData {
            cooldown: cooldown(ship_symbol, 60),
            surveys: vec![Survey {
                signature: format!("{}-SURVEY", at),
                symbol: at,
                deposits: vec![SurveyDeposit { symbol: "IRON_ORE".to_string() }],
                expiration: (Utc::now() + ChronoDuration::hours(1)).to_rfc3339(),
                size: "SMALL".to_string(),
            }],
        })
    }

    async fn extract_resources(&self, ship_symbol: &str, survey: Option<&Survey>) -> AgentResult<ExtractionData> {
        let mut state = self.lock();
        let call = match survey {
            Some(survey) => format!("extract {} {}", ship_symbol, survey.signature),
            None => format!("extract {}", ship_symbol),
        };
        self.record(&mut state, call)?;
        let ship = state.ship_mut(ship_symbol)?;
        if ship.is_docked() {
            return Err(api_error(400, "ship is docked"));
        }
        let units = EXTRACT_YIELD.min(ship.cargo_free());
        add_cargo(&mut ship.cargo, "IRON_ORE", units);

        Ok(ExtractionData {
            cooldown: cooldown(ship_symbol, 70),
            extraction: ExtractionResult {
                ship_symbol: ship_symbol.to_string(),
                extraction_yield: ExtractionYield {
                    symbol: "IRON_ORE".to_string(),
                    units,
                },
            },
            cargo: ship.cargo.clone(),
        })
    }

    async fn purchase_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> AgentResult<CargoTradeData> {
        let mut state = self.lock();
        self.record(&mut state, format!("buy {} {} {}", ship_symbol, trade_symbol, units))?;
        let at = state.ship_mut(ship_symbol)?.current_waypoint().to_string();
        let market = state.market_at(&at)?;
        if !market.exports_good(trade_symbol) && !market.exchange.iter().any(|g| g.symbol == trade_symbol) {
            return Err(api_error(400, "market does not sell this good"));
        }
        if units > TRADE_VOLUME {
            return Err(api_error(400, "exceeds trade volume"));
        }

        let total_price = units * BUY_PRICE;
        let ship = state.ship_mut(ship_symbol)?;
        if !ship.is_docked() {
            return Err(api_error(400, "ship is not docked"));
        }
        if units > ship.cargo_free() {
            return Err(api_error(400, "not enough cargo space"));
        }
        add_cargo(&mut ship.cargo, trade_symbol, units);
        let cargo = ship.cargo.clone();
        state.credits -= total_price as i64;

        Ok(CargoTradeData {
            agent: state.agent(),
            cargo,
            transaction: MarketTransaction {
                waypoint_symbol: at,
                ship_symbol: ship_symbol.to_string(),
                trade_symbol: trade_symbol.to_string(),
                transaction_type: "PURCHASE".to_string(),
                units,
                price_per_unit: BUY_PRICE,
                total_price,
                timestamp: Utc::now().to_rfc3339(),
            },
        })
    }

    async fn sell_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> AgentResult<CargoTradeData> {
        let mut state = self.lock();
        self.record(&mut state, format!("sell {} {} {}", ship_symbol, trade_symbol, units))?;
        let at = state.ship_mut(ship_symbol)?.current_waypoint().to_string();
        let market = state.market_at(&at)?;
        if !market.accepts(trade_symbol) {
            return Err(api_error(400, "market does not buy this good"));
        }
        if units > TRADE_VOLUME {
            return Err(api_error(400, "exceeds trade volume"));
        }

        let total_price = units * SELL_PRICE;
        let ship = state.ship_mut(ship_symbol)?;
        if !ship.is_docked() {
            return Err(api_error(400, "ship is not docked"));
        }
        if !remove_cargo(&mut ship.cargo, trade_symbol, units) {
            return Err(api_error(400, "not enough cargo"));
        }
        let cargo = ship.cargo.clone();
        state.credits += total_price as i64;

        Ok(CargoTradeData {
            agent: state.agent(),
            cargo,
            transaction: MarketTransaction {
                waypoint_symbol: at,
                ship_symbol: ship_symbol.to_string(),
                trade_symbol: trade_symbol.to_string(),
                transaction_type: "SELL".to_string(),
                units,
                price_per_unit: SELL_PRICE,
                total_price,
                timestamp: Utc::now().to_rfc3339(),
            },
        })
    }

    async fn refuel_ship(&self, ship_symbol: &str) -> AgentResult<RefuelData> {
        let mut state = self.lock();
        self.record(&mut state, format!("refuel {}", ship_symbol))?;
        let ship = state.ship_mut(ship_symbol)?;
        if !ship.is_docked() {
            return Err(api_error(400, "ship is not docked"));
        }
        let units = ship.fuel.capacity - ship.fuel.current;
        ship.fuel.current = ship.fuel.capacity;
        let fuel = ship.fuel.clone();
        let at = ship.current_waypoint().to_string();
        state.credits -= units as i64;

        Ok(RefuelData {
            agent: state.agent(),
            fuel,
            transaction: RefuelTransaction {
                waypoint_symbol: at,
                ship_symbol: ship_symbol.to_string(),
                total_price: units,
                units,
                timestamp: Utc::now().to_rfc3339(),
            },
        })
    }

    async fn purchase_ship(&self, ship_type: &str, waypoint_symbol: &str) -> AgentResult<ShipPurchaseData> {
        let mut state = self.lock();
        self.record(&mut state, format!("purchase_ship {} {}", ship_type, waypoint_symbol))?;
        let sells = state.shipyards.get(waypoint_symbol).is_some_and(|s| s.sells(ship_type));
        if !sells {
            return Err(api_error(400, "shipyard does not sell this type"));
        }
        if !state.ships.iter().any(|s| s.current_waypoint() == waypoint_symbol && s.is_docked()) {
            return Err(api_error(400, "no docked ship at shipyard"));
        }

        let at = state.waypoint(waypoint_symbol)?;
        state.purchased += 1;
        let symbol = format!("TESTER-NEW-{}", state.purchased);
        let mut bought = if ship_type.contains("MINING") { miner(&symbol, &at) } else { ship(&symbol, &at) };
        bought.nav.status = "DOCKED".to_string();
        state.ships.push(bought.clone());
        state.credits -= 1_000;

        Ok(ShipPurchaseData {
            agent: state.agent(),
            ship: bought,
            transaction: ShipPurchaseTransaction {
                waypoint_symbol: waypoint_symbol.to_string(),
                ship_symbol: symbol,
                ship_type: ship_type.to_string(),
                price: 1_000,
                timestamp: Utc::now().to_rfc3339(),
            },
        })
    }
}

/// Telemetry that remembers what it was told.
#[derive(Default)]
pub struct RecordingTelemetry {
    pub credits: Mutex<Vec<i64>>,
    pub fleets: Mutex<Vec<usize>>,
    pub events: Mutex<Vec<String>>,
}

impl TelemetrySink for RecordingTelemetry {
    fn credits(&self, credits: i64) {
        self.credits.lock().unwrap().push(credits);
    }

    fn fleet(&self, ships: &[Ship]) {
        self.fleets.lock().unwrap().push(ships.len());
    }

    fn ship_event(&self, ship_symbol: &str, event: &str) {
        self.events.lock().unwrap().push(format!("{}: {}", ship_symbol, event));
    }
}

pub fn unthrottled_client(api: Arc<MockGameApi>) -> ThrottledClient {
    ThrottledClient::new(api, Arc::new(RateThrottler::new(Vec::new())), RetryPolicy::default(), 20)
}

/// A job context wired to a mock server, with the system map and refuel
/// graph preloaded from the server's waypoints and markets.
pub struct TestRig {
    pub api: Arc<MockGameApi>,
    pub telemetry: Arc<RecordingTelemetry>,
    pub ctx: JobContext,
}

impl TestRig {
    pub fn new(api: MockGameApi) -> Self {
        let api = Arc::new(api);
        let system_map = Arc::new(SystemMap::new(api.waypoints()));
        for market in api.markets() {
            system_map.update_market(market);
        }
        let oracle = Arc::new(RouteOracle::new());
        oracle.load_refuel_waypoints(&system_map.refuel_waypoints());
        let telemetry = Arc::new(RecordingTelemetry::default());

        let ctx = JobContext {
            client: unthrottled_client(Arc::clone(&api)),
            oracle,
            system_map,
            telemetry: telemetry.clone(),
        };
        Self { api, telemetry, ctx }
    }

    /// The server's current view of a ship.
    pub fn ship(&self, symbol: &str) -> Ship {
        self.api.ship(symbol).unwrap()
    }
}

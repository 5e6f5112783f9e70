use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::error::{AgentError, AgentResult};
use crate::models::*;
use crate::v_trace;

/// The remote SpaceTraders operations the autopilot relies on.
///
/// Callers never use this directly from job code; they go through
/// [`crate::client::ThrottledClient`] so that every call is paced.
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn get_agent(&self) -> AgentResult<Agent>;

    async fn get_ships_page(&self, page: u32, limit: u32) -> AgentResult<Page<Ship>>;

    async fn get_ship(&self, ship_symbol: &str) -> AgentResult<Ship>;

    async fn get_system_waypoints_page(
        &self,
        system_symbol: &str,
        page: u32,
        limit: u32,
    ) -> AgentResult<Page<Waypoint>>;

    async fn get_market(&self, system_symbol: &str, waypoint_symbol: &str) -> AgentResult<Market>;

    async fn get_shipyard(&self, system_symbol: &str, waypoint_symbol: &str) -> AgentResult<Shipyard>;

    async fn navigate_ship(&self, ship_symbol: &str, waypoint_symbol: &str) -> AgentResult<NavigationData>;

    async fn dock_ship(&self, ship_symbol: &str) -> AgentResult<ShipNav>;

    async fn orbit_ship(&self, ship_symbol: &str) -> AgentResult<ShipNav>;

    async fn create_survey(&self, ship_symbol: &str) -> AgentResult<SurveyData>;

    async fn extract_resources(&self, ship_symbol: &str, survey: Option<&Survey>) -> AgentResult<ExtractionData>;

    async fn purchase_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> AgentResult<CargoTradeData>;

    async fn sell_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> AgentResult<CargoTradeData>;

    async fn refuel_ship(&self, ship_symbol: &str) -> AgentResult<RefuelData>;

    async fn purchase_ship(&self, ship_type: &str, waypoint_symbol: &str) -> AgentResult<ShipPurchaseData>;
}

#[derive(Clone)]
pub struct SpaceTradersClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpaceTradersClient {
    pub fn new(token: &str, base_url: &str) -> AgentResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AgentError::InvalidConfig("agent token contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(SpaceTradersClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_body(&self, method: &str, path: &str, request: reqwest::RequestBuilder) -> AgentResult<String> {
        v_trace!("🌐 API {} {}", method, path);
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let preview: String = body.chars().take(100).collect();
            v_trace!("🌐 API {} {} -> {} ({})", method, path, status.as_u16(), preview);
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AgentResult<T> {
        let body = self.read_body("GET", path, self.client.get(self.url(path))).await?;
        let envelope: DataResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, page: u32, limit: u32) -> AgentResult<Page<T>> {
        let paged_path = format!("{}?page={}&limit={}", path, page, limit);
        let body = self.read_body("GET", &paged_path, self.client.get(self.url(&paged_path))).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, payload: serde_json::Value) -> AgentResult<T> {
        let request = self.client.post(self.url(path)).json(&payload);
        let body = self.read_body("POST", path, request).await?;
        let envelope: DataResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl GameApi for SpaceTradersClient {
    async fn get_agent(&self) -> AgentResult<Agent> {
        self.get("/my/agent").await
    }

    async fn get_ships_page(&self, page: u32, limit: u32) -> AgentResult<Page<Ship>> {
        self.get_page("/my/ships", page, limit).await
    }

    async fn get_ship(&self, ship_symbol: &str) -> AgentResult<Ship> {
        self.get(&format!("/my/ships/{}", ship_symbol)).await
    }

    async fn get_system_waypoints_page(
        &self,
        system_symbol: &str,
        page: u32,
        limit: u32,
    ) -> AgentResult<Page<Waypoint>> {
        self.get_page(&format!("/systems/{}/waypoints", system_symbol), page, limit).await
    }

    async fn get_market(&self, system_symbol: &str, waypoint_symbol: &str) -> AgentResult<Market> {
        self.get(&format!("/systems/{}/waypoints/{}/market", system_symbol, waypoint_symbol)).await
    }

    async fn get_shipyard(&self, system_symbol: &str, waypoint_symbol: &str) -> AgentResult<Shipyard> {
        self.get(&format!("/systems/{}/waypoints/{}/shipyard", system_symbol, waypoint_symbol)).await
    }

    async fn navigate_ship(&self, ship_symbol: &str, waypoint_symbol: &str) -> AgentResult<NavigationData> {
        let payload = serde_json::json!({ "waypointSymbol": waypoint_symbol });
        self.post(&format!("/my/ships/{}/navigate", ship_symbol), payload).await
    }

    async fn dock_ship(&self, ship_symbol: &str) -> AgentResult<ShipNav> {
        let data: NavData = self.post(&format!("/my/ships/{}/dock", ship_symbol), serde_json::json!({})).await?;
        Ok(data.nav)
    }

    async fn orbit_ship(&self, ship_symbol: &str) -> AgentResult<ShipNav> {
        let data: NavData = self.post(&format!("/my/ships/{}/orbit", ship_symbol), serde_json::json!({})).await?;
        Ok(data.nav)
    }

    async fn create_survey(&self, ship_symbol: &str) -> AgentResult<SurveyData> {
        self.post(&format!("/my/ships/{}/survey", ship_symbol), serde_json::json!({})).await
    }

    async fn extract_resources(&self, ship_symbol: &str, survey: Option<&Survey>) -> AgentResult<ExtractionData> {
        match survey {
            Some(survey) => {
                let payload = serde_json::to_value(survey)?;
                self.post(&format!("/my/ships/{}/extract/survey", ship_symbol), payload).await
            }
            None => self.post(&format!("/my/ships/{}/extract", ship_symbol), serde_json::json!({})).await,
        }
    }

    async fn purchase_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> AgentResult<CargoTradeData> {
        let payload = serde_json::json!({
            "symbol": trade_symbol,
            "units": units
        });
        self.post(&format!("/my/ships/{}/purchase", ship_symbol), payload).await
    }

    async fn sell_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> AgentResult<CargoTradeData> {
        let payload = serde_json::json!({
            "symbol": trade_symbol,
            "units": units
        });
        self.post(&format!("/my/ships/{}/sell", ship_symbol), payload).await
    }

    async fn refuel_ship(&self, ship_symbol: &str) -> AgentResult<RefuelData> {
        self.post(&format!("/my/ships/{}/refuel", ship_symbol), serde_json::json!({})).await
    }

    async fn purchase_ship(&self, ship_type: &str, waypoint_symbol: &str) -> AgentResult<ShipPurchaseData> {
        let payload = serde_json::json!({
            "shipType": ship_type,
            "waypointSymbol": waypoint_symbol
        });
        self.post("/my/ships", payload).await
    }
}

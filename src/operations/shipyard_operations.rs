// Shipyard operations module
use std::collections::VecDeque;

use tokio::time::Instant;

use crate::error::AgentResult;
use crate::models::*;
use crate::operations::{JobContext, JobOutcome};
use crate::v_summary;

/// Fly a ship hop by hop along a precomputed route to a shipyard and buy one
/// ship of the requested type there.
#[derive(Debug, Clone)]
pub struct PurchaseJob {
    pub ship: Ship,
    pub due_at: Instant,
    pub remaining_path_to_shipyard: VecDeque<String>,
    pub shipyard: String,
    pub ship_type_to_buy: String,
}

impl PurchaseJob {
    pub fn new(ship: Ship, path: Vec<String>, shipyard: String, ship_type_to_buy: String, due_at: Instant) -> Self {
        Self {
            ship,
            due_at,
            remaining_path_to_shipyard: path.into(),
            shipyard,
            ship_type_to_buy,
        }
    }

    fn at_shipyard(&self) -> bool {
        self.ship.current_waypoint() == self.shipyard
    }

    pub async fn advance(mut self, ctx: &JobContext) -> AgentResult<JobOutcome> {
        let ops = ctx.ship_ops();

        if !self.at_shipyard() {
            if let Some(next) = self.remaining_path_to_shipyard.pop_front() {
                ops.refuel_if_possible(&mut self.ship).await?;
                self.due_at = ops.navigate(&mut self.ship, &next).await?;
                return Ok(JobOutcome::Continue(self.into()));
            }
        }

        ops.dock(&mut self.ship).await?;
        let data = ctx.client.purchase_ship(&self.ship_type_to_buy, &self.shipyard).await?;
        v_summary!("🎉 {} purchased {} ({}) at {} for {} credits", self.ship.symbol,
                   data.ship.symbol, self.ship_type_to_buy, self.shipyard, data.transaction.price);
        ctx.telemetry.credits(data.agent.credits);
        ctx.telemetry.ship_event(&self.ship.symbol, &format!("bought {}", data.ship.symbol));

        Ok(JobOutcome::Purchased {
            ship: self.ship,
            new_ship: data.ship,
        })
    }
}

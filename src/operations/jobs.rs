// Ship jobs - one active task per ship, advanced one step per dispatch
use std::sync::Arc;

use tokio::time::Instant;

use crate::client::ThrottledClient;
use crate::error::AgentResult;
use crate::models::Ship;
use crate::operations::{MiningJob, PurchaseJob, RouteOracle, ShipOperations, TradeJob};
use crate::storage::SystemMap;
use crate::telemetry::TelemetrySink;

/// Everything a job handler may touch while advancing.
#[derive(Clone)]
pub struct JobContext {
    pub client: ThrottledClient,
    pub oracle: Arc<RouteOracle>,
    pub system_map: Arc<SystemMap>,
    pub telemetry: Arc<dyn TelemetrySink>,
}

impl JobContext {
    pub fn ship_ops(&self) -> ShipOperations<'_> {
        ShipOperations::new(&self.client, &self.oracle, self.telemetry.as_ref())
    }
}

#[derive(Debug, Clone)]
pub enum ShipJob {
    Mining(MiningJob),
    Trade(TradeJob),
    Purchase(PurchaseJob),
}

/// What a dispatch produced for the ship it ran.
#[derive(Debug)]
pub enum JobOutcome {
    /// Same task, next step; re-queue at its due instant.
    Continue(ShipJob),
    /// Task finished; the ship needs a new assignment.
    Complete(Ship),
    /// A purchase finished; both ships need assignments.
    Purchased { ship: Ship, new_ship: Ship },
}

impl ShipJob {
    pub fn ship(&self) -> &Ship {
        match self {
            ShipJob::Mining(job) => &job.ship,
            ShipJob::Trade(job) => &job.ship,
            ShipJob::Purchase(job) => &job.ship,
        }
    }

    pub fn ship_symbol(&self) -> &str {
        &self.ship().symbol
    }

    pub fn due_at(&self) -> Instant {
        match self {
            ShipJob::Mining(job) => job.due_at,
            ShipJob::Trade(job) => job.due_at,
            ShipJob::Purchase(job) => job.due_at,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ShipJob::Mining(_) => "mining",
            ShipJob::Trade(_) => "trade",
            ShipJob::Purchase(_) => "purchase",
        }
    }

    pub async fn advance(self, ctx: &JobContext) -> AgentResult<JobOutcome> {
        match self {
            ShipJob::Mining(job) => job.advance(ctx).await,
            ShipJob::Trade(job) => job.advance(ctx).await,
            ShipJob::Purchase(job) => job.advance(ctx).await,
        }
    }
}

impl From<MiningJob> for ShipJob {
    fn from(job: MiningJob) -> Self {
        ShipJob::Mining(job)
    }
}

impl From<TradeJob> for ShipJob {
    fn from(job: TradeJob) -> Self {
        ShipJob::Trade(job)
    }
}

impl From<PurchaseJob> for ShipJob {
    fn from(job: PurchaseJob) -> Self {
        ShipJob::Purchase(job)
    }
}

//! Job scheduler: one in-memory loop that runs each ship's job when it is due.
//!
//! Jobs are kept in a [`JobQueue`] ordered by due instant. The loop sleeps
//! until the earliest job is due, advances it by one step and re-queues
//! whatever the step produced. Operator commands arrive over an mpsc channel
//! and can interrupt the sleep.
//!
//! Ships the job factory has nothing for are parked as idle and offered to
//! the factory again every [`IDLE_RETRY`], or at once after a refuel graph
//! reload. An empty queue is only fatal when `run` starts.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{Duration, Instant, sleep_until};

use crate::error::{AgentError, AgentResult};
use crate::models::Ship;
use crate::operations::{JobContext, JobFactory, JobOutcome, ShipJob};
use crate::{v_debug, v_info, v_summary, v_warn};

/// How long idle ships wait before the factory is asked again.
pub const IDLE_RETRY: Duration = Duration::from_secs(60);

/// Commands an operator can send to a running scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Buy one ship of this type with the next ship that frees up.
    BuyShip(String),
    /// Rebuild the refuel graph from the current system map.
    ReloadRefuelGraph,
    /// Stop the loop after the current step.
    Stop,
}

/// Pending jobs ordered by due instant, at most one per ship.
///
/// Entries are keyed by `(due_at, seq)`, so two jobs due at the same instant
/// never collide; equal instants pop in insertion order.
#[derive(Debug, Default)]
pub struct JobQueue {
    entries: BTreeMap<(Instant, u64), ShipJob>,
    /// Ship symbol -> key of that ship's entry.
    by_ship: HashMap<String, (Instant, u64)>,
    next_seq: u64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `job`, replacing (and returning) any job already queued for the
    /// same ship.
    pub fn insert(&mut self, job: ShipJob) -> Option<ShipJob> {
        let replaced = self.remove(job.ship_symbol());
        let key = (job.due_at(), self.next_seq);
        self.next_seq += 1;
        self.by_ship.insert(job.ship_symbol().to_string(), key);
        self.entries.insert(key, job);
        replaced
    }

    pub fn remove(&mut self, ship_symbol: &str) -> Option<ShipJob> {
        let key = self.by_ship.remove(ship_symbol)?;
        self.entries.remove(&key)
    }

    /// Due instant of the earliest job.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    pub fn peek(&self) -> Option<&ShipJob> {
        self.entries.values().next()
    }

    pub fn pop(&mut self) -> Option<ShipJob> {
        let (_, job) = self.entries.pop_first()?;
        self.by_ship.remove(job.ship_symbol());
        Some(job)
    }

    pub fn contains(&self, ship_symbol: &str) -> bool {
        self.by_ship.contains_key(ship_symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Jobs in due order.
    pub fn jobs(&self) -> impl Iterator<Item = &ShipJob> {
        self.entries.values()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub struct Scheduler {
    queue: JobQueue,
    ctx: JobContext,
    factory: Arc<dyn JobFactory>,
    commands: UnboundedReceiver<OperatorCommand>,
    commands_open: bool,
    pending_purchase: Option<String>,
    /// Ships the factory had nothing for.
    idle_ships: BTreeMap<String, Ship>,
    idle_retry_at: Option<Instant>,
    dispatched: u64,
}

impl Scheduler {
    pub fn new(ctx: JobContext, factory: Arc<dyn JobFactory>, commands: UnboundedReceiver<OperatorCommand>) -> Self {
        Self {
            queue: JobQueue::new(),
            ctx,
            factory,
            commands,
            commands_open: true,
            pending_purchase: None,
            idle_ships: BTreeMap::new(),
            idle_retry_at: None,
            dispatched: 0,
        }
    }

    /// A scheduler plus the sender half of its command channel.
    pub fn with_channel(ctx: JobContext, factory: Arc<dyn JobFactory>) -> (Self, UnboundedSender<OperatorCommand>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(ctx, factory, receiver), sender)
    }

    pub fn insert(&mut self, job: ShipJob) {
        v_debug!("📅 Queued {} job for {}", job.kind(), job.ship_symbol());
        self.idle_ships.remove(job.ship_symbol());
        if self.idle_ships.is_empty() {
            self.idle_retry_at = None;
        }
        if let Some(replaced) = self.queue.insert(job) {
            v_warn!("⚠️ Replaced pending {} job for {}", replaced.kind(), replaced.ship_symbol());
        }
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn pending_purchase(&self) -> Option<&str> {
        self.pending_purchase.as_deref()
    }

    pub fn idle_ships(&self) -> impl Iterator<Item = &Ship> {
        self.idle_ships.values()
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Ships with a queued job plus idle ships.
    pub fn fleet(&self) -> Vec<Ship> {
        self.queue
            .jobs()
            .map(|job| job.ship().clone())
            .chain(self.idle_ships.values().cloned())
            .collect()
    }

    /// When idle ships are next offered to the factory, if any are idle.
    pub fn idle_retry_at(&self) -> Option<Instant> {
        self.idle_retry_at
    }

    /// Run until stopped. Starting with an empty queue is an error: no ship
    /// has an assignment.
    pub async fn run(&mut self) -> AgentResult<()> {
        if self.queue.is_empty() {
            return Err(AgentError::EmptyScheduler);
        }
        v_summary!("🗓️  Scheduler running with {} jobs", self.queue.len());
        while self.run_once().await? {}
        v_summary!("🛑 Scheduler stopped after {} dispatches", self.dispatched);
        Ok(())
    }

    /// Wait for the earliest job (or idle retry) and run it. Returns `false`
    /// once a stop command has been received. Fails with `EmptyScheduler`
    /// only when there is neither a job nor an idle ship to wait for.
    pub async fn run_once(&mut self) -> AgentResult<bool> {
        loop {
            if self.drain_commands() == Flow::Stop {
                return Ok(false);
            }

            let Some(due) = self.next_wake() else {
                return Err(AgentError::EmptyScheduler);
            };

            if due > Instant::now() {
                if self.wait_until(due).await == Flow::Stop {
                    return Ok(false);
                }
                // A command may have changed what is due; look again.
                continue;
            }

            let job_due = self.queue.next_due().is_some_and(|at| at <= Instant::now());
            let job = if job_due { self.queue.pop() } else { None };
            match job {
                Some(job) => self.dispatch(job).await?,
                None => self.retry_idle_ships().await?,
            }
            return Ok(true);
        }
    }

    fn next_wake(&self) -> Option<Instant> {
        match (self.queue.next_due(), self.idle_retry_at) {
            (Some(job), Some(retry)) => Some(job.min(retry)),
            (job, retry) => job.or(retry),
        }
    }

    async fn wait_until(&mut self, due: Instant) -> Flow {
        if !self.commands_open {
            sleep_until(due).await;
            return Flow::Continue;
        }

        tokio::select! {
            _ = sleep_until(due) => Flow::Continue,
            command = self.commands.recv() => match command {
                Some(command) => self.handle_command(command),
                None => {
                    self.commands_open = false;
                    Flow::Continue
                }
            },
        }
    }

    fn drain_commands(&mut self) -> Flow {
        while self.commands_open {
            match self.commands.try_recv() {
                Ok(command) => {
                    if self.handle_command(command) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.commands_open = false,
            }
        }
        Flow::Continue
    }

    fn handle_command(&mut self, command: OperatorCommand) -> Flow {
        match command {
            OperatorCommand::BuyShip(ship_type) => {
                if let Some(previous) = self.pending_purchase.replace(ship_type.clone()) {
                    v_warn!("⚠️ Pending purchase of {} replaced by {}", previous, ship_type);
                }
                v_summary!("🛒 Will buy a {} with the next free ship", ship_type);
                Flow::Continue
            }
            OperatorCommand::ReloadRefuelGraph => {
                self.ctx.oracle.load_refuel_waypoints(&self.ctx.system_map.refuel_waypoints());
                v_info!("⛽ Refuel graph reloaded ({} waypoints)", self.ctx.oracle.node_count());
                if !self.idle_ships.is_empty() {
                    self.idle_retry_at = Some(Instant::now());
                }
                Flow::Continue
            }
            OperatorCommand::Stop => Flow::Stop,
        }
    }

    async fn dispatch(&mut self, job: ShipJob) -> AgentResult<()> {
        self.dispatched += 1;
        v_debug!("▶️ Dispatching {} job for {}", job.kind(), job.ship_symbol());

        match job.advance(&self.ctx).await? {
            JobOutcome::Continue(next) => self.insert(next),
            JobOutcome::Complete(ship) => self.reassign(ship).await?,
            JobOutcome::Purchased { ship, new_ship } => {
                let new_symbol = new_ship.symbol.clone();
                self.reassign(ship).await?;
                self.assign(new_ship).await?;
                v_info!("🆕 {} joined the fleet", new_symbol);
                self.ctx.telemetry.fleet(&self.fleet());
            }
        }
        Ok(())
    }

    /// Next job for a ship that finished: a pending purchase wins, otherwise
    /// whatever its role calls for.
    async fn reassign(&mut self, ship: Ship) -> AgentResult<()> {
        if let Some(ship_type) = self.pending_purchase.take() {
            if let Some(job) = self.factory.purchase(&ship, &ship_type).await? {
                self.insert(job);
                return Ok(());
            }
        }
        self.assign(ship).await
    }

    /// Ask the factory for a role job; ships without one idle.
    pub async fn assign(&mut self, ship: Ship) -> AgentResult<()> {
        match self.factory.assign(&ship).await? {
            Some(job) => self.insert(job),
            None => {
                v_warn!("💤 {} has no job and will idle", ship.symbol);
                self.idle_ships.insert(ship.symbol.clone(), ship);
                if self.idle_retry_at.is_none() {
                    self.idle_retry_at = Some(Instant::now() + IDLE_RETRY);
                }
            }
        }
        Ok(())
    }

    /// Offer every idle ship to the factory again, topping up fuel first
    /// where the ship sits at a refuel point.
    async fn retry_idle_ships(&mut self) -> AgentResult<()> {
        self.idle_retry_at = None;
        let idle = std::mem::take(&mut self.idle_ships);
        v_debug!("🔁 Retrying {} idle ships", idle.len());

        for (_, mut ship) in idle {
            self.ctx.ship_ops().refuel_if_possible(&mut ship).await?;
            self.assign(ship).await?;
        }
        Ok(())
    }
}

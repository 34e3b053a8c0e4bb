//! Hub actor
//!
//! Runs a [`BroadcastEngine`] inside a single tokio task. Connection tasks
//! talk to it through a cloneable [`HubHandle`]; commands are applied one at
//! a time in arrival order, which is what keeps the engine lock-free.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use crate::error::{Error, Result};
use crate::protocol::LocationReport;
use crate::registry::ConnectionId;
use crate::session::Outbox;
use crate::stats::HubStats;

use super::broadcast::BroadcastEngine;
use super::event::HubEvent;

/// Commands accepted by the hub task
#[derive(Debug)]
pub enum HubCommand {
    /// Apply an inbound event
    Event(HubEvent),
    /// Reply with a statistics snapshot
    GetStats {
        respond_to: oneshot::Sender<HubStats>,
    },
}

/// Handle to communicate with the hub task
#[derive(Debug, Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
    next_connection_id: Arc<AtomicU64>,
}

impl HubHandle {
    /// Allocate a fresh connection id
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_connection_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Report a new channel
    pub async fn connect(&self, id: ConnectionId, outbox: Outbox) -> Result<()> {
        self.send_event(HubEvent::Connect { id, outbox }).await
    }

    /// Report a position message from a channel
    pub async fn report(&self, id: ConnectionId, report: LocationReport) -> Result<()> {
        self.send_event(HubEvent::PositionReport { id, report }).await
    }

    /// Report a channel closure
    pub async fn disconnect(&self, id: ConnectionId) -> Result<()> {
        self.send_event(HubEvent::Disconnect { id }).await
    }

    /// Fetch a statistics snapshot
    pub async fn stats(&self) -> Result<HubStats> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(HubCommand::GetStats { respond_to: tx })
            .await
            .map_err(|_| Error::HubClosed)?;
        rx.await.map_err(|_| Error::HubClosed)
    }

    async fn send_event(&self, event: HubEvent) -> Result<()> {
        self.sender
            .send(HubCommand::Event(event))
            .await
            .map_err(|_| Error::HubClosed)
    }
}

/// Hub task settings
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity of the inbound command queue
    pub queue_capacity: usize,
    /// How often to log statistics (zero disables)
    pub stats_interval: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            stats_interval: Duration::from_secs(60),
        }
    }
}

/// Spawn the hub task
///
/// The task runs until every [`HubHandle`] has been dropped. Must be called
/// from within a tokio runtime.
pub fn spawn(engine: BroadcastEngine, config: HubConfig) -> (HubHandle, JoinHandle<()>) {
    let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));

    let handle = HubHandle {
        sender,
        next_connection_id: Arc::new(AtomicU64::new(1)),
    };

    let ticker = if config.stats_interval.is_zero() {
        None
    } else {
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + config.stats_interval,
            config.stats_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(ticker)
    };

    let task = tokio::spawn(run(engine, receiver, ticker));

    (handle, task)
}

async fn run(
    mut engine: BroadcastEngine,
    mut receiver: mpsc::Receiver<HubCommand>,
    mut ticker: Option<Interval>,
) {
    tracing::debug!("Hub task started");

    loop {
        tokio::select! {
            command = receiver.recv() => match command {
                Some(HubCommand::Event(event)) => engine.handle(event),
                Some(HubCommand::GetStats { respond_to }) => {
                    let _ = respond_to.send(engine.stats());
                }
                None => break,
            },
            _ = next_tick(&mut ticker) => log_stats(&engine.stats()),
        }
    }

    tracing::debug!(live_channels = engine.live_channels(), "Hub task stopped");
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn log_stats(stats: &HubStats) {
    tracing::info!(
        active_connections = stats.active_connections,
        bound_connections = stats.bound_connections,
        present_peers = stats.present_peers,
        position_reports = stats.position_reports,
        rejected_reports = stats.rejected_reports,
        frames_dropped = stats.frames_dropped,
        delivery_rate = stats.delivery_rate(),
        uptime_secs = stats.uptime.as_secs(),
        "Hub stats"
    );
}

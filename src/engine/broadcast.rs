//! Broadcast engine implementation
//!
//! Applies inbound events to the connection registry and presence store and
//! fans the resulting events out to live channels. All handlers are
//! synchronous and run to completion, so a handler always sees both stores
//! in a consistent state.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::presence::PresenceStore;
use crate::protocol::{LocationReport, ServerMessage};
use crate::registry::{ConnectionId, ConnectionRegistry};
use crate::session::{ChannelPhase, ChannelState, Outbound, OutboundFrame, Outbox};
use crate::stats::HubStats;

use super::event::HubEvent;

/// A channel the engine can still reach
struct LiveChannel {
    state: ChannelState,
    outbox: Outbox,
}

/// Event-driven core of the presence hub
///
/// Owns both stores outright; nothing else may mutate them.
pub struct BroadcastEngine {
    registry: ConnectionRegistry,
    presence: PresenceStore,
    channels: BTreeMap<ConnectionId, LiveChannel>,
    stats: HubStats,
    started_at: Instant,
}

impl BroadcastEngine {
    /// Create an engine around the given stores
    pub fn new(registry: ConnectionRegistry, presence: PresenceStore) -> Self {
        Self {
            registry,
            presence,
            channels: BTreeMap::new(),
            stats: HubStats::new(),
            started_at: Instant::now(),
        }
    }

    /// Read access to the connection registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Read access to the presence store
    pub fn presence(&self) -> &PresenceStore {
        &self.presence
    }

    /// Number of live channels
    pub fn live_channels(&self) -> usize {
        self.channels.len()
    }

    /// Phase of a live channel; `None` once closed or if never connected
    pub fn channel_phase(&self, id: ConnectionId) -> Option<ChannelPhase> {
        self.channels.get(&id).map(|channel| channel.state.phase)
    }

    /// Current statistics
    pub fn stats(&self) -> HubStats {
        HubStats {
            active_connections: self.channels.len() as u64,
            bound_connections: self.registry.len() as u64,
            present_peers: self.presence.len() as u64,
            uptime: self.started_at.elapsed(),
            ..self.stats.clone()
        }
    }

    /// Dispatch one inbound event
    pub fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connect { id, outbox } => self.on_connect(id, outbox),
            HubEvent::PositionReport { id, report } => {
                if let Err(e) = self.on_position_report(id, report) {
                    tracing::warn!(
                        connection_id = %id,
                        error = %e,
                        "Position report rejected"
                    );
                }
            }
            HubEvent::Disconnect { id } => self.on_disconnect(id),
        }
    }

    /// A channel connected
    ///
    /// Sends the current presence snapshot to this channel only. Nothing is
    /// sent to the other channels.
    pub fn on_connect(&mut self, id: ConnectionId, outbox: Outbox) {
        let mut catchup = Vec::with_capacity(self.presence.len());

        for (peer, position) in self.presence.snapshot() {
            let message = ServerMessage::location_update(peer.clone(), position);
            match OutboundFrame::encode(&message) {
                Ok(frame) => catchup.push(frame),
                Err(e) => {
                    tracing::error!(peer = %peer, error = %e, "Failed to encode catch-up event");
                }
            }
        }

        let catchup_events = catchup.len();
        if !catchup.is_empty() {
            self.stats.catchup_events += catchup_events as u64;
            deliver(id, &outbox, Outbound::Batch(catchup), &mut self.stats);
        }

        let channel = LiveChannel {
            state: ChannelState::new(id),
            outbox,
        };
        if self.channels.insert(id, channel).is_some() {
            tracing::warn!(connection_id = %id, "Connection id reused, replacing channel");
        }
        self.stats.total_connections += 1;

        tracing::info!(
            connection_id = %id,
            catchup_events = catchup_events,
            live_channels = self.channels.len(),
            "Channel connected"
        );
    }

    /// A channel reported its peer's position
    ///
    /// Binds the channel to the reported identity, stores the position and
    /// broadcasts it to every live channel including the sender. If the
    /// channel was bound to a different identity before, that identity is
    /// removed and its removal broadcast first.
    ///
    /// Invalid reports change nothing and broadcast nothing.
    pub fn on_position_report(&mut self, id: ConnectionId, report: LocationReport) -> Result<()> {
        if !self.channels.contains_key(&id) {
            return Err(Error::UnknownChannel(id));
        }

        let (peer, position) = match report.validate() {
            Ok(valid) => valid,
            Err(e) => {
                self.stats.rejected_reports += 1;
                return Err(e.into());
            }
        };

        if let Some(channel) = self.channels.get_mut(&id) {
            channel.state.record_report();
        }

        match self.registry.bind(id, peer.clone()) {
            Some(previous) if previous != peer => {
                self.presence.remove(&previous);
                let recipients = self.broadcast(&ServerMessage::UserDisconnected(previous.clone()));
                self.stats.removals_broadcast += 1;

                tracing::info!(
                    connection_id = %id,
                    previous = %previous,
                    peer = %peer,
                    recipients = recipients,
                    "Channel rebound, superseded identity removed"
                );
            }
            Some(_) => {}
            None => {
                tracing::info!(connection_id = %id, peer = %peer, "Channel bound");
            }
        }

        self.presence.upsert(peer.clone(), position);
        self.stats.position_reports += 1;

        let recipients = self.broadcast(&ServerMessage::location_update(peer.clone(), position));
        self.stats.updates_broadcast += 1;

        tracing::debug!(
            connection_id = %id,
            peer = %peer,
            latitude = position.latitude,
            longitude = position.longitude,
            recipients = recipients,
            "Position update broadcast"
        );

        Ok(())
    }

    /// A channel's transport closed
    ///
    /// If the channel was bound, its identity is removed from both stores and
    /// every remaining channel is told. An unbound channel leaves silently.
    pub fn on_disconnect(&mut self, id: ConnectionId) {
        let Some(mut channel) = self.channels.remove(&id) else {
            tracing::debug!(connection_id = %id, "Disconnect for unknown channel");
            return;
        };
        channel.state.close();

        let Some(peer) = self.registry.resolve(id).cloned() else {
            tracing::info!(
                connection_id = %id,
                duration_secs = channel.state.duration().as_secs(),
                "Unbound channel disconnected"
            );
            return;
        };

        self.presence.remove(&peer);
        self.registry.unbind(id);

        let still_bound = self.registry.bindings_for(&peer);
        if still_bound > 0 {
            tracing::warn!(
                connection_id = %id,
                peer = %peer,
                still_bound = still_bound,
                "Shared identity removed while other channels still report it"
            );
        }

        let recipients = self.broadcast(&ServerMessage::UserDisconnected(peer.clone()));
        self.stats.removals_broadcast += 1;

        tracing::info!(
            connection_id = %id,
            peer = %peer,
            reports = channel.state.reports,
            duration_secs = channel.state.duration().as_secs(),
            recipients = recipients,
            "Channel disconnected, peer removed"
        );
    }

    /// Send one message to every live channel
    ///
    /// Returns the number of channels the frame was queued for.
    fn broadcast(&mut self, message: &ServerMessage) -> usize {
        let frame = match OutboundFrame::encode(message) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(
                    event = message.event_name(),
                    error = %e,
                    "Failed to encode broadcast"
                );
                return 0;
            }
        };

        let mut recipients = 0;
        for (id, channel) in &self.channels {
            if deliver(*id, &channel.outbox, Outbound::Frame(frame.clone()), &mut self.stats) {
                recipients += 1;
            }
        }
        recipients
    }
}

impl Default for BroadcastEngine {
    fn default() -> Self {
        Self::new(ConnectionRegistry::new(), PresenceStore::new())
    }
}

/// Queue frames for one channel; a failure only affects that channel
fn deliver(id: ConnectionId, outbox: &Outbox, outbound: Outbound, stats: &mut HubStats) -> bool {
    let frames = outbound.len() as u64;

    match outbox.send(outbound) {
        Ok(()) => {
            stats.frames_delivered += frames;
            true
        }
        Err(e) => {
            stats.frames_dropped += frames;
            tracing::debug!(
                connection_id = %id,
                frames = frames,
                error = %e,
                "Dropped outbound frames"
            );
            false
        }
    }
}

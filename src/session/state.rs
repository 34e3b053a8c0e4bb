//! Channel state machine
//!
//! Tracks one channel from connect to transport closure.

use std::time::{Duration, Instant};

use crate::registry::ConnectionId;

/// Channel lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPhase {
    /// Connected, no position report yet
    Unbound,
    /// At least one position report received
    Bound,
    /// Transport closed (terminal)
    Closed,
}

/// Per-channel state held by the engine
#[derive(Debug)]
pub struct ChannelState {
    /// Hub-assigned connection id
    pub id: ConnectionId,

    /// Current phase
    pub phase: ChannelPhase,

    /// Connection start time
    pub connected_at: Instant,

    /// Accepted position reports on this channel
    pub reports: u64,
}

impl ChannelState {
    /// Create a new unbound channel
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            phase: ChannelPhase::Unbound,
            connected_at: Instant::now(),
            reports: 0,
        }
    }

    /// Record an accepted position report
    ///
    /// Moves `Unbound` to `Bound`. A closed channel stays closed and the
    /// report is not counted.
    pub fn record_report(&mut self) {
        match self.phase {
            ChannelPhase::Unbound => self.phase = ChannelPhase::Bound,
            ChannelPhase::Bound => {}
            ChannelPhase::Closed => return,
        }
        self.reports += 1;
    }

    /// Close the channel
    pub fn close(&mut self) {
        self.phase = ChannelPhase::Closed;
    }

    /// Get channel duration
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

//! Statistics for the presence hub

use std::time::Duration;

/// Hub-wide counters
///
/// Maintained by the broadcast engine. Plain integers are enough since only
/// the engine's task ever touches them; readers get a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Total channels ever connected
    pub total_connections: u64,
    /// Currently live channels
    pub active_connections: u64,
    /// Live channels bound to an identity
    pub bound_connections: u64,
    /// Peers in the presence store
    pub present_peers: u64,
    /// Accepted position reports
    pub position_reports: u64,
    /// Position reports rejected by validation
    pub rejected_reports: u64,
    /// Live position updates broadcast
    pub updates_broadcast: u64,
    /// Peer removals broadcast
    pub removals_broadcast: u64,
    /// Catch-up events sent to newly connected channels
    pub catchup_events: u64,
    /// Individual frames queued to a recipient
    pub frames_delivered: u64,
    /// Individual frames dropped (full or closed outbox)
    pub frames_dropped: u64,
    /// Time since the engine was created
    pub uptime: Duration,
}

impl HubStats {
    /// Create zeroed stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of frames that reached a recipient queue (1.0 when idle)
    pub fn delivery_rate(&self) -> f64 {
        let attempted = self.frames_delivered + self.frames_dropped;
        if attempted == 0 {
            1.0
        } else {
            self.frames_delivered as f64 / attempted as f64
        }
    }
}

//! Inbound hub events

use crate::protocol::LocationReport;
use crate::registry::ConnectionId;
use crate::session::Outbox;

/// An event reported by the transport layer
#[derive(Debug)]
pub enum HubEvent {
    /// A new channel is live
    Connect { id: ConnectionId, outbox: Outbox },
    /// A channel sent a `location` message
    PositionReport {
        id: ConnectionId,
        report: LocationReport,
    },
    /// A channel's transport closed
    Disconnect { id: ConnectionId },
}

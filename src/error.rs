//! Crate-level error type

use crate::protocol::ReportError;
use crate::registry::ConnectionId;

/// Errors surfaced by the hub and server
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Socket or listener failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inbound frame was not a valid message
    #[error("Malformed message: {0}")]
    Decode(#[from] serde_json::Error),

    /// Position report failed validation
    #[error("Report rejected: {0}")]
    Rejected(#[from] ReportError),

    /// Event for a channel the engine does not know (never connected or closed)
    #[error("Unknown channel: {0}")]
    UnknownChannel(ConnectionId),

    /// The hub task has stopped
    #[error("Presence hub is no longer running")]
    HubClosed,
}

pub type Result<T> = std::result::Result<T, Error>;

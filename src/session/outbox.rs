//! Per-channel outbound queue
//!
//! The engine never awaits a recipient. Each channel gets a bounded queue;
//! the engine pushes with `try_send` and the connection's writer task drains
//! the queue into the socket. A slow channel fills its own queue and loses
//! events while nobody else is held up.
//!
//! Catch-up is queued as a single [`Outbound::Batch`] so a large presence
//! snapshot occupies one slot no matter how many peers it holds.

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::protocol::ServerMessage;

/// An encoded outbound event
///
/// The JSON is encoded once per broadcast. Clones share the same allocation
/// through `Bytes` reference counting.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    payload: Bytes,
}

impl OutboundFrame {
    /// Encode a server message
    pub fn encode(message: &ServerMessage) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(message)?;
        Ok(Self {
            payload: Bytes::from(payload),
        })
    }

    /// Decode the frame back into a message
    pub fn decode(&self) -> Result<ServerMessage, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    pub fn into_bytes(self) -> Bytes {
        self.payload
    }
}

/// One queue item: a single frame or a catch-up batch
#[derive(Debug, Clone)]
pub enum Outbound {
    Frame(OutboundFrame),
    Batch(Vec<OutboundFrame>),
}

impl Outbound {
    /// Number of frames carried
    pub fn len(&self) -> usize {
        match self {
            Outbound::Frame(_) => 1,
            Outbound::Batch(frames) => frames.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into frames in send order
    pub fn into_frames(self) -> Vec<OutboundFrame> {
        match self {
            Outbound::Frame(frame) => vec![frame],
            Outbound::Batch(frames) => frames,
        }
    }
}

/// Why an outbound send did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// Recipient queue is full
    #[error("Outbox full")]
    Full,
    /// Recipient writer is gone
    #[error("Outbox closed")]
    Closed,
}

/// Sending half of a channel's outbound queue
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::Sender<Outbound>,
}

impl Outbox {
    /// Create an outbox and the receiver its writer drains
    ///
    /// A capacity of zero is raised to one.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue a frame or batch without waiting
    pub fn send(&self, outbound: Outbound) -> Result<(), SendError> {
        self.tx.try_send(outbound).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Closed,
        })
    }
}

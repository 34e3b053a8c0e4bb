//! Channel sessions
//!
//! Per-channel lifecycle state and the outbound queue the engine uses to
//! reach a channel.

pub mod outbox;
pub mod state;

pub use outbox::{Outbound, OutboundFrame, Outbox, SendError};
pub use state::{ChannelPhase, ChannelState};

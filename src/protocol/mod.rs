//! Peer wire protocol

pub mod error;
pub mod message;

pub use error::ReportError;
pub use message::{ClientMessage, LocationReport, PeerId, Position, PositionUpdate, ServerMessage};

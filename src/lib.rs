//! Realtime presence-broadcast hub
//!
//! Peers report their geographic position over a WebSocket channel and the
//! hub fans every update out to all connected peers, keeping a live shared
//! view of who is where.
//!
//! - [`registry`]: which peer identity each channel speaks for
//! - [`presence`]: last-known position per peer
//! - [`engine`]: event handling, ordering and fan-out
//! - [`server`]: axum WebSocket transport and process bootstrap
//!
//! ```no_run
//! use presence_hub::{PresenceServer, ServerConfig};
//!
//! # async fn run() -> presence_hub::Result<()> {
//! let server = PresenceServer::new(ServerConfig::default());
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod presence;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use engine::{BroadcastEngine, HubEvent, HubHandle};
pub use error::{Error, Result};
pub use presence::PresenceStore;
pub use protocol::{ClientMessage, LocationReport, PeerId, Position, ServerMessage};
pub use registry::{ConnectionId, ConnectionRegistry};
pub use server::{PresenceServer, ServerConfig};
pub use stats::HubStats;

//! Broadcast engine
//!
//! Consumes connect, position-report and disconnect events, keeps the
//! connection registry and presence store up to date, and fans outbound
//! events out to live channels.
//!
//! # Architecture
//!
//! ```text
//!   [connection task]   [connection task]   [connection task]
//!          │ HubHandle          │                   │
//!          └──────────┬─────────┴───────────────────┘
//!                     ▼  mpsc<HubCommand> (arrival order)
//!            ┌──────────────────────────┐
//!            │ hub task                 │
//!            │  BroadcastEngine {       │
//!            │    registry,             │
//!            │    presence,             │
//!            │    channels: Outbox..    │
//!            │  }                       │
//!            └───────────┬──────────────┘
//!                        │ try_send (never awaits)
//!         ┌──────────────┼──────────────┐
//!         ▼              ▼              ▼
//!      [writer]       [writer]       [writer] ──► WebSocket
//! ```

pub mod broadcast;
pub mod event;
pub mod hub;

pub use broadcast::BroadcastEngine;
pub use event::HubEvent;
pub use hub::{spawn, HubCommand, HubConfig, HubHandle};

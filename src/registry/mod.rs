//! Connection registry
//!
//! The transport reports channel closure by connection id, never by peer
//! identity. The registry remembers which identity each bound channel speaks
//! for so the engine can resolve "who just left".
//!
//! ```text
//!   ConnectionId ──bind()──► PeerId
//!        │                     ▲
//!        └────resolve()────────┘   (on disconnect)
//! ```

pub mod store;

pub use store::{ConnectionId, ConnectionRegistry};

//! Presence store
//!
//! Holds the hub's belief about where every peer is. Owned and mutated only
//! by the broadcast engine.

pub mod store;

pub use store::PresenceStore;

//! Connection registry implementation
//!
//! Maps hub-assigned connection ids to the peer identity each channel
//! currently speaks for. Entries exist only for bound channels.

use std::collections::HashMap;
use std::fmt;

use crate::protocol::PeerId;

/// Hub-assigned identifier for one transport channel
///
/// Distinct from [`PeerId`]: a peer that reconnects gets a new connection id
/// but keeps its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Bindings from live channels to the identity they last reported under
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    bindings: HashMap<ConnectionId, PeerId>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection to a peer identity
    ///
    /// Overwrites any existing binding. Returns the identity that was bound
    /// before, if any, so the caller can clean up a superseded identity.
    pub fn bind(&mut self, id: ConnectionId, peer: PeerId) -> Option<PeerId> {
        let previous = self.bindings.insert(id, peer);

        tracing::trace!(
            connection_id = %id,
            superseded = ?previous,
            "Connection bound"
        );

        previous
    }

    /// Resolve the identity bound to a connection
    ///
    /// `None` if the connection never sent a position report.
    pub fn resolve(&self, id: ConnectionId) -> Option<&PeerId> {
        self.bindings.get(&id)
    }

    /// Remove a binding. No-op if the connection was never bound.
    pub fn unbind(&mut self, id: ConnectionId) -> Option<PeerId> {
        self.bindings.remove(&id)
    }

    /// Check if a connection is bound
    pub fn is_bound(&self, id: ConnectionId) -> bool {
        self.bindings.contains_key(&id)
    }

    /// Number of connections currently bound to `peer`
    ///
    /// More than one means several channels (e.g. browser tabs) share an
    /// identity and the first of them to disconnect removes the presence.
    pub fn bindings_for(&self, peer: &PeerId) -> usize {
        self.bindings.values().filter(|bound| *bound == peer).count()
    }

    /// Number of bound connections
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if no connection is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: &str) -> PeerId {
        PeerId::new(id).unwrap()
    }

    #[test]
    fn test_bind_and_resolve() {
        let mut registry = ConnectionRegistry::new();
        let conn = ConnectionId::new(1);

        assert!(registry.resolve(conn).is_none());

        assert_eq!(registry.bind(conn, peer("p1")), None);
        assert_eq!(registry.resolve(conn), Some(&peer("p1")));
        assert!(registry.is_bound(conn));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rebind_returns_previous() {
        let mut registry = ConnectionRegistry::new();
        let conn = ConnectionId::new(1);

        registry.bind(conn, peer("p1"));
        let previous = registry.bind(conn, peer("p2"));

        assert_eq!(previous, Some(peer("p1")));
        assert_eq!(registry.resolve(conn), Some(&peer("p2")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_bind_is_idempotent() {
        let mut registry = ConnectionRegistry::new();
        let conn = ConnectionId::new(7);

        registry.bind(conn, peer("p1"));
        assert_eq!(registry.bind(conn, peer("p1")), Some(peer("p1")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unbind() {
        let mut registry = ConnectionRegistry::new();
        let conn = ConnectionId::new(1);

        registry.bind(conn, peer("p1"));
        assert_eq!(registry.unbind(conn), Some(peer("p1")));
        assert!(registry.is_empty());

        // Second unbind is a no-op
        assert_eq!(registry.unbind(conn), None);
    }

    #[test]
    fn test_bindings_for_shared_identity() {
        let mut registry = ConnectionRegistry::new();

        registry.bind(ConnectionId::new(1), peer("shared"));
        registry.bind(ConnectionId::new(2), peer("shared"));
        registry.bind(ConnectionId::new(3), peer("other"));

        assert_eq!(registry.bindings_for(&peer("shared")), 2);
        assert_eq!(registry.bindings_for(&peer("other")), 1);
        assert_eq!(registry.bindings_for(&peer("nobody")), 0);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(42).to_string(), "conn-42");
        assert_eq!(ConnectionId::new(42).get(), 42);
    }
}

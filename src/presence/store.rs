//! Presence store implementation

use std::collections::HashMap;

use crate::protocol::{PeerId, Position};

/// Authoritative map from peer identity to last-known position
#[derive(Debug, Default)]
pub struct PresenceStore {
    entries: HashMap<PeerId, Position>,
}

impl PresenceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a peer's position, replacing any previous one
    ///
    /// Returns the replaced position. There is no merging: the newest report
    /// wins outright.
    pub fn upsert(&mut self, peer: PeerId, position: Position) -> Option<Position> {
        self.entries.insert(peer, position)
    }

    /// Forget a peer. No-op if absent.
    pub fn remove(&mut self, peer: &PeerId) -> Option<Position> {
        self.entries.remove(peer)
    }

    /// Enumerate every current entry
    ///
    /// The iterator is lazy and can be cloned to restart from the beginning.
    /// It borrows the store, so it always reflects the store as it was when
    /// `snapshot` was called.
    pub fn snapshot(&self) -> impl Iterator<Item = (&PeerId, Position)> + Clone + '_ {
        self.entries.iter().map(|(peer, position)| (peer, *position))
    }

    pub fn contains(&self, peer: &PeerId) -> bool {
        self.entries.contains_key(peer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Conversation directory
//!
//! Holds the peer roster and the per-peer unseen-message counters. The
//! directory is populated from fetch snapshots and mutated by the
//! reconciler; nothing else writes to it.

use crate::protocol::Peer;
use std::collections::HashMap;

/// Peer roster plus unseen-counter map
#[derive(Debug, Clone, Default)]
pub struct Directory {
    peers: Vec<Peer>,
    unseen: HashMap<String, u32>,
}

impl Directory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the peer set and the unseen-count snapshot
    ///
    /// Both collections swap in one call so readers never observe a roster
    /// from one snapshot paired with counters from another.
    pub fn replace(&mut self, peers: Vec<Peer>, unseen: HashMap<String, u32>) {
        self.peers = peers;
        self.unseen = unseen;
    }

    /// Zero the unseen counter for a peer
    pub fn clear_unseen(&mut self, peer_id: &str) {
        self.unseen.insert(peer_id.to_string(), 0);
    }

    /// Increment the unseen counter for a peer, creating the entry at 1
    pub fn bump_unseen(&mut self, peer_id: &str) -> u32 {
        let count = self.unseen.entry(peer_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Get the unseen count for a peer (0 when absent)
    pub fn unseen_for(&self, peer_id: &str) -> u32 {
        self.unseen.get(peer_id).copied().unwrap_or(0)
    }

    /// Get a peer by id
    pub fn peer(&self, peer_id: &str) -> Option<&Peer> {
        self.peers.iter().find(|p| p.id == peer_id)
    }

    /// The current peer roster
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// The current unseen-counter map
    pub fn unseen(&self) -> &HashMap<String, u32> {
        &self.unseen
    }
}

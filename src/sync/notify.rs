//! Store-change notification feed
//!
//! The reconciler publishes a change record every time it commits a store
//! mutation; the client-facing sync layer fans these out to per-owner
//! observers. The feed carries only (owner, domain) — observers re-read the
//! stores for data, which keeps every read a consistent snapshot rather than
//! a partial write.

use crate::types::OwnerId;
use tokio::sync::broadcast;

/// Which store changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDomain {
    /// Payment method directory
    Methods,
    /// Transaction log
    Transactions,
    /// Subscription store / entitlement snapshot
    Subscription,
}

/// A committed store change, addressed to one owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    /// Owner whose view is affected
    pub owner: OwnerId,
    /// Store that changed
    pub domain: ChangeDomain,
}

/// Broadcast fan-out of store changes
///
/// Wraps a `tokio::sync::broadcast` channel. Publishing never blocks; when
/// no observer is subscribed the record is dropped, which is fine — an
/// observer that subscribes later starts from a fresh `load()` snapshot.
#[derive(Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<StoreChange>,
}

impl ChangeFeed {
    /// Create a feed with the given per-receiver buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        ChangeFeed { sender }
    }

    /// Publish a committed change
    pub fn publish(&self, owner: OwnerId, domain: ChangeDomain) {
        // A send error only means no live receivers; nothing to do.
        let _ = self.sender.send(StoreChange { owner, domain });
    }

    /// Open a new raw receiver on the feed
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }

    /// Number of currently subscribed receivers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        // Enough slack that a briefly-stalled observer resyncs instead of
        // dropping the connection.
        ChangeFeed::new(256)
    }
}

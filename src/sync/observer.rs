//! Client-facing live views
//!
//! `ClientSync` is the read side of the sync layer: it assembles consistent
//! per-owner snapshots and hands out cancellable observers that wake on
//! reconciler commits. It never writes the stores.
//!
//! Lifecycle is explicit: `observe` opens a subscription, `unsubscribe` (or
//! dropping the observer) closes it. A dropped observer releases its
//! broadcast receiver immediately; nothing leaks past cancellation.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;

use crate::core::methods::MethodDirectory;
use crate::core::subscriptions::SubscriptionStore;
use crate::core::transactions::TransactionLog;
use crate::sync::notify::{ChangeDomain, ChangeFeed, StoreChange};
use crate::sync::view::OwnerSnapshot;
use crate::types::OwnerId;

/// What woke an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSignal {
    /// One store changed for this owner
    Changed(ChangeDomain),

    /// The observer fell behind the feed and missed notifications
    ///
    /// The stores are still consistent; the observer should reload its
    /// snapshot rather than assume it saw every change.
    Resync,
}

/// Read-side handle over the payment stores
#[derive(Debug, Clone)]
pub struct ClientSync {
    methods: Arc<MethodDirectory>,
    transactions: Arc<TransactionLog>,
    subscriptions: Arc<SubscriptionStore>,
    feed: Arc<ChangeFeed>,
}

impl ClientSync {
    /// Create a read handle over the given stores
    pub fn new(
        methods: Arc<MethodDirectory>,
        transactions: Arc<TransactionLog>,
        subscriptions: Arc<SubscriptionStore>,
        feed: Arc<ChangeFeed>,
    ) -> Self {
        ClientSync {
            methods,
            transactions,
            subscriptions,
            feed,
        }
    }

    /// Take a consistent snapshot of an owner's payment state
    ///
    /// Safe to call at any time, concurrently with live updates; this is
    /// the polling fallback when no subscription is held.
    pub fn load(&self, owner: OwnerId) -> OwnerSnapshot {
        OwnerSnapshot {
            owner,
            methods: self.methods.methods_for(owner),
            transactions: self.transactions.for_owner(owner),
            subscription: self.subscriptions.for_owner(owner),
            entitlement: self.subscriptions.entitlement_for(owner),
        }
    }

    /// Open a live observer for one owner
    ///
    /// The observer holds store handles but not the feed's send side, so an
    /// engine teardown (all senders dropped) is observable as a closed feed.
    pub fn observe(&self, owner: OwnerId) -> OwnerObserver {
        OwnerObserver {
            owner,
            receiver: self.feed.subscribe(),
            methods: Arc::clone(&self.methods),
            transactions: Arc::clone(&self.transactions),
            subscriptions: Arc::clone(&self.subscriptions),
        }
    }
}

/// A cancellable per-owner subscription to store changes
///
/// May wait indefinitely in [`changed`](Self::changed); dropping the
/// observer (or calling [`unsubscribe`](Self::unsubscribe)) cancels the
/// wait and releases the underlying channel.
#[derive(Debug)]
pub struct OwnerObserver {
    owner: OwnerId,
    receiver: Receiver<StoreChange>,
    methods: Arc<MethodDirectory>,
    transactions: Arc<TransactionLog>,
    subscriptions: Arc<SubscriptionStore>,
}

impl OwnerObserver {
    /// The owner this observer watches
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Take a fresh consistent snapshot
    pub fn load(&self) -> OwnerSnapshot {
        OwnerSnapshot {
            owner: self.owner,
            methods: self.methods.methods_for(self.owner),
            transactions: self.transactions.for_owner(self.owner),
            subscription: self.subscriptions.for_owner(self.owner),
            entitlement: self.subscriptions.entitlement_for(self.owner),
        }
    }

    /// Wait for the next change affecting this owner
    ///
    /// Changes for other owners are filtered out. Returns `None` once the
    /// feed is closed (the engine was torn down); returns
    /// [`SyncSignal::Resync`] if the observer lagged and missed records.
    pub async fn changed(&mut self) -> Option<SyncSignal> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.owner == self.owner => {
                    return Some(SyncSignal::Changed(change.domain));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => return Some(SyncSignal::Resync),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Close the subscription
    ///
    /// Equivalent to dropping the observer; spelled out so call sites can
    /// make teardown visible.
    pub fn unsubscribe(self) {}
}

//! Subscription store and entitlement snapshot
//!
//! One subscription row per owner, plus an intent-to-owner index so the
//! reconciler can find the pending row a succeeded intent pays for. The
//! pending-to-active transition is guarded by the stored status, which makes
//! it idempotent under replay: re-activating an active subscription changes
//! nothing.

use crate::types::{
    IntentId, OwnerId, PlanId, Subscription, SubscriptionKind, SubscriptionStatus,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Concurrent per-owner subscription store
#[derive(Debug)]
pub struct SubscriptionStore {
    by_owner: DashMap<OwnerId, Subscription>,
    owner_by_intent: DashMap<IntentId, OwnerId>,
    entitlements: DashMap<OwnerId, PlanId>,
    next_id: AtomicU64,
}

impl SubscriptionStore {
    /// Create an empty store
    pub fn new() -> Self {
        SubscriptionStore {
            by_owner: DashMap::new(),
            owner_by_intent: DashMap::new(),
            entitlements: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a pending subscription awaiting payment confirmation
    ///
    /// Called when checkout starts, before the charge outcome is known.
    /// Replaces any previous subscription row for the owner.
    pub fn begin(
        &self,
        owner: OwnerId,
        plan: impl Into<PlanId>,
        intent: impl Into<IntentId>,
        kind: SubscriptionKind,
    ) -> Subscription {
        let intent = intent.into();
        let subscription = Subscription {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            owner,
            plan: plan.into(),
            status: SubscriptionStatus::Pending,
            intent: intent.clone(),
            kind,
        };
        self.by_owner.insert(owner, subscription.clone());
        self.owner_by_intent.insert(intent, owner);
        subscription
    }

    /// Activate the pending subscription paid for by this intent
    ///
    /// Transitions Pending to Active at most once. A one-time entitlement
    /// purchase also updates the owner's entitlement snapshot on the
    /// transition. Returns `false` when no subscription matches the intent
    /// or the matching row is not pending (already active under replay, or
    /// cancelled).
    pub fn activate_for_intent(&self, intent: &str) -> bool {
        let Some(owner) = self.owner_by_intent.get(intent).map(|e| *e) else {
            return false;
        };

        let Some(mut subscription) = self.by_owner.get_mut(&owner) else {
            return false;
        };

        if subscription.intent != intent || subscription.status != SubscriptionStatus::Pending {
            return false;
        }

        subscription.status = SubscriptionStatus::Active;
        if subscription.kind == SubscriptionKind::OneTime {
            self.entitlements.insert(owner, subscription.plan.clone());
        }
        true
    }

    /// Cancel the owner's subscription, if any
    pub fn cancel(&self, owner: OwnerId) -> bool {
        match self.by_owner.get_mut(&owner) {
            Some(mut subscription) if subscription.status != SubscriptionStatus::Cancelled => {
                subscription.status = SubscriptionStatus::Cancelled;
                true
            }
            _ => false,
        }
    }

    /// Snapshot of the owner's subscription row
    pub fn for_owner(&self, owner: OwnerId) -> Option<Subscription> {
        self.by_owner.get(&owner).map(|entry| entry.clone())
    }

    /// The owner's current entitlement, if a one-time purchase activated
    pub fn entitlement_for(&self, owner: OwnerId) -> Option<PlanId> {
        self.entitlements.get(&owner).map(|entry| entry.clone())
    }
}

impl Default for SubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

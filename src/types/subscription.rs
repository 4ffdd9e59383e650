//! Subscription and entitlement types
//!
//! A subscription ties an owner to a plan through the payment intent that
//! pays for it. The pending row is created when checkout starts; the first
//! observed succeeded event for its intent activates it.

use super::event::{IntentId, OwnerId, PlanId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Awaiting payment confirmation
    Pending,

    /// Payment confirmed, entitlement granted
    Active,

    /// Explicitly cancelled
    Cancelled,
}

/// How the plan was purchased
///
/// One-time entitlement purchases additionally update the owner's current
/// entitlement snapshot when they activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionKind {
    /// Recurring plan billed by the provider
    Recurring,

    /// One-time entitlement purchase
    OneTime,
}

/// An owner's plan purchase, keyed by owner
///
/// The pending-to-active transition happens exactly once, on the first
/// succeeded intent event matching `intent`. Re-activating an active
/// subscription is a no-op under replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Local subscription id
    pub id: u64,

    /// Owning marketplace user
    pub owner: OwnerId,

    /// Purchased plan
    pub plan: PlanId,

    /// Current lifecycle status
    pub status: SubscriptionStatus,

    /// Payment intent that pays for this subscription
    pub intent: IntentId,

    /// Purchase shape (recurring vs one-time entitlement)
    pub kind: SubscriptionKind,
}

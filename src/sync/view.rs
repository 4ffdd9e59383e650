//! Owner-facing state snapshots

use crate::types::{OwnerId, PaymentMethod, PlanId, Subscription, Transaction};
use serde::Serialize;

/// A consistent snapshot of one owner's payment state
///
/// Each collection is cloned out of its store in a single pass, so a
/// snapshot never exposes a half-applied write. Snapshots are cheap to
/// rebuild and carry no live references; the UI refreshes by taking a new
/// one, either on a change notification or by polling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerSnapshot {
    /// Owner this view belongs to
    pub owner: OwnerId,

    /// Stored payment methods, at most one marked default
    pub methods: Vec<PaymentMethod>,

    /// Charge history, oldest first
    pub transactions: Vec<Transaction>,

    /// Current subscription row, if any
    pub subscription: Option<Subscription>,

    /// Entitlement granted by an activated one-time purchase
    pub entitlement: Option<PlanId>,
}

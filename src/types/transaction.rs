//! Transaction lifecycle types
//!
//! A transaction tracks one charge attempt (one provider payment intent) from
//! initiation to its terminal outcome. Rows are created either speculatively
//! by the client when it requests a charge, or lazily by the reconciler when
//! a terminal intent event arrives with no prior row (the provider event can
//! outrace the client insert, and server-initiated charges never have one).

use super::event::{IntentId, OwnerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a transaction
///
/// `Pending` is the only non-terminal status. Once a transaction reaches
/// `Succeeded` or `Failed` it never changes again; re-applying the same
/// terminal status is an idempotent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Charge requested, outcome not yet observed
    Pending,

    /// Provider confirmed the charge
    Succeeded,

    /// Provider reported the charge failed
    Failed,
}

impl TransactionStatus {
    /// Whether this status is terminal (succeeded or failed)
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// A single charge attempt keyed by its provider intent id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Provider payment intent id, the natural key for this row
    pub intent: IntentId,

    /// Owning marketplace user
    pub owner: OwnerId,

    /// Amount in minor currency units, stored exactly as received
    ///
    /// No rounding or currency conversion is ever performed.
    pub amount_minor: i64,

    /// ISO currency code as reported by the provider (e.g. "usd")
    pub currency: String,

    /// Current lifecycle status
    pub status: TransactionStatus,

    /// Free-form description shown to the user
    pub description: Option<String>,

    /// When the row was first created locally
    pub created_at: DateTime<Utc>,
}

//! Stored payment method state
//!
//! This module defines the PaymentMethod row kept per owner. Rows are created
//! and removed exclusively by the reconciler in response to provider events.

use super::event::{CardDetails, InstrumentId, OwnerId};
use serde::{Deserialize, Serialize};

/// A stored payment instrument belonging to an owner
///
/// Invariant: at most one method per owner has `is_default = true` at any
/// observation point. The default flag is only rewritten as a unit by the
/// method directory (never row-by-row across separate writes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Provider instrument id, the natural key for this row
    pub instrument: InstrumentId,

    /// Owning marketplace user
    pub owner: OwnerId,

    /// Mutable card display metadata, refreshed on update events
    pub card: CardDetails,

    /// Whether this is the owner's default instrument
    pub is_default: bool,
}

impl PaymentMethod {
    /// Create a method row for an owner
    ///
    /// # Arguments
    ///
    /// * `instrument` - Provider instrument id
    /// * `owner` - Owning user
    /// * `card` - Card display metadata from the attach event
    /// * `is_default` - Whether this method starts as the owner's default
    pub fn new(
        instrument: InstrumentId,
        owner: OwnerId,
        card: CardDetails,
        is_default: bool,
    ) -> Self {
        PaymentMethod {
            instrument,
            owner,
            card,
            is_default,
        }
    }
}

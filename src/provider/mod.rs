//! Outbound payment provider interface
//!
//! Commands go out through this trait; state comes back in through webhook
//! events. Implementations perform the provider API call and nothing else —
//! local stores are only ever updated by the reconciler when the provider's
//! event confirms the effect.

pub mod mock;

use async_trait::async_trait;

use crate::types::{InstrumentId, IntentId, SyncError};

pub use mock::MockProvider;

/// Outbound calls to the hosted payment provider
///
/// Every call is keyed by the provider customer id the owner was onboarded
/// with. Calls may block on network I/O; the command gateway wraps each one
/// in a deadline, so implementations do not need their own timeout handling.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Attach a tokenized instrument to a customer
    ///
    /// Returns the provider-issued instrument id. The local method row is
    /// created later, by the attached event.
    async fn attach_instrument(
        &self,
        customer: &str,
        card_token: &str,
    ) -> Result<InstrumentId, SyncError>;

    /// Detach an instrument from its customer
    ///
    /// The local row is removed when the detached event confirms it.
    async fn detach_instrument(&self, instrument: &str) -> Result<(), SyncError>;

    /// Select the customer's default instrument
    async fn set_default_instrument(
        &self,
        customer: &str,
        instrument: &str,
    ) -> Result<(), SyncError>;

    /// Create a charge against the customer's default instrument
    ///
    /// Returns the provider-issued intent id. The terminal outcome arrives
    /// as a succeeded or failed event.
    async fn create_charge(
        &self,
        customer: &str,
        amount_minor: i64,
        currency: &str,
        description: Option<&str>,
    ) -> Result<IntentId, SyncError>;
}

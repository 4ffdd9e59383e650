//! Provider event types for the payment sync engine
//!
//! This module defines the identifiers and event shapes used throughout the
//! system. Events originate from the hosted payment provider and describe
//! state changes on objects the provider owns (instruments, customers,
//! payment intents). Delivery is at-least-once with no ordering guarantee
//! across objects or event types.

use serde::{Deserialize, Serialize};

/// Local user identifier
///
/// Owners are marketplace users (buyers and sellers). Provider objects are
/// mapped back to an owner through the customer directory.
pub type OwnerId = u64;

/// Provider-issued event identifier (e.g. `evt_1JG8...`)
///
/// Unique per delivery attempt group: redeliveries of the same event reuse
/// the same id, which is what makes the event ledger a sufficient replay gate.
pub type EventId = String;

/// Provider-issued payment instrument identifier (e.g. `pm_1JG8...`)
pub type InstrumentId = String;

/// Provider-issued payment intent identifier (e.g. `pi_1JG8...`)
pub type IntentId = String;

/// Provider-issued customer identifier (e.g. `cus_1JG8...`)
pub type CustomerRef = String;

/// Marketplace plan identifier
pub type PlanId = String;

/// Card display metadata carried on instrument events
///
/// These fields are mutable on the provider side (expiry refresh after
/// reissue) and are overwritten wholesale by `instrument.updated` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    /// Card network brand (e.g. "visa", "mastercard")
    pub brand: String,

    /// Last four digits of the card number
    pub last4: String,

    /// Expiry month (1-12)
    pub exp_month: u8,

    /// Expiry year (four digits)
    pub exp_year: u16,
}

/// Provider events consumed by the reconciler
///
/// Each variant corresponds to one webhook event type. The reconciler applies
/// each distinct event id at most once; every handler is additionally
/// idempotent so that replays past the ledger (partial-failure reprocessing)
/// remain harmless.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// A payment instrument was attached to a provider customer
    ///
    /// Creates the local method row. The first method an owner acquires
    /// becomes their default.
    InstrumentAttached {
        instrument: InstrumentId,
        customer: CustomerRef,
        card: CardDetails,
    },

    /// A payment instrument was detached from its customer
    ///
    /// Removes the local method row. The provider may have already cleared
    /// the customer reference by the time this fires, so removal is keyed by
    /// instrument id alone; absence is a no-op.
    InstrumentDetached { instrument: InstrumentId },

    /// Card display metadata changed on an existing instrument
    ///
    /// Overwrites the mutable card fields. Arriving before the matching
    /// attach is tolerated (logged, skipped).
    InstrumentUpdated {
        instrument: InstrumentId,
        card: CardDetails,
    },

    /// The customer's default instrument selection changed
    ///
    /// `default_instrument` is `None` when the provider cleared the default.
    CustomerUpdated {
        customer: CustomerRef,
        default_instrument: Option<InstrumentId>,
    },

    /// A payment intent reached the succeeded terminal state
    IntentSucceeded {
        intent: IntentId,
        customer: CustomerRef,
        amount_minor: i64,
        currency: String,
        description: Option<String>,
    },

    /// A payment intent reached the failed terminal state
    IntentFailed {
        intent: IntentId,
        customer: CustomerRef,
        amount_minor: i64,
        currency: String,
        description: Option<String>,
    },
}

/// A provider event together with its delivery identity
///
/// The envelope id is what the event ledger gates on; the payload is what
/// the reconciler dispatches on.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    /// Provider-issued event id, stable across redeliveries
    pub id: EventId,

    /// The decoded event payload
    pub event: ProviderEvent,
}

impl EventEnvelope {
    /// Wrap an event with its delivery id
    pub fn new(id: impl Into<EventId>, event: ProviderEvent) -> Self {
        EventEnvelope {
            id: id.into(),
            event,
        }
    }
}

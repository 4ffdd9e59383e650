//! Error types for the payment sync engine
//!
//! This module defines all error values that can surface from reconciliation,
//! outbound commands, and webhook ingestion. Each variant carries the context
//! needed to act on it without parsing message text.
//!
//! # Error Categories
//!
//! - **Unresolvable references**: an event points at a customer or instrument
//!   the system cannot map locally. Logged and dropped, never retried —
//!   a retry cannot create the missing mapping.
//! - **Command validation**: bad amount, unknown instrument, missing owner
//!   mapping on an outbound request. Surfaced synchronously to the caller and
//!   never reach the reconciler.
//! - **Provider failures**: the outbound call failed or timed out. The call
//!   is not retried here; retries are a caller-level action.
//! - **Ingestion failures**: bad signature or malformed payload on the
//!   webhook endpoint. Rejected with a 4xx so the provider retries.

use thiserror::Error;

use super::event::{CustomerRef, EventId, InstrumentId, OwnerId};

/// Main error type for the payment sync engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Event references a provider customer with no local owner mapping
    ///
    /// This is a configuration/onboarding gap, not a transient failure.
    /// The event is dropped and logged; automatic retry would not help.
    #[error("No owner mapping for provider customer {customer} (event {event})")]
    UnresolvedCustomer {
        /// Provider customer reference that could not be resolved
        customer: CustomerRef,
        /// Event id that referenced it
        event: EventId,
    },

    /// Operation references an instrument with no local method row
    ///
    /// Recoverable: update events on unsynced instruments are skipped and a
    /// later attach realigns state.
    #[error("Instrument {instrument} not found for {operation}")]
    UnknownInstrument {
        /// Provider instrument id that was not found
        instrument: InstrumentId,
        /// Operation that failed
        operation: String,
    },

    /// Outbound command validation: instrument does not belong to the owner
    #[error("Instrument {instrument} does not belong to owner {owner}")]
    MethodNotOwned {
        /// Provider instrument id
        instrument: InstrumentId,
        /// Owner that issued the command
        owner: OwnerId,
    },

    /// Outbound command validation: charge amount must be positive
    #[error("Invalid charge amount {amount_minor}: must be a positive number of minor units")]
    InvalidAmount {
        /// The rejected amount in minor units
        amount_minor: i64,
    },

    /// Outbound command validation: currency code is not a three-letter code
    #[error("Invalid currency code '{currency}'")]
    InvalidCurrency {
        /// The rejected currency code
        currency: String,
    },

    /// Outbound command issued for an owner with no provider customer
    ///
    /// The owner has not completed payment onboarding.
    #[error("Owner {owner} has no provider customer mapping")]
    NotOnboarded {
        /// Owner that issued the command
        owner: OwnerId,
    },

    /// The provider rejected or failed an outbound call
    #[error("Provider error during {operation}: {message}")]
    Provider {
        /// Operation that failed
        operation: String,
        /// Provider-reported failure description
        message: String,
    },

    /// An outbound provider call exceeded the configured deadline
    ///
    /// The call is abandoned and the failure surfaced; no automatic retry.
    #[error("Provider call {operation} timed out after {timeout_ms}ms")]
    CommandTimeout {
        /// Operation that timed out
        operation: String,
        /// Deadline that was exceeded, in milliseconds
        timeout_ms: u64,
    },

    /// Webhook payload could not be decoded into a known event shape
    #[error("Malformed event payload: {message}")]
    MalformedEvent {
        /// Description of the decoding failure
        message: String,
    },

    /// Webhook signature header missing, unparseable, stale, or wrong
    #[error("Webhook signature rejected: {message}")]
    InvalidSignature {
        /// Description of the verification failure
        message: String,
    },
}

impl From<serde_json::Error> for SyncError {
    fn from(error: serde_json::Error) -> Self {
        SyncError::MalformedEvent {
            message: error.to_string(),
        }
    }
}

// Helper constructors for the variants built away from their definition

impl SyncError {
    /// Create an UnresolvedCustomer error
    pub fn unresolved_customer(customer: &str, event: &str) -> Self {
        SyncError::UnresolvedCustomer {
            customer: customer.to_string(),
            event: event.to_string(),
        }
    }

    /// Create an UnknownInstrument error
    pub fn unknown_instrument(instrument: &str, operation: &str) -> Self {
        SyncError::UnknownInstrument {
            instrument: instrument.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create a MethodNotOwned error
    pub fn method_not_owned(instrument: &str, owner: OwnerId) -> Self {
        SyncError::MethodNotOwned {
            instrument: instrument.to_string(),
            owner,
        }
    }

    /// Create a Provider error
    pub fn provider(operation: &str, message: impl Into<String>) -> Self {
        SyncError::Provider {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Create a CommandTimeout error
    pub fn command_timeout(operation: &str, timeout_ms: u64) -> Self {
        SyncError::CommandTimeout {
            operation: operation.to_string(),
            timeout_ms,
        }
    }

    /// Create a MalformedEvent error
    pub fn malformed_event(message: impl Into<String>) -> Self {
        SyncError::MalformedEvent {
            message: message.into(),
        }
    }

    /// Create an InvalidSignature error
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        SyncError::InvalidSignature {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unresolved_customer(
        SyncError::UnresolvedCustomer { customer: "cus_9".to_string(), event: "evt_1".to_string() },
        "No owner mapping for provider customer cus_9 (event evt_1)"
    )]
    #[case::unknown_instrument(
        SyncError::UnknownInstrument { instrument: "pm_1".to_string(), operation: "update".to_string() },
        "Instrument pm_1 not found for update"
    )]
    #[case::method_not_owned(
        SyncError::MethodNotOwned { instrument: "pm_1".to_string(), owner: 7 },
        "Instrument pm_1 does not belong to owner 7"
    )]
    #[case::invalid_amount(
        SyncError::InvalidAmount { amount_minor: -50 },
        "Invalid charge amount -50: must be a positive number of minor units"
    )]
    #[case::invalid_currency(
        SyncError::InvalidCurrency { currency: "dollars".to_string() },
        "Invalid currency code 'dollars'"
    )]
    #[case::not_onboarded(
        SyncError::NotOnboarded { owner: 3 },
        "Owner 3 has no provider customer mapping"
    )]
    #[case::provider(
        SyncError::Provider { operation: "detach".to_string(), message: "instrument busy".to_string() },
        "Provider error during detach: instrument busy"
    )]
    #[case::command_timeout(
        SyncError::CommandTimeout { operation: "charge".to_string(), timeout_ms: 5000 },
        "Provider call charge timed out after 5000ms"
    )]
    #[case::malformed_event(
        SyncError::MalformedEvent { message: "missing field `id`".to_string() },
        "Malformed event payload: missing field `id`"
    )]
    #[case::invalid_signature(
        SyncError::InvalidSignature { message: "timestamp too old".to_string() },
        "Webhook signature rejected: timestamp too old"
    )]
    fn test_error_display(#[case] error: SyncError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::unresolved_customer(
        SyncError::unresolved_customer("cus_9", "evt_1"),
        SyncError::UnresolvedCustomer { customer: "cus_9".to_string(), event: "evt_1".to_string() }
    )]
    #[case::unknown_instrument(
        SyncError::unknown_instrument("pm_1", "update"),
        SyncError::UnknownInstrument { instrument: "pm_1".to_string(), operation: "update".to_string() }
    )]
    #[case::method_not_owned(
        SyncError::method_not_owned("pm_1", 7),
        SyncError::MethodNotOwned { instrument: "pm_1".to_string(), owner: 7 }
    )]
    #[case::command_timeout(
        SyncError::command_timeout("charge", 5000),
        SyncError::CommandTimeout { operation: "charge".to_string(), timeout_ms: 5000 }
    )]
    fn test_helper_functions(#[case] result: SyncError, #[case] expected: SyncError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: SyncError = json_error.into();
        assert!(matches!(error, SyncError::MalformedEvent { .. }));
    }
}

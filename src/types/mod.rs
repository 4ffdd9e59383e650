//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `event`: Provider event shapes and identifier aliases
//! - `method`: Stored payment method state
//! - `transaction`: Charge lifecycle types
//! - `subscription`: Subscription and entitlement types
//! - `error`: Error types for the sync engine

pub mod error;
pub mod event;
pub mod method;
pub mod subscription;
pub mod transaction;

pub use error::SyncError;
pub use event::{
    CardDetails, CustomerRef, EventEnvelope, EventId, InstrumentId, IntentId, OwnerId, PlanId,
    ProviderEvent,
};
pub use method::PaymentMethod;
pub use subscription::{Subscription, SubscriptionKind, SubscriptionStatus};
pub use transaction::{Transaction, TransactionStatus};

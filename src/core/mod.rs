//! Core reconciliation module
//!
//! This module contains the event-driven state components:
//! - `ledger` - Idempotent replay protection for provider events
//! - `customers` - Provider customer to local owner mapping
//! - `methods` - Payment method directory with the per-owner default unit
//! - `transactions` - Intent-keyed transaction log
//! - `subscriptions` - Subscription store and entitlement snapshot
//! - `reconciler` - Event dispatch and store update rules

pub mod customers;
pub mod ledger;
pub mod methods;
pub mod reconciler;
pub mod subscriptions;
pub mod transactions;

pub use customers::CustomerDirectory;
pub use ledger::{EventLedger, ProcessedEvent};
pub use methods::MethodDirectory;
pub use reconciler::{Outcome, Reconciler};
pub use subscriptions::SubscriptionStore;
pub use transactions::TransactionLog;

//! Application state for the webhook server

use std::sync::Arc;

use crate::core::{
    CustomerDirectory, EventLedger, MethodDirectory, Reconciler, SubscriptionStore, TransactionLog,
};
use crate::http::signature::SignatureVerifier;
use crate::sync::{ChangeFeed, ClientSync};

/// Webhook server state
///
/// One instance per process, built from explicit parts and cloned into each
/// handler. The stores are reachable through the public fields so embedding
/// code (and tests) can seed customer mappings or open client views against
/// the same engine the webhook writes to.
#[derive(Clone)]
pub struct AppState {
    /// Event reconciliation engine (the single store writer)
    pub reconciler: Reconciler,
    /// Customer onboarding directory
    pub customers: Arc<CustomerDirectory>,
    /// Subscription checkout entry point
    pub subscriptions: Arc<SubscriptionStore>,
    /// Read-side handle for live views
    pub sync: ClientSync,
    /// Signature verifier for inbound deliveries
    pub verifier: Arc<SignatureVerifier>,
    /// API version
    pub version: String,
}

impl AppState {
    /// Create app state with fresh stores
    pub fn new(verifier: SignatureVerifier) -> Self {
        let ledger = Arc::new(EventLedger::new());
        let customers = Arc::new(CustomerDirectory::new());
        let methods = Arc::new(MethodDirectory::new());
        let transactions = Arc::new(TransactionLog::new());
        let subscriptions = Arc::new(SubscriptionStore::new());
        let feed = Arc::new(ChangeFeed::default());

        let reconciler = Reconciler::new(
            ledger,
            Arc::clone(&customers),
            Arc::clone(&methods),
            Arc::clone(&transactions),
            Arc::clone(&subscriptions),
            Arc::clone(&feed),
        );
        let sync = ClientSync::new(methods, transactions, Arc::clone(&subscriptions), feed);

        AppState {
            reconciler,
            customers,
            subscriptions,
            sync,
            verifier: Arc::new(verifier),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

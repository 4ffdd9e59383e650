//! Outbound payment commands
//!
//! The write side of the client-facing layer. Commands validate their input,
//! call the provider under a deadline, and return what the provider said —
//! they do NOT update local stores. Confirmation arrives asynchronously, as
//! a webhook event the reconciler applies; the caller observes it through
//! its live view. The single exception is the speculative pending
//! transaction inserted after a successfully initiated charge, so the UI has
//! a row to show before the webhook lands.
//!
//! No command is retried here. A timeout or provider failure surfaces
//! immediately; retrying is a caller-level action.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::core::customers::CustomerDirectory;
use crate::core::methods::MethodDirectory;
use crate::core::transactions::TransactionLog;
use crate::provider::PaymentProvider;
use crate::sync::notify::{ChangeDomain, ChangeFeed};
use crate::types::{InstrumentId, OwnerId, SyncError, Transaction};

/// Default deadline for a single provider call
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Dependency-injected gateway for outbound provider commands
///
/// Constructed per process (or per test) from explicit handles; holds no
/// hidden global state. Cloneable into concurrent callers.
#[derive(Clone)]
pub struct CommandGateway {
    provider: Arc<dyn PaymentProvider>,
    customers: Arc<CustomerDirectory>,
    methods: Arc<MethodDirectory>,
    transactions: Arc<TransactionLog>,
    feed: Arc<ChangeFeed>,
    timeout: Duration,
}

impl CommandGateway {
    /// Create a gateway with the default command timeout
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        customers: Arc<CustomerDirectory>,
        methods: Arc<MethodDirectory>,
        transactions: Arc<TransactionLog>,
        feed: Arc<ChangeFeed>,
    ) -> Self {
        Self::with_timeout(
            provider,
            customers,
            methods,
            transactions,
            feed,
            DEFAULT_COMMAND_TIMEOUT,
        )
    }

    /// Create a gateway with an explicit command timeout
    pub fn with_timeout(
        provider: Arc<dyn PaymentProvider>,
        customers: Arc<CustomerDirectory>,
        methods: Arc<MethodDirectory>,
        transactions: Arc<TransactionLog>,
        feed: Arc<ChangeFeed>,
        timeout: Duration,
    ) -> Self {
        CommandGateway {
            provider,
            customers,
            methods,
            transactions,
            feed,
            timeout,
        }
    }

    /// Ask the provider to attach a tokenized instrument
    ///
    /// Returns the provider-issued instrument id; the local method row
    /// appears only when the attached event is reconciled.
    pub async fn request_attach(
        &self,
        owner: OwnerId,
        card_token: &str,
    ) -> Result<InstrumentId, SyncError> {
        let customer = self.customer_for(owner)?;

        let instrument = self
            .deadline("attach", self.provider.attach_instrument(&customer, card_token))
            .await?;
        info!(owner, %instrument, "attach submitted");
        Ok(instrument)
    }

    /// Ask the provider to detach one of the owner's instruments
    ///
    /// The local row is removed when the detached event confirms it.
    pub async fn request_detach(&self, owner: OwnerId, instrument: &str) -> Result<(), SyncError> {
        if !self.methods.is_owned_by(instrument, owner) {
            return Err(SyncError::method_not_owned(instrument, owner));
        }

        self.deadline("detach", self.provider.detach_instrument(instrument))
            .await?;
        info!(owner, instrument, "detach submitted");
        Ok(())
    }

    /// Ask the provider to make an instrument the owner's default
    ///
    /// The flag flips locally when the customer-updated event arrives.
    pub async fn request_set_default(
        &self,
        owner: OwnerId,
        instrument: &str,
    ) -> Result<(), SyncError> {
        let customer = self.customer_for(owner)?;
        if !self.methods.is_owned_by(instrument, owner) {
            return Err(SyncError::method_not_owned(instrument, owner));
        }

        self.deadline(
            "set_default",
            self.provider.set_default_instrument(&customer, instrument),
        )
        .await?;
        info!(owner, instrument, "default change submitted");
        Ok(())
    }

    /// Ask the provider to charge the owner's default instrument
    ///
    /// On success, inserts the speculative pending transaction (the one
    /// permitted local write) and returns its snapshot. The terminal status
    /// arrives later through the reconciler.
    pub async fn request_charge(
        &self,
        owner: OwnerId,
        amount_minor: i64,
        currency: &str,
        description: Option<String>,
    ) -> Result<Transaction, SyncError> {
        if amount_minor <= 0 {
            return Err(SyncError::InvalidAmount { amount_minor });
        }
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SyncError::InvalidCurrency {
                currency: currency.to_string(),
            });
        }
        let customer = self.customer_for(owner)?;

        let intent = self
            .deadline(
                "charge",
                self.provider
                    .create_charge(&customer, amount_minor, currency, description.as_deref()),
            )
            .await?;

        if self
            .transactions
            .record_pending(&intent, owner, amount_minor, currency, description)
        {
            self.feed.publish(owner, ChangeDomain::Transactions);
        }
        info!(owner, %intent, amount_minor, currency, "charge submitted");

        // The webhook may already have settled this intent; either way the
        // stored row is authoritative.
        Ok(self
            .transactions
            .get(&intent)
            .expect("row exists: just inserted or settled by the reconciler"))
    }

    fn customer_for(&self, owner: OwnerId) -> Result<String, SyncError> {
        self.customers
            .customer_for(owner)
            .ok_or(SyncError::NotOnboarded { owner })
    }

    /// Run a provider call under the configured deadline
    async fn deadline<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T, SyncError>>,
    ) -> Result<T, SyncError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::command_timeout(
                operation,
                self.timeout.as_millis() as u64,
            )),
        }
    }
}

//! In-memory payment provider for tests and local development
//!
//! Issues deterministic ids (`pm_mock_1`, `pi_mock_1`, ...) and records every
//! call. Failure and latency can be injected to exercise the command
//! gateway's error and timeout paths.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::PaymentProvider;
use crate::types::{InstrumentId, IntentId, SyncError};

/// A recorded outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Attach { customer: String, card_token: String },
    Detach { instrument: String },
    SetDefault { customer: String, instrument: String },
    Charge {
        customer: String,
        amount_minor: i64,
        currency: String,
    },
}

/// Deterministic in-memory provider
#[derive(Debug)]
pub struct MockProvider {
    calls: Mutex<Vec<ProviderCall>>,
    next_instrument: AtomicU64,
    next_intent: AtomicU64,
    fail_next: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl MockProvider {
    /// Create a provider that succeeds immediately
    pub fn new() -> Self {
        MockProvider {
            calls: Mutex::new(Vec::new()),
            next_instrument: AtomicU64::new(1),
            next_intent: AtomicU64::new(1),
            fail_next: AtomicBool::new(false),
            latency: Mutex::new(None),
        }
    }

    /// Make the next call fail with a provider error
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Delay every call by the given duration
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Calls recorded so far
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn simulate(&self, operation: &str) -> Result<(), SyncError> {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SyncError::provider(operation, "injected failure"));
        }
        Ok(())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn attach_instrument(
        &self,
        customer: &str,
        card_token: &str,
    ) -> Result<InstrumentId, SyncError> {
        self.simulate("attach").await?;
        self.record(ProviderCall::Attach {
            customer: customer.to_string(),
            card_token: card_token.to_string(),
        });
        let n = self.next_instrument.fetch_add(1, Ordering::Relaxed);
        Ok(format!("pm_mock_{n}"))
    }

    async fn detach_instrument(&self, instrument: &str) -> Result<(), SyncError> {
        self.simulate("detach").await?;
        self.record(ProviderCall::Detach {
            instrument: instrument.to_string(),
        });
        Ok(())
    }

    async fn set_default_instrument(
        &self,
        customer: &str,
        instrument: &str,
    ) -> Result<(), SyncError> {
        self.simulate("set_default").await?;
        self.record(ProviderCall::SetDefault {
            customer: customer.to_string(),
            instrument: instrument.to_string(),
        });
        Ok(())
    }

    async fn create_charge(
        &self,
        customer: &str,
        amount_minor: i64,
        currency: &str,
        _description: Option<&str>,
    ) -> Result<IntentId, SyncError> {
        self.simulate("charge").await?;
        self.record(ProviderCall::Charge {
            customer: customer.to_string(),
            amount_minor,
            currency: currency.to_string(),
        });
        let n = self.next_intent.fetch_add(1, Ordering::Relaxed);
        Ok(format!("pi_mock_{n}"))
    }
}

//! Transaction log keyed by provider intent id
//!
//! Records every charge attempt. Rows enter in one of two ways:
//!
//! - speculatively, status Pending, inserted by the client-facing command
//!   layer immediately after a charge request is accepted by the provider
//! - lazily, already terminal, inserted by the reconciler when a terminal
//!   intent event arrives with no prior row
//!
//! Both paths are conditional upserts keyed by the intent id, so duplicated
//! and reordered deliveries converge on the same final row.

use crate::types::{IntentId, OwnerId, Transaction, TransactionStatus};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Concurrent intent-keyed transaction store
#[derive(Debug, Default)]
pub struct TransactionLog {
    by_intent: DashMap<IntentId, Transaction>,
}

impl TransactionLog {
    /// Create an empty log
    pub fn new() -> Self {
        TransactionLog {
            by_intent: DashMap::new(),
        }
    }

    /// Insert a speculative pending row for a just-requested charge
    ///
    /// No-op if a row for this intent already exists — the provider event
    /// may have outraced the client insert, and the terminal row wins.
    ///
    /// # Returns
    ///
    /// `true` if the pending row was inserted.
    pub fn record_pending(
        &self,
        intent: &str,
        owner: OwnerId,
        amount_minor: i64,
        currency: &str,
        description: Option<String>,
    ) -> bool {
        match self.by_intent.entry(intent.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(Transaction {
                    intent: intent.to_string(),
                    owner,
                    amount_minor,
                    currency: currency.to_string(),
                    status: TransactionStatus::Pending,
                    description,
                    created_at: Utc::now(),
                });
                true
            }
        }
    }

    /// Apply a terminal outcome observed from the provider
    ///
    /// If a row exists, only its status moves: Pending advances to the
    /// terminal value, an equal terminal value is a no-op, and a conflicting
    /// terminal value is refused (terminal rows are immutable). The original
    /// row's amount and currency are preserved.
    ///
    /// If no row exists, one is inserted with the terminal status and the
    /// event's amount and currency exactly as received.
    ///
    /// # Arguments
    ///
    /// * `status` - must be terminal (Succeeded or Failed)
    ///
    /// # Returns
    ///
    /// `true` if a row was created or its status changed.
    pub fn apply_outcome(
        &self,
        intent: &str,
        owner: OwnerId,
        amount_minor: i64,
        currency: &str,
        description: Option<String>,
        status: TransactionStatus,
    ) -> bool {
        debug_assert!(status.is_terminal());

        match self.by_intent.entry(intent.to_string()) {
            Entry::Occupied(mut occupied) => {
                let transaction = occupied.get_mut();
                if transaction.status == status {
                    false
                } else if transaction.status.is_terminal() {
                    // Terminal rows never flip to a different terminal value
                    false
                } else {
                    transaction.status = status;
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Transaction {
                    intent: intent.to_string(),
                    owner,
                    amount_minor,
                    currency: currency.to_string(),
                    status,
                    description,
                    created_at: Utc::now(),
                });
                true
            }
        }
    }

    /// Look up a transaction by intent id
    pub fn get(&self, intent: &str) -> Option<Transaction> {
        self.by_intent.get(intent).map(|entry| entry.clone())
    }

    /// Snapshot of an owner's transactions, oldest first
    pub fn for_owner(&self, owner: OwnerId) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .by_intent
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.clone())
            .collect();
        transactions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        transactions
    }

    /// Number of stored transactions
    pub fn len(&self) -> usize {
        self.by_intent.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.by_intent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_then_succeeded() {
        let log = TransactionLog::new();

        assert!(log.record_pending("pi_1", 1, 2500, "usd", Some("sticker pack".to_string())));
        assert!(log.apply_outcome("pi_1", 1, 2500, "usd", None, TransactionStatus::Succeeded));

        let transaction = log.get("pi_1").unwrap();
        assert_eq!(transaction.status, TransactionStatus::Succeeded);
        assert_eq!(transaction.amount_minor, 2500);
        // Original description survives the outcome
        assert_eq!(transaction.description.as_deref(), Some("sticker pack"));
    }

    #[test]
    fn test_lazy_insert_on_first_observed_outcome() {
        let log = TransactionLog::new();

        assert!(log.apply_outcome("pi_1", 1, 999, "eur", None, TransactionStatus::Succeeded));

        let transaction = log.get("pi_1").unwrap();
        assert_eq!(transaction.status, TransactionStatus::Succeeded);
        assert_eq!(transaction.amount_minor, 999);
        assert_eq!(transaction.currency, "eur");
    }

    #[test]
    fn test_duplicate_outcome_is_noop() {
        let log = TransactionLog::new();

        assert!(log.apply_outcome("pi_1", 1, 999, "usd", None, TransactionStatus::Succeeded));
        assert!(!log.apply_outcome("pi_1", 1, 999, "usd", None, TransactionStatus::Succeeded));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_terminal_row_never_flips() {
        let log = TransactionLog::new();

        log.apply_outcome("pi_1", 1, 999, "usd", None, TransactionStatus::Succeeded);
        assert!(!log.apply_outcome("pi_1", 1, 999, "usd", None, TransactionStatus::Failed));
        assert_eq!(log.get("pi_1").unwrap().status, TransactionStatus::Succeeded);
    }

    #[test]
    fn test_pending_after_outcome_is_noop() {
        let log = TransactionLog::new();

        log.apply_outcome("pi_1", 1, 999, "usd", None, TransactionStatus::Failed);
        assert!(!log.record_pending("pi_1", 1, 999, "usd", None));
        assert_eq!(log.get("pi_1").unwrap().status, TransactionStatus::Failed);
    }

    #[test]
    fn test_for_owner_filters_and_orders() {
        let log = TransactionLog::new();
        log.record_pending("pi_1", 1, 100, "usd", None);
        log.record_pending("pi_2", 2, 200, "usd", None);
        log.record_pending("pi_3", 1, 300, "usd", None);

        let mine = log.for_owner(1);
        assert_eq!(mine.len(), 2);
        assert!(mine.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn test_amount_stored_exactly_as_received() {
        let log = TransactionLog::new();
        log.apply_outcome("pi_1", 1, 1, "jpy", None, TransactionStatus::Succeeded);
        assert_eq!(log.get("pi_1").unwrap().amount_minor, 1);
    }
}

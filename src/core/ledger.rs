//! Event ledger: idempotent replay protection
//!
//! The ledger is an append-only record of provider event ids that have
//! already been admitted for processing. Provider delivery is at-least-once
//! and unordered, so the ledger is the primary guard against applying the
//! same event twice.
//!
//! # Partial Failure
//!
//! If a crash occurs after a side effect executed but before the caller
//! acknowledged the delivery, the provider redelivers and the ledger
//! short-circuits the replay. The inverse window (admitted here, side effect
//! lost) is covered by every downstream store operation being independently
//! idempotent — the ledger alone cannot guarantee exactly-once.
//!
//! # Thread Safety
//!
//! Admission is an atomic insert-if-absent on a concurrent map: when two
//! handler instances race on the same event id, exactly one wins.

use crate::types::EventId;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Record of a processed provider event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEvent {
    /// When the event was first admitted
    pub processed_at: DateTime<Utc>,
}

/// Append-only set of admitted provider event ids
///
/// Entries are never removed; retention is an operational concern outside
/// the correctness window.
#[derive(Debug, Default)]
pub struct EventLedger {
    processed: DashMap<EventId, ProcessedEvent>,
}

impl EventLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        EventLedger {
            processed: DashMap::new(),
        }
    }

    /// Admit an event id for processing
    ///
    /// Records the id and returns `true` the first time it is seen; returns
    /// `false` on any repeat. The check-and-record is a single atomic entry
    /// operation, so concurrent deliveries of the same id admit exactly one.
    ///
    /// # Arguments
    ///
    /// * `event_id` - Provider event id, stable across redeliveries
    pub fn admit(&self, event_id: &str) -> bool {
        match self.processed.entry(event_id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(ProcessedEvent {
                    processed_at: Utc::now(),
                });
                true
            }
        }
    }

    /// Whether an event id has already been admitted
    pub fn contains(&self, event_id: &str) -> bool {
        self.processed.contains_key(event_id)
    }

    /// Number of admitted events
    pub fn len(&self) -> usize {
        self.processed.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_admission_succeeds() {
        let ledger = EventLedger::new();
        assert!(ledger.admit("evt_1"));
        assert!(ledger.contains("evt_1"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_repeat_admission_rejected() {
        let ledger = EventLedger::new();
        assert!(ledger.admit("evt_1"));
        assert!(!ledger.admit("evt_1"));
        assert!(!ledger.admit("evt_1"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_distinct_ids_admitted_independently() {
        let ledger = EventLedger::new();
        assert!(ledger.admit("evt_1"));
        assert!(ledger.admit("evt_2"));
        assert!(ledger.admit("evt_3"));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_concurrent_admission_single_winner() {
        let ledger = Arc::new(EventLedger::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || ledger.admit("evt_contended"))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(ledger.len(), 1);
    }
}

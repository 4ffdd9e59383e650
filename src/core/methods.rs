//! Payment method directory
//!
//! Holds every owner's stored payment instruments. Each owner's method set
//! lives under a single concurrent-map entry, so any rewrite of the set —
//! in particular the clear-then-set of the default flag — is atomic as a
//! unit: observers never see two rows marked default.
//!
//! A secondary instrument-to-owner index supports events that arrive keyed
//! by instrument id alone (the provider clears the customer reference before
//! emitting detach).
//!
//! # Idempotence
//!
//! Every operation is a conditional upsert keyed by natural id: re-applying
//! an attach, detach, or card update produces no additional observable
//! effect beyond the first application.

use crate::types::{CardDetails, InstrumentId, OwnerId, PaymentMethod};
use dashmap::DashMap;

/// Concurrent directory of stored payment methods, keyed per owner
#[derive(Debug, Default)]
pub struct MethodDirectory {
    by_owner: DashMap<OwnerId, Vec<PaymentMethod>>,
    owner_by_instrument: DashMap<InstrumentId, OwnerId>,
}

impl MethodDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        MethodDirectory {
            by_owner: DashMap::new(),
            owner_by_instrument: DashMap::new(),
        }
    }

    /// Insert a method row for an attached instrument
    ///
    /// No-op if a row with this instrument id already exists (replayed or
    /// duplicated attach event). The first method an owner acquires becomes
    /// their default.
    ///
    /// # Returns
    ///
    /// `true` if a row was inserted, `false` if the instrument was already
    /// present.
    pub fn attach(&self, owner: OwnerId, instrument: &str, card: CardDetails) -> bool {
        let mut methods = self.by_owner.entry(owner).or_default();

        if methods.iter().any(|m| m.instrument == instrument) {
            return false;
        }

        let is_default = methods.is_empty();
        methods.push(PaymentMethod::new(
            instrument.to_string(),
            owner,
            card,
            is_default,
        ));
        drop(methods);

        self.owner_by_instrument.insert(instrument.to_string(), owner);
        true
    }

    /// Remove the method row for a detached instrument
    ///
    /// Absence is a no-op, not an error: the detach may have been replayed,
    /// or the attach may never have been observed. If the removed row was
    /// the default, the owner is left with no default until the provider's
    /// customer update realigns it.
    ///
    /// # Returns
    ///
    /// The owner whose row was removed, or `None` if no row matched.
    pub fn detach(&self, instrument: &str) -> Option<OwnerId> {
        let owner = self.owner_by_instrument.get(instrument).map(|e| *e)?;

        let removed = match self.by_owner.get_mut(&owner) {
            Some(mut methods) => {
                let before = methods.len();
                methods.retain(|m| m.instrument != instrument);
                methods.len() < before
            }
            None => false,
        };

        if removed {
            self.owner_by_instrument.remove(instrument);
            Some(owner)
        } else {
            None
        }
    }

    /// Overwrite the mutable card fields of an existing row
    ///
    /// # Returns
    ///
    /// The owner whose row was updated, or `None` if the instrument has no
    /// local row yet (event arrived before the attach; the caller logs and
    /// skips).
    pub fn update_card(&self, instrument: &str, card: CardDetails) -> Option<OwnerId> {
        let owner = self.owner_by_instrument.get(instrument).map(|e| *e)?;

        let mut methods = self.by_owner.get_mut(&owner)?;
        let method = methods.iter_mut().find(|m| m.instrument == instrument)?;
        method.card = card;
        Some(owner)
    }

    /// Rewrite the owner's default flag as a single unit
    ///
    /// Clears `is_default` on every row for the owner, then sets it on the
    /// row matching `target` if one is present. When the target instrument
    /// has not been synced yet, the clear still applies and the owner has no
    /// default until a later attach realigns it — an accepted
    /// eventual-consistency gap, not an error.
    ///
    /// # Returns
    ///
    /// `true` if a row matched the requested target (always `true` when the
    /// target is `None`, meaning the clear is the whole request).
    pub fn set_default(&self, owner: OwnerId, target: Option<&str>) -> bool {
        let mut methods = self.by_owner.entry(owner).or_default();

        for method in methods.iter_mut() {
            method.is_default = false;
        }

        match target {
            Some(instrument) => match methods.iter_mut().find(|m| m.instrument == instrument) {
                Some(method) => {
                    method.is_default = true;
                    true
                }
                None => false,
            },
            None => true,
        }
    }

    /// Snapshot of an owner's methods
    pub fn methods_for(&self, owner: OwnerId) -> Vec<PaymentMethod> {
        self.by_owner
            .get(&owner)
            .map(|methods| methods.clone())
            .unwrap_or_default()
    }

    /// The owner's current default method, if any
    pub fn default_for(&self, owner: OwnerId) -> Option<PaymentMethod> {
        self.by_owner
            .get(&owner)
            .and_then(|methods| methods.iter().find(|m| m.is_default).cloned())
    }

    /// Whether an instrument belongs to the given owner
    pub fn is_owned_by(&self, instrument: &str, owner: OwnerId) -> bool {
        self.owner_by_instrument
            .get(instrument)
            .map(|e| *e == owner)
            .unwrap_or(false)
    }
}

//! Provider customer to local owner mapping
//!
//! Every provider object arrives keyed by the provider's customer id. The
//! directory translates that back to the marketplace user who owns it. The
//! mapping is established at payment onboarding (customer creation) and must
//! exist before any event for that customer can be applied.

use crate::types::{CustomerRef, OwnerId};
use dashmap::DashMap;

/// Bidirectional customer/owner directory
///
/// Lookups are concurrent; links are written once at onboarding and
/// overwritten only if an owner is re-onboarded with a fresh customer.
#[derive(Debug, Default)]
pub struct CustomerDirectory {
    owner_by_customer: DashMap<CustomerRef, OwnerId>,
    customer_by_owner: DashMap<OwnerId, CustomerRef>,
}

impl CustomerDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        CustomerDirectory {
            owner_by_customer: DashMap::new(),
            customer_by_owner: DashMap::new(),
        }
    }

    /// Register the owner for a provider customer
    ///
    /// Called at onboarding, before any events for the customer can arrive.
    pub fn link(&self, customer: impl Into<CustomerRef>, owner: OwnerId) {
        let customer = customer.into();
        self.customer_by_owner.insert(owner, customer.clone());
        self.owner_by_customer.insert(customer, owner);
    }

    /// Resolve a provider customer to its local owner
    ///
    /// `None` means the mapping is absent — a configuration/onboarding gap
    /// the caller reports and drops, never retries.
    pub fn resolve(&self, customer: &str) -> Option<OwnerId> {
        self.owner_by_customer.get(customer).map(|entry| *entry)
    }

    /// Look up the provider customer for an owner
    ///
    /// Used by outbound commands, which are issued per owner.
    pub fn customer_for(&self, owner: OwnerId) -> Option<CustomerRef> {
        self.customer_by_owner
            .get(&owner)
            .map(|entry| entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_and_resolve() {
        let directory = CustomerDirectory::new();
        directory.link("cus_1", 42);

        assert_eq!(directory.resolve("cus_1"), Some(42));
        assert_eq!(directory.customer_for(42), Some("cus_1".to_string()));
    }

    #[test]
    fn test_resolve_unknown_customer() {
        let directory = CustomerDirectory::new();
        assert_eq!(directory.resolve("cus_missing"), None);
        assert_eq!(directory.customer_for(7), None);
    }

    #[test]
    fn test_relink_overwrites() {
        let directory = CustomerDirectory::new();
        directory.link("cus_old", 42);
        directory.link("cus_new", 42);

        assert_eq!(directory.customer_for(42), Some("cus_new".to_string()));
        assert_eq!(directory.resolve("cus_new"), Some(42));
    }
}

//! # Whitelist Registry
//!
//! Owner-mutable set of fee-exempt addresses. Unseen addresses are not exempt.

use crate::domain::value_objects::Address;
use std::collections::HashMap;

/// Exemption entries keyed by address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WhitelistRegistry {
    entries: HashMap<Address, bool>,
}

impl WhitelistRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored entry for `address` (false if never set).
    #[must_use]
    pub fn is_whitelisted(&self, address: &Address) -> bool {
        self.entries.get(address).copied().unwrap_or(false)
    }

    /// Overwrites the entry for `address`.
    ///
    /// Returns true if the stored exemption state changed.
    pub fn set_exempt(&mut self, address: Address, state: bool) -> bool {
        self.entries.insert(address, state).unwrap_or(false) != state
    }

    /// Decides whether a transfer between `from` and `to` skips fees.
    ///
    /// Exempt when the parties are the same, when either party is one of the
    /// `privileged` addresses (owner and fee recipients), or when either party
    /// carries a whitelist entry set to true.
    #[must_use]
    pub fn is_exempt(&self, from: &Address, to: &Address, privileged: &[Address]) -> bool {
        from == to
            || privileged.iter().any(|p| p == from || p == to)
            || self.is_whitelisted(from)
            || self.is_whitelisted(to)
    }

    /// Number of stored entries, including ones set to false.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry was ever set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

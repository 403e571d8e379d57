//! # Token Policy
//!
//! The owner-controlled configuration the engines consult: owner identity,
//! whitelist and fee recipients. Every mutating entry point checks the caller
//! explicitly.

use crate::domain::entities::FeeRecipients;
use crate::domain::fees::FeeConfig;
use crate::domain::value_objects::Address;
use crate::domain::whitelist::WhitelistRegistry;
use crate::errors::FeeTokenError;

/// Owner, whitelist and fee configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPolicy {
    owner: Address,
    whitelist: WhitelistRegistry,
    fees: FeeConfig,
}

impl TokenPolicy {
    /// Creates a policy owned by `owner` with the given recipients.
    #[must_use]
    pub fn new(owner: Address, recipients: FeeRecipients) -> Self {
        Self {
            owner,
            whitelist: WhitelistRegistry::new(),
            fees: FeeConfig::new(recipients),
        }
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Current fee recipients.
    #[must_use]
    pub const fn recipients(&self) -> FeeRecipients {
        self.fees.recipients()
    }

    /// Read access to the whitelist.
    #[must_use]
    pub const fn whitelist(&self) -> &WhitelistRegistry {
        &self.whitelist
    }

    /// Fails with `Unauthorized` unless `caller` is the owner.
    ///
    /// # Errors
    ///
    /// `FeeTokenError::Unauthorized` for any other caller.
    pub fn ensure_owner(&self, caller: Address) -> Result<(), FeeTokenError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(FeeTokenError::Unauthorized { caller })
        }
    }

    /// Whether a transfer between `from` and `to` is fee-exempt.
    #[must_use]
    pub fn is_exempt(&self, from: &Address, to: &Address) -> bool {
        let recipients = self.fees.recipients();
        let privileged: Vec<Address> = std::iter::once(self.owner)
            .chain(recipients.primary)
            .chain(recipients.secondary)
            .collect();
        self.whitelist.is_exempt(from, to, &privileged)
    }

    /// Sets a whitelist entry without an authorization check.
    ///
    /// Used while bootstrapping the token, before any caller exists.
    pub(crate) fn seed_exempt(&mut self, address: Address, state: bool) {
        let _ = self.whitelist.set_exempt(address, state);
    }

    /// Owner-only: overwrite the whitelist entry for `address`.
    /// Returns true if the exemption state changed.
    ///
    /// # Errors
    ///
    /// `FeeTokenError::Unauthorized` if `caller` is not the owner.
    pub fn set_exempt(
        &mut self,
        caller: Address,
        address: Address,
        state: bool,
    ) -> Result<bool, FeeTokenError> {
        self.ensure_owner(caller)?;
        Ok(self.whitelist.set_exempt(address, state))
    }

    /// Owner-only: replace both fee recipients. Returns true if either changed.
    ///
    /// # Errors
    ///
    /// `FeeTokenError::Unauthorized` if `caller` is not the owner.
    pub fn set_recipients(
        &mut self,
        caller: Address,
        primary: Option<Address>,
        secondary: Option<Address>,
    ) -> Result<bool, FeeTokenError> {
        self.ensure_owner(caller)?;
        Ok(self.fees.set_recipients(primary, secondary))
    }

    /// Owner-only: hand ownership to `new_owner`. Returns the previous owner.
    ///
    /// # Errors
    ///
    /// `FeeTokenError::Unauthorized` if `caller` is not the owner.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<Address, FeeTokenError> {
        self.ensure_owner(caller)?;
        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }
}

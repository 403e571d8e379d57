//! # Driving Ports (API - Inbound)
//!
//! The operations callers use: fee-routed transfers and issuance, owner
//! configuration, and read accessors.

use crate::domain::entities::{
    FeeQuote, FeeRecipients, IssuanceReceipt, IssuanceRequest, TransferReceipt, TransferRequest,
};
use crate::domain::value_objects::{Address, Partition, U256};
use crate::errors::FeeTokenError;
use async_trait::async_trait;

/// Primary API of the fee-routing token.
#[async_trait]
pub trait FeeTokenApi: Send + Sync {
    /// Executes a partitioned transfer, deducting fees unless exempt.
    ///
    /// # Returns
    ///
    /// * `Ok(TransferReceipt)` - committed; `destination_partition` is where the value landed
    /// * `Err(InsufficientBalance)` - source partition balance too low, nothing changed
    async fn transfer_by_partition(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, FeeTokenError>;

    /// Issues new tokens into a partition, splitting off the issuance fee.
    async fn issue_by_partition(
        &self,
        request: IssuanceRequest,
    ) -> Result<IssuanceReceipt, FeeTokenError>;

    /// Owner-only: replace both fee recipients.
    async fn upgrade_fee_addresses(
        &self,
        caller: Address,
        primary: Option<Address>,
        secondary: Option<Address>,
    ) -> Result<(), FeeTokenError>;

    /// Owner-only: set the exemption entry for `account`.
    async fn set_whitelist(
        &self,
        caller: Address,
        account: Address,
        exempt: bool,
    ) -> Result<(), FeeTokenError>;

    /// Owner-only: hand ownership to `new_owner`.
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), FeeTokenError>;

    /// Previews the fee split of a transfer without changing anything.
    async fn quote_transfer(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<FeeQuote, FeeTokenError>;

    /// Whether `from -> to` transfers skip fees.
    async fn is_exempt(&self, from: Address, to: Address) -> bool;

    /// Stored whitelist entry for `account`.
    async fn is_whitelisted(&self, account: Address) -> bool;

    /// Current fee recipients.
    async fn fee_recipients(&self) -> FeeRecipients;

    /// Current owner.
    async fn owner(&self) -> Address;

    /// Total balance of `holder`.
    async fn balance_of(&self, holder: Address) -> Result<U256, FeeTokenError>;

    /// Balance of `holder` in `partition`.
    async fn balance_of_by_partition(
        &self,
        holder: Address,
        partition: Partition,
    ) -> Result<U256, FeeTokenError>;

    /// Partitions of `holder`.
    async fn partitions_of(&self, holder: Address) -> Result<Vec<Partition>, FeeTokenError>;

    /// Total supply.
    async fn total_supply(&self) -> Result<U256, FeeTokenError>;
}

//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the fee-routing core depends on:
//! - `Ledger`: the partitioned balance store
//! - `EventSink`: where notifications go after a commit
//!
//! The core never stores balances itself and never decides how a partition is
//! encoded in transfer payloads.

use crate::domain::entities::LedgerChange;
use crate::domain::value_objects::{Address, Bytes, Partition, U256};
use crate::errors::LedgerError;
use crate::events::TokenEvent;
use async_trait::async_trait;

// =============================================================================
// LEDGER
// =============================================================================

/// Partitioned balance store.
///
/// ## Implementation Notes
///
/// `commit` must be all-or-nothing: if any change fails, none of the earlier
/// changes in the same call may remain visible.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Total balance of `holder` across partitions.
    async fn balance_of(&self, holder: Address) -> Result<U256, LedgerError>;

    /// Balance of `holder` in `partition`.
    async fn balance_of_by_partition(
        &self,
        holder: Address,
        partition: Partition,
    ) -> Result<U256, LedgerError>;

    /// Partitions in which `holder` holds a non-zero balance.
    async fn partitions_of(&self, holder: Address) -> Result<Vec<Partition>, LedgerError>;

    /// Total supply across partitions.
    async fn total_supply(&self) -> Result<U256, LedgerError>;

    /// Total supply held in `partition`.
    async fn total_supply_by_partition(&self, partition: Partition) -> Result<U256, LedgerError>;

    /// Extracts an explicit destination partition from transfer `data`.
    ///
    /// Returns `None` when `data` does not encode one.
    fn decode_destination_partition(&self, data: &Bytes) -> Option<Partition>;

    /// Whether `operator` may issue new tokens.
    async fn can_issue(&self, operator: Address) -> Result<bool, LedgerError>;

    /// Applies `changes` in order, atomically.
    async fn commit(&self, changes: &[LedgerChange]) -> Result<(), LedgerError>;
}

// =============================================================================
// EVENT SINK
// =============================================================================

/// Receiver of committed notifications.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes one event. Called in emission order after a successful commit.
    async fn publish(&self, event: TokenEvent);
}

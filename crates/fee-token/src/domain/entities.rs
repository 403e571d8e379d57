//! # Core Domain Entities
//!
//! Requests, ledger mutations and receipts for fee-routed operations.

use crate::domain::value_objects::{Address, Bytes, Partition, U256};
use crate::events::TokenEvent;
use serde::{Deserialize, Serialize};

// =============================================================================
// REQUESTS
// =============================================================================

/// A partitioned transfer submitted by an operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Partition the value is taken from.
    pub source_partition: Partition,
    /// Caller acting on behalf of `from`.
    pub operator: Address,
    /// Holder debited.
    pub from: Address,
    /// Holder credited.
    pub to: Address,
    /// Requested value. Fees are always computed on this amount.
    pub value: U256,
    /// Transfer payload; may carry an explicit destination partition.
    pub data: Bytes,
    /// Operator payload; destination decoding only happens when non-empty.
    pub operator_data: Bytes,
}

impl TransferRequest {
    /// Creates a plain holder-initiated transfer without payloads.
    #[must_use]
    pub fn new(partition: Partition, from: Address, to: Address, value: U256) -> Self {
        Self {
            source_partition: partition,
            operator: from,
            from,
            to,
            value,
            data: Bytes::new(),
            operator_data: Bytes::new(),
        }
    }

    /// Sets the operator.
    #[must_use]
    pub fn with_operator(mut self, operator: Address) -> Self {
        self.operator = operator;
        self
    }

    /// Sets the transfer and operator payloads.
    #[must_use]
    pub fn with_data(mut self, data: Bytes, operator_data: Bytes) -> Self {
        self.data = data;
        self.operator_data = operator_data;
        self
    }
}

/// A partitioned issuance submitted by an operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRequest {
    /// Partition credited.
    pub destination_partition: Partition,
    /// Caller performing the issuance.
    pub operator: Address,
    /// Holder credited.
    pub to: Address,
    /// Requested value, gross of the issuance fee.
    pub value: U256,
    /// Issuance payload.
    pub data: Bytes,
}

impl IssuanceRequest {
    /// Creates an issuance without payload.
    #[must_use]
    pub fn new(partition: Partition, operator: Address, to: Address, value: U256) -> Self {
        Self {
            destination_partition: partition,
            operator,
            to,
            value,
            data: Bytes::new(),
        }
    }
}

// =============================================================================
// FEE RECIPIENTS
// =============================================================================

/// The two fee recipients. Either may be unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRecipients {
    /// Receives the primary transfer fee and the whole issuance fee.
    pub primary: Option<Address>,
    /// Receives the secondary transfer fee.
    pub secondary: Option<Address>,
}

impl FeeRecipients {
    /// Creates a recipient pair.
    #[must_use]
    pub const fn new(primary: Option<Address>, secondary: Option<Address>) -> Self {
        Self { primary, secondary }
    }

    /// Returns true if `address` is one of the configured recipients.
    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.primary.as_ref() == Some(address) || self.secondary.as_ref() == Some(address)
    }
}

// =============================================================================
// LEDGER CHANGES
// =============================================================================

/// A single mutation applied by the ledger collaborator.
///
/// An operation is committed as an ordered list of changes; the ledger applies
/// all of them or none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerChange {
    /// Remove value from a holder's partition (and the partition's supply).
    RemoveFromPartition {
        /// Holder debited.
        holder: Address,
        /// Partition debited.
        partition: Partition,
        /// Amount removed.
        amount: U256,
    },
    /// Add value to a holder's partition (and the partition's supply).
    AddToPartition {
        /// Holder credited.
        holder: Address,
        /// Partition credited.
        partition: Partition,
        /// Amount added.
        amount: U256,
    },
    /// Move value between total balances.
    MoveBalance {
        /// Holder debited.
        from: Address,
        /// Holder credited.
        to: Address,
        /// Amount moved.
        amount: U256,
    },
    /// Create value in a holder's total balance and the total supply.
    Mint {
        /// Holder credited.
        to: Address,
        /// Amount created.
        amount: U256,
    },
    /// Destroy value from a holder's total balance and the total supply.
    Burn {
        /// Holder debited.
        holder: Address,
        /// Amount destroyed.
        amount: U256,
    },
}

/// Everything an operation does, computed before anything is applied.
///
/// `changes` go to the ledger in one atomic commit; `events` are published
/// only after that commit succeeds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Ordered ledger mutations.
    pub changes: Vec<LedgerChange>,
    /// Ordered notifications.
    pub events: Vec<TokenEvent>,
}

impl Settlement {
    /// Appends a ledger change.
    pub fn change(&mut self, change: LedgerChange) {
        self.changes.push(change);
    }

    /// Appends an event.
    pub fn emit(&mut self, event: TokenEvent) {
        self.events.push(event);
    }
}

// =============================================================================
// FEE BREAKDOWNS & RECEIPTS
// =============================================================================

/// How a transfer value splits into net and fees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFees {
    /// Fee owed to the primary recipient.
    pub primary_fee: U256,
    /// Fee owed to the secondary recipient.
    pub secondary_fee: U256,
    /// Amount reaching the receiver.
    pub net: U256,
}

/// How an issuance value splits into fee and recipient amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceFees {
    /// Fee issued to the primary recipient.
    pub issue_fee: U256,
    /// Amount issued to the holder.
    pub to_amount: U256,
}

/// Read-only preview of a transfer's fee split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// True if the parties are exempt and no fee applies.
    pub exempt: bool,
    /// Fee split (all fees zero when exempt).
    pub fees: TransferFees,
    /// Fee amounts whose recipient is unset and that would be burned.
    pub burned: U256,
}

/// Outcome of a committed transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Partition the net amount and fees were credited to.
    pub destination_partition: Partition,
    /// True if the transfer bypassed fee logic.
    pub exempt: bool,
    /// Fee split.
    pub fees: TransferFees,
    /// Fees actually paid to a recipient.
    pub fees_routed: U256,
    /// Fees burned because their recipient was unset.
    pub burned: U256,
}

/// Outcome of a committed issuance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceReceipt {
    /// Partition credited.
    pub destination_partition: Partition,
    /// Fee split.
    pub fees: IssuanceFees,
}

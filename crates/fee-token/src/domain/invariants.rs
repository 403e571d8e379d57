//! # Domain Invariants
//!
//! Properties every settlement must satisfy before it is committed.
//!
//! - INVARIANT-1: Partition Consistency. For every holder, the change to the
//!   sum of its partition balances equals the change to its total balance.
//! - INVARIANT-2: Transfer Conservation. `net + primary_fee + secondary_fee == value`,
//!   and every fee is either paid out or burned.
//! - INVARIANT-3: Issuance Conservation. `issue_fee + to_amount == value`.

use crate::domain::entities::{IssuanceReceipt, LedgerChange, Settlement, TransferReceipt};
use crate::domain::value_objects::{Address, U256};
use crate::events::TokenEvent;
use std::collections::HashMap;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

#[derive(Default)]
struct Deltas {
    partition_in: U256,
    partition_out: U256,
    total_in: U256,
    total_out: U256,
}

/// INVARIANT-1: Partition Consistency
///
/// Each holder's partition movements must match its total-balance movements,
/// so that the sum of partitions keeps equalling the total after commit.
#[must_use]
pub fn check_partition_consistency(settlement: &Settlement) -> bool {
    let mut deltas: HashMap<Address, Deltas> = HashMap::new();

    for change in &settlement.changes {
        match change {
            LedgerChange::RemoveFromPartition { holder, amount, .. } => {
                let d = deltas.entry(*holder).or_default();
                d.partition_out = d.partition_out.saturating_add(*amount);
            }
            LedgerChange::AddToPartition { holder, amount, .. } => {
                let d = deltas.entry(*holder).or_default();
                d.partition_in = d.partition_in.saturating_add(*amount);
            }
            LedgerChange::MoveBalance { from, to, amount } => {
                let d = deltas.entry(*from).or_default();
                d.total_out = d.total_out.saturating_add(*amount);
                let d = deltas.entry(*to).or_default();
                d.total_in = d.total_in.saturating_add(*amount);
            }
            LedgerChange::Mint { to, amount } => {
                let d = deltas.entry(*to).or_default();
                d.total_in = d.total_in.saturating_add(*amount);
            }
            LedgerChange::Burn { holder, amount } => {
                let d = deltas.entry(*holder).or_default();
                d.total_out = d.total_out.saturating_add(*amount);
            }
        }
    }

    deltas.values().all(|d| {
        d.partition_in.saturating_add(d.total_out) == d.total_in.saturating_add(d.partition_out)
    })
}

/// INVARIANT-2: Transfer Conservation
#[must_use]
pub fn check_transfer_conservation(
    value: U256,
    receipt: &TransferReceipt,
    settlement: &Settlement,
) -> bool {
    let fees = &receipt.fees;
    let split = fees
        .net
        .checked_add(fees.primary_fee)
        .and_then(|v| v.checked_add(fees.secondary_fee));
    if split != Some(value) {
        return false;
    }

    let moved = settlement
        .events
        .iter()
        .filter(|e| matches!(e, TokenEvent::TransferExecuted { .. }))
        .filter_map(TokenEvent::amount)
        .fold(U256::zero(), U256::saturating_add);

    moved.saturating_add(receipt.burned) == value
}

/// INVARIANT-3: Issuance Conservation
#[must_use]
pub fn check_issuance_conservation(value: U256, receipt: &IssuanceReceipt) -> bool {
    receipt.fees.issue_fee.checked_add(receipt.fees.to_amount) == Some(value)
}

// =============================================================================
// AGGREGATE CHECK
// =============================================================================

/// A violated invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A holder's partitions and total moved by different amounts.
    PartitionMismatch,
    /// Transfer legs do not add up to the requested value.
    TransferNotConserved {
        /// Requested value.
        value: U256,
    },
    /// Issuance legs do not add up to the requested value.
    IssuanceNotConserved {
        /// Requested value.
        value: U256,
    },
}

/// Result of checking a settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants are violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

fn collect(violations: Vec<InvariantViolation>) -> InvariantCheckResult {
    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

/// Checks every invariant that applies to a transfer settlement.
#[must_use]
pub fn check_transfer(
    value: U256,
    receipt: &TransferReceipt,
    settlement: &Settlement,
) -> InvariantCheckResult {
    let mut violations = Vec::new();
    if !check_partition_consistency(settlement) {
        violations.push(InvariantViolation::PartitionMismatch);
    }
    if !check_transfer_conservation(value, receipt, settlement) {
        violations.push(InvariantViolation::TransferNotConserved { value });
    }
    collect(violations)
}

/// Checks every invariant that applies to an issuance settlement.
#[must_use]
pub fn check_issuance(
    value: U256,
    receipt: &IssuanceReceipt,
    settlement: &Settlement,
) -> InvariantCheckResult {
    let mut violations = Vec::new();
    if !check_partition_consistency(settlement) {
        violations.push(InvariantViolation::PartitionMismatch);
    }
    if !check_issuance_conservation(value, receipt) {
        violations.push(InvariantViolation::IssuanceNotConserved { value });
    }
    collect(violations)
}

// =============================================================================
// TESTS
// =============================================================================

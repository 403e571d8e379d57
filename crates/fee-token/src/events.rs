//! # Event Schema
//!
//! Notifications published to external observers after an operation commits.
//! One event is emitted per value movement; a failed operation emits nothing.
//!
//! | Event | Emitted when |
//! |-------|--------------|
//! | `PartitionChanged` | A transfer lands in a different partition than its source |
//! | `TransferExecuted` | Once for the net amount, once per non-zero fee payout |
//! | `IssuanceExecuted` | Once per issuance fee payout, once for the net amount |
//! | `WhitelistUpdated` | Owner sets an exemption entry |
//! | `FeeRecipientsUpdated` | Owner replaces the fee recipients |
//! | `OwnershipTransferred` | Owner hands over ownership |

use crate::domain::value_objects::{Address, Bytes, Partition, U256};
use serde::{Deserialize, Serialize};

/// Event topics for routing and filtering.
pub mod topics {
    /// Partition changed during a transfer.
    pub const PARTITION_CHANGED: &str = "token.partition_changed";
    /// Value moved between holders.
    pub const TRANSFER_EXECUTED: &str = "token.transfer_executed";
    /// Value issued to a holder.
    pub const ISSUANCE_EXECUTED: &str = "token.issuance_executed";
    /// Whitelist entry changed.
    pub const WHITELIST_UPDATED: &str = "token.whitelist_updated";
    /// Fee recipients replaced.
    pub const FEE_RECIPIENTS_UPDATED: &str = "token.fee_recipients_updated";
    /// Ownership transferred.
    pub const OWNERSHIP_TRANSFERRED: &str = "token.ownership_transferred";
}

/// A notification emitted by the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenEvent {
    /// The transferred value changed partition.
    PartitionChanged {
        /// Partition the value left.
        from_partition: Partition,
        /// Partition the value entered.
        to_partition: Partition,
        /// Full requested value.
        value: U256,
    },

    /// A value movement between two holders.
    TransferExecuted {
        /// Source partition of the transfer.
        partition: Partition,
        /// Operator that submitted the transfer.
        operator: Address,
        /// Holder debited.
        from: Address,
        /// Holder credited.
        to: Address,
        /// Amount moved by this leg.
        amount: U256,
        /// Transfer payload.
        data: Bytes,
        /// Operator payload.
        operator_data: Bytes,
    },

    /// Newly issued value.
    IssuanceExecuted {
        /// Partition credited.
        partition: Partition,
        /// Operator that submitted the issuance.
        operator: Address,
        /// Holder credited.
        to: Address,
        /// Amount issued by this leg.
        amount: U256,
        /// Issuance payload.
        data: Bytes,
    },

    /// An exemption entry was set.
    WhitelistUpdated {
        /// Address whose entry changed.
        account: Address,
        /// New exemption state.
        exempt: bool,
    },

    /// Fee recipients were replaced.
    FeeRecipientsUpdated {
        /// New primary recipient.
        primary: Option<Address>,
        /// New secondary recipient.
        secondary: Option<Address>,
    },

    /// Ownership moved to a new address.
    OwnershipTransferred {
        /// Former owner.
        previous_owner: Address,
        /// New owner.
        new_owner: Address,
    },
}

impl TokenEvent {
    /// Returns the topic this event is published under.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::PartitionChanged { .. } => topics::PARTITION_CHANGED,
            Self::TransferExecuted { .. } => topics::TRANSFER_EXECUTED,
            Self::IssuanceExecuted { .. } => topics::ISSUANCE_EXECUTED,
            Self::WhitelistUpdated { .. } => topics::WHITELIST_UPDATED,
            Self::FeeRecipientsUpdated { .. } => topics::FEE_RECIPIENTS_UPDATED,
            Self::OwnershipTransferred { .. } => topics::OWNERSHIP_TRANSFERRED,
        }
    }

    /// Returns the amount moved by a value-movement event.
    #[must_use]
    pub fn amount(&self) -> Option<U256> {
        match self {
            Self::TransferExecuted { amount, .. } | Self::IssuanceExecuted { amount, .. } => {
                Some(*amount)
            }
            _ => None,
        }
    }
}

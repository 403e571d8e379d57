//! # Transfer Engine
//!
//! Plans one partitioned transfer. The plan is a [`Settlement`]: the ordered
//! ledger changes plus the events to publish once they are committed.
//!
//! ```text
//! Start -> ExemptCheck -> ExemptPath -> Done
//!                      \-> FeePath  -> Done
//! (any failed precondition) -> Failed, nothing committed
//! ```

use crate::domain::entities::{
    FeeQuote, FeeRecipients, LedgerChange, Settlement, TransferFees, TransferReceipt,
    TransferRequest,
};
use crate::domain::fees::transfer_fees;
use crate::domain::value_objects::{Address, Partition, U256};
use crate::errors::FeeTokenError;
use crate::events::TokenEvent;

/// Inputs the engine needs besides the request itself.
#[derive(Clone, Copy, Debug)]
pub struct TransferContext {
    /// Whether the parties are fee-exempt.
    pub exempt: bool,
    /// Balance of `(from, source_partition)` before the transfer.
    pub available: U256,
    /// Resolved destination partition.
    pub destination: Partition,
    /// Fee recipients at the time of the transfer.
    pub recipients: FeeRecipients,
}

/// A planned transfer: what to commit and what to report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferPlan {
    /// Ledger changes and events.
    pub settlement: Settlement,
    /// Receipt returned once committed.
    pub receipt: TransferReceipt,
}

/// Stateless transfer planner.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransferEngine;

impl TransferEngine {
    /// Plans `request` under `ctx`.
    ///
    /// # Errors
    ///
    /// - `InsufficientBalance` if `ctx.available < request.value`
    /// - `ArithmeticOverflow` if fee math leaves the 256-bit range
    pub fn plan(
        request: &TransferRequest,
        ctx: &TransferContext,
    ) -> Result<TransferPlan, FeeTokenError> {
        if ctx.available < request.value {
            return Err(FeeTokenError::InsufficientBalance {
                required: request.value,
                available: ctx.available,
            });
        }

        if ctx.exempt {
            Ok(Self::plan_base(request, ctx.destination))
        } else {
            Self::plan_with_fees(request, ctx.destination, ctx.recipients)
        }
    }

    /// Previews the fee split for a transfer of `value`.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if fee math leaves the 256-bit range.
    pub fn quote(
        value: U256,
        exempt: bool,
        recipients: FeeRecipients,
    ) -> Result<FeeQuote, FeeTokenError> {
        if exempt {
            return Ok(FeeQuote {
                exempt,
                fees: TransferFees {
                    net: value,
                    ..TransferFees::default()
                },
                burned: U256::zero(),
            });
        }

        let fees = transfer_fees(value)?;
        let mut burned = U256::zero();
        if recipients.primary.is_none() {
            burned += fees.primary_fee;
        }
        if recipients.secondary.is_none() {
            burned += fees.secondary_fee;
        }

        Ok(FeeQuote {
            exempt,
            fees,
            burned,
        })
    }

    /// The ledger's plain partition transfer: full value, no fees.
    fn plan_base(request: &TransferRequest, destination: Partition) -> TransferPlan {
        let mut settlement = Settlement::default();
        Self::announce_partition_change(&mut settlement, request, destination);

        settlement.change(LedgerChange::RemoveFromPartition {
            holder: request.from,
            partition: request.source_partition,
            amount: request.value,
        });
        Self::pay(&mut settlement, request, request.to, destination, request.value);

        TransferPlan {
            settlement,
            receipt: TransferReceipt {
                destination_partition: destination,
                exempt: true,
                fees: TransferFees {
                    net: request.value,
                    ..TransferFees::default()
                },
                fees_routed: U256::zero(),
                burned: U256::zero(),
            },
        }
    }

    fn plan_with_fees(
        request: &TransferRequest,
        destination: Partition,
        recipients: FeeRecipients,
    ) -> Result<TransferPlan, FeeTokenError> {
        let fees = transfer_fees(request.value)?;
        let mut settlement = Settlement::default();
        Self::announce_partition_change(&mut settlement, request, destination);

        // The full value leaves the source partition; fees come out of it.
        settlement.change(LedgerChange::RemoveFromPartition {
            holder: request.from,
            partition: request.source_partition,
            amount: request.value,
        });
        Self::pay(&mut settlement, request, request.to, destination, fees.net);

        let mut routed = U256::zero();
        let mut burned = U256::zero();
        for (fee, recipient) in [
            (fees.primary_fee, recipients.primary),
            (fees.secondary_fee, recipients.secondary),
        ] {
            if fee.is_zero() {
                continue;
            }
            match recipient {
                Some(recipient) => {
                    Self::pay(&mut settlement, request, recipient, destination, fee);
                    routed += fee;
                }
                None => {
                    // Unset recipient: nobody is credited. Burning keeps the
                    // sender's total equal to the sum of its partitions.
                    settlement.change(LedgerChange::Burn {
                        holder: request.from,
                        amount: fee,
                    });
                    burned += fee;
                }
            }
        }

        Ok(TransferPlan {
            settlement,
            receipt: TransferReceipt {
                destination_partition: destination,
                exempt: false,
                fees,
                fees_routed: routed,
                burned,
            },
        })
    }

    fn announce_partition_change(
        settlement: &mut Settlement,
        request: &TransferRequest,
        destination: Partition,
    ) {
        if destination != request.source_partition {
            settlement.emit(TokenEvent::PartitionChanged {
                from_partition: request.source_partition,
                to_partition: destination,
                value: request.value,
            });
        }
    }

    /// One value-movement leg: total balance move, partition credit, event.
    fn pay(
        settlement: &mut Settlement,
        request: &TransferRequest,
        to: Address,
        destination: Partition,
        amount: U256,
    ) {
        settlement.change(LedgerChange::MoveBalance {
            from: request.from,
            to,
            amount,
        });
        settlement.change(LedgerChange::AddToPartition {
            holder: to,
            partition: destination,
            amount,
        });
        settlement.emit(TokenEvent::TransferExecuted {
            partition: request.source_partition,
            operator: request.operator,
            from: request.from,
            to,
            amount,
            data: request.data.clone(),
            operator_data: request.operator_data.clone(),
        });
    }
}

//! # Issuance Engine
//!
//! Plans one partitioned issuance. With a primary recipient set, 1% of the
//! value is issued to it first and the rest to the holder; otherwise the
//! holder receives everything.

use crate::domain::entities::{
    FeeRecipients, IssuanceReceipt, IssuanceRequest, LedgerChange, Settlement,
};
use crate::domain::fees::issuance_fees;
use crate::domain::value_objects::{Address, U256};
use crate::errors::FeeTokenError;
use crate::events::TokenEvent;

/// A planned issuance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuancePlan {
    /// Ledger changes and events.
    pub settlement: Settlement,
    /// Receipt returned once committed.
    pub receipt: IssuanceReceipt,
}

/// Stateless issuance planner.
#[derive(Clone, Copy, Debug, Default)]
pub struct IssuanceEngine;

impl IssuanceEngine {
    /// Plans `request` with the current `recipients`.
    ///
    /// A zero issuance fee produces no fee leg.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the fee computation overflows.
    pub fn plan(
        request: &IssuanceRequest,
        recipients: FeeRecipients,
    ) -> Result<IssuancePlan, FeeTokenError> {
        let fees = issuance_fees(request.value, recipients.primary.is_some())?;
        let mut settlement = Settlement::default();

        if let Some(primary) = recipients.primary {
            if !fees.issue_fee.is_zero() {
                Self::issue(&mut settlement, request, primary, fees.issue_fee);
            }
        }
        Self::issue(&mut settlement, request, request.to, fees.to_amount);

        Ok(IssuancePlan {
            settlement,
            receipt: IssuanceReceipt {
                destination_partition: request.destination_partition,
                fees,
            },
        })
    }

    fn issue(settlement: &mut Settlement, request: &IssuanceRequest, to: Address, amount: U256) {
        settlement.change(LedgerChange::Mint { to, amount });
        settlement.change(LedgerChange::AddToPartition {
            holder: to,
            partition: request.destination_partition,
            amount,
        });
        settlement.emit(TokenEvent::IssuanceExecuted {
            partition: request.destination_partition,
            operator: request.operator,
            to,
            amount,
            data: request.data.clone(),
        });
    }
}

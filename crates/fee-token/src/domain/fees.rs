//! # Fee Configuration
//!
//! Fixed fee rates and the owner-mutable fee recipients.
//!
//! Rates are integer numerators over [`FEE_DENOMINATOR`]. A fee is
//! `floor(value * numerator / denominator)`; the remainder always stays on the
//! non-fee side.

use crate::domain::entities::{FeeRecipients, IssuanceFees, TransferFees};
use crate::domain::value_objects::{Address, U256};
use crate::errors::FeeTokenError;

/// Denominator shared by every fee rate.
pub const FEE_DENOMINATOR: u64 = 100_000;

/// A fee rate expressed as `numerator / FEE_DENOMINATOR`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeRate {
    /// Numerator over [`FEE_DENOMINATOR`].
    pub numerator: u64,
}

impl FeeRate {
    /// Creates a rate.
    #[must_use]
    pub const fn new(numerator: u64) -> Self {
        Self { numerator }
    }

    /// Computes `floor(value * numerator / FEE_DENOMINATOR)`.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if `value * numerator` exceeds 256 bits.
    pub fn apply(&self, value: U256) -> Result<U256, FeeTokenError> {
        value
            .checked_mul(U256::from(self.numerator))
            .map(|scaled| scaled / U256::from(FEE_DENOMINATOR))
            .ok_or(FeeTokenError::ArithmeticOverflow {
                context: "fee computation",
            })
    }
}

/// Fixed fee rates.
pub mod rates {
    use super::FeeRate;

    /// Issuance fee: 1%.
    pub const ISSUANCE: FeeRate = FeeRate::new(1_000);
    /// Transfer fee paid to the primary recipient: 0.125%.
    pub const TRANSFER_PRIMARY: FeeRate = FeeRate::new(125);
    /// Transfer fee paid to the secondary recipient: 0.25%.
    pub const TRANSFER_SECONDARY: FeeRate = FeeRate::new(250);
}

/// Splits a transfer value into primary fee, secondary fee and net.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if any step leaves the 256-bit range.
pub fn transfer_fees(value: U256) -> Result<TransferFees, FeeTokenError> {
    let secondary_fee = rates::TRANSFER_SECONDARY.apply(value)?;
    let primary_fee = rates::TRANSFER_PRIMARY.apply(value)?;
    let net = value
        .checked_sub(primary_fee)
        .and_then(|v| v.checked_sub(secondary_fee))
        .ok_or(FeeTokenError::ArithmeticOverflow {
            context: "net transfer amount",
        })?;

    Ok(TransferFees {
        primary_fee,
        secondary_fee,
        net,
    })
}

/// Splits an issuance value into fee and recipient amount.
///
/// Without a primary recipient no fee is taken.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the fee computation overflows.
pub fn issuance_fees(value: U256, primary_set: bool) -> Result<IssuanceFees, FeeTokenError> {
    if !primary_set {
        return Ok(IssuanceFees {
            issue_fee: U256::zero(),
            to_amount: value,
        });
    }

    let issue_fee = rates::ISSUANCE.apply(value)?;
    let to_amount = value
        .checked_sub(issue_fee)
        .ok_or(FeeTokenError::ArithmeticOverflow {
            context: "net issuance amount",
        })?;

    Ok(IssuanceFees {
        issue_fee,
        to_amount,
    })
}

/// Owner-mutable fee recipient configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeConfig {
    recipients: FeeRecipients,
}

impl FeeConfig {
    /// Creates a configuration with the given recipients.
    #[must_use]
    pub const fn new(recipients: FeeRecipients) -> Self {
        Self { recipients }
    }

    /// Returns the current recipients.
    #[must_use]
    pub const fn recipients(&self) -> FeeRecipients {
        self.recipients
    }

    /// Returns the primary recipient, if set.
    #[must_use]
    pub const fn primary(&self) -> Option<Address> {
        self.recipients.primary
    }

    /// Returns the secondary recipient, if set.
    #[must_use]
    pub const fn secondary(&self) -> Option<Address> {
        self.recipients.secondary
    }

    /// Replaces both recipients at once. Returns true if either changed.
    pub fn set_recipients(&mut self, primary: Option<Address>, secondary: Option<Address>) -> bool {
        let next = FeeRecipients::new(primary, secondary);
        let changed = self.recipients != next;
        self.recipients = next;
        changed
    }
}

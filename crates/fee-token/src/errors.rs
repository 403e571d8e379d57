//! # Error Types
//!
//! All error types for fee-routed transfers and issuance.
//!
//! Every error aborts the enclosing operation as a whole: balances, whitelist
//! entries and fee-recipient configuration are left untouched and no events
//! are published.

use crate::domain::value_objects::{Address, U256};
use thiserror::Error;

// =============================================================================
// STATUS CODES
// =============================================================================

/// ERC-1066 style status codes reported alongside errors.
pub mod status_codes {
    /// Insufficient funds.
    pub const INSUFFICIENT_BALANCE: &str = "52";
    /// Not authorized for the requested action.
    pub const UNAUTHORIZED: &str = "56";
    /// Arithmetic overflow or underflow.
    pub const ARITHMETIC: &str = "5F";
    /// Ledger collaborator failure.
    pub const LEDGER_FAILURE: &str = "50";
}

// =============================================================================
// FEE TOKEN ERRORS
// =============================================================================

/// Errors surfaced by the fee-routing engines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeeTokenError {
    /// Source partition balance is below the requested value.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Value requested.
        required: U256,
        /// Balance held in the source partition.
        available: U256,
    },

    /// A configuration change or issuance was attempted by an unauthorized caller.
    #[error("unauthorized caller: {caller:?}")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },

    /// Fee or balance arithmetic left the representable range.
    #[error("arithmetic overflow in {context}")]
    ArithmeticOverflow {
        /// Which computation overflowed.
        context: &'static str,
    },

    /// The ledger collaborator rejected the operation.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl FeeTokenError {
    /// Returns the status code reported for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => status_codes::INSUFFICIENT_BALANCE,
            Self::Unauthorized { .. } => status_codes::UNAUTHORIZED,
            Self::ArithmeticOverflow { .. }
            | Self::Ledger(LedgerError::Overflow | LedgerError::Underflow) => {
                status_codes::ARITHMETIC
            }
            Self::Ledger(_) => status_codes::LEDGER_FAILURE,
        }
    }

    /// Returns true if this is an arithmetic failure, whether raised by the
    /// engine or by the ledger while applying changes.
    #[must_use]
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::ArithmeticOverflow { .. }
                | Self::Ledger(LedgerError::Overflow | LedgerError::Underflow)
        )
    }
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors raised by the ledger collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A credit or mint would exceed the representable range.
    #[error("balance overflow")]
    Overflow,

    /// A debit, burn or move would take a balance below zero.
    #[error("balance underflow")]
    Underflow,

    /// The ledger backend cannot be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// TESTS
// =============================================================================

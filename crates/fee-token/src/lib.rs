//! # Fee Token - Fee-Routed Partitioned Transfers
//!
//! ## Purpose
//!
//! Every balance-changing operation on a partitioned token (transfer or
//! issuance) computes fee amounts with exact floor rounding and routes them to
//! designated recipients in the same atomic commit, unless the parties are
//! exempt.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Partition Consistency | `domain/invariants.rs` - `check_partition_consistency()` |
//! | INVARIANT-2 | Transfer Conservation | `domain/invariants.rs` - `check_transfer_conservation()` |
//! | INVARIANT-3 | Issuance Conservation | `domain/invariants.rs` - `check_issuance_conservation()` |
//! | INVARIANT-4 | All-or-Nothing Commit | `ports/outbound.rs` - `Ledger::commit()` |
//!
//! ## Fee Rates
//!
//! | Fee | Rate | Paid to |
//! |-----|------|---------|
//! | Issuance | 1000 / 100000 (1%) | Primary recipient |
//! | Transfer (primary) | 125 / 100000 (0.125%) | Primary recipient |
//! | Transfer (secondary) | 250 / 100000 (0.25%) | Secondary recipient |
//!
//! A transfer is exempt when `from == to`, when either party is the owner or
//! a fee recipient, or when either party is whitelisted.
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Ledger | `Ledger` | Balances, partition decoding, issuer check, atomic commit |
//! | Observers | `EventSink` | Receives committed events |
//!
//! ## Usage Example
//!
//! ```ignore
//! use fee_token::prelude::*;
//!
//! let service = create_in_memory_service(&config).await?;
//! let receipt = service
//!     .transfer_by_partition(TransferRequest::new(partition, alice, bob, value))
//!     .await?;
//! println!("net {} fees {}", receipt.fees.net, receipt.fees_routed);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        FeeQuote, FeeRecipients, IssuanceFees, IssuanceReceipt, IssuanceRequest, LedgerChange,
        Settlement, TransferFees, TransferReceipt, TransferRequest,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes, Partition, U256};

    // Engines and policy
    pub use crate::domain::fees::{rates, FeeRate, FEE_DENOMINATOR};
    pub use crate::domain::issuance::IssuanceEngine;
    pub use crate::domain::policy::TokenPolicy;
    pub use crate::domain::routing::PartitionRouter;
    pub use crate::domain::transfer::{TransferContext, TransferEngine};
    pub use crate::domain::whitelist::WhitelistRegistry;

    // Invariants
    pub use crate::domain::invariants::{InvariantCheckResult, InvariantViolation};

    // Ports
    pub use crate::ports::inbound::FeeTokenApi;
    pub use crate::ports::outbound::{EventSink, Ledger};

    // Events
    pub use crate::events::{topics, TokenEvent};

    // Errors
    pub use crate::errors::{FeeTokenError, LedgerError};

    // Configuration
    pub use crate::config::{ConfigError, TokenConfig};

    // Adapters
    pub use crate::adapters::{InMemoryEventLog, InMemoryLedger};

    // Service
    pub use crate::service::{create_in_memory_service, FeeTokenService, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

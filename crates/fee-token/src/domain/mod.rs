//! # Domain Layer (Inner Hexagon)
//!
//! Pure fee-routing logic. NO I/O, NO async.
//!
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).
//! - Engines produce a [`Settlement`](entities::Settlement); applying it is the
//!   ledger's job.

pub mod entities;
pub mod fees;
pub mod invariants;
pub mod issuance;
pub mod policy;
pub mod routing;
pub mod transfer;
pub mod value_objects;
pub mod whitelist;

pub use entities::*;
pub use fees::{rates, FeeConfig, FeeRate, FEE_DENOMINATOR};
pub use invariants::{InvariantCheckResult, InvariantViolation};
pub use issuance::{IssuanceEngine, IssuancePlan};
pub use policy::TokenPolicy;
pub use routing::{PartitionRouter, MIN_ROUTING_DATA_LEN};
pub use transfer::{TransferContext, TransferEngine, TransferPlan};
pub use value_objects::*;
pub use whitelist::WhitelistRegistry;

//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports.

pub mod event_log;
pub mod memory_ledger;

pub use event_log::*;
pub use memory_ledger::*;

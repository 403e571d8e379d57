//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the fee-routing domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `FeeTokenApi`
//! - **Driven Ports (Outbound)**: `Ledger`, `EventSink`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

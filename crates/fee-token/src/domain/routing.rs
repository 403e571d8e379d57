//! # Partition Router
//!
//! Resolves the destination partition of a transfer. Byte layout of the
//! payload belongs to the ledger; the router only decides whether to ask.

use crate::domain::value_objects::{Bytes, Partition};

/// Minimum `data` length before a destination partition is looked for.
pub const MIN_ROUTING_DATA_LEN: usize = 64;

/// Stateless destination-partition resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct PartitionRouter;

impl PartitionRouter {
    /// Returns the destination partition for a transfer out of `source`.
    ///
    /// `decode` is only consulted when `operator_data` is non-empty and
    /// `data` is at least [`MIN_ROUTING_DATA_LEN`] bytes. When it finds no
    /// explicit partition the source partition is kept.
    pub fn resolve_destination<F>(
        source: Partition,
        data: &Bytes,
        operator_data: &Bytes,
        decode: F,
    ) -> Partition
    where
        F: FnOnce(&Bytes) -> Option<Partition>,
    {
        if operator_data.is_empty() || data.len() < MIN_ROUTING_DATA_LEN {
            return source;
        }
        decode(data).unwrap_or(source)
    }
}

//! # In-Memory Ledger
//!
//! Partitioned balance store for tests and the simulator.
//! A production ledger would sit on persistent storage behind the same port.

use crate::domain::entities::LedgerChange;
use crate::domain::value_objects::{Address, Bytes, Partition, U256};
use crate::errors::LedgerError;
use crate::ports::outbound::Ledger;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// First 32 bytes of `data` that announce an explicit destination partition.
pub const CHANGE_PARTITION_FLAG: [u8; 32] = [0xFF; 32];

#[derive(Clone, Debug, Default)]
struct LedgerState {
    balances: HashMap<Address, U256>,
    partition_balances: HashMap<(Address, Partition), U256>,
    partitions: HashMap<Address, Vec<Partition>>,
    total_supply: U256,
    supply_by_partition: HashMap<Partition, U256>,
}

fn credit(slot: &mut U256, amount: U256) -> Result<(), LedgerError> {
    *slot = slot.checked_add(amount).ok_or(LedgerError::Overflow)?;
    Ok(())
}

fn debit(slot: &mut U256, amount: U256) -> Result<(), LedgerError> {
    *slot = slot.checked_sub(amount).ok_or(LedgerError::Underflow)?;
    Ok(())
}

impl LedgerState {
    fn apply(&mut self, change: &LedgerChange) -> Result<(), LedgerError> {
        match change {
            LedgerChange::RemoveFromPartition {
                holder,
                partition,
                amount,
            } => {
                let slot = self
                    .partition_balances
                    .entry((*holder, *partition))
                    .or_default();
                debit(slot, *amount)?;
                if slot.is_zero() {
                    if let Some(list) = self.partitions.get_mut(holder) {
                        list.retain(|p| p != partition);
                    }
                }
                debit(
                    self.supply_by_partition.entry(*partition).or_default(),
                    *amount,
                )
            }
            LedgerChange::AddToPartition {
                holder,
                partition,
                amount,
            } => {
                if amount.is_zero() {
                    return Ok(());
                }
                let slot = self
                    .partition_balances
                    .entry((*holder, *partition))
                    .or_default();
                let was_empty = slot.is_zero();
                credit(slot, *amount)?;
                if was_empty {
                    self.partitions.entry(*holder).or_default().push(*partition);
                }
                credit(
                    self.supply_by_partition.entry(*partition).or_default(),
                    *amount,
                )
            }
            LedgerChange::MoveBalance { from, to, amount } => {
                debit(self.balances.entry(*from).or_default(), *amount)?;
                credit(self.balances.entry(*to).or_default(), *amount)
            }
            LedgerChange::Mint { to, amount } => {
                credit(&mut self.total_supply, *amount)?;
                credit(self.balances.entry(*to).or_default(), *amount)
            }
            LedgerChange::Burn { holder, amount } => {
                debit(self.balances.entry(*holder).or_default(), *amount)?;
                debit(&mut self.total_supply, *amount)
            }
        }
    }
}

/// In-memory partitioned ledger with all-or-nothing commits.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    issuers: RwLock<HashSet<Address>>,
    unavailable: RwLock<Option<String>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger where `issuer` may issue tokens.
    #[must_use]
    pub fn new(issuer: Address) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            issuers: RwLock::new(HashSet::from([issuer])),
            unavailable: RwLock::new(None),
        }
    }

    /// Grants or revokes issuance rights.
    pub fn set_issuer(&self, operator: Address, allowed: bool) {
        let mut issuers = self.issuers.write();
        if allowed {
            issuers.insert(operator);
        } else {
            issuers.remove(&operator);
        }
    }

    /// Makes every subsequent commit fail with `Unavailable` until cleared.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        *self.unavailable.write() = reason.map(str::to_string);
    }

    /// Sum of `holder`'s partition balances.
    #[must_use]
    pub fn partition_sum(&self, holder: Address) -> U256 {
        self.state
            .read()
            .partition_balances
            .iter()
            .filter(|((h, _), _)| *h == holder)
            .fold(U256::zero(), |acc, (_, v)| acc.saturating_add(*v))
    }

    /// Encodes `data` that routes a transfer into `partition`.
    #[must_use]
    pub fn encode_destination_partition(partition: Partition) -> Bytes {
        let mut data = CHANGE_PARTITION_FLAG.to_vec();
        data.extend_from_slice(partition.as_bytes());
        Bytes(data)
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn balance_of(&self, holder: Address) -> Result<U256, LedgerError> {
        Ok(self
            .state
            .read()
            .balances
            .get(&holder)
            .copied()
            .unwrap_or_default())
    }

    async fn balance_of_by_partition(
        &self,
        holder: Address,
        partition: Partition,
    ) -> Result<U256, LedgerError> {
        Ok(self
            .state
            .read()
            .partition_balances
            .get(&(holder, partition))
            .copied()
            .unwrap_or_default())
    }

    async fn partitions_of(&self, holder: Address) -> Result<Vec<Partition>, LedgerError> {
        Ok(self
            .state
            .read()
            .partitions
            .get(&holder)
            .cloned()
            .unwrap_or_default())
    }

    async fn total_supply(&self) -> Result<U256, LedgerError> {
        Ok(self.state.read().total_supply)
    }

    async fn total_supply_by_partition(&self, partition: Partition) -> Result<U256, LedgerError> {
        Ok(self
            .state
            .read()
            .supply_by_partition
            .get(&partition)
            .copied()
            .unwrap_or_default())
    }

    fn decode_destination_partition(&self, data: &Bytes) -> Option<Partition> {
        let bytes = data.as_slice();
        if bytes.len() < 64 || bytes[..32] != CHANGE_PARTITION_FLAG {
            return None;
        }
        Partition::from_slice(&bytes[32..64])
    }

    async fn can_issue(&self, operator: Address) -> Result<bool, LedgerError> {
        Ok(self.issuers.read().contains(&operator))
    }

    async fn commit(&self, changes: &[LedgerChange]) -> Result<(), LedgerError> {
        if let Some(reason) = self.unavailable.read().clone() {
            return Err(LedgerError::Unavailable(reason));
        }

        let mut state = self.state.write();
        let mut staged = state.clone();
        for change in changes {
            staged.apply(change)?;
        }
        *state = staged;

        debug!(changes = changes.len(), "Ledger commit applied");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: Address = Address::repeat(0x01);
    const ALICE: Address = Address::repeat(0xA1);
    const BOB: Address = Address::repeat(0xB0);

    fn default_partition() -> Partition {
        Partition::from_label("default")
    }

    fn mint(to: Address, amount: u64) -> Vec<LedgerChange> {
        vec![
            LedgerChange::Mint {
                to,
                amount: U256::from(amount),
            },
            LedgerChange::AddToPartition {
                holder: to,
                partition: default_partition(),
                amount: U256::from(amount),
            },
        ]
    }

    #[tokio::test]
    async fn test_mint_updates_all_views() {
        let ledger = InMemoryLedger::new(ISSUER);
        ledger.commit(&mint(ALICE, 100)).await.unwrap();

        assert_eq!(ledger.balance_of(ALICE).await.unwrap(), U256::from(100));
        assert_eq!(
            ledger
                .balance_of_by_partition(ALICE, default_partition())
                .await
                .unwrap(),
            U256::from(100)
        );
        assert_eq!(ledger.total_supply().await.unwrap(), U256::from(100));
        assert_eq!(
            ledger
                .total_supply_by_partition(default_partition())
                .await
                .unwrap(),
            U256::from(100)
        );
        assert_eq!(
            ledger.partitions_of(ALICE).await.unwrap(),
            vec![default_partition()]
        );
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back() {
        let ledger = InMemoryLedger::new(ISSUER);
        ledger.commit(&mint(ALICE, 100)).await.unwrap();

        let changes = vec![
            LedgerChange::MoveBalance {
                from: ALICE,
                to: BOB,
                amount: U256::from(60),
            },
            LedgerChange::MoveBalance {
                from: ALICE,
                to: BOB,
                amount: U256::from(60),
            },
        ];
        let err = ledger.commit(&changes).await.unwrap_err();
        assert_eq!(err, LedgerError::Underflow);

        assert_eq!(ledger.balance_of(ALICE).await.unwrap(), U256::from(100));
        assert_eq!(ledger.balance_of(BOB).await.unwrap(), U256::zero());
    }

    #[tokio::test]
    async fn test_mint_overflow_rejected() {
        let ledger = InMemoryLedger::new(ISSUER);
        ledger
            .commit(&[LedgerChange::Mint {
                to: ALICE,
                amount: U256::MAX,
            }])
            .await
            .unwrap();
        let err = ledger
            .commit(&[LedgerChange::Mint {
                to: BOB,
                amount: U256::one(),
            }])
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::Overflow);
        assert_eq!(ledger.balance_of(BOB).await.unwrap(), U256::zero());
    }

    #[tokio::test]
    async fn test_emptied_partition_is_dropped() {
        let ledger = InMemoryLedger::new(ISSUER);
        ledger.commit(&mint(ALICE, 10)).await.unwrap();
        ledger
            .commit(&[LedgerChange::RemoveFromPartition {
                holder: ALICE,
                partition: default_partition(),
                amount: U256::from(10),
            }])
            .await
            .unwrap();
        assert!(ledger.partitions_of(ALICE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_commit() {
        let ledger = InMemoryLedger::new(ISSUER);
        ledger.set_unavailable(Some("maintenance"));
        let err = ledger.commit(&mint(ALICE, 1)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable(_)));

        ledger.set_unavailable(None);
        ledger.commit(&mint(ALICE, 1)).await.unwrap();
    }

    #[test]
    fn test_decode_destination_partition() {
        let ledger = InMemoryLedger::new(ISSUER);
        let target = Partition::from_label("locked");

        let data = InMemoryLedger::encode_destination_partition(target);
        assert_eq!(ledger.decode_destination_partition(&data), Some(target));

        let mut unflagged = data.clone();
        unflagged.0[0] = 0;
        assert_eq!(ledger.decode_destination_partition(&unflagged), None);
        assert_eq!(
            ledger.decode_destination_partition(&Bytes::from(vec![0xFF; 40])),
            None
        );
    }

    #[tokio::test]
    async fn test_issuers() {
        let ledger = InMemoryLedger::new(ISSUER);
        assert!(ledger.can_issue(ISSUER).await.unwrap());
        assert!(!ledger.can_issue(ALICE).await.unwrap());

        ledger.set_issuer(ALICE, true);
        assert!(ledger.can_issue(ALICE).await.unwrap());
        ledger.set_issuer(ISSUER, false);
        assert!(!ledger.can_issue(ISSUER).await.unwrap());
    }
}

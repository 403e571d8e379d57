//! # Fee Token Service
//!
//! Wires the pure engines to the ledger and event sink.
//!
//! Operations run one at a time: the policy lock is held from the exemption
//! check until the events are published, so no two operations interleave and
//! configuration cannot change under an in-flight transfer.
//!
//! Each operation follows the same shape:
//! 1. Consult the policy (exemption, recipients, authorization)
//! 2. Plan a [`Settlement`] in the domain layer
//! 3. Commit its changes to the ledger in one call
//! 4. Publish its events, only if the commit succeeded

use crate::adapters::{InMemoryEventLog, InMemoryLedger};
use crate::config::TokenConfig;
use crate::domain::entities::{
    FeeQuote, FeeRecipients, IssuanceReceipt, IssuanceRequest, Settlement, TransferReceipt,
    TransferRequest,
};
use crate::domain::invariants;
use crate::domain::issuance::IssuanceEngine;
use crate::domain::policy::TokenPolicy;
use crate::domain::routing::PartitionRouter;
use crate::domain::transfer::{TransferContext, TransferEngine};
use crate::domain::value_objects::{Address, Partition, U256};
use crate::errors::FeeTokenError;
use crate::events::TokenEvent;
use crate::ports::inbound::FeeTokenApi;
use crate::ports::outbound::{EventSink, Ledger};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Converts a base-unit amount for a Prometheus counter.
///
/// Amounts above `u128::MAX` saturate; below that the value is exact up to
/// `f64` precision.
#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
#[allow(clippy::cast_precision_loss)]
fn metric_amount(amount: U256) -> f64 {
    if amount > U256::from(u128::MAX) {
        u128::MAX as f64
    } else {
        amount.low_u128() as f64
    }
}

/// Statistics for the fee token service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Committed transfers, exempt or not.
    pub transfers_executed: u64,
    /// Committed transfers that skipped fee logic.
    pub exempt_transfers: u64,
    /// Committed issuances.
    pub issuances_executed: u64,
    /// Fees paid out to recipients (transfer and issuance).
    pub fees_routed: U256,
    /// Fees burned because their recipient was unset.
    pub fees_burned: U256,
    /// Operations that failed after authorization.
    pub failed_operations: u64,
    /// Calls rejected as unauthorized.
    pub rejected_requests: u64,
}

/// The fee-routing token service.
pub struct FeeTokenService<L: Ledger, E: EventSink> {
    /// Ledger collaborator.
    ledger: Arc<L>,
    /// Event sink.
    events: Arc<E>,
    /// Owner, whitelist and fee recipients. Held for the whole of an operation.
    policy: Mutex<TokenPolicy>,
    /// Service statistics.
    stats: RwLock<ServiceStats>,
}

impl<L: Ledger, E: EventSink> FeeTokenService<L, E> {
    /// Constructs the token.
    ///
    /// Sets the fee recipients, whitelists `config.initial_recipient` and
    /// issues `config.initial_supply` to it on behalf of the owner through
    /// the issuance engine.
    ///
    /// # Errors
    ///
    /// Fails if the owner may not issue on `ledger`, or if the initial
    /// issuance fails.
    #[instrument(skip(ledger, events, config), fields(owner = %config.owner))]
    pub async fn construct(
        ledger: Arc<L>,
        events: Arc<E>,
        config: &TokenConfig,
    ) -> Result<Self, FeeTokenError> {
        let mut policy = TokenPolicy::new(config.owner, config.recipients());
        policy.seed_exempt(config.initial_recipient, true);

        let service = Self {
            ledger,
            events,
            policy: Mutex::new(policy),
            stats: RwLock::new(ServiceStats::default()),
        };

        service
            .issue_by_partition(IssuanceRequest::new(
                config.default_partition(),
                config.owner,
                config.initial_recipient,
                config.initial_supply,
            ))
            .await?;

        info!(
            recipient = %config.initial_recipient,
            supply = %config.initial_supply,
            partition = %config.default_partition(),
            "Fee token constructed"
        );
        Ok(service)
    }

    /// Ledger handle.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Event sink handle.
    pub fn events(&self) -> &Arc<E> {
        &self.events
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Commits a settlement and publishes its events.
    async fn settle(&self, settlement: Settlement) -> Result<(), FeeTokenError> {
        self.ledger.commit(&settlement.changes).await?;
        for event in settlement.events {
            self.events.publish(event).await;
        }
        Ok(())
    }

    async fn record_failure(&self, err: &FeeTokenError) {
        let mut stats = self.stats.write().await;
        if matches!(err, FeeTokenError::Unauthorized { .. }) {
            stats.rejected_requests += 1;
        } else {
            stats.failed_operations += 1;
        }
        #[cfg(feature = "metrics")]
        token_telemetry::metrics::OPERATIONS_REJECTED
            .with_label_values(&[err.code()])
            .inc();
    }

    async fn transfer_locked(
        &self,
        policy: &TokenPolicy,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, FeeTokenError> {
        let exempt = policy.is_exempt(&request.from, &request.to);
        let available = self
            .ledger
            .balance_of_by_partition(request.from, request.source_partition)
            .await?;
        let destination = PartitionRouter::resolve_destination(
            request.source_partition,
            &request.data,
            &request.operator_data,
            |data| self.ledger.decode_destination_partition(data),
        );

        let plan = TransferEngine::plan(
            request,
            &TransferContext {
                exempt,
                available,
                destination,
                recipients: policy.recipients(),
            },
        )?;
        debug_assert!(
            invariants::check_transfer(request.value, &plan.receipt, &plan.settlement).is_valid()
        );

        debug!(
            exempt,
            net = %plan.receipt.fees.net,
            primary_fee = %plan.receipt.fees.primary_fee,
            secondary_fee = %plan.receipt.fees.secondary_fee,
            destination = %destination,
            "Transfer planned"
        );
        if !plan.receipt.burned.is_zero() {
            warn!(
                burned = %plan.receipt.burned,
                "Fee recipient unset; fee amount burned"
            );
        }

        self.settle(plan.settlement).await?;
        Ok(plan.receipt)
    }

    async fn issue_locked(
        &self,
        policy: &TokenPolicy,
        request: &IssuanceRequest,
    ) -> Result<IssuanceReceipt, FeeTokenError> {
        if !self.ledger.can_issue(request.operator).await? {
            return Err(FeeTokenError::Unauthorized {
                caller: request.operator,
            });
        }

        let plan = IssuanceEngine::plan(request, policy.recipients())?;
        debug_assert!(
            invariants::check_issuance(request.value, &plan.receipt, &plan.settlement).is_valid()
        );

        self.settle(plan.settlement).await?;
        Ok(plan.receipt)
    }

    /// Runs an owner-only policy mutation and publishes `event` if it
    /// changed anything.
    async fn govern<F>(&self, caller: Address, event: TokenEvent, mutate: F) -> Result<(), FeeTokenError>
    where
        F: FnOnce(&mut TokenPolicy) -> Result<bool, FeeTokenError> + Send,
    {
        let mut policy = self.policy.lock().await;
        match mutate(&mut *policy) {
            Ok(true) => {
                info!(caller = %caller, topic = event.topic(), "Configuration updated");
                self.events.publish(event).await;
                Ok(())
            }
            Ok(false) => {
                debug!(caller = %caller, topic = event.topic(), "Configuration unchanged");
                Ok(())
            }
            Err(err) => {
                warn!(caller = %caller, error = %err, "Configuration change rejected");
                self.record_failure(&err).await;
                Err(err)
            }
        }
    }
}

#[async_trait]
impl<L: Ledger, E: EventSink> FeeTokenApi for FeeTokenService<L, E> {
    #[instrument(
        skip(self, request),
        fields(from = %request.from, to = %request.to, value = %request.value)
    )]
    async fn transfer_by_partition(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, FeeTokenError> {
        let policy = self.policy.lock().await;

        match self.transfer_locked(&policy, &request).await {
            Ok(receipt) => {
                {
                    let mut stats = self.stats.write().await;
                    stats.transfers_executed += 1;
                    if receipt.exempt {
                        stats.exempt_transfers += 1;
                    }
                    stats.fees_routed = stats.fees_routed.saturating_add(receipt.fees_routed);
                    stats.fees_burned = stats.fees_burned.saturating_add(receipt.burned);
                }
                #[cfg(feature = "metrics")]
                token_telemetry::metrics::record_transfer(
                    receipt.exempt,
                    metric_amount(receipt.fees_routed),
                );

                info!(
                    exempt = receipt.exempt,
                    net = %receipt.fees.net,
                    fees_routed = %receipt.fees_routed,
                    "Transfer committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, code = err.code(), "Transfer aborted");
                self.record_failure(&err).await;
                Err(err)
            }
        }
    }

    #[instrument(
        skip(self, request),
        fields(operator = %request.operator, to = %request.to, value = %request.value)
    )]
    async fn issue_by_partition(
        &self,
        request: IssuanceRequest,
    ) -> Result<IssuanceReceipt, FeeTokenError> {
        let policy = self.policy.lock().await;

        match self.issue_locked(&policy, &request).await {
            Ok(receipt) => {
                {
                    let mut stats = self.stats.write().await;
                    stats.issuances_executed += 1;
                    stats.fees_routed = stats.fees_routed.saturating_add(receipt.fees.issue_fee);
                }
                #[cfg(feature = "metrics")]
                token_telemetry::metrics::record_issuance(metric_amount(receipt.fees.issue_fee));

                info!(
                    issue_fee = %receipt.fees.issue_fee,
                    to_amount = %receipt.fees.to_amount,
                    "Issuance committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, code = err.code(), "Issuance aborted");
                self.record_failure(&err).await;
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    async fn upgrade_fee_addresses(
        &self,
        caller: Address,
        primary: Option<Address>,
        secondary: Option<Address>,
    ) -> Result<(), FeeTokenError> {
        self.govern(
            caller,
            TokenEvent::FeeRecipientsUpdated { primary, secondary },
            |policy| policy.set_recipients(caller, primary, secondary),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn set_whitelist(
        &self,
        caller: Address,
        account: Address,
        exempt: bool,
    ) -> Result<(), FeeTokenError> {
        self.govern(
            caller,
            TokenEvent::WhitelistUpdated { account, exempt },
            |policy| policy.set_exempt(caller, account, exempt),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), FeeTokenError> {
        self.govern(
            caller,
            TokenEvent::OwnershipTransferred {
                previous_owner: caller,
                new_owner,
            },
            |policy| policy
                .transfer_ownership(caller, new_owner)
                .map(|previous| previous != new_owner),
        )
        .await
    }

    async fn quote_transfer(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<FeeQuote, FeeTokenError> {
        let policy = self.policy.lock().await;
        TransferEngine::quote(value, policy.is_exempt(&from, &to), policy.recipients())
    }

    async fn is_exempt(&self, from: Address, to: Address) -> bool {
        self.policy.lock().await.is_exempt(&from, &to)
    }

    async fn is_whitelisted(&self, account: Address) -> bool {
        self.policy.lock().await.whitelist().is_whitelisted(&account)
    }

    async fn fee_recipients(&self) -> FeeRecipients {
        self.policy.lock().await.recipients()
    }

    async fn owner(&self) -> Address {
        self.policy.lock().await.owner()
    }

    async fn balance_of(&self, holder: Address) -> Result<U256, FeeTokenError> {
        Ok(self.ledger.balance_of(holder).await?)
    }

    async fn balance_of_by_partition(
        &self,
        holder: Address,
        partition: Partition,
    ) -> Result<U256, FeeTokenError> {
        Ok(self.ledger.balance_of_by_partition(holder, partition).await?)
    }

    async fn partitions_of(&self, holder: Address) -> Result<Vec<Partition>, FeeTokenError> {
        Ok(self.ledger.partitions_of(holder).await?)
    }

    async fn total_supply(&self) -> Result<U256, FeeTokenError> {
        Ok(self.ledger.total_supply().await?)
    }
}

/// Constructs a token over a fresh in-memory ledger and event log.
///
/// The owner is the ledger's only issuer.
///
/// # Errors
///
/// Propagates construction failures.
pub async fn create_in_memory_service(
    config: &TokenConfig,
) -> Result<FeeTokenService<InMemoryLedger, InMemoryEventLog>, FeeTokenError> {
    let ledger = Arc::new(InMemoryLedger::new(config.owner));
    let events = Arc::new(InMemoryEventLog::new());
    FeeTokenService::construct(ledger, events, config).await
}

// =============================================================================
// TESTS
// =============================================================================

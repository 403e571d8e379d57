//! # End-to-End Fee Routing Tests
//!
//! Drives the service over the in-memory ledger and checks balances, events
//! and rollbacks together.
//!
//! ## Test Categories
//!
//! 1. **Construction** - Genesis issuance split and whitelisting
//! 2. **Fee Path** - Net and fee legs, event order, unset recipients
//! 3. **Exempt Path** - Whitelist, privileged parties, self-transfers
//! 4. **Partition Routing** - Destination decoding from transfer data
//! 5. **Failures** - Nothing committed, nothing published
//! 6. **Conservation** - Randomized transfers and issuances

use fee_token::prelude::*;
use proptest::prelude::*;

// =============================================================================
// TEST HELPERS
// =============================================================================

const OWNER: Address = Address::repeat(0x01);
const PRIMARY: Address = Address::repeat(0x0A);
const SECONDARY: Address = Address::repeat(0x0B);
const TREASURY: Address = Address::repeat(0x7E);
const ALICE: Address = Address::repeat(0xA1);
const BOB: Address = Address::repeat(0xB0);

type Service = FeeTokenService<InMemoryLedger, InMemoryEventLog>;

fn default_partition() -> Partition {
    Partition::from_label("default")
}

fn config() -> TokenConfig {
    TokenConfig {
        owner: OWNER,
        initial_recipient: TREASURY,
        primary_fee_address: Some(PRIMARY),
        secondary_fee_address: Some(SECONDARY),
        ..TokenConfig::default()
    }
}

/// Token with `amount` moved from the treasury to Alice and the log cleared.
async fn service_with(config: TokenConfig, amount: u64) -> Service {
    let service = create_in_memory_service(&config).await.unwrap();
    service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            TREASURY,
            ALICE,
            U256::from(amount),
        ))
        .await
        .unwrap();
    service.events().drain();
    service
}

async fn balance(service: &Service, holder: Address) -> U256 {
    service.balance_of(holder).await.unwrap()
}

async fn partition_balance(service: &Service, holder: Address, partition: Partition) -> U256 {
    service
        .balance_of_by_partition(holder, partition)
        .await
        .unwrap()
}

fn transfer_legs(events: &[TokenEvent]) -> Vec<(Address, U256)> {
    events
        .iter()
        .filter_map(|e| match e {
            TokenEvent::TransferExecuted { to, amount, .. } => Some((*to, *amount)),
            _ => None,
        })
        .collect()
}

async fn assert_partitions_consistent(service: &Service, holders: &[Address]) {
    for holder in holders {
        assert_eq!(
            service.ledger().partition_sum(*holder),
            balance(service, *holder).await,
            "partition sum differs from balance for {holder}"
        );
    }
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

#[tokio::test]
async fn test_genesis_issuance_split() {
    let service = create_in_memory_service(&config()).await.unwrap();
    let unit = U256::exp10(18);

    assert_eq!(
        partition_balance(&service, PRIMARY, default_partition()).await,
        U256::from(1_000_000u64) * unit
    );
    assert_eq!(
        partition_balance(&service, TREASURY, default_partition()).await,
        U256::from(99_000_000u64) * unit
    );
    assert_eq!(
        service.total_supply().await.unwrap(),
        U256::from(100_000_000u64) * unit
    );

    let events = service.events().events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        TokenEvent::IssuanceExecuted { to, .. } if *to == PRIMARY
    ));
    assert!(matches!(
        &events[1],
        TokenEvent::IssuanceExecuted { to, .. } if *to == TREASURY
    ));
    assert!(service.is_whitelisted(TREASURY).await);
}

#[tokio::test]
async fn test_genesis_without_primary_issues_everything() {
    let config = TokenConfig {
        primary_fee_address: None,
        ..config()
    };
    let service = create_in_memory_service(&config).await.unwrap();

    assert_eq!(balance(&service, TREASURY).await, config.initial_supply);
    assert_eq!(service.events().len(), 1);
}

// =============================================================================
// FEE PATH
// =============================================================================

#[tokio::test]
async fn test_fee_transfer_scenario() {
    let service = service_with(config(), 1_000_000).await;

    let receipt = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::from(1_000_000u64),
        ))
        .await
        .unwrap();

    assert!(!receipt.exempt);
    assert_eq!(receipt.fees.net, U256::from(996_250u64));
    assert_eq!(receipt.fees_routed, U256::from(3_750u64));

    assert_eq!(balance(&service, ALICE).await, U256::zero());
    assert_eq!(balance(&service, BOB).await, U256::from(996_250u64));
    assert_eq!(
        partition_balance(&service, BOB, default_partition()).await,
        U256::from(996_250u64)
    );

    let events = service.events().events();
    assert_eq!(
        transfer_legs(&events),
        vec![
            (BOB, U256::from(996_250u64)),
            (PRIMARY, U256::from(1_250u64)),
            (SECONDARY, U256::from(2_500u64)),
        ]
    );
    assert_eq!(events.len(), 3);
    assert_partitions_consistent(&service, &[ALICE, BOB, PRIMARY, SECONDARY]).await;
}

#[tokio::test]
async fn test_small_transfer_rounds_primary_to_zero() {
    let service = service_with(config(), 799).await;
    service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::from(799u64),
        ))
        .await
        .unwrap();

    assert_eq!(
        transfer_legs(&service.events().events()),
        vec![(BOB, U256::from(798u64)), (SECONDARY, U256::one())]
    );
}

#[tokio::test]
async fn test_unset_primary_fee_is_burned() {
    let config = TokenConfig {
        primary_fee_address: None,
        ..config()
    };
    let service = service_with(config, 1_000_000).await;
    let supply_before = service.total_supply().await.unwrap();

    let receipt = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::from(1_000_000u64),
        ))
        .await
        .unwrap();

    assert_eq!(receipt.burned, U256::from(1_250u64));
    assert_eq!(receipt.fees_routed, U256::from(2_500u64));
    assert_eq!(
        service.total_supply().await.unwrap(),
        supply_before - U256::from(1_250u64)
    );
    assert_eq!(balance(&service, ALICE).await, U256::zero());
    assert_eq!(service.stats().await.fees_burned, U256::from(1_250u64));
    assert_partitions_consistent(&service, &[ALICE, BOB, SECONDARY]).await;
}

#[tokio::test]
async fn test_zero_value_transfer() {
    let service = service_with(config(), 100).await;
    let receipt = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::zero(),
        ))
        .await
        .unwrap();

    assert!(receipt.fees_routed.is_zero());
    assert_eq!(
        transfer_legs(&service.events().events()),
        vec![(BOB, U256::zero())]
    );
    assert_eq!(balance(&service, ALICE).await, U256::from(100u64));
}

#[tokio::test]
async fn test_operator_is_reported() {
    let service = service_with(config(), 1_000).await;
    service
        .transfer_by_partition(
            TransferRequest::new(default_partition(), ALICE, BOB, U256::from(1_000u64))
                .with_operator(OWNER),
        )
        .await
        .unwrap();

    for event in service.events().events() {
        if let TokenEvent::TransferExecuted { operator, from, .. } = event {
            assert_eq!(operator, OWNER);
            assert_eq!(from, ALICE);
        }
    }
}

// =============================================================================
// EXEMPT PATH
// =============================================================================

#[tokio::test]
async fn test_whitelisted_receiver_skips_fees() {
    let service = service_with(config(), 1_000_000).await;
    service.set_whitelist(OWNER, BOB, true).await.unwrap();
    service.events().drain();

    let receipt = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::from(1_000_000u64),
        ))
        .await
        .unwrap();

    assert!(receipt.exempt);
    assert_eq!(balance(&service, BOB).await, U256::from(1_000_000u64));
    assert_eq!(
        transfer_legs(&service.events().events()),
        vec![(BOB, U256::from(1_000_000u64))]
    );
}

#[tokio::test]
async fn test_repeated_whitelist_call_publishes_once() {
    let service = service_with(config(), 100).await;

    service.set_whitelist(OWNER, BOB, true).await.unwrap();
    assert_eq!(service.events().len(), 1);

    service.set_whitelist(OWNER, BOB, true).await.unwrap();
    assert_eq!(
        service.events().events(),
        vec![TokenEvent::WhitelistUpdated {
            account: BOB,
            exempt: true,
        }]
    );
    assert!(service.is_whitelisted(BOB).await);

    // Clearing an entry that was never set changes nothing either.
    service.set_whitelist(OWNER, ALICE, false).await.unwrap();
    assert_eq!(service.events().len(), 1);
}

#[tokio::test]
async fn test_removed_whitelist_entry_pays_fees_again() {
    let service = service_with(config(), 2_000_000).await;
    service.set_whitelist(OWNER, BOB, true).await.unwrap();
    service.set_whitelist(OWNER, BOB, false).await.unwrap();

    let receipt = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::from(1_000_000u64),
        ))
        .await
        .unwrap();
    assert!(!receipt.exempt);
}

#[tokio::test]
async fn test_fee_recipient_as_sender_is_exempt() {
    let service = create_in_memory_service(&config()).await.unwrap();
    assert!(service.is_exempt(PRIMARY, BOB).await);
    assert!(service.is_exempt(ALICE, OWNER).await);
    assert!(!service.is_exempt(ALICE, BOB).await);

    let receipt = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            PRIMARY,
            BOB,
            U256::from(1_000u64),
        ))
        .await
        .unwrap();
    assert!(receipt.exempt);
    assert_eq!(balance(&service, BOB).await, U256::from(1_000u64));
}

#[tokio::test]
async fn test_self_transfer_is_exempt() {
    let service = service_with(config(), 500).await;
    let receipt = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            ALICE,
            U256::from(500u64),
        ))
        .await
        .unwrap();

    assert!(receipt.exempt);
    assert_eq!(balance(&service, ALICE).await, U256::from(500u64));
    assert_partitions_consistent(&service, &[ALICE]).await;
}

#[tokio::test]
async fn test_upgraded_recipients_receive_fees() {
    let carol = Address::repeat(0xC0);
    let service = service_with(config(), 1_000_000).await;
    service
        .upgrade_fee_addresses(OWNER, Some(carol), Some(SECONDARY))
        .await
        .unwrap();
    service.events().drain();

    service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::from(1_000_000u64),
        ))
        .await
        .unwrap();
    assert_eq!(balance(&service, carol).await, U256::from(1_250u64));
}

// =============================================================================
// PARTITION ROUTING
// =============================================================================

#[tokio::test]
async fn test_transfer_into_new_partition() {
    let locked = Partition::from_label("locked");
    let service = service_with(config(), 1_000_000).await;

    let receipt = service
        .transfer_by_partition(
            TransferRequest::new(default_partition(), ALICE, BOB, U256::from(1_000_000u64))
                .with_data(
                    InMemoryLedger::encode_destination_partition(locked),
                    Bytes::from(vec![0x01]),
                ),
        )
        .await
        .unwrap();

    assert_eq!(receipt.destination_partition, locked);
    assert_eq!(
        partition_balance(&service, BOB, locked).await,
        U256::from(996_250u64)
    );
    assert_eq!(
        partition_balance(&service, PRIMARY, locked).await,
        U256::from(1_250u64)
    );
    assert_eq!(
        partition_balance(&service, BOB, default_partition()).await,
        U256::zero()
    );

    let events = service.events().events();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        TokenEvent::PartitionChanged {
            from_partition: default_partition(),
            to_partition: locked,
            value: U256::from(1_000_000u64),
        }
    );
    assert_partitions_consistent(&service, &[ALICE, BOB, PRIMARY, SECONDARY]).await;
}

#[tokio::test]
async fn test_routing_data_without_operator_data_is_ignored() {
    let locked = Partition::from_label("locked");
    let service = service_with(config(), 1_000).await;

    let receipt = service
        .transfer_by_partition(
            TransferRequest::new(default_partition(), ALICE, BOB, U256::from(1_000u64))
                .with_data(InMemoryLedger::encode_destination_partition(locked), Bytes::new()),
        )
        .await
        .unwrap();

    assert_eq!(receipt.destination_partition, default_partition());
    assert!(service
        .events()
        .events()
        .iter()
        .all(|e| e.topic() != topics::PARTITION_CHANGED));
}

// =============================================================================
// FAILURES
// =============================================================================

#[tokio::test]
async fn test_insufficient_balance_changes_nothing() {
    let service = service_with(config(), 100).await;
    let err = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::from(101u64),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "52");
    assert_eq!(balance(&service, ALICE).await, U256::from(100u64));
    assert_eq!(balance(&service, BOB).await, U256::zero());
    assert!(service.events().is_empty());
    assert_eq!(service.stats().await.failed_operations, 1);
}

#[tokio::test]
async fn test_wrong_partition_is_insufficient() {
    let service = service_with(config(), 100).await;
    let err = service
        .transfer_by_partition(TransferRequest::new(
            Partition::from_label("other"),
            ALICE,
            BOB,
            U256::one(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, FeeTokenError::InsufficientBalance { .. }));
}

#[tokio::test]
async fn test_ledger_failure_rolls_back() {
    let service = service_with(config(), 1_000_000).await;
    service.ledger().set_unavailable(Some("disk full"));

    let err = service
        .transfer_by_partition(TransferRequest::new(
            default_partition(),
            ALICE,
            BOB,
            U256::from(1_000_000u64),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, FeeTokenError::Ledger(LedgerError::Unavailable(_))));
    assert!(service.events().is_empty());

    service.ledger().set_unavailable(None);
    assert_eq!(balance(&service, ALICE).await, U256::from(1_000_000u64));
    assert_eq!(balance(&service, BOB).await, U256::zero());
    assert_eq!(balance(&service, PRIMARY).await, U256::from(1_000_000u64) * U256::exp10(18));
}

#[tokio::test]
async fn test_unauthorized_configuration_is_rejected() {
    let service = service_with(config(), 100).await;

    assert_eq!(
        service.set_whitelist(ALICE, ALICE, true).await,
        Err(FeeTokenError::Unauthorized { caller: ALICE })
    );
    assert_eq!(
        service.upgrade_fee_addresses(ALICE, Some(ALICE), None).await,
        Err(FeeTokenError::Unauthorized { caller: ALICE })
    );
    assert_eq!(
        service.transfer_ownership(ALICE, ALICE).await,
        Err(FeeTokenError::Unauthorized { caller: ALICE })
    );

    assert!(!service.is_whitelisted(ALICE).await);
    assert_eq!(service.fee_recipients().await.primary, Some(PRIMARY));
    assert_eq!(service.owner().await, OWNER);
    assert!(service.events().is_empty());
    assert_eq!(service.stats().await.rejected_requests, 3);
}

#[tokio::test]
async fn test_unauthorized_issuance_is_rejected() {
    let service = service_with(config(), 100).await;
    let supply = service.total_supply().await.unwrap();

    let err = service
        .issue_by_partition(IssuanceRequest::new(
            default_partition(),
            ALICE,
            ALICE,
            U256::from(1_000u64),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "56");
    assert_eq!(service.total_supply().await.unwrap(), supply);
    assert!(service.events().is_empty());
}

#[tokio::test]
async fn test_ownership_transfer_moves_authority() {
    let service = service_with(config(), 100).await;
    service.transfer_ownership(OWNER, ALICE).await.unwrap();

    assert!(service.set_whitelist(OWNER, BOB, true).await.is_err());
    service.set_whitelist(ALICE, BOB, true).await.unwrap();
    assert!(service.is_whitelisted(BOB).await);
}

// =============================================================================
// ISSUANCE
// =============================================================================

#[tokio::test]
async fn test_issuance_split() {
    let service = service_with(config(), 100).await;
    let receipt = service
        .issue_by_partition(IssuanceRequest::new(
            default_partition(),
            OWNER,
            BOB,
            U256::from(12_345u64),
        ))
        .await
        .unwrap();

    assert_eq!(receipt.fees.issue_fee, U256::from(123u64));
    assert_eq!(receipt.fees.to_amount, U256::from(12_222u64));
    assert_eq!(balance(&service, BOB).await, U256::from(12_222u64));
    assert_eq!(service.events().len(), 2);
}

#[tokio::test]
async fn test_small_issuance_has_no_fee_leg() {
    let service = service_with(config(), 100).await;
    let receipt = service
        .issue_by_partition(IssuanceRequest::new(
            default_partition(),
            OWNER,
            BOB,
            U256::from(99u64),
        ))
        .await
        .unwrap();

    assert!(receipt.fees.issue_fee.is_zero());
    assert_eq!(service.events().len(), 1);
}

// =============================================================================
// CONSERVATION
// =============================================================================

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_transfer_conserves_value(
        funded in 1u64..10_000_000_000,
        fraction in 0u64..=100,
        primary_set in any::<bool>(),
        secondary_set in any::<bool>(),
    ) {
        let value = funded / 100 * fraction;
        let config = TokenConfig {
            primary_fee_address: primary_set.then_some(PRIMARY),
            secondary_fee_address: secondary_set.then_some(SECONDARY),
            ..config()
        };

        run(async move {
            let service = service_with(config, funded).await;
            let supply_before = service.total_supply().await.unwrap();
            let holders = [ALICE, BOB, PRIMARY, SECONDARY];
            let mut before = U256::zero();
            for holder in holders {
                before += balance(&service, holder).await;
            }

            let receipt = service
                .transfer_by_partition(TransferRequest::new(
                    default_partition(),
                    ALICE,
                    BOB,
                    U256::from(value),
                ))
                .await
                .unwrap();

            let fees = receipt.fees;
            assert_eq!(fees.net + fees.primary_fee + fees.secondary_fee, U256::from(value));
            assert_eq!(receipt.fees_routed + receipt.burned, fees.primary_fee + fees.secondary_fee);

            let mut after = U256::zero();
            for holder in holders {
                after += balance(&service, holder).await;
                assert_eq!(
                    service.ledger().partition_sum(holder),
                    balance(&service, holder).await
                );
            }
            assert_eq!(after + receipt.burned, before);
            assert_eq!(
                service.total_supply().await.unwrap() + receipt.burned,
                supply_before
            );
        });
    }

    #[test]
    fn prop_issuance_conserves_value(value in any::<u64>(), primary_set in any::<bool>()) {
        let config = TokenConfig {
            primary_fee_address: primary_set.then_some(PRIMARY),
            ..config()
        };

        run(async move {
            let service = create_in_memory_service(&config).await.unwrap();
            let supply_before = service.total_supply().await.unwrap();

            let receipt = service
                .issue_by_partition(IssuanceRequest::new(
                    default_partition(),
                    OWNER,
                    BOB,
                    U256::from(value),
                ))
                .await
                .unwrap();

            assert_eq!(receipt.fees.issue_fee + receipt.fees.to_amount, U256::from(value));
            if !primary_set {
                assert!(receipt.fees.issue_fee.is_zero());
            }
            assert_eq!(
                service.total_supply().await.unwrap(),
                supply_before + U256::from(value)
            );
            assert_eq!(balance(&service, BOB).await, receipt.fees.to_amount);
        });
    }
}

//! fee-token-sim: Fee Token Simulator
//!
//! Constructs a token over the in-memory ledger, runs one operation against
//! it and prints the receipt, resulting balances and emitted events as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use fee_token::prelude::*;
use token_telemetry::{init_telemetry, TelemetryConfig};

/// Fee Token Simulator
#[derive(Parser, Debug)]
#[command(name = "fee-token-sim")]
#[command(about = "Simulate fee-routed transfers and issuance on an in-memory ledger")]
struct Args {
    /// Owner address (overrides FT_OWNER)
    #[arg(long, env = "FT_OWNER")]
    owner: Option<Address>,

    /// Primary fee recipient (overrides FT_PRIMARY_FEE)
    #[arg(long, env = "FT_PRIMARY_FEE")]
    primary_fee: Option<Address>,

    /// Secondary fee recipient (overrides FT_SECONDARY_FEE)
    #[arg(long, env = "FT_SECONDARY_FEE")]
    secondary_fee: Option<Address>,

    /// Addresses to whitelist before running the command
    #[arg(long, value_delimiter = ',')]
    whitelist: Vec<Address>,

    /// Log level (overrides FT_LOG_LEVEL)
    #[arg(long, env = "FT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Print Prometheus metrics after the command
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the state right after construction
    Genesis,

    /// Preview the fee split of a transfer
    Quote {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        to: Address,
        /// Amount in base units (decimal)
        #[arg(long, value_parser = parse_amount)]
        value: U256,
    },

    /// Fund `from` from the initial recipient, then transfer to `to`
    Transfer {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        to: Address,
        /// Amount in base units (decimal)
        #[arg(long, value_parser = parse_amount)]
        value: U256,
        /// Amount sent to `from` before the transfer (default: `value`)
        #[arg(long, value_parser = parse_amount)]
        fund: Option<U256>,
        /// Route the value into this partition label
        #[arg(long, value_parser = parse_partition)]
        to_partition: Option<Partition>,
    },

    /// Issue new tokens as the owner
    Issue {
        #[arg(long)]
        to: Address,
        /// Amount in base units (decimal)
        #[arg(long, value_parser = parse_amount)]
        value: U256,
        /// Partition label (default: the configured default partition)
        #[arg(long, value_parser = parse_partition)]
        partition: Option<Partition>,
    },
}

fn parse_amount(raw: &str) -> Result<U256, String> {
    U256::from_dec_str(raw).map_err(|e| format!("invalid amount {raw}: {e:?}"))
}

fn parse_partition(label: &str) -> Result<Partition, String> {
    Partition::try_from_label(label).ok_or_else(|| {
        format!(
            "partition label {label:?} is {} bytes, max {}",
            label.len(),
            Partition::MAX_LABEL_LEN
        )
    })
}

fn load_config(args: &Args) -> Result<TokenConfig> {
    let mut config = match TokenConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingOwner) => TokenConfig::default(),
        Err(e) => return Err(e).context("loading token configuration"),
    };
    if let Some(owner) = args.owner {
        if config.initial_recipient.is_zero() || config.initial_recipient == config.owner {
            config.initial_recipient = owner;
        }
        config.owner = owner;
    }
    if args.primary_fee.is_some() {
        config.primary_fee_address = args.primary_fee;
    }
    if args.secondary_fee.is_some() {
        config.secondary_fee_address = args.secondary_fee;
    }
    config.validate().context("owner address is required (--owner or FT_OWNER)")?;
    Ok(config)
}

async fn balances<L: Ledger, E: EventSink>(
    service: &FeeTokenService<L, E>,
    holders: &[Address],
) -> Result<Value> {
    let mut out = serde_json::Map::new();
    for holder in holders {
        let mut partitions = serde_json::Map::new();
        for partition in service.partitions_of(*holder).await? {
            let amount = service.balance_of_by_partition(*holder, partition).await?;
            partitions.insert(partition.to_string(), json!(amount.to_string()));
        }
        out.insert(
            format!("{holder:?}"),
            json!({
                "total": service.balance_of(*holder).await?.to_string(),
                "partitions": partitions,
            }),
        );
    }
    Ok(Value::Object(out))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _telemetry = init_telemetry(TelemetryConfig::from_env().with_log_level(&args.log_level))?;

    let config = load_config(&args)?;
    let service = create_in_memory_service(&config).await?;
    for account in &args.whitelist {
        service.set_whitelist(config.owner, *account, true).await?;
    }

    let mut holders = vec![config.initial_recipient];
    holders.extend(config.primary_fee_address);
    holders.extend(config.secondary_fee_address);

    let receipt = match &args.command {
        Command::Genesis => Value::Null,
        Command::Quote { from, to, value } => {
            serde_json::to_value(service.quote_transfer(*from, *to, *value).await?)?
        }
        Command::Transfer {
            from,
            to,
            value,
            fund,
            to_partition,
        } => {
            let partition = config.default_partition();
            let fund = fund.unwrap_or(*value);
            if *from != config.initial_recipient && !fund.is_zero() {
                service
                    .transfer_by_partition(TransferRequest::new(
                        partition,
                        config.initial_recipient,
                        *from,
                        fund,
                    ))
                    .await
                    .context("funding sender")?;
            }
            service.events().drain();

            let mut request = TransferRequest::new(partition, *from, *to, *value);
            if let Some(target) = to_partition {
                request = request.with_data(
                    InMemoryLedger::encode_destination_partition(*target),
                    Bytes::from(vec![1u8]),
                );
            }
            holders.extend([*from, *to]);
            serde_json::to_value(service.transfer_by_partition(request).await?)?
        }
        Command::Issue {
            to,
            value,
            partition,
        } => {
            service.events().drain();
            let partition = (*partition).unwrap_or_else(|| config.default_partition());
            holders.push(*to);
            serde_json::to_value(
                service
                    .issue_by_partition(IssuanceRequest::new(partition, config.owner, *to, *value))
                    .await?,
            )?
        }
    };

    holders.sort();
    holders.dedup();
    let stats = service.stats().await;
    let report = json!({
        "receipt": receipt,
        "total_supply": service.total_supply().await?.to_string(),
        "balances": balances(&service, &holders).await?,
        "events": service.events().events(),
        "stats": {
            "transfers_executed": stats.transfers_executed,
            "issuances_executed": stats.issuances_executed,
            "fees_routed": stats.fees_routed.to_string(),
            "fees_burned": stats.fees_burned.to_string(),
        },
    });
    tracing::info!(command = ?args.command, "Simulation complete");
    println!("{}", serde_json::to_string_pretty(&report)?);

    if args.metrics {
        println!("{}", token_telemetry::metrics::encode_metrics()?);
    }
    Ok(())
}

//! Token configuration from defaults, serde sources or environment variables.

use crate::domain::entities::FeeRecipients;
use crate::domain::value_objects::{Address, ParseHexError, Partition, U256};
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Whole-token supply issued at construction.
pub const INITIAL_SUPPLY_TOKENS: u64 = 100_000_000;

/// Decimals of the base unit.
pub const DECIMALS: usize = 18;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An address variable could not be parsed.
    #[error("invalid address in {var}: {source}")]
    InvalidAddress {
        /// Variable name.
        var: &'static str,
        /// Parse failure.
        #[source]
        source: ParseHexError,
    },

    /// The supply variable is not a decimal integer.
    #[error("invalid initial supply: {0}")]
    InvalidSupply(String),

    /// The owner address is missing or zero.
    #[error("owner address is required")]
    MissingOwner,

    /// The partition label does not fit in 32 bytes.
    #[error("partition label too long ({len} bytes, max 32): {label}")]
    PartitionLabelTooLong {
        /// Rejected label.
        label: String,
        /// Its length in bytes.
        len: usize,
    },
}

/// Construction parameters of the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Owner of the whitelist and fee configuration.
    pub owner: Address,
    /// Receives the initial supply (net of the issuance fee); whitelisted.
    pub initial_recipient: Address,
    /// Primary fee recipient.
    pub primary_fee_address: Option<Address>,
    /// Secondary fee recipient.
    pub secondary_fee_address: Option<Address>,
    /// Base units issued at construction.
    pub initial_supply: U256,
    /// Label of the partition the initial supply is issued into.
    pub default_partition: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            owner: Address::ZERO,
            initial_recipient: Address::ZERO,
            primary_fee_address: None,
            secondary_fee_address: None,
            initial_supply: U256::from(INITIAL_SUPPLY_TOKENS) * U256::exp10(DECIMALS),
            default_partition: "default".to_string(),
        }
    }
}

fn address_var(var: &'static str) -> Result<Option<Address>, ConfigError> {
    match env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|source| ConfigError::InvalidAddress { var, source }),
        _ => Ok(None),
    }
}

impl TokenConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FT_OWNER`: Owner address (required)
    /// - `FT_INITIAL_RECIPIENT`: Initial supply recipient (default: owner)
    /// - `FT_PRIMARY_FEE`: Primary fee recipient (default: unset)
    /// - `FT_SECONDARY_FEE`: Secondary fee recipient (default: unset)
    /// - `FT_INITIAL_SUPPLY`: Supply in base units, decimal (default: 100,000,000 * 10^18)
    /// - `FT_DEFAULT_PARTITION`: Partition label for the initial supply (default: default)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on malformed values or a missing owner.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let owner = address_var("FT_OWNER")?.ok_or(ConfigError::MissingOwner)?;

        let initial_supply = match env::var("FT_INITIAL_SUPPLY") {
            Ok(raw) => U256::from_dec_str(raw.trim())
                .map_err(|e| ConfigError::InvalidSupply(format!("{raw}: {e:?}")))?,
            Err(_) => defaults.initial_supply,
        };

        let config = Self {
            owner,
            initial_recipient: address_var("FT_INITIAL_RECIPIENT")?.unwrap_or(owner),
            primary_fee_address: address_var("FT_PRIMARY_FEE")?,
            secondary_fee_address: address_var("FT_SECONDARY_FEE")?,
            initial_supply,
            default_partition: env::var("FT_DEFAULT_PARTITION")
                .unwrap_or(defaults.default_partition),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can construct a token.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingOwner` if the owner is the zero address,
    /// `ConfigError::PartitionLabelTooLong` if the default partition label
    /// does not fit in a partition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_zero() {
            return Err(ConfigError::MissingOwner);
        }
        if Partition::try_from_label(&self.default_partition).is_none() {
            return Err(ConfigError::PartitionLabelTooLong {
                label: self.default_partition.clone(),
                len: self.default_partition.len(),
            });
        }
        Ok(())
    }

    /// Fee recipients described by this configuration.
    #[must_use]
    pub fn recipients(&self) -> FeeRecipients {
        FeeRecipients::new(self.primary_fee_address, self.secondary_fee_address)
    }

    /// Partition the initial supply is issued into.
    #[must_use]
    pub fn default_partition(&self) -> Partition {
        Partition::from_label(&self.default_partition)
    }
}

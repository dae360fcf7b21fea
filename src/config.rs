//! Configuration management for cracmd
//!
//! Loads settings from the process environment, with a `.env` file as a
//! fallback source. Loaded once at startup and never mutated.

use crate::error::{ClientError, ClientResult};
use ethers::types::Address;
use std::str::FromStr;

/// Crabada IdleGame contract on the Avalanche C-Chain.
const DEFAULT_CONTRACT_ADDRESS: &str = "0x82a85407bd612f52577909f4a58bfc6873f14da8";
const DEFAULT_CHAIN_ID: u64 = 43114;
const DEFAULT_GAS_LIMIT: u64 = 400_000;
const DEFAULT_MAX_PRIORITY_FEE_GWEI: u64 = 2;

/// Immutable runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub rpc_url: String,
    pub user_address: Address,
    pub user_private_key: String,
    pub contract_address: Address,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub max_priority_fee_per_gas_gwei: u64,
    pub gas_price_strategy: GasPriceStrategy,
}

/// Fee policy applied when building transactions.
///
/// A configuration choice, not caller-selectable per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPriceStrategy {
    Legacy,
    Eip1559,
}

impl FromStr for GasPriceStrategy {
    type Err = ClientError;

    fn from_str(s: &str) -> ClientResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(GasPriceStrategy::Legacy),
            "eip1559" => Ok(GasPriceStrategy::Eip1559),
            other => Err(ClientError::Config(format!(
                "Unknown gas price strategy: {other}"
            ))),
        }
    }
}

impl Settings {
    /// Load settings from the environment, reading `.env` first if present.
    pub fn load() -> ClientResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let rpc_url = require(&lookup, "RPC_URL")?;
        let user_address = parse_address(&require(&lookup, "USER_ADDRESS")?, "USER_ADDRESS")?;
        let user_private_key = require(&lookup, "USER_PRIVATE_KEY")?;

        let contract_address = parse_address(
            &lookup("CONTRACT_ADDRESS").unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string()),
            "CONTRACT_ADDRESS",
        )?;
        let chain_id = parse_u64(&lookup, "CHAIN_ID", DEFAULT_CHAIN_ID)?;
        let gas_limit = parse_u64(&lookup, "GAS_LIMIT", DEFAULT_GAS_LIMIT)?;
        let max_priority_fee_per_gas_gwei = parse_u64(
            &lookup,
            "MAX_PRIORITY_FEE_PER_GAS_IN_GWEI",
            DEFAULT_MAX_PRIORITY_FEE_GWEI,
        )?;
        let gas_price_strategy = match lookup("GAS_PRICE_STRATEGY") {
            Some(value) => value.parse()?,
            None => GasPriceStrategy::Eip1559,
        };

        Ok(Self {
            rpc_url,
            user_address,
            user_private_key,
            contract_address,
            chain_id,
            gas_limit,
            max_priority_fee_per_gas_gwei,
            gas_price_strategy,
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> ClientResult<String> {
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ClientError::Config(format!("{key} must be set"))),
    }
}

fn parse_address(value: &str, key: &str) -> ClientResult<Address> {
    value
        .parse()
        .map_err(|e| ClientError::Config(format!("Invalid {key}: {e}")))
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> ClientResult<u64> {
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|e| ClientError::Config(format!("Invalid {key}: {e}"))),
        None => Ok(default),
    }
}

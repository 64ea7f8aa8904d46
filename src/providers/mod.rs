// src/providers/mod.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::types::NftItem;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("request timed out")]
    Timeout,
}

/// ERC-20 balance entry, base units as a decimal string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub contract_address: String,
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub token_symbol: String,
    #[serde(default = "default_decimals")]
    pub token_decimal: u32,
    pub balance: String,
}

fn default_decimals() -> u32 {
    18
}

/// Approval data for one held token as reported by the security oracle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenApproval {
    pub token_address: String,
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub token_symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Current balance in base units, decimal string.
    #[serde(default)]
    pub balance: String,
    /// Nonzero when the token itself is flagged malicious.
    #[serde(default)]
    pub malicious_address: i64,
    #[serde(default)]
    pub approved_list: Vec<ApprovedSpender>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovedSpender {
    pub approved_contract: String,
    /// `"Unlimited"` or a base-unit decimal string.
    pub approved_amount: String,
    #[serde(default)]
    pub address_info: SpenderInfo,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpenderInfo {
    #[serde(default)]
    pub contract_name: String,
    #[serde(default)]
    pub doubt_list: i64,
    #[serde(default)]
    pub trust_list: i64,
    #[serde(default)]
    pub malicious_behavior: Vec<String>,
}

/// Per-token security flags. The oracle reports most flags as "0"/"1"
/// strings and percentages as decimal strings; kept verbatim, parsed by the
/// checks that consume them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSecurity {
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub token_symbol: String,
    #[serde(default)]
    pub cannot_buy: String,
    #[serde(default)]
    pub cannot_sell_all: String,
    #[serde(default)]
    pub is_honeypot: String,
    #[serde(default)]
    pub is_in_dex: String,
    #[serde(default)]
    pub buy_tax: String,
    #[serde(default)]
    pub sell_tax: String,
    #[serde(default)]
    pub creator_percent: String,
    #[serde(default)]
    pub creator_balance: String,
    #[serde(default)]
    pub total_supply: String,
}

/// Token-approval/security oracle (GoPlus).
#[async_trait]
pub trait SecurityOracle: Send + Sync {
    async fn get_token_approvals(&self, address: &str)
        -> Result<Vec<TokenApproval>, ProviderError>;

    async fn get_token_security(
        &self,
        token_addresses: &[String],
    ) -> Result<HashMap<String, TokenSecurity>, ProviderError>;
}

/// Block explorer (Etherscan).
#[async_trait]
pub trait Explorer: Send + Sync {
    /// Native balance in ETH.
    async fn get_eth_balance(&self, address: &str) -> Result<f64, ProviderError>;
}

/// Node/indexing API (Alchemy).
#[async_trait]
pub trait Indexer: Send + Sync {
    async fn get_erc20_tokens(&self, address: &str) -> Result<Vec<TokenBalance>, ProviderError>;

    /// Raw owned-NFT list; well-formedness filtering and dedup belong to
    /// the consuming check.
    async fn get_nfts(&self, address: &str) -> Result<Vec<NftItem>, ProviderError>;

    async fn get_eth_balance(&self, address: &str) -> Result<f64, ProviderError>;
}

pub mod alchemy;
pub mod etherscan;
pub mod goplus;
pub mod mocks;

pub use alchemy::AlchemyClient;
pub use etherscan::EtherscanClient;
pub use goplus::GoPlusClient;
pub use mocks::{MockExplorer, MockIndexer, MockOracle};

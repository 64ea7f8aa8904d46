// src/checks/assets.rs

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::RiskCheck;
use crate::config::Config;
use crate::providers::{Explorer, Indexer, ProviderError};
use crate::types::{CheckResult, RiskLevel, TokenInfo};
use crate::util::{address_url, is_trusted, parse_token_amount};

const ETH_PSEUDO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Reference ETH price for valuation. Stable tokens are valued at face
/// value, everything else at zero until a price feed is wired in.
const ETH_USD_PRICE: f64 = 2000.0;

/// Volatile share of total valued holdings above this percentage is a risk.
const VOLATILE_RATIO_THRESHOLD: f64 = 90.0;

/// Measures the stablecoin vs. volatile split of the wallet's holdings.
pub struct AssetCompositionCheck {
    indexer: Arc<dyn Indexer>,
    explorer: Arc<dyn Explorer>,
    config: Arc<Config>,
}

impl AssetCompositionCheck {
    pub fn new(
        indexer: Arc<dyn Indexer>,
        explorer: Arc<dyn Explorer>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            indexer,
            explorer,
            config,
        }
    }
}

#[async_trait]
impl RiskCheck for AssetCompositionCheck {
    fn name(&self) -> &'static str {
        "assets"
    }

    async fn execute(&self, address: &str) -> Result<CheckResult, ProviderError> {
        let tokens = self.indexer.get_erc20_tokens(address).await?;
        let eth_balance = self.explorer.get_eth_balance(address).await?;

        debug!(
            address,
            tokens = tokens.len(),
            eth_balance,
            "checking asset composition"
        );

        let mut holdings = Vec::new();

        if eth_balance > 0.0 {
            holdings.push(TokenInfo {
                address: ETH_PSEUDO_ADDRESS.to_string(),
                address_url: address_url(ETH_PSEUDO_ADDRESS),
                name: "Ethereum".to_string(),
                symbol: "ETH".to_string(),
                balance: eth_balance,
                usd_value: eth_balance * ETH_USD_PRICE,
                is_stable: false,
            });
        }

        for token in &tokens {
            if token.balance == "0" {
                continue;
            }
            let balance = match parse_token_amount(&token.balance, token.token_decimal) {
                Some(b) => b,
                None => continue,
            };
            let is_stable = is_trusted(&token.contract_address);
            let usd_value = if is_stable { balance } else { 0.0 };

            holdings.push(TokenInfo {
                address: token.contract_address.clone(),
                address_url: address_url(&token.contract_address),
                name: token.token_name.clone(),
                symbol: token.token_symbol.clone(),
                balance,
                usd_value,
                is_stable,
            });
        }

        let total: f64 = holdings.iter().map(|t| t.usd_value).sum();
        let stable: f64 = holdings
            .iter()
            .filter(|t| t.is_stable)
            .map(|t| t.usd_value)
            .sum();
        let volatile = total - stable;

        let mut risk_found = false;
        let mut score_penalty = 0.0;
        let details = if total > 0.0 {
            let stable_ratio = stable / total * 100.0;
            let volatile_ratio = volatile / total * 100.0;
            if volatile_ratio > VOLATILE_RATIO_THRESHOLD {
                risk_found = true;
                score_penalty = self.config.scoring.penalty_for(self.name());
                format!("High volatile assets ratio: {:.1}%", volatile_ratio)
            } else {
                format!(
                    "Stable assets: {:.1}%, volatile assets: {:.1}%",
                    stable_ratio, volatile_ratio
                )
            }
        } else {
            "No assets found".to_string()
        };

        Ok(CheckResult {
            check_name: self.name().to_string(),
            risk_found,
            risk_level: RiskLevel::Medium,
            score_penalty,
            details,
            raw_data: serde_json::to_value(&holdings).unwrap_or(Value::Null),
        })
    }
}

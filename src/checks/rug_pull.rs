// src/checks/rug_pull.rs

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::RiskCheck;
use crate::config::Config;
use crate::providers::{Indexer, ProviderError, SecurityOracle};
use crate::types::{CheckResult, RiskLevel};

/// Flags held tokens that are honeypots or cannot be fully sold.
pub struct RugPullCheck {
    indexer: Arc<dyn Indexer>,
    oracle: Arc<dyn SecurityOracle>,
    config: Arc<Config>,
}

impl RugPullCheck {
    pub fn new(
        indexer: Arc<dyn Indexer>,
        oracle: Arc<dyn SecurityOracle>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            indexer,
            oracle,
            config,
        }
    }
}

#[async_trait]
impl RiskCheck for RugPullCheck {
    fn name(&self) -> &'static str {
        "rug_pull"
    }

    async fn execute(&self, address: &str) -> Result<CheckResult, ProviderError> {
        let tokens = self.indexer.get_erc20_tokens(address).await?;
        let token_addresses: Vec<String> =
            tokens.iter().map(|t| t.contract_address.clone()).collect();

        debug!(
            address,
            count = token_addresses.len(),
            "checking held tokens for rug pull risk"
        );

        let mut flagged = Vec::new();
        if !token_addresses.is_empty() {
            let security = self.oracle.get_token_security(&token_addresses).await?;
            for (addr, info) in &security {
                if info.is_honeypot == "1" || info.cannot_sell_all == "1" {
                    flagged.push(addr.clone());
                }
            }
            flagged.sort();
        }

        let risk_found = !flagged.is_empty();
        let (score_penalty, details) = if risk_found {
            (
                self.config.scoring.penalty_for(self.name()),
                format!("Found {} tokens with rug pull risk", flagged.len()),
            )
        } else {
            (0.0, "No rug pull interactions found".to_string())
        };

        Ok(CheckResult {
            check_name: self.name().to_string(),
            risk_found,
            risk_level: RiskLevel::Critical,
            score_penalty,
            details,
            raw_data: serde_json::to_value(&flagged).unwrap_or(Value::Null),
        })
    }
}

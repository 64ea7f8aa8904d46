// src/checks/scam_tokens.rs

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::RiskCheck;
use crate::config::Config;
use crate::providers::{Indexer, ProviderError, SecurityOracle, TokenSecurity};
use crate::types::{CheckResult, RiskLevel};

/// Flags held tokens that look unsellable, untradeable, or
/// creator-controlled.
pub struct ScamTokensCheck {
    indexer: Arc<dyn Indexer>,
    oracle: Arc<dyn SecurityOracle>,
    config: Arc<Config>,
}

impl ScamTokensCheck {
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
impl RiskCheck for ScamTokensCheck {
    fn name(&self) -> &'static str {
        "scam_tokens"
    }

    async fn execute(&self, address: &str) -> Result<CheckResult, ProviderError> {
        let tokens = self.indexer.get_erc20_tokens(address).await?;
        let token_addresses: Vec<String> =
            tokens.iter().map(|t| t.contract_address.clone()).collect();

        debug!(
            address,
            count = token_addresses.len(),
            "checking held tokens for scams"
        );

        let mut scam_tokens = Vec::new();
        if !token_addresses.is_empty() {
            let security = self.oracle.get_token_security(&token_addresses).await?;
            for (addr, info) in &security {
                if is_scam_token(info) {
                    scam_tokens.push(addr.clone());
                }
            }
            // The oracle result is a map; fix the order for stable evidence.
            scam_tokens.sort();
        }

        let risk_found = !scam_tokens.is_empty();
        let (score_penalty, details) = if risk_found {
            (
                self.config.scoring.penalty_for(self.name()),
                format!("Found {} scam tokens", scam_tokens.len()),
            )
        } else {
            (0.0, "No scam tokens found".to_string())
        };

        Ok(CheckResult {
            check_name: self.name().to_string(),
            risk_found,
            risk_level: RiskLevel::High,
            score_penalty,
            details,
            raw_data: serde_json::to_value(&scam_tokens).unwrap_or(Value::Null),
        })
    }
}

fn is_scam_token(info: &TokenSecurity) -> bool {
    // Cannot be bought at all.
    if info.cannot_buy == "1" {
        return true;
    }

    // Not listed on any DEX.
    if info.is_in_dex == "0" {
        return true;
    }

    // Creator still controls more than half the supply.
    if let Some(percent) = parse_percent(&info.creator_percent) {
        if percent > 50.0 {
            return true;
        }
    }

    // Buy or sell tax above 10%.
    if let Some(tax) = parse_percent(&info.buy_tax) {
        if tax > 10.0 {
            return true;
        }
    }
    if let Some(tax) = parse_percent(&info.sell_tax) {
        if tax > 10.0 {
            return true;
        }
    }

    // Creator holds the entire supply.
    if info.creator_percent == "100.000000" {
        return true;
    }
    if !info.creator_balance.is_empty() && info.creator_balance == info.total_supply {
        return true;
    }

    false
}

/// Parses oracle percent/tax strings, stripping stray symbols such as '%'.
pub(super) fn parse_percent(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

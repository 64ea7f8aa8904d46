// src/checks/dead_nft.rs

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::RiskCheck;
use crate::config::Config;
use crate::providers::{Indexer, ProviderError};
use crate::types::{CheckResult, NftItem, RiskLevel};

/// Shapes the wallet's NFT holdings for the deadness policy: drops
/// malformed and duplicate entries. The policy itself (`is_dead`) is a stub
/// until a liquidity/activity signal is wired in, so this check currently
/// flags nothing.
pub struct DeadNftCheck {
    indexer: Arc<dyn Indexer>,
    config: Arc<Config>,
}

impl DeadNftCheck {
    pub fn new(indexer: Arc<dyn Indexer>, config: Arc<Config>) -> Self {
        Self { indexer, config }
    }
}

#[async_trait]
impl RiskCheck for DeadNftCheck {
    fn name(&self) -> &'static str {
        "dead_nft"
    }

    async fn execute(&self, address: &str) -> Result<CheckResult, ProviderError> {
        let raw = self.indexer.get_nfts(address).await?;
        let holdings = dedupe_nfts(raw);
        debug!(address, count = holdings.len(), "checking NFT holdings");

        let dead: Vec<&NftItem> = holdings.iter().filter(|nft| is_dead(nft)).collect();

        let risk_found = !dead.is_empty();
        let (score_penalty, details) = if risk_found {
            (
                self.config.scoring.penalty_for(self.name()),
                format!("Found {} dead NFTs", dead.len()),
            )
        } else {
            (0.0, "No dead NFTs found".to_string())
        };

        Ok(CheckResult {
            check_name: self.name().to_string(),
            risk_found,
            risk_level: RiskLevel::Low,
            score_penalty,
            details,
            raw_data: serde_json::to_value(&holdings).unwrap_or(Value::Null),
        })
    }
}

/// Keeps well-formed entries, first occurrence wins.
fn dedupe_nfts(raw: Vec<NftItem>) -> Vec<NftItem> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for nft in raw {
        if nft.contract_address.is_empty() || nft.token_id.is_empty() {
            continue;
        }
        let key = format!("{}:{}", nft.contract_address, nft.token_id);
        if seen.insert(key) {
            result.push(nft);
        }
    }
    result
}

/// Deadness policy placeholder: nothing is flagged until a real
/// liquidity/activity heuristic replaces this.
fn is_dead(_nft: &NftItem) -> bool {
    false
}

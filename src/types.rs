// src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final report for one wallet. Built once per orchestration run and never
/// mutated afterwards; the cache stores it verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletReport {
    pub address: String,
    pub score: f64,
    pub checks: Vec<CheckResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

/// One check's verdict. `risk_found == false` always carries a zero penalty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_name: String,
    pub risk_found: bool,
    pub risk_level: RiskLevel,
    pub score_penalty: f64,
    pub details: String,
    pub raw_data: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Closed set of check tags. `all()` fixes the enumeration order used for
/// report output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckType {
    Approvals,
    ScamTokens,
    RugPull,
    DeadNft,
    Assets,
}

impl CheckType {
    pub fn all() -> [CheckType; 5] {
        [
            CheckType::Approvals,
            CheckType::ScamTokens,
            CheckType::RugPull,
            CheckType::DeadNft,
            CheckType::Assets,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Approvals => "approvals",
            CheckType::ScamTokens => "scam_tokens",
            CheckType::RugPull => "rug_pull",
            CheckType::DeadNft => "dead_nft",
            CheckType::Assets => "assets",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One valued holding, used as evidence by the asset-composition check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    #[serde(rename = "addressURL")]
    pub address_url: String,
    pub name: String,
    pub symbol: String,
    pub balance: f64,
    pub usd_value: f64,
    pub is_stable: bool,
}

/// One risky approval, used as evidence by the approvals check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalInfo {
    pub token_address: String,
    pub token_url: String,
    pub token_name: String,
    pub spender_address: String,
    pub spender_url: String,
    /// Raw approved amount as reported, `"Unlimited"` or base units.
    pub approved_amount: String,
    pub exposure_balance: f64,
    pub is_unlimited: bool,
    pub is_malicious: bool,
}

/// One owned NFT as reported by the indexer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NftItem {
    pub contract_address: String,
    pub token_id: String,
    #[serde(default)]
    pub token_type: String,
}

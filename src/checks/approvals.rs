// src/checks/approvals.rs

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::RiskCheck;
use crate::config::Config;
use crate::providers::{ProviderError, SecurityOracle};
use crate::types::{ApprovalInfo, CheckResult, RiskLevel};
use crate::util::{address_url, parse_token_amount};

const UNLIMITED: &str = "Unlimited";

/// Flags token approvals granted to malicious, doubtful, or unlimited
/// spenders, and computes how much balance each one could drain.
pub struct ApprovalsCheck {
    oracle: Arc<dyn SecurityOracle>,
    config: Arc<Config>,
}

impl ApprovalsCheck {
    pub fn new(oracle: Arc<dyn SecurityOracle>, config: Arc<Config>) -> Self {
        Self { oracle, config }
    }
}

#[async_trait]
impl RiskCheck for ApprovalsCheck {
    fn name(&self) -> &'static str {
        "approvals"
    }

    async fn execute(&self, address: &str) -> Result<CheckResult, ProviderError> {
        debug!(address, "checking token approvals");

        let approvals = self.oracle.get_token_approvals(address).await?;

        let mut risky = Vec::new();
        for token in &approvals {
            for spender in &token.approved_list {
                let token_malicious = token.malicious_address > 0
                    || !spender.address_info.malicious_behavior.is_empty();
                let is_unlimited = spender.approved_amount == UNLIMITED;
                let is_doubtful = spender.address_info.doubt_list > 0;

                if !(token_malicious || is_unlimited || is_doubtful) {
                    continue;
                }

                let exposure = calculate_exposure_balance(
                    &spender.approved_amount,
                    &token.balance,
                    token.decimals,
                );

                risky.push(ApprovalInfo {
                    token_address: token.token_address.clone(),
                    token_url: address_url(&token.token_address),
                    token_name: token.token_name.clone(),
                    spender_address: spender.approved_contract.clone(),
                    spender_url: address_url(&spender.approved_contract),
                    approved_amount: spender.approved_amount.clone(),
                    exposure_balance: exposure,
                    is_unlimited,
                    is_malicious: token_malicious,
                });
            }
        }

        let risk_found = !risky.is_empty();
        let (score_penalty, details) = if risk_found {
            (
                self.config.scoring.penalty_for(self.name()),
                format!("Found {} risky approvals", risky.len()),
            )
        } else {
            (0.0, "No risky approvals found".to_string())
        };

        Ok(CheckResult {
            check_name: self.name().to_string(),
            risk_found,
            risk_level: max_risk_level(&risky),
            score_penalty,
            details,
            raw_data: serde_json::to_value(&risky).unwrap_or(Value::Null),
        })
    }
}

/// How much of the token this approval could drain, in token units.
/// Unlimited approvals expose the full balance; limited ones expose
/// `min(approved, balance)`. Conversion failure yields zero exposure.
fn calculate_exposure_balance(approved_amount: &str, balance: &str, decimals: u32) -> f64 {
    if approved_amount == UNLIMITED {
        return parse_token_amount(balance, decimals).unwrap_or(0.0);
    }

    match (
        parse_token_amount(approved_amount, decimals),
        parse_token_amount(balance, decimals),
    ) {
        (Some(approved), Some(balance)) => approved.min(balance),
        _ => 0.0,
    }
}

fn max_risk_level(approvals: &[ApprovalInfo]) -> RiskLevel {
    let mut max = RiskLevel::Low;
    for approval in approvals {
        let level = if approval.is_malicious || approval.exposure_balance > 0.0 {
            RiskLevel::Critical
        } else if approval.is_unlimited {
            RiskLevel::High
        } else {
            RiskLevel::Low
        };
        max = max.max(level);
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mocks::MockOracle;
    use crate::providers::{ApprovedSpender, SpenderInfo, TokenApproval};

    const WALLET: &str = "0x742d35cc6634c0532925a3b88650d7241eff5cbc";

    fn test_config() -> Arc<Config> {
        Arc::new(Config::from_env())
    }

    fn spender(amount: &str, doubt_list: i64, malicious: Vec<String>) -> ApprovedSpender {
        ApprovedSpender {
            approved_contract: "0xspender".to_string(),
            approved_amount: amount.to_string(),
            address_info: SpenderInfo {
                contract_name: "Spender".to_string(),
                doubt_list,
                trust_list: 0,
                malicious_behavior: malicious,
            },
        }
    }

    #[test]
    fn test_exposure_unlimited_uses_balance() {
        let exposure = calculate_exposure_balance(UNLIMITED, "1000000000000000000", 18);
        assert_eq!(exposure, 1.0);
    }

    #[test]
    fn test_exposure_limited_uses_min() {
        let exposure =
            calculate_exposure_balance("500000000000000000", "2000000000000000000", 18);
        assert_eq!(exposure, 0.5);

        let exposure =
            calculate_exposure_balance("3000000000000000000", "2000000000000000000", 18);
        assert_eq!(exposure, 2.0);
    }

    #[test]
    fn test_exposure_parse_failure_is_zero() {
        assert_eq!(calculate_exposure_balance(UNLIMITED, "garbage", 18), 0.0);
        assert_eq!(calculate_exposure_balance("garbage", "100", 18), 0.0);
    }

    #[tokio::test]
    async fn test_clean_wallet_no_risk() {
        let approval = TokenApproval {
            token_address: "0xtoken".to_string(),
            token_name: "Token".to_string(),
            decimals: 18,
            balance: "1000000000000000000".to_string(),
            malicious_address: 0,
            approved_list: vec![spender("500000000000000000", 0, vec![])],
            ..Default::default()
        };
        let oracle = Arc::new(MockOracle::new().with_approvals(WALLET, vec![approval]));
        let check = ApprovalsCheck::new(oracle, test_config());

        let result = check.execute(WALLET).await.unwrap();

        assert!(!result.risk_found);
        assert_eq!(result.score_penalty, 0.0);
        assert_eq!(result.check_name, "approvals");
    }

    #[tokio::test]
    async fn test_unlimited_approval_flagged_high() {
        let approval = TokenApproval {
            token_address: "0xtoken".to_string(),
            token_name: "Token".to_string(),
            decimals: 18,
            balance: "0".to_string(),
            malicious_address: 0,
            approved_list: vec![spender(UNLIMITED, 0, vec![])],
            ..Default::default()
        };
        let oracle = Arc::new(MockOracle::new().with_approvals(WALLET, vec![approval]));
        let check = ApprovalsCheck::new(oracle, test_config());

        let result = check.execute(WALLET).await.unwrap();

        assert!(result.risk_found);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result.score_penalty > 0.0);

        // Evidence keeps the raw reported amount.
        let evidence = result.raw_data.as_array().unwrap();
        assert_eq!(evidence[0]["approved_amount"], UNLIMITED);
    }

    #[tokio::test]
    async fn test_unlimited_with_balance_is_critical() {
        let approval = TokenApproval {
            token_address: "0xtoken".to_string(),
            token_name: "Token".to_string(),
            decimals: 18,
            balance: "1000000000000000000".to_string(),
            malicious_address: 0,
            approved_list: vec![spender(UNLIMITED, 0, vec![])],
            ..Default::default()
        };
        let oracle = Arc::new(MockOracle::new().with_approvals(WALLET, vec![approval]));
        let check = ApprovalsCheck::new(oracle, test_config());

        let result = check.execute(WALLET).await.unwrap();

        assert!(result.risk_found);
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[tokio::test]
    async fn test_malicious_spender_is_critical() {
        let approval = TokenApproval {
            token_address: "0xtoken".to_string(),
            token_name: "Token".to_string(),
            decimals: 18,
            balance: "0".to_string(),
            malicious_address: 0,
            approved_list: vec![spender(
                "100",
                0,
                vec!["phishing".to_string()],
            )],
            ..Default::default()
        };
        let oracle = Arc::new(MockOracle::new().with_approvals(WALLET, vec![approval]));
        let check = ApprovalsCheck::new(oracle, test_config());

        let result = check.execute(WALLET).await.unwrap();

        assert!(result.risk_found);
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let oracle = Arc::new(MockOracle::new().with_failure());
        let check = ApprovalsCheck::new(oracle, test_config());

        assert!(check.execute(WALLET).await.is_err());
    }
}

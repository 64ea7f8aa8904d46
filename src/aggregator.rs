// src/aggregator.rs

use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::cache::ReportCache;
use crate::checks::CheckFactory;
use crate::config::Config;
use crate::types::{CheckResult, CheckType, WalletReport};

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("wallet check deadline exceeded")]
    Deadline,
}

/// Runs every registered check against a wallet concurrently and folds the
/// verdicts into one scored report.
pub struct Aggregator {
    config: Arc<Config>,
    factory: Arc<dyn CheckFactory>,
    cache: Option<Arc<dyn ReportCache>>,
}

impl Aggregator {
    pub fn new(
        config: Arc<Config>,
        factory: Arc<dyn CheckFactory>,
        cache: Option<Arc<dyn ReportCache>>,
    ) -> Self {
        Self {
            config,
            factory,
            cache,
        }
    }

    pub async fn check_wallet(&self, address: &str) -> Result<WalletReport, AggregatorError> {
        let deadline = Instant::now() + self.config.check_timeout;

        if let Some(cache) = &self.cache {
            match cache.get(address).await {
                Ok(Some(report)) => {
                    info!(address, "serving cached report");
                    return Ok(report);
                }
                Ok(None) => {}
                // A broken cache never blocks the check.
                Err(e) => warn!(address, error = %e, "cache read failed, treating as miss"),
            }
        }

        if Instant::now() >= deadline {
            return Err(AggregatorError::Deadline);
        }

        let mut tasks = JoinSet::new();
        for check_type in CheckType::all() {
            let Some(check) = self.factory.create_check(check_type) else {
                continue;
            };
            let address = address.to_string();
            tasks.spawn(async move {
                let name = check.name();
                (name, timeout_at(deadline, check.execute(&address)).await)
            });
        }

        let mut results = Vec::new();
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Ok(result)))) => results.push(result),
                Ok((name, Ok(Err(e)))) => errors.push(format!("{}: {}", name, e)),
                // Deadline hit: the check contributes neither a verdict nor
                // an error.
                Ok((name, Err(_))) => {
                    warn!(address, check = name, "check dropped at deadline")
                }
                Err(e) => errors.push(format!("check panicked: {}", e)),
            }
        }

        sort_results(&mut results);

        let score = calculate_score(self.config.scoring.base_score, &results);
        debug!(
            address,
            score,
            checks = results.len(),
            errors = errors.len(),
            "wallet check complete"
        );

        let report = WalletReport {
            address: address.to_string(),
            score,
            checks: results,
            errors,
            recommendations: None,
        };

        // Only fully clean runs are worth caching; a partial report would
        // pin missing checks for the whole TTL.
        if report.errors.is_empty() {
            if let Some(cache) = &self.cache {
                if let Err(e) = cache.set(address, &report).await {
                    warn!(address, error = %e, "cache write failed");
                }
            }
        }

        Ok(report)
    }
}

/// Concurrent completion order is arbitrary; reports always list checks in
/// the fixed enumeration order.
fn sort_results(results: &mut [CheckResult]) {
    let order: Vec<&str> = CheckType::all().iter().map(|t| t.as_str()).collect();
    results.sort_by_key(|r| {
        order
            .iter()
            .position(|name| *name == r.check_name)
            .unwrap_or(order.len())
    });
}

fn calculate_score(base: f64, results: &[CheckResult]) -> f64 {
    let penalty: f64 = results
        .iter()
        .filter(|r| r.risk_found)
        .map(|r| r.score_penalty)
        .sum();
    (base - penalty).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::RiskCheck;
    use crate::types::RiskLevel;
    use async_trait::async_trait;
    use serde_json::Value;

    const WALLET: &str = "0x742d35cc6634c0532925a3b88650d7241eff5cbc";

    fn result(name: &str, risk_found: bool, penalty: f64) -> CheckResult {
        CheckResult {
            check_name: name.to_string(),
            risk_found,
            risk_level: RiskLevel::Low,
            score_penalty: penalty,
            details: String::new(),
            raw_data: Value::Null,
        }
    }

    #[test]
    fn test_score_no_risks() {
        let results = vec![result("approvals", false, 0.0), result("assets", false, 0.0)];
        assert_eq!(calculate_score(100.0, &results), 100.0);
    }

    #[test]
    fn test_score_sums_only_found_risks() {
        let results = vec![
            result("approvals", true, 40.0),
            result("scam_tokens", false, 0.0),
            result("assets", true, 10.0),
        ];
        assert_eq!(calculate_score(100.0, &results), 50.0);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let results = vec![
            result("approvals", true, 40.0),
            result("scam_tokens", true, 20.0),
            result("rug_pull", true, 20.0),
            result("dead_nft", true, 10.0),
            result("assets", true, 10.0),
        ];
        assert_eq!(calculate_score(50.0, &results), 0.0);
    }

    #[test]
    fn test_sort_results_fixed_order() {
        let mut results = vec![
            result("assets", false, 0.0),
            result("approvals", false, 0.0),
            result("rug_pull", false, 0.0),
        ];
        sort_results(&mut results);
        let names: Vec<&str> = results.iter().map(|r| r.check_name.as_str()).collect();
        assert_eq!(names, vec!["approvals", "rug_pull", "assets"]);
    }

    struct FixedCheck {
        name: &'static str,
        risk_found: bool,
        penalty: f64,
        delay: Option<std::time::Duration>,
    }

    #[async_trait]
    impl RiskCheck for FixedCheck {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn execute(&self, _address: &str) -> Result<CheckResult, crate::providers::ProviderError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(result(self.name, self.risk_found, self.penalty))
        }
    }

    struct FixedFactory {
        risky: Vec<&'static str>,
        slow: Vec<&'static str>,
    }

    impl CheckFactory for FixedFactory {
        fn create_check(&self, check_type: CheckType) -> Option<Arc<dyn RiskCheck>> {
            let name = check_type.as_str();
            let risk_found = self.risky.contains(&name);
            let delay = self
                .slow
                .contains(&name)
                .then(|| std::time::Duration::from_secs(600));
            Some(Arc::new(FixedCheck {
                name,
                risk_found,
                penalty: if risk_found { 20.0 } else { 0.0 },
                delay,
            }))
        }
    }

    fn aggregator(factory: FixedFactory) -> Aggregator {
        Aggregator::new(Arc::new(Config::from_env()), Arc::new(factory), None)
    }

    #[tokio::test]
    async fn test_all_clean_full_score() {
        let agg = aggregator(FixedFactory {
            risky: vec![],
            slow: vec![],
        });

        let report = agg.check_wallet(WALLET).await.unwrap();

        assert_eq!(report.score, 100.0);
        assert_eq!(report.checks.len(), 5);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_report_order_is_stable() {
        let agg = aggregator(FixedFactory {
            risky: vec!["rug_pull"],
            slow: vec![],
        });

        let report = agg.check_wallet(WALLET).await.unwrap();

        let names: Vec<&str> = report.checks.iter().map(|r| r.check_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["approvals", "scam_tokens", "rug_pull", "dead_nft", "assets"]
        );
        assert_eq!(report.score, 80.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_drops_slow_checks() {
        let agg = aggregator(FixedFactory {
            risky: vec![],
            slow: vec!["dead_nft"],
        });

        let report = agg.check_wallet(WALLET).await.unwrap();

        // The slow check is silently absent; the run itself still succeeds.
        assert_eq!(report.checks.len(), 4);
        assert!(report.errors.is_empty());
        assert!(!report
            .checks
            .iter()
            .any(|r| r.check_name == "dead_nft"));
    }
}

// src/config.rs

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::types::CheckType;

/// Runtime configuration, read from the environment with sensible defaults.
/// Missing provider keys are tolerated: the affected clients simply fail at
/// call time and the pipeline records the failure per check.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    /// Overall deadline for one wallet check. Generous because individual
    /// checks call slow third-party APIs.
    pub check_timeout: Duration,
    /// Per-request timeout for provider HTTP clients.
    pub provider_timeout: Duration,
    pub goplus_api_key: String,
    pub etherscan_api_key: String,
    pub etherscan_url: String,
    pub alchemy_api_key: String,
    pub alchemy_url: String,
    pub rate_limit: RateLimitConfig,
    pub scoring: ScoringConfig,
}

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: u32,
    pub window: Duration,
}

#[derive(Clone, Debug)]
pub struct ScoringConfig {
    pub base_score: f64,
    /// Per-check weight as a fraction of the base score, keyed by check name.
    pub weights: HashMap<String, f64>,
}

impl ScoringConfig {
    /// Penalty applied when the named check finds risk. Unknown names weigh
    /// nothing.
    pub fn penalty_for(&self, check_name: &str) -> f64 {
        self.weights.get(check_name).copied().unwrap_or(0.0) * 100.0
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default_weights: [(CheckType, f64); 5] = [
            (CheckType::Approvals, 0.4),
            (CheckType::ScamTokens, 0.2),
            (CheckType::RugPull, 0.2),
            (CheckType::DeadNft, 0.1),
            (CheckType::Assets, 0.1),
        ];

        let mut weights = HashMap::new();
        for (check, default) in default_weights {
            let key = format!("WEIGHT_{}", check.as_str().to_uppercase());
            weights.insert(check.as_str().to_string(), env_parse(&key, default));
        }

        Self {
            port: env_parse("APP_PORT", 8080),
            log_level: env_or("LOG_LEVEL", "info"),
            check_timeout: Duration::from_secs(env_parse("CHECK_TIMEOUT_SECS", 300)),
            provider_timeout: Duration::from_secs(env_parse("PROVIDER_TIMEOUT_SECS", 10)),
            goplus_api_key: env_or("GOPLUS_API_KEY", ""),
            etherscan_api_key: env_or("ETHERSCAN_API_KEY", ""),
            etherscan_url: env_or("ETHERSCAN_URL", "https://api.etherscan.io"),
            alchemy_api_key: env_or("ALCHEMY_API_KEY", ""),
            alchemy_url: env_or("ALCHEMY_URL", "https://eth-mainnet.g.alchemy.com/v2"),
            rate_limit: RateLimitConfig {
                enabled: env_parse("RATE_LIMIT_ENABLED", true),
                requests: env_parse("RATE_LIMIT_REQUESTS", 100),
                window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", 60)),
            },
            scoring: ScoringConfig {
                base_score: env_parse("BASE_SCORE", 100.0),
                weights,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_cover_all_checks() {
        let cfg = Config::from_env();
        for check in CheckType::all() {
            assert!(
                cfg.scoring.weights.contains_key(check.as_str()),
                "missing weight for {}",
                check
            );
        }
    }

    #[test]
    fn test_penalty_for_known_and_unknown() {
        let mut weights = HashMap::new();
        weights.insert("approvals".to_string(), 0.4);
        let scoring = ScoringConfig {
            base_score: 100.0,
            weights,
        };
        assert_eq!(scoring.penalty_for("approvals"), 40.0);
        assert_eq!(scoring.penalty_for("no_such_check"), 0.0);
    }
}

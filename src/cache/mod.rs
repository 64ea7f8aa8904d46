// src/cache/mod.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::WalletReport;

/// Fresh reports are served from cache for this long.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Report store keyed by wallet address. The aggregator treats read
/// failures as a miss and write failures as non-fatal.
#[async_trait]
pub trait ReportCache: Send + Sync {
    async fn get(&self, address: &str) -> Result<Option<WalletReport>, CacheError>;

    async fn set(&self, address: &str, report: &WalletReport) -> Result<(), CacheError>;
}

#[derive(Clone)]
struct CacheEntry {
    report: WalletReport,
    cached_at: u64,
    ttl_seconds: u64,
}

/// In-process TTL cache.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Remove expired entries.
    pub async fn cleanup(&self) {
        let now = current_timestamp();
        self.entries.write().await.retain(|_, entry| {
            let age = now.saturating_sub(entry.cached_at);
            age < entry.ttl_seconds
        });
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportCache for MemoryCache {
    async fn get(&self, address: &str) -> Result<Option<WalletReport>, CacheError> {
        let key = cache_key(address);
        let entries = self.entries.read().await;
        if let Some(entry) = entries.get(&key) {
            let age = current_timestamp().saturating_sub(entry.cached_at);
            if age < entry.ttl_seconds {
                return Ok(Some(entry.report.clone()));
            }
        }
        Ok(None)
    }

    async fn set(&self, address: &str, report: &WalletReport) -> Result<(), CacheError> {
        let entry = CacheEntry {
            report: report.clone(),
            cached_at: current_timestamp(),
            ttl_seconds: self.ttl.as_secs(),
        };
        self.entries.write().await.insert(cache_key(address), entry);
        Ok(())
    }
}

fn cache_key(address: &str) -> String {
    format!("wallet_report:{}", address.to_lowercase())
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_report() -> WalletReport {
        WalletReport {
            address: "0x742d35cc6634c0532925a3b88650d7241eff5cbc".to_string(),
            score: 90.0,
            checks: vec![],
            errors: vec![],
            recommendations: None,
        }
    }

    #[tokio::test]
    async fn test_cache_set_and_get() {
        let cache = MemoryCache::new();
        let report = make_test_report();

        cache.set(&report.address, &report).await.unwrap();

        let cached = cache.get(&report.address).await.unwrap();
        assert!(cached.is_some());
        assert_eq!(cached.unwrap().score, 90.0);
    }

    #[tokio::test]
    async fn test_cache_key_is_case_insensitive() {
        let cache = MemoryCache::new();
        let report = make_test_report();

        cache
            .set("0x742D35Cc6634C0532925a3b88650D7241EfF5CbC", &report)
            .await
            .unwrap();

        let cached = cache.get(&report.address).await.unwrap();
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = MemoryCache::with_ttl(Duration::from_secs(0));
        let report = make_test_report();

        cache.set(&report.address, &report).await.unwrap();

        let cached = cache.get(&report.address).await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_stay_resident_until_swept() {
        // Reads take only a read lock and must not evict; the sweep does.
        let cache = MemoryCache::with_ttl(Duration::from_secs(0));
        let report = make_test_report();

        for i in 0..100 {
            cache.set(&format!("0x{:040x}", i), &report).await.unwrap();
        }
        for i in 0..100 {
            let cached = cache.get(&format!("0x{:040x}", i)).await.unwrap();
            assert!(cached.is_none());
        }
        assert_eq!(cache.size().await, 100);

        cache.cleanup().await;
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_cache_cleanup() {
        let expiring = MemoryCache::with_ttl(Duration::from_secs(0));
        let report = make_test_report();

        expiring.set("0xaaa", &report).await.unwrap();
        assert_eq!(expiring.size().await, 1);

        expiring.cleanup().await;
        assert_eq!(expiring.size().await, 0);
    }
}

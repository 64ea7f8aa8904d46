// src/main.rs

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wallet_hygiene_score::aggregator::Aggregator;
use wallet_hygiene_score::cache::MemoryCache;
use wallet_hygiene_score::checks::CheckRegistry;
use wallet_hygiene_score::config::Config;
use wallet_hygiene_score::providers::{AlchemyClient, EtherscanClient, GoPlusClient};
use wallet_hygiene_score::server::{run_server, AppState, RateLimiter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(Config::from_env());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    info!(port = config.port, "starting wallet hygiene service");

    let oracle = Arc::new(GoPlusClient::new(
        config.goplus_api_key.clone(),
        config.provider_timeout,
    )?);
    let explorer = Arc::new(EtherscanClient::new(
        config.etherscan_api_key.clone(),
        config.etherscan_url.clone(),
        config.provider_timeout,
    )?);
    let indexer = Arc::new(AlchemyClient::new(
        config.alchemy_api_key.clone(),
        config.alchemy_url.clone(),
        config.provider_timeout,
    )?);

    let registry = Arc::new(CheckRegistry::new(
        config.clone(),
        oracle,
        explorer,
        indexer,
    ));
    let cache = Arc::new(MemoryCache::new());
    // Reads only skip expired reports; the sweep actually evicts them.
    let sweep_cache = cache.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tick.tick().await;
            sweep_cache.cleanup().await;
        }
    });
    let aggregator = Aggregator::new(config.clone(), registry, Some(cache));

    let rate_limiter = config
        .rate_limit
        .enabled
        .then(|| RateLimiter::new(&config.rate_limit));

    let state = Arc::new(AppState {
        aggregator,
        rate_limiter,
    });

    run_server(config.port, state).await?;
    Ok(())
}

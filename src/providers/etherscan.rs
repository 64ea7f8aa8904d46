// src/providers/etherscan.rs

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::goplus::map_reqwest_error;
use super::{Explorer, ProviderError};
use crate::util::parse_token_amount;

/// Client for the Etherscan account API.
pub struct EtherscanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct EtherscanEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    result: String,
}

impl EtherscanClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl Explorer for EtherscanClient {
    async fn get_eth_balance(&self, address: &str) -> Result<f64, ProviderError> {
        let url = format!(
            "{}/api?module=account&action=balance&address={}&tag=latest&apikey={}",
            self.base_url, address, self.api_key
        );

        let response = self.client.get(&url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("HTTP {}: {}", status, body)));
        }

        let envelope: EtherscanEnvelope = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if envelope.status != "1" {
            return Err(ProviderError::Api(format!(
                "Etherscan error: {}",
                envelope.message
            )));
        }

        // Result is wei as a decimal string.
        let eth = parse_token_amount(&envelope.result, 18).ok_or_else(|| {
            ProviderError::InvalidResponse(format!("unparsable balance: {}", envelope.result))
        })?;

        debug!(address, eth, "fetched ETH balance");
        Ok(eth)
    }
}

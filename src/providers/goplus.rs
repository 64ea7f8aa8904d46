// src/providers/goplus.rs

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{ProviderError, SecurityOracle, TokenApproval, TokenSecurity};

const GOPLUS_BASE_URL: &str = "https://api.gopluslabs.io/api";

/// Client for the GoPlus security API (Ethereum mainnet, chain id 1).
pub struct GoPlusClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GoPlusEnvelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    result: Option<T>,
}

impl GoPlusClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: GOPLUS_BASE_URL.to_string(),
            api_key,
        })
    }

    async fn get_envelope<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .header("API-Key", &self.api_key)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("HTTP {}: {}", status, body)));
        }

        let envelope: GoPlusEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if envelope.code != 1 {
            return Err(ProviderError::Api(format!(
                "GoPlus code {}: {}",
                envelope.code, envelope.message
            )));
        }

        envelope
            .result
            .ok_or_else(|| ProviderError::InvalidResponse("missing result".to_string()))
    }
}

#[async_trait]
impl SecurityOracle for GoPlusClient {
    async fn get_token_approvals(
        &self,
        address: &str,
    ) -> Result<Vec<TokenApproval>, ProviderError> {
        let url = format!(
            "{}/v2/token_approval_security/1?addresses={}",
            self.base_url, address
        );
        let approvals: Vec<TokenApproval> = self.get_envelope(&url).await?;
        debug!(address, count = approvals.len(), "fetched token approvals");
        Ok(approvals)
    }

    async fn get_token_security(
        &self,
        token_addresses: &[String],
    ) -> Result<HashMap<String, TokenSecurity>, ProviderError> {
        let url = format!(
            "{}/v1/token_security/1?contract_addresses={}",
            self.base_url,
            token_addresses.join(",")
        );
        let result: HashMap<String, TokenSecurity> = self.get_envelope(&url).await?;
        debug!(
            requested = token_addresses.len(),
            returned = result.len(),
            "fetched token security flags"
        );
        Ok(result)
    }
}

pub(super) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_error_code() {
        let body = r#"{"code": 0, "message": "rate limited", "result": null}"#;
        let envelope: GoPlusEnvelope<Vec<TokenApproval>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.message, "rate limited");
        assert!(envelope.result.is_none());
    }

    #[test]
    fn test_approval_wire_decoding() {
        let body = r#"{
            "code": 1,
            "message": "ok",
            "result": [{
                "token_address": "0xtoken",
                "token_name": "Tether USD",
                "token_symbol": "USDT",
                "decimals": 6,
                "balance": "1000000",
                "malicious_address": 0,
                "approved_list": [{
                    "approved_contract": "0xspender",
                    "approved_amount": "Unlimited",
                    "address_info": {
                        "contract_name": "Router",
                        "doubt_list": 0,
                        "trust_list": 1,
                        "malicious_behavior": []
                    }
                }]
            }]
        }"#;
        let envelope: GoPlusEnvelope<Vec<TokenApproval>> = serde_json::from_str(body).unwrap();
        let approvals = envelope.result.unwrap();
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals[0].decimals, 6);
        assert_eq!(approvals[0].approved_list[0].approved_amount, "Unlimited");
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_token_approvals() {
        let api_key = std::env::var("GOPLUS_API_KEY").expect("GOPLUS_API_KEY must be set");
        let client = GoPlusClient::new(api_key, Duration::from_secs(10)).unwrap();
        let approvals = client
            .get_token_approvals("0x742d35Cc6634C0532925a3b88650D7241EfF5cbc")
            .await
            .unwrap();
        println!("{:#?}", approvals);
    }
}

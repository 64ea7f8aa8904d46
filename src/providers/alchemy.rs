// src/providers/alchemy.rs

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::goplus::map_reqwest_error;
use super::{Indexer, ProviderError, TokenBalance};
use crate::types::NftItem;
use crate::util::{hex_to_dec_string, parse_token_amount};

/// Client for the Alchemy JSON-RPC and NFT APIs.
pub struct AlchemyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TokenBalancesResult {
    #[serde(rename = "tokenBalances")]
    token_balances: Vec<RawTokenBalance>,
}

#[derive(Debug, Deserialize)]
struct RawTokenBalance {
    #[serde(rename = "contractAddress")]
    contract_address: String,
    #[serde(rename = "tokenBalance", default)]
    token_balance: String,
}

#[derive(Debug, Deserialize)]
struct OwnedNftsResponse {
    #[serde(rename = "ownedNfts", default)]
    owned_nfts: Vec<OwnedNft>,
}

#[derive(Debug, Deserialize)]
struct OwnedNft {
    #[serde(default)]
    contract: NftContract,
    #[serde(default)]
    id: NftId,
}

#[derive(Debug, Default, Deserialize)]
struct NftContract {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Default, Deserialize)]
struct NftId {
    #[serde(rename = "tokenId", default)]
    token_id: String,
    #[serde(rename = "tokenMetadata", default)]
    token_metadata: NftTokenMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct NftTokenMetadata {
    #[serde(rename = "tokenType", default)]
    token_type: String,
}

impl AlchemyClient {
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

    async fn rpc_call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, self.api_key);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("HTTP {}: {}", status, text)));
        }

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(ProviderError::Api(format!("RPC error: {}", error)));
        }

        envelope
            .result
            .ok_or_else(|| ProviderError::InvalidResponse("missing result".to_string()))
    }
}

#[async_trait]
impl Indexer for AlchemyClient {
    async fn get_erc20_tokens(&self, address: &str) -> Result<Vec<TokenBalance>, ProviderError> {
        let result: TokenBalancesResult = self
            .rpc_call("alchemy_getTokenBalances", json!([address]))
            .await?;

        let mut tokens = Vec::with_capacity(result.token_balances.len());
        for raw in result.token_balances {
            let balance = match hex_to_dec_string(&raw.token_balance) {
                Some(b) => b,
                None => {
                    warn!(
                        contract = %raw.contract_address,
                        balance = %raw.token_balance,
                        "unparsable token balance, treating as zero"
                    );
                    "0".to_string()
                }
            };
            tokens.push(TokenBalance {
                contract_address: raw.contract_address,
                token_name: String::new(),
                token_symbol: String::new(),
                token_decimal: 18,
                balance,
            });
        }

        debug!(address, count = tokens.len(), "fetched ERC-20 balances");
        Ok(tokens)
    }

    async fn get_nfts(&self, address: &str) -> Result<Vec<NftItem>, ProviderError> {
        let url = format!(
            "{}/{}/getNFTsForOwner?owner={}&omitMetadata=true",
            self.base_url, self.api_key, address
        );

        let response = self.client.get(&url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("HTTP {}: {}", status, text)));
        }

        let parsed: OwnedNftsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let nfts: Vec<NftItem> = parsed
            .owned_nfts
            .into_iter()
            .map(|nft| NftItem {
                contract_address: nft.contract.address,
                token_id: nft.id.token_id,
                token_type: nft.id.token_metadata.token_type,
            })
            .collect();

        debug!(address, count = nfts.len(), "fetched owned NFTs");
        Ok(nfts)
    }

    async fn get_eth_balance(&self, address: &str) -> Result<f64, ProviderError> {
        let hex: String = self
            .rpc_call("eth_getBalance", json!([address, "latest"]))
            .await?;

        let wei = hex_to_dec_string(&hex)
            .ok_or_else(|| ProviderError::InvalidResponse(format!("unparsable balance: {}", hex)))?;
        parse_token_amount(&wei, 18)
            .ok_or_else(|| ProviderError::InvalidResponse(format!("unparsable balance: {}", hex)))
    }
}

// src/providers/mocks.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use super::{
    Explorer, Indexer, ProviderError, SecurityOracle, TokenApproval, TokenBalance, TokenSecurity,
};
use crate::types::NftItem;

/// Configurable stand-in for the security oracle. Canned data per wallet
/// address, optional injected failure, optional artificial latency.
#[derive(Default)]
pub struct MockOracle {
    approvals: HashMap<String, Vec<TokenApproval>>,
    security: HashMap<String, TokenSecurity>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_approvals(mut self, address: &str, approvals: Vec<TokenApproval>) -> Self {
        self.approvals.insert(address.to_string(), approvals);
        self
    }

    /// Security flags keyed by token contract address.
    pub fn with_security(mut self, token_address: &str, security: TokenSecurity) -> Self {
        self.security.insert(token_address.to_string(), security);
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn simulate(&self) -> Result<(), ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProviderError::Api("mock oracle failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SecurityOracle for MockOracle {
    async fn get_token_approvals(
        &self,
        address: &str,
    ) -> Result<Vec<TokenApproval>, ProviderError> {
        self.simulate().await?;
        Ok(self.approvals.get(address).cloned().unwrap_or_default())
    }

    async fn get_token_security(
        &self,
        token_addresses: &[String],
    ) -> Result<HashMap<String, TokenSecurity>, ProviderError> {
        self.simulate().await?;
        let mut result = HashMap::new();
        for addr in token_addresses {
            if let Some(security) = self.security.get(addr) {
                result.insert(addr.clone(), security.clone());
            }
        }
        Ok(result)
    }
}

#[derive(Default)]
pub struct MockExplorer {
    balances: HashMap<String, f64>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eth_balance(mut self, address: &str, balance: f64) -> Self {
        self.balances.insert(address.to_string(), balance);
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Explorer for MockExplorer {
    async fn get_eth_balance(&self, address: &str) -> Result<f64, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProviderError::Api("mock explorer failure".to_string()));
        }
        Ok(self.balances.get(address).copied().unwrap_or(0.0))
    }
}

#[derive(Default)]
pub struct MockIndexer {
    tokens: HashMap<String, Vec<TokenBalance>>,
    nfts: HashMap<String, Vec<NftItem>>,
    balances: HashMap<String, f64>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(mut self, address: &str, tokens: Vec<TokenBalance>) -> Self {
        self.tokens.insert(address.to_string(), tokens);
        self
    }

    pub fn with_nfts(mut self, address: &str, nfts: Vec<NftItem>) -> Self {
        self.nfts.insert(address.to_string(), nfts);
        self
    }

    pub fn with_eth_balance(mut self, address: &str, balance: f64) -> Self {
        self.balances.insert(address.to_string(), balance);
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn simulate(&self) -> Result<(), ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProviderError::Api("mock indexer failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    async fn get_erc20_tokens(&self, address: &str) -> Result<Vec<TokenBalance>, ProviderError> {
        self.simulate().await?;
        Ok(self.tokens.get(address).cloned().unwrap_or_default())
    }

    async fn get_nfts(&self, address: &str) -> Result<Vec<NftItem>, ProviderError> {
        self.simulate().await?;
        Ok(self.nfts.get(address).cloned().unwrap_or_default())
    }

    async fn get_eth_balance(&self, address: &str) -> Result<f64, ProviderError> {
        self.simulate().await?;
        Ok(self.balances.get(address).copied().unwrap_or(0.0))
    }
}

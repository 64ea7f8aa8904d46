// src/checks/registry.rs

use std::sync::Arc;

use super::{
    ApprovalsCheck, AssetCompositionCheck, DeadNftCheck, RiskCheck, RugPullCheck, ScamTokensCheck,
};
use crate::config::Config;
use crate::providers::{Explorer, Indexer, SecurityOracle};
use crate::types::CheckType;

/// Maps a check tag to a ready-to-run check. The aggregator only knows
/// tags; construction and provider wiring live behind this trait.
pub trait CheckFactory: Send + Sync {
    fn create_check(&self, check_type: CheckType) -> Option<Arc<dyn RiskCheck>>;
}

/// Production factory holding the shared provider clients.
pub struct CheckRegistry {
    config: Arc<Config>,
    oracle: Arc<dyn SecurityOracle>,
    explorer: Arc<dyn Explorer>,
    indexer: Arc<dyn Indexer>,
}

impl CheckRegistry {
    pub fn new(
        config: Arc<Config>,
        oracle: Arc<dyn SecurityOracle>,
        explorer: Arc<dyn Explorer>,
        indexer: Arc<dyn Indexer>,
    ) -> Self {
        Self {
            config,
            oracle,
            explorer,
            indexer,
        }
    }
}

impl CheckFactory for CheckRegistry {
    fn create_check(&self, check_type: CheckType) -> Option<Arc<dyn RiskCheck>> {
        let check: Arc<dyn RiskCheck> = match check_type {
            CheckType::Approvals => Arc::new(ApprovalsCheck::new(
                self.oracle.clone(),
                self.config.clone(),
            )),
            CheckType::ScamTokens => Arc::new(ScamTokensCheck::new(
                self.indexer.clone(),
                self.oracle.clone(),
                self.config.clone(),
            )),
            CheckType::RugPull => Arc::new(RugPullCheck::new(
                self.indexer.clone(),
                self.oracle.clone(),
                self.config.clone(),
            )),
            CheckType::DeadNft => Arc::new(DeadNftCheck::new(
                self.indexer.clone(),
                self.config.clone(),
            )),
            CheckType::Assets => Arc::new(AssetCompositionCheck::new(
                self.indexer.clone(),
                self.explorer.clone(),
                self.config.clone(),
            )),
        };
        Some(check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mocks::{MockExplorer, MockIndexer, MockOracle};

    #[test]
    fn test_registry_covers_every_check_type() {
        let registry = CheckRegistry::new(
            Arc::new(Config::from_env()),
            Arc::new(MockOracle::new()),
            Arc::new(MockExplorer::new()),
            Arc::new(MockIndexer::new()),
        );

        for check_type in CheckType::all() {
            let check = registry.create_check(check_type);
            assert!(check.is_some(), "no check bound for {:?}", check_type);
            assert_eq!(check.unwrap().name(), check_type.as_str());
        }
    }
}

// src/checks/mod.rs

use async_trait::async_trait;

use crate::providers::ProviderError;
use crate::types::CheckResult;

/// Contract for one independent risk check. A check either produces a
/// verdict or a provider error; it never decides pipeline fate.
#[async_trait]
pub trait RiskCheck: Send + Sync {
    /// Stable identifier, also the key into the configured scoring weights.
    fn name(&self) -> &'static str;

    async fn execute(&self, address: &str) -> Result<CheckResult, ProviderError>;
}

pub mod approvals;
pub mod assets;
pub mod dead_nft;
pub mod registry;
pub mod rug_pull;
pub mod scam_tokens;

pub use approvals::ApprovalsCheck;
pub use assets::AssetCompositionCheck;
pub use dead_nft::DeadNftCheck;
pub use registry::{CheckFactory, CheckRegistry};
pub use rug_pull::RugPullCheck;
pub use scam_tokens::ScamTokensCheck;

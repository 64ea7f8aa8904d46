// src/lib.rs

pub mod aggregator;
pub mod cache;
pub mod checks;
pub mod config;
pub mod providers;
pub mod server;
pub mod types;
pub mod util;

pub use aggregator::{Aggregator, AggregatorError};
pub use cache::{MemoryCache, ReportCache};
pub use checks::{CheckFactory, CheckRegistry, RiskCheck};
pub use config::Config;
pub use types::{CheckResult, CheckType, RiskLevel, WalletReport};

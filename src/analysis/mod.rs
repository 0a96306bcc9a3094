//! Analysis components: everything between the raw ledger gateway and the
//! final report. Each component takes its dependencies by trait object so
//! tests run against the in-memory mocks.

pub mod deployer;
pub mod executor;
pub mod history;
pub mod holders;
pub mod liquidity;
pub mod metadata_cache;

pub use deployer::{DeployerConfig, DeployerError, DeployerResolver, ResolvedDeployer};
pub use executor::{ExecutorConfig, FetchExecutor};
pub use history::{DeploymentScanner, HistoryConfig};
pub use holders::{HolderTracer, TraceError, TracerConfig};
pub use liquidity::LiquidityCheck;
pub use metadata_cache::MetadataCache;

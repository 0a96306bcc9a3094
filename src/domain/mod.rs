//! Domain Layer - Core audit logic for tokensleuth
//!
//! Pure types and algorithms with no ledger I/O. All external interactions
//! happen through the ports layer.
//!
//! ## Modules
//!
//! - `deployment`: deployment records, lifecycle classification, developer profiling
//! - `holders`: holder records, funding sources, cluster grouping
//! - `risk`: the final score/level/warnings aggregation
//! - `stats`: distribution statistics (Gini, deployment cadence)
//! - `known_entities`: injected exchange/mixer allowlists
//! - `known_programs`: well-known program and launch-platform addresses

pub mod deployment;
pub mod holders;
pub mod known_entities;
pub mod known_programs;
pub mod risk;
pub mod stats;

pub use deployment::{
    DeployedToken, DeveloperProfile, DeveloperRiskLevel, TokenLifecycle, DEAD_TOP_HOLDER_PCT,
    RUGGED_TOP_HOLDER_PCT,
};
pub use holders::{
    group_by_funder, ClusterReport, ClusterRiskLevel, FundingSource, HolderCluster, HolderRecord,
};
pub use known_entities::KnownEntities;
pub use risk::{
    aggregate, ConcentrationSignal, LiquidityTier, RiskAssessment, RiskInputs, RiskLevel,
};
pub use stats::{deployment_cadence_hours, gini_coefficient, top_n_share};

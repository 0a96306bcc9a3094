//! Tokensleuth - Solana Token Risk Auditor
//!
//! Pre-trade rug-pull risk analysis for Solana fungible tokens: deployer
//! identification, deployment-history profiling, holder funding-source
//! tracing with cluster grouping, and a bounded 0-100 risk score.
//!
//! # Modules
//!
//! - `domain`: Pure analysis logic (lifecycle classification, clustering, risk aggregation)
//! - `ports`: Trait abstractions (LedgerGateway, CreatorLookup, MetadataLookup, LiquidityProbe)
//! - `analysis`: Stateful analysis components (executor, deployer, history, holders, liquidity)
//! - `adapters`: External implementations (Solana RPC, launchpad, DAS, DexScreener, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Audit orchestration

pub mod adapters;
pub mod analysis;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

//! Adapters Layer - External System Implementations
//!
//! Implementations of the port traits:
//! - Solana: JSON-RPC ledger gateway
//! - Launchpad: launch-platform creator lookup
//! - Metadata: DAS display-metadata lookup
//! - DexScreener: pool liquidity probe
//! - CLI: command-line interface and rendering

pub mod cli;
pub mod dexscreener;
pub mod launchpad;
pub mod metadata;
pub mod solana;

pub use cli::CliApp;
pub use dexscreener::{DexScreenerConfig, DexScreenerProbe};
pub use launchpad::{LaunchpadConfig, LaunchpadCreatorLookup};
pub use metadata::{DasConfig, DasMetadataLookup};
pub use solana::{RpcConfig, SolanaRpcGateway};

//! Optional external lookup ports.
//!
//! All three are best-effort collaborators: failures degrade to an absent
//! signal in the audit, never to a failed audit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Lookup unavailable: {0}")]
    Unavailable(String),
}

/// Launch-platform creator lookup, keyed by mint.
///
/// `Ok(None)` means the platform does not know the mint; that is a normal
/// outcome for tokens launched elsewhere.
#[async_trait]
pub trait CreatorLookup: Send + Sync {
    async fn creator_of(&self, mint: &str) -> Result<Option<String>, LookupError>;
}

/// Display metadata for a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenDisplay {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub image: Option<String>,
    /// Whether on-chain metadata can still be changed.
    pub mutable: Option<bool>,
}

/// Metadata-resolution lookup, keyed by mint.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn display_of(&self, mint: &str) -> Result<Option<TokenDisplay>, LookupError>;
}

/// Liquidity snapshot for the token's deepest pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquiditySnapshot {
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    /// Pair address of the pool the snapshot came from.
    pub pair: Option<String>,
}

/// Pool liquidity probe, keyed by mint. `Ok(None)` when no pool exists.
#[async_trait]
pub trait LiquidityProbe: Send + Sync {
    async fn probe(&self, mint: &str) -> Result<Option<LiquiditySnapshot>, LookupError>;
}

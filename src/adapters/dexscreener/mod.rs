//! DexScreener liquidity probe.
//!
//! One public GET per token, no API key. A token can trade in several
//! pools; the probe reports the deepest one, since that is the pool an
//! exit would actually route through.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::ports::lookup::{LiquidityProbe, LiquiditySnapshot, LookupError};

#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.dexscreener.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    pairs: Option<Vec<PairEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairEntry {
    pair_address: Option<String>,
    liquidity: Option<PairLiquidity>,
    volume: Option<PairVolume>,
}

#[derive(Debug, Deserialize)]
struct PairLiquidity {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PairVolume {
    h24: Option<f64>,
}

/// Liquidity probe over the DexScreener token-pairs API.
#[derive(Debug, Clone)]
pub struct DexScreenerProbe {
    config: DexScreenerConfig,
    http: Client,
}

impl DexScreenerProbe {
    pub fn new(config: DexScreenerConfig) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LookupError::Http(e.to_string()))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl LiquidityProbe for DexScreenerProbe {
    async fn probe(&self, mint: &str) -> Result<Option<LiquiditySnapshot>, LookupError> {
        let url = format!("{}/latest/dex/tokens/{}", self.config.base_url, mint);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::Unavailable("rate limited".to_string()));
        }
        if !response.status().is_success() {
            return Err(LookupError::Http(format!(
                "DexScreener returned {}",
                response.status()
            )));
        }

        let body: TokenPairsResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        Ok(deepest_pool(body))
    }
}

/// Snapshot of the pool with the most USD liquidity, if any pool is listed.
fn deepest_pool(body: TokenPairsResponse) -> Option<LiquiditySnapshot> {
    body.pairs?
        .into_iter()
        .map(|pair| LiquiditySnapshot {
            liquidity_usd: pair.liquidity.and_then(|l| l.usd).unwrap_or(0.0),
            volume_24h_usd: pair.volume.and_then(|v| v.h24).unwrap_or(0.0),
            pair: pair.pair_address,
        })
        .max_by(|a, b| {
            a.liquidity_usd
                .partial_cmp(&b.liquidity_usd)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

//! Token display-metadata lookup over the DAS (Digital Asset Standard) API.
//!
//! `getAsset` resolves name, symbol, image, and whether the on-chain
//! metadata is still mutable. Only DAS-enabled RPC providers serve it, so
//! the lookup is optional; a provider without DAS yields absent metadata,
//! not a failed audit.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::ports::lookup::{LookupError, MetadataLookup, TokenDisplay};

#[derive(Debug, Clone)]
pub struct DasConfig {
    /// DAS-enabled RPC endpoint.
    pub url: String,
    pub timeout: Duration,
}

impl DasConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    result: Option<AssetResult>,
    error: Option<AssetError>,
}

#[derive(Debug, Deserialize)]
struct AssetError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AssetResult {
    content: Option<AssetContent>,
    mutable: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AssetContent {
    metadata: Option<AssetMetadata>,
    links: Option<AssetLinks>,
}

#[derive(Debug, Deserialize)]
struct AssetMetadata {
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetLinks {
    image: Option<String>,
}

/// Metadata lookup via DAS `getAsset`.
#[derive(Debug, Clone)]
pub struct DasMetadataLookup {
    config: DasConfig,
    http: Client,
}

impl DasMetadataLookup {
    pub fn new(config: DasConfig) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LookupError::Http(e.to_string()))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl MetadataLookup for DasMetadataLookup {
    async fn display_of(&self, mint: &str) -> Result<Option<TokenDisplay>, LookupError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getAsset",
            "params": { "id": mint },
        });

        let response = self
            .http
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::Unavailable("rate limited".to_string()));
        }
        if !response.status().is_success() {
            return Err(LookupError::Http(format!(
                "DAS endpoint returned {}",
                response.status()
            )));
        }

        let asset: AssetResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        if let Some(err) = asset.error {
            // Unknown assets come back as an RPC error, not a null result.
            tracing::debug!(mint, error = %err.message, "DAS getAsset returned error");
            return Ok(None);
        }

        Ok(asset.result.map(display_from_asset))
    }
}

fn display_from_asset(asset: AssetResult) -> TokenDisplay {
    let (name, symbol, image) = match asset.content {
        Some(content) => {
            let (name, symbol) = match content.metadata {
                Some(meta) => (meta.name, meta.symbol),
                None => (None, None),
            };
            let image = content.links.and_then(|l| l.image);
            (name, symbol, image)
        }
        None => (None, None, None),
    };

    TokenDisplay {
        name,
        symbol,
        image,
        mutable: asset.mutable,
    }
}

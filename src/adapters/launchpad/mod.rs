//! Launch-platform creator lookup.
//!
//! The launch platform's own API records who created each token it
//! launched, which is the fastest deployer-identification path for tokens
//! minted through its shared program. Tokens launched elsewhere are simply
//! unknown to it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::ports::lookup::{CreatorLookup, LookupError};

#[derive(Debug, Clone)]
pub struct LaunchpadConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            base_url: "https://frontend-api.pump.fun".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    creator: Option<String>,
}

/// Creator lookup against the launch platform's coin API.
#[derive(Debug, Clone)]
pub struct LaunchpadCreatorLookup {
    config: LaunchpadConfig,
    http: Client,
}

impl LaunchpadCreatorLookup {
    pub fn new(config: LaunchpadConfig) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LookupError::Http(e.to_string()))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl CreatorLookup for LaunchpadCreatorLookup {
    async fn creator_of(&self, mint: &str) -> Result<Option<String>, LookupError> {
        let url = format!("{}/coins/{}", self.config.base_url, mint);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                return Err(LookupError::Unavailable(format!(
                    "coin API returned {}",
                    status
                )));
            }
            _ => {}
        }

        let coin: CoinResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;
        Ok(coin.creator.filter(|c| !c.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_response_parses() {
        let coin: CoinResponse =
            serde_json::from_str(r#"{"mint":"M1","creator":"Creator111","name":"Tok"}"#).unwrap();
        assert_eq!(coin.creator.as_deref(), Some("Creator111"));
    }

    #[test]
    fn test_coin_response_missing_creator() {
        let coin: CoinResponse = serde_json::from_str(r#"{"mint":"M1"}"#).unwrap();
        assert!(coin.creator.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = LaunchpadConfig::default();
        assert!(config.base_url.starts_with("https://"));
    }
}

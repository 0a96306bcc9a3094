//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml
//! structure. Every section has defaults, so the tool runs without a config
//! file at all; a file only overrides what it names.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::analysis::deployer::DeployerConfig;
use crate::analysis::executor::ExecutorConfig;
use crate::analysis::history::HistoryConfig;
use crate::analysis::holders::TracerConfig;
use crate::application::AuditorConfig;
use crate::domain::known_entities::KnownEntities;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub solana: SolanaSection,
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub lookups: LookupsSection,
    #[serde(default)]
    pub known_entities: KnownEntitiesSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolanaSection {
    /// RPC endpoint (use private RPC for production)
    pub rpc_url: String,
    /// Commitment level: "processed", "confirmed", "finalized"
    pub commitment: String,
    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SolanaSection {
    /// Get RPC URL with environment variable override
    /// Checks SOLANA_RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }
}

/// Audit engine configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Holders fetched and traced per token
    pub top_holders: usize,
    /// Recent-signature window for deployment-history scans
    pub max_deploy_signatures: usize,
    /// Signature pages walked per holder during funding traces
    pub funding_page_limit: usize,
    /// Maximum concurrent RPC calls
    pub concurrency: usize,
    /// Minimum spacing between RPC dispatches, milliseconds
    pub min_request_interval_ms: u64,
    /// Attempts per RPC call, including the first
    pub retry_max_attempts: u32,
    /// Base delay for retry backoff, milliseconds
    pub retry_base_delay_ms: u64,
    /// Transactions inspected per history batch
    pub batch_size: usize,
    /// Pause between history batches, milliseconds
    pub batch_delay_ms: u64,
    /// Hard deadline for the liquidity probe, seconds
    pub liquidity_timeout_secs: u64,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            top_holders: 20,
            max_deploy_signatures: 500,
            funding_page_limit: 3,
            concurrency: 5,
            min_request_interval_ms: 200,
            retry_max_attempts: 3,
            retry_base_delay_ms: 500,
            batch_size: 10,
            batch_delay_ms: 500,
            liquidity_timeout_secs: 5,
        }
    }
}

/// External lookup configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupsSection {
    /// Query the launch platform's coin API for creators
    pub launchpad_enabled: bool,
    /// DAS-enabled RPC endpoint for display metadata; disabled when unset
    pub das_url: Option<String>,
    /// Query DexScreener for pool liquidity
    pub dexscreener_enabled: bool,
}

impl Default for LookupsSection {
    fn default() -> Self {
        Self {
            launchpad_enabled: true,
            das_url: None,
            dexscreener_enabled: true,
        }
    }
}

/// Known-entity allowlists
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KnownEntitiesSection {
    /// Exchange hot-wallet addresses
    pub exchanges: Vec<String>,
    /// Mixer withdrawal addresses
    pub mixers: Vec<String>,
}

impl KnownEntitiesSection {
    pub fn to_entities(&self) -> KnownEntities {
        KnownEntities::from_lists(&self.exchanges, &self.mixers)
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solana.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        match self.solana.commitment.as_str() {
            "processed" | "confirmed" | "finalized" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "commitment must be processed, confirmed, or finalized, got {:?}",
                    other
                )));
            }
        }

        if self.audit.top_holders == 0 {
            return Err(ConfigError::ValidationError(
                "top_holders must be > 0".to_string(),
            ));
        }

        if self.audit.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "concurrency must be > 0".to_string(),
            ));
        }

        if self.audit.retry_max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry_max_attempts must be > 0".to_string(),
            ));
        }

        if self.audit.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

// Conversion from Config to AuditorConfig
impl From<&Config> for AuditorConfig {
    fn from(config: &Config) -> Self {
        let audit = &config.audit;
        AuditorConfig {
            executor: ExecutorConfig {
                max_in_flight: audit.concurrency,
                min_request_interval: Duration::from_millis(audit.min_request_interval_ms),
                max_attempts: audit.retry_max_attempts,
                retry_base_delay: Duration::from_millis(audit.retry_base_delay_ms),
                ..ExecutorConfig::default()
            },
            deployer: DeployerConfig::default(),
            history: HistoryConfig {
                max_signatures: audit.max_deploy_signatures,
                batch_size: audit.batch_size,
                batch_delay: Duration::from_millis(audit.batch_delay_ms),
                ..HistoryConfig::default()
            },
            tracer: TracerConfig {
                top_n: audit.top_holders,
                funding_pages: audit.funding_page_limit,
                ..TracerConfig::default()
            },
            liquidity_deadline: Duration::from_secs(audit.liquidity_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[solana]
rpc_url = "https://rpc.example.com"
commitment = "confirmed"
timeout_secs = 20

[audit]
top_holders = 25
max_deploy_signatures = 300
funding_page_limit = 2
concurrency = 4
min_request_interval_ms = 100
retry_max_attempts = 4
retry_base_delay_ms = 250
batch_size = 8
batch_delay_ms = 400
liquidity_timeout_secs = 3

[lookups]
launchpad_enabled = true
das_url = "https://das.example.com"
dexscreener_enabled = false

[known_entities]
exchanges = ["ExchangeHot111"]
mixers = ["Mixer111"]

[logging]
level = "debug"
"#
        .to_string()
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.solana.rpc_url, "https://rpc.example.com");
        assert_eq!(config.audit.top_holders, 25);
        assert_eq!(config.audit.concurrency, 4);
        assert_eq!(config.lookups.das_url.as_deref(), Some("https://das.example.com"));
        assert!(!config.lookups.dexscreener_enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audit.top_holders, 20);
        assert_eq!(config.audit.max_deploy_signatures, 500);
        assert_eq!(config.solana.commitment, "confirmed");
        assert!(config.known_entities.exchanges.is_empty());
    }

    #[test]
    fn test_invalid_commitment_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[solana]\ncommitment = \"instant\"\n").unwrap();

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[audit]\nconcurrency = 0\n").unwrap();

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_config_to_auditor_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        let auditor_config = AuditorConfig::from(&config);

        assert_eq!(auditor_config.executor.max_in_flight, 4);
        assert_eq!(
            auditor_config.executor.min_request_interval,
            Duration::from_millis(100)
        );
        assert_eq!(auditor_config.history.max_signatures, 300);
        assert_eq!(auditor_config.tracer.top_n, 25);
        assert_eq!(auditor_config.liquidity_deadline, Duration::from_secs(3));
    }

    #[test]
    fn test_known_entities_conversion() {
        let section = KnownEntitiesSection {
            exchanges: vec!["Exchange111".to_string()],
            mixers: vec!["Mixer111".to_string()],
        };
        let entities = section.to_entities();
        assert!(entities.is_exchange("Exchange111"));
        assert!(entities.is_mixer("Mixer111"));
    }

    #[test]
    fn test_rpc_url_env_override() {
        let section = SolanaSection::default();
        // Without the env var set, the config value wins.
        std::env::remove_var("SOLANA_RPC_URL");
        assert_eq!(section.get_rpc_url(), section.rpc_url);
    }
}

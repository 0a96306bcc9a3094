//! Configuration loading and validation.

pub mod loader;

pub use loader::{
    load_config, AuditSection, Config, ConfigError, KnownEntitiesSection, LoggingSection,
    LookupsSection, SolanaSection,
};

//! Known-entity allowlists for funding-source classification.
//!
//! Exchange hot wallets fund thousands of unrelated users, and mixer
//! withdrawals deliberately break the funding trail, so neither implies
//! common ownership of the wallets they funded. The sets are injected
//! configuration data, never module-level constants, so deployments and
//! tests can swap them freely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Injected allowlists of addresses with a known, non-suspicious funding role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnownEntities {
    /// Exchange hot-wallet addresses.
    #[serde(default)]
    pub exchanges: HashSet<String>,
    /// Mixer / privacy-pool withdrawal addresses.
    #[serde(default)]
    pub mixers: HashSet<String>,
}

impl KnownEntities {
    pub fn new(exchanges: HashSet<String>, mixers: HashSet<String>) -> Self {
        Self { exchanges, mixers }
    }

    /// Build from plain address lists, e.g. straight out of config.
    pub fn from_lists(exchanges: &[String], mixers: &[String]) -> Self {
        Self {
            exchanges: exchanges.iter().cloned().collect(),
            mixers: mixers.iter().cloned().collect(),
        }
    }

    pub fn is_exchange(&self, address: &str) -> bool {
        self.exchanges.contains(address)
    }

    pub fn is_mixer(&self, address: &str) -> bool {
        self.mixers.contains(address)
    }
}

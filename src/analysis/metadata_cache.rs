//! Per-audit token display-metadata cache.
//!
//! One audit touches the same mint from several places (history scanner,
//! report assembly); the cache collapses those into a single lookup. It is
//! scoped to one audit invocation and discarded with it, never shared
//! across requests. Population is write-once-per-key: the first completed
//! lookup wins, concurrent duplicates are dropped.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ports::lookup::{MetadataLookup, TokenDisplay};

/// Write-once, read-many cache over a [`MetadataLookup`].
pub struct MetadataCache {
    lookup: Option<Arc<dyn MetadataLookup>>,
    entries: Mutex<HashMap<String, Option<TokenDisplay>>>,
}

impl MetadataCache {
    pub fn new(lookup: Option<Arc<dyn MetadataLookup>>) -> Self {
        Self {
            lookup,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Display metadata for `mint`, fetched on first use.
    ///
    /// Lookup failures are cached as `None` so a flaky metadata provider is
    /// consulted at most once per mint per audit.
    pub async fn display_of(&self, mint: &str) -> Option<TokenDisplay> {
        {
            let entries = self.entries.lock().await;
            if let Some(cached) = entries.get(mint) {
                return cached.clone();
            }
        }

        let fetched = match &self.lookup {
            Some(lookup) => match lookup.display_of(mint).await {
                Ok(display) => display,
                Err(e) => {
                    tracing::debug!(mint, error = %e, "metadata lookup failed");
                    None
                }
            },
            None => None,
        };

        let mut entries = self.entries.lock().await;
        entries
            .entry(mint.to_string())
            .or_insert(fetched)
            .clone()
    }

    /// Number of cached mints, for logging.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

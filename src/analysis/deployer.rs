//! Deployer Identifier.
//!
//! Resolves the wallet that deployed a token mint by trying an ordered list
//! of named strategies, first success wins:
//!
//! 1. `mint-authority` - the current mint authority, unless it is the
//!    shared-launch platform authority.
//! 2. `creation-transaction` - the creation transaction's creator, preferring
//!    the launch platform's lookup API when the platform was involved,
//!    falling back to the first signer.
//! 3. `fee-payer` - the fee payer of the creation transaction.
//!
//! Resolution fails only when no creation transaction exists within the
//! paginated scan bound, e.g. a mint older than the provider's indexing
//! retention.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::domain::known_programs::{is_shared_launch_authority, is_shared_launch_program};
use crate::ports::ledger::{
    validate_address, LedgerError, LedgerGateway, ParsedTransaction, SignatureInfo,
};
use crate::ports::lookup::CreatorLookup;

use super::executor::FetchExecutor;

/// The strategy order, visible for inspection and logs.
pub const STRATEGIES: [&str; 3] = ["mint-authority", "creation-transaction", "fee-payer"];

/// How many of the oldest signatures to try when the very oldest
/// transaction cannot be fetched.
const OLDEST_TX_CANDIDATES: usize = 3;

#[derive(Debug, Error)]
pub enum DeployerError {
    /// No creation transaction found within the scan bound. Terminal for
    /// deployment-history analysis, not for the rest of the audit.
    #[error("no creation transaction found for mint {0} within the scan bound")]
    Unresolved(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Outcome of one strategy attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum StrategyOutcome {
    Resolved(String),
    Skipped(String),
    Failed(String),
}

/// A successfully identified deployer, tagged with the strategy that won.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedDeployer {
    pub address: String,
    pub strategy: &'static str,
}

/// Scan bounds for locating the creation transaction.
#[derive(Debug, Clone)]
pub struct DeployerConfig {
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            max_pages: 5,
        }
    }
}

/// Resolves deployers against the ledger gateway.
pub struct DeployerResolver {
    gateway: Arc<dyn LedgerGateway>,
    creator_lookup: Option<Arc<dyn CreatorLookup>>,
    executor: FetchExecutor,
    config: DeployerConfig,
}

impl DeployerResolver {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        creator_lookup: Option<Arc<dyn CreatorLookup>>,
        executor: FetchExecutor,
        config: DeployerConfig,
    ) -> Self {
        Self {
            gateway,
            creator_lookup,
            executor,
            config,
        }
    }

    /// Identify the deployer of `mint`.
    pub async fn identify(&self, mint: &str) -> Result<ResolvedDeployer, DeployerError> {
        validate_address(mint)?;

        // Strategy 1: mint-authority.
        match self.try_mint_authority(mint).await? {
            StrategyOutcome::Resolved(address) => {
                tracing::debug!(mint, %address, strategy = STRATEGIES[0], "deployer resolved");
                return Ok(ResolvedDeployer {
                    address,
                    strategy: STRATEGIES[0],
                });
            }
            outcome => tracing::debug!(mint, strategy = STRATEGIES[0], ?outcome, "strategy passed over"),
        }

        // Strategies 2 and 3 share the creation transaction.
        let creation_tx = self
            .find_creation_transaction(mint)
            .await?
            .ok_or_else(|| DeployerError::Unresolved(mint.to_string()))?;

        match self.try_creation_transaction(mint, &creation_tx).await {
            StrategyOutcome::Resolved(address) => {
                tracing::debug!(mint, %address, strategy = STRATEGIES[1], "deployer resolved");
                return Ok(ResolvedDeployer {
                    address,
                    strategy: STRATEGIES[1],
                });
            }
            outcome => tracing::debug!(mint, strategy = STRATEGIES[1], ?outcome, "strategy passed over"),
        }

        match creation_tx.fee_payer() {
            Some(payer) => {
                tracing::debug!(mint, address = payer, strategy = STRATEGIES[2], "deployer resolved");
                Ok(ResolvedDeployer {
                    address: payer.to_string(),
                    strategy: STRATEGIES[2],
                })
            }
            None => Err(DeployerError::Unresolved(mint.to_string())),
        }
    }

    /// Strategy 1: the live mint authority, cheapest and most reliable.
    async fn try_mint_authority(&self, mint: &str) -> Result<StrategyOutcome, DeployerError> {
        let gateway = Arc::clone(&self.gateway);
        let mint_owned = mint.to_string();
        let state = self
            .executor
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let mint = mint_owned.clone();
                async move { gateway.get_mint_state(&mint).await }
            })
            .await?;

        Ok(match state.mint_authority {
            Some(authority) if !is_shared_launch_authority(&authority) => {
                StrategyOutcome::Resolved(authority)
            }
            Some(_) => StrategyOutcome::Skipped("mint authority is the shared-launch platform".to_string()),
            None => StrategyOutcome::Skipped("mint authority revoked".to_string()),
        })
    }

    /// Strategy 2: inspect the creation transaction.
    async fn try_creation_transaction(
        &self,
        mint: &str,
        tx: &ParsedTransaction,
    ) -> StrategyOutcome {
        let launched_via_platform = tx
            .instructions
            .iter()
            .any(|ix| is_shared_launch_program(&ix.program_id));

        if launched_via_platform {
            if let Some(lookup) = &self.creator_lookup {
                match lookup.creator_of(mint).await {
                    Ok(Some(creator)) => return StrategyOutcome::Resolved(creator),
                    Ok(None) => {
                        tracing::debug!(mint, "launch platform does not know this mint")
                    }
                    Err(e) => tracing::debug!(mint, error = %e, "creator lookup failed"),
                }
            }
        }

        match tx.first_signer() {
            Some(signer) => StrategyOutcome::Resolved(signer.to_string()),
            None => StrategyOutcome::Skipped("creation transaction has no signers".to_string()),
        }
    }

    /// Walk the mint's signature history to its oldest page and fetch the
    /// creation transaction. Bounded by `max_pages`; mints older than the
    /// bound resolve as `None`.
    async fn find_creation_transaction(
        &self,
        mint: &str,
    ) -> Result<Option<ParsedTransaction>, LedgerError> {
        let mut oldest_page: Vec<SignatureInfo> = Vec::new();
        let mut before: Option<String> = None;
        let mut reached_oldest = false;

        for _ in 0..self.config.max_pages {
            let gateway = Arc::clone(&self.gateway);
            let mint_owned = mint.to_string();
            let before_owned = before.clone();
            let page_size = self.config.page_size;
            let page = self
                .executor
                .run(|| {
                    let gateway = Arc::clone(&gateway);
                    let mint = mint_owned.clone();
                    let before = before_owned.clone();
                    async move {
                        gateway
                            .get_signatures_for_address(&mint, page_size, before.as_deref())
                            .await
                    }
                })
                .await?;

            if page.is_empty() {
                reached_oldest = true;
                break;
            }
            before = page.last().map(|s| s.signature.clone());
            let exhausted = page.len() < self.config.page_size;
            oldest_page = page;
            if exhausted {
                reached_oldest = true;
                break;
            }
        }

        // The page bound was hit while history kept going: the creation
        // transaction sits beyond the window, and the oldest fetched
        // transaction would be an arbitrary mid-history one.
        if !reached_oldest {
            return Ok(None);
        }

        // Oldest entries sit at the tail of the final page.
        let candidates: Vec<&SignatureInfo> = oldest_page
            .iter()
            .rev()
            .filter(|s| !s.failed)
            .take(OLDEST_TX_CANDIDATES)
            .collect();

        for info in candidates {
            let gateway = Arc::clone(&self.gateway);
            let sig = info.signature.clone();
            let tx = self
                .executor
                .run(|| {
                    let gateway = Arc::clone(&gateway);
                    let sig = sig.clone();
                    async move { gateway.get_parsed_transaction(&sig).await }
                })
                .await?;
            if let Some(tx) = tx {
                if !tx.failed {
                    return Ok(Some(tx));
                }
            }
        }

        Ok(None)
    }
}

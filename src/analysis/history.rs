//! Deployment History Scanner.
//!
//! Walks a deployer's recent transaction history, discovers every token
//! mint it created, and classifies each as Active, Dead, or Rugged. The
//! scan covers a bounded window of recent signatures, not the wallet's full
//! history; deployments older than the window are simply not seen.
//!
//! Signatures are processed in fixed-size batches with a pause between
//! batches, trading latency for reliability against bursty rate limiting.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::domain::deployment::{DeployedToken, TokenLifecycle};
use crate::domain::known_programs::{
    is_mint_init_instruction, is_shared_launch_authority, is_shared_launch_program,
    is_token_program,
};
use crate::ports::ledger::{
    validate_address, LedgerError, LedgerGateway, ParsedTransaction, SignatureInfo,
};

use super::executor::FetchExecutor;
use super::metadata_cache::MetadataCache;

/// How many non-signer accounts of a launch-platform instruction are
/// checked as mint candidates.
const LAUNCH_CANDIDATE_ACCOUNTS: usize = 3;

/// Scan bounds and pacing.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Recent-signature window per deployer; an explicit scope limitation,
    /// not full history.
    pub max_signatures: usize,
    /// Page size for signature listing.
    pub page_size: usize,
    /// Transactions inspected per batch.
    pub batch_size: usize,
    /// Pause between batches.
    pub batch_delay: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_signatures: 500,
            page_size: 1000,
            batch_size: 10,
            batch_delay: Duration::from_millis(500),
        }
    }
}

/// Discovers and classifies a deployer's token deployments.
pub struct DeploymentScanner {
    gateway: Arc<dyn LedgerGateway>,
    executor: FetchExecutor,
    metadata: Arc<MetadataCache>,
    config: HistoryConfig,
}

impl DeploymentScanner {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        executor: FetchExecutor,
        metadata: Arc<MetadataCache>,
        config: HistoryConfig,
    ) -> Self {
        Self {
            gateway,
            executor,
            metadata,
            config,
        }
    }

    /// Scan up to `max_signatures` recent signatures of `deployer` and
    /// return its discovered deployments, newest first.
    pub async fn scan(&self, deployer: &str) -> Result<Vec<DeployedToken>, LedgerError> {
        validate_address(deployer)?;

        let signatures = self.collect_signatures(deployer).await?;
        tracing::info!(
            deployer,
            signatures = signatures.len(),
            "scanning deployment history"
        );

        let mut seen: HashSet<String> = HashSet::new();
        let mut tokens: Vec<DeployedToken> = Vec::new();

        let batches: Vec<&[SignatureInfo]> = signatures.chunks(self.config.batch_size).collect();
        for (i, batch) in batches.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            let mut handles = Vec::new();
            for info in batch.iter().filter(|s| !s.failed) {
                let gateway = Arc::clone(&self.gateway);
                let executor = self.executor.clone();
                let signature = info.signature.clone();
                handles.push(tokio::spawn(async move {
                    executor
                        .run(|| {
                            let gateway = Arc::clone(&gateway);
                            let signature = signature.clone();
                            async move { gateway.get_parsed_transaction(&signature).await }
                        })
                        .await
                }));
            }

            for handle in handles {
                let fetched = match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!(error = %e, "transaction fetch task panicked");
                        continue;
                    }
                };
                let tx = match fetched {
                    Ok(Some(tx)) if !tx.failed => tx,
                    Ok(_) => continue,
                    Err(e) => {
                        // One unreadable transaction never aborts the scan.
                        tracing::warn!(error = %e, "skipping unreadable transaction");
                        continue;
                    }
                };

                for candidate in mint_candidates(&tx) {
                    if !seen.insert(candidate.mint.clone()) {
                        continue;
                    }
                    match self.build_deployed_token(&tx, candidate).await {
                        Some(token) => tokens.push(token),
                        None => continue,
                    }
                }
            }
        }

        tracing::info!(deployer, discovered = tokens.len(), "deployment scan complete");
        Ok(tokens)
    }

    /// Page newest-first signatures up to the configured window.
    async fn collect_signatures(&self, deployer: &str) -> Result<Vec<SignatureInfo>, LedgerError> {
        let mut collected: Vec<SignatureInfo> = Vec::new();
        let mut before: Option<String> = None;

        while collected.len() < self.config.max_signatures {
            let remaining = self.config.max_signatures - collected.len();
            let limit = remaining.min(self.config.page_size);

            let gateway = Arc::clone(&self.gateway);
            let address = deployer.to_string();
            let before_owned = before.clone();
            let page = self
                .executor
                .run(|| {
                    let gateway = Arc::clone(&gateway);
                    let address = address.clone();
                    let before = before_owned.clone();
                    async move {
                        gateway
                            .get_signatures_for_address(&address, limit, before.as_deref())
                            .await
                    }
                })
                .await?;

            if page.is_empty() {
                break;
            }
            let exhausted = page.len() < limit;
            before = page.last().map(|s| s.signature.clone());
            collected.extend(page);
            if exhausted {
                break;
            }
        }

        Ok(collected)
    }

    /// Classify a candidate and assemble its record. Returns `None` when
    /// the candidate turns out not to be a mint, or its state is
    /// unreadable.
    async fn build_deployed_token(
        &self,
        tx: &ParsedTransaction,
        candidate: MintCandidate,
    ) -> Option<DeployedToken> {
        let gateway = Arc::clone(&self.gateway);
        let mint = candidate.mint.clone();
        let state = self
            .executor
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let mint = mint.clone();
                async move { gateway.get_mint_state(&mint).await }
            })
            .await;

        let state = match state {
            Ok(state) => state,
            Err(LedgerError::NotFound(_)) if !candidate.verified_mint => {
                // Launch-platform account that was not actually a mint.
                return None;
            }
            Err(e) => {
                tracing::warn!(mint = %candidate.mint, error = %e, "mint state unavailable, skipping");
                return None;
            }
        };

        let top_holder_pct = self.top_holder_pct(&candidate.mint, state.supply).await;
        let authority_live = state
            .mint_authority
            .as_deref()
            .map(|a| !is_shared_launch_authority(a))
            .unwrap_or(false);
        let lifecycle = TokenLifecycle::classify(authority_live, state.supply, top_holder_pct);

        let display = self.metadata.display_of(&candidate.mint).await;
        let age_days = tx
            .block_time
            .map(|bt| (Utc::now().timestamp() - bt) / 86_400);

        Some(DeployedToken {
            mint: candidate.mint,
            creation_signature: tx.signature.clone(),
            created_at: tx.block_time,
            lifecycle,
            name: display.as_ref().and_then(|d| d.name.clone()),
            symbol: display.as_ref().and_then(|d| d.symbol.clone()),
            age_days,
        })
    }

    /// Largest single holder's share of supply, best-effort.
    async fn top_holder_pct(&self, mint: &str, supply: u64) -> Option<f64> {
        if supply == 0 {
            return None;
        }
        let gateway = Arc::clone(&self.gateway);
        let mint_owned = mint.to_string();
        let largest = self
            .executor
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let mint = mint_owned.clone();
                async move { gateway.get_largest_token_accounts(&mint).await }
            })
            .await;

        match largest {
            Ok(accounts) => accounts
                .first()
                .map(|top| top.amount as f64 / supply as f64 * 100.0),
            Err(e) => {
                tracing::debug!(mint, error = %e, "largest accounts unavailable for classification");
                None
            }
        }
    }
}

struct MintCandidate {
    mint: String,
    /// True when the instruction itself proves this is a mint
    /// (direct SPL initialization); launch-platform candidates still need
    /// verification against mint state.
    verified_mint: bool,
}

/// Extract candidate mints initialized by this transaction.
fn mint_candidates(tx: &ParsedTransaction) -> Vec<MintCandidate> {
    let mut candidates = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for ix in &tx.instructions {
        if is_token_program(&ix.program_id) {
            let is_init = ix
                .kind
                .as_deref()
                .map(is_mint_init_instruction)
                .unwrap_or(false);
            if !is_init {
                continue;
            }
            let mint = ix
                .info
                .get("mint")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .or_else(|| ix.accounts.first().cloned());
            if let Some(mint) = mint {
                if seen.insert(mint.clone()) {
                    candidates.push(MintCandidate {
                        mint,
                        verified_mint: true,
                    });
                }
            }
        } else if is_shared_launch_program(&ix.program_id) {
            // The platform's create instruction carries the new mint among
            // its leading non-signer accounts; verified later against mint
            // state.
            for account in ix
                .accounts
                .iter()
                .filter(|a| !tx.signers.contains(*a))
                .take(LAUNCH_CANDIDATE_ACCOUNTS)
            {
                if seen.insert(account.clone()) {
                    candidates.push(MintCandidate {
                        mint: account.clone(),
                        verified_mint: false,
                    });
                }
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::executor::ExecutorConfig;
    use crate::domain::known_programs::{
        SHARED_LAUNCH_MINT_AUTHORITY, SHARED_LAUNCH_PROGRAM_ID, TOKEN_PROGRAM_ID,
    };
    use crate::ports::ledger::{MintState, ParsedInstruction, TokenAccountBalance};
    use crate::ports::mocks::MockLedger;

    const DEPLOYER: &str = "So11111111111111111111111111111111111111112";

    fn scanner(ledger: MockLedger) -> DeploymentScanner {
        DeploymentScanner::new(
            Arc::new(ledger),
            FetchExecutor::new(ExecutorConfig {
                min_request_interval: Duration::ZERO,
                retry_base_delay: Duration::from_millis(1),
                retry_max_jitter: Duration::ZERO,
                ..Default::default()
            }),
            Arc::new(MetadataCache::new(None)),
            HistoryConfig {
                max_signatures: 100,
                page_size: 50,
                batch_size: 4,
                batch_delay: Duration::from_millis(1),
            },
        )
    }

    fn sig(signature: &str, block_time: i64) -> SignatureInfo {
        SignatureInfo {
            signature: signature.to_string(),
            block_time: Some(block_time),
            failed: false,
        }
    }

    fn init_mint_tx(signature: &str, mint: &str, block_time: i64) -> ParsedTransaction {
        ParsedTransaction {
            signature: signature.to_string(),
            block_time: Some(block_time),
            account_keys: vec![DEPLOYER.to_string(), mint.to_string()],
            signers: vec![DEPLOYER.to_string()],
            pre_balances: vec![0, 0],
            post_balances: vec![0, 0],
            instructions: vec![ParsedInstruction {
                program_id: TOKEN_PROGRAM_ID.to_string(),
                kind: Some("initializeMint".to_string()),
                accounts: vec![mint.to_string()],
                info: serde_json::json!({ "mint": mint }),
            }],
            failed: false,
        }
    }

    fn launch_create_tx(signature: &str, mint: &str, block_time: i64) -> ParsedTransaction {
        ParsedTransaction {
            signature: signature.to_string(),
            block_time: Some(block_time),
            account_keys: vec![DEPLOYER.to_string(), mint.to_string()],
            signers: vec![DEPLOYER.to_string()],
            pre_balances: vec![0, 0],
            post_balances: vec![0, 0],
            instructions: vec![ParsedInstruction {
                program_id: SHARED_LAUNCH_PROGRAM_ID.to_string(),
                kind: None,
                accounts: vec![mint.to_string(), "BondingCurve111".to_string()],
                info: serde_json::Value::Null,
            }],
            failed: false,
        }
    }

    fn mint_state(mint: &str, authority: Option<&str>, supply: u64) -> MintState {
        MintState {
            mint: mint.to_string(),
            mint_authority: authority.map(|a| a.to_string()),
            freeze_authority: None,
            supply,
            decimals: 6,
        }
    }

    fn top_holder(mint_supply_pct: f64, supply: u64) -> Vec<TokenAccountBalance> {
        let amount = (supply as f64 * mint_supply_pct / 100.0) as u64;
        vec![TokenAccountBalance {
            address: "TopHolderAta".to_string(),
            amount,
            ui_amount: amount as f64,
        }]
    }

    #[tokio::test]
    async fn test_discovers_and_classifies_direct_mint() {
        let supply = 1_000_000;
        let ledger = MockLedger::new()
            .with_signatures(DEPLOYER, vec![sig("tx1", 1_700_000_000)])
            .with_transaction(init_mint_tx("tx1", "MintA", 1_700_000_000))
            .with_mint_state(mint_state("MintA", None, supply))
            .with_largest_accounts("MintA", top_holder(10.0, supply));

        let tokens = scanner(ledger).scan(DEPLOYER).await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].mint, "MintA");
        assert_eq!(tokens[0].lifecycle, TokenLifecycle::Active);
        assert_eq!(tokens[0].creation_signature, "tx1");
    }

    #[tokio::test]
    async fn test_live_authority_classified_rugged() {
        let supply = 1_000_000;
        let ledger = MockLedger::new()
            .with_signatures(DEPLOYER, vec![sig("tx1", 1_700_000_000)])
            .with_transaction(init_mint_tx("tx1", "MintA", 1_700_000_000))
            .with_mint_state(mint_state("MintA", Some(DEPLOYER), supply))
            .with_largest_accounts("MintA", top_holder(10.0, supply));

        let tokens = scanner(ledger).scan(DEPLOYER).await.unwrap();
        assert_eq!(tokens[0].lifecycle, TokenLifecycle::Rugged);
    }

    #[tokio::test]
    async fn test_shared_launch_authority_not_counted_as_live() {
        let supply = 1_000_000;
        let ledger = MockLedger::new()
            .with_signatures(DEPLOYER, vec![sig("tx1", 1_700_000_000)])
            .with_transaction(launch_create_tx("tx1", "MintB", 1_700_000_000))
            .with_mint_state(mint_state(
                "MintB",
                Some(SHARED_LAUNCH_MINT_AUTHORITY),
                supply,
            ))
            .with_largest_accounts("MintB", top_holder(30.0, supply));

        let tokens = scanner(ledger).scan(DEPLOYER).await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].lifecycle, TokenLifecycle::Active);
    }

    #[tokio::test]
    async fn test_dead_classification_band() {
        let supply = 1_000_000;
        let ledger = MockLedger::new()
            .with_signatures(DEPLOYER, vec![sig("tx1", 1_700_000_000)])
            .with_transaction(init_mint_tx("tx1", "MintA", 1_700_000_000))
            .with_mint_state(mint_state("MintA", None, supply))
            .with_largest_accounts("MintA", top_holder(85.0, supply));

        let tokens = scanner(ledger).scan(DEPLOYER).await.unwrap();
        assert_eq!(tokens[0].lifecycle, TokenLifecycle::Dead);
    }

    #[tokio::test]
    async fn test_deduplicates_across_transactions() {
        let supply = 1_000_000;
        let ledger = MockLedger::new()
            .with_signatures(
                DEPLOYER,
                vec![sig("tx1", 1_700_010_000), sig("tx2", 1_700_000_000)],
            )
            .with_transaction(init_mint_tx("tx1", "MintA", 1_700_010_000))
            .with_transaction(init_mint_tx("tx2", "MintA", 1_700_000_000))
            .with_mint_state(mint_state("MintA", None, supply))
            .with_largest_accounts("MintA", top_holder(10.0, supply));

        let tokens = scanner(ledger).scan(DEPLOYER).await.unwrap();
        assert_eq!(tokens.len(), 1);
        // Newest occurrence wins.
        assert_eq!(tokens[0].creation_signature, "tx1");
    }

    #[tokio::test]
    async fn test_non_mint_launch_account_skipped() {
        // Launch instruction lists accounts that are not mints; no mint
        // state exists for them, so nothing is discovered.
        let ledger = MockLedger::new()
            .with_signatures(DEPLOYER, vec![sig("tx1", 1_700_000_000)])
            .with_transaction(launch_create_tx("tx1", "NotAMint", 1_700_000_000));

        let tokens = scanner(ledger).scan(DEPLOYER).await.unwrap();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_transaction_does_not_abort() {
        let supply = 1_000_000;
        let ledger = MockLedger::new()
            .with_signatures(
                DEPLOYER,
                vec![sig("bad", 1_700_010_000), sig("tx2", 1_700_000_000)],
            )
            .with_failure("bad", LedgerError::Rpc("boom".to_string()))
            .with_transaction(init_mint_tx("tx2", "MintA", 1_700_000_000))
            .with_mint_state(mint_state("MintA", None, supply))
            .with_largest_accounts("MintA", top_holder(10.0, supply));

        let tokens = scanner(ledger).scan(DEPLOYER).await.unwrap();
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_mint_candidates_ignores_unrelated_programs() {
        let tx = ParsedTransaction {
            signature: "tx".to_string(),
            block_time: None,
            account_keys: vec![],
            signers: vec![],
            pre_balances: vec![],
            post_balances: vec![],
            instructions: vec![ParsedInstruction {
                program_id: "SomeOtherProgram".to_string(),
                kind: Some("transfer".to_string()),
                accounts: vec!["acc".to_string()],
                info: serde_json::Value::Null,
            }],
            failed: false,
        };
        assert!(mint_candidates(&tx).is_empty());
    }
}

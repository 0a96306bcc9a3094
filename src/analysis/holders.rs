//! Holder & Funding-Source Tracer.
//!
//! Fetches a token's top-N holders and, for each, walks the holder wallet's
//! own transaction history backward to find the wallet that first sent it
//! native SOL. That funding wallet is the grouping key for cluster
//! analysis.
//!
//! The funding walk is bounded to a fixed number of signature pages. For
//! very old or very active wallets the true first funder can sit beyond the
//! window; the result is then simply absent. Absence is a normal outcome
//! and never aborts the trace.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::holders::{FundingSource, HolderRecord};
use crate::domain::known_entities::KnownEntities;
use crate::domain::known_programs::is_system_program;
use crate::ports::ledger::{
    validate_address, LedgerError, LedgerGateway, ParsedTransaction, SignatureInfo,
};

use super::executor::FetchExecutor;

#[derive(Debug, Error)]
pub enum TraceError {
    /// The holder set exceeds what the largest-accounts primitive supports;
    /// cluster analysis is unsuitable for this token. The rest of the
    /// audit still completes.
    #[error("token {0} has too many holders for cluster analysis")]
    TooManyHolders(String),

    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for TraceError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::TooManyHolders(mint) => TraceError::TooManyHolders(mint),
            other => TraceError::Ledger(other),
        }
    }
}

/// Trace bounds.
#[derive(Debug, Clone)]
pub struct TracerConfig {
    /// Holders fetched per token.
    pub top_n: usize,
    /// Signature pages walked per holder wallet.
    pub funding_pages: usize,
    /// Page size for the funding walk.
    pub funding_page_size: usize,
    /// Transactions actually fetched per holder before giving up.
    pub max_tx_inspections: usize,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            top_n: 20,
            funding_pages: 3,
            funding_page_size: 1000,
            max_tx_inspections: 25,
        }
    }
}

/// Resolves top holders and their funding origins.
pub struct HolderTracer {
    gateway: Arc<dyn LedgerGateway>,
    executor: FetchExecutor,
    entities: Arc<KnownEntities>,
    config: TracerConfig,
}

impl HolderTracer {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        executor: FetchExecutor,
        entities: Arc<KnownEntities>,
        config: TracerConfig,
    ) -> Self {
        Self {
            gateway,
            executor,
            entities,
            config,
        }
    }

    /// Top-N holders of `mint` with their funding sources where resolvable.
    pub async fn trace(
        &self,
        mint: &str,
    ) -> Result<Vec<(HolderRecord, Option<FundingSource>)>, TraceError> {
        validate_address(mint)?;

        let gateway = Arc::clone(&self.gateway);
        let mint_owned = mint.to_string();
        let largest = self
            .executor
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let mint = mint_owned.clone();
                async move { gateway.get_largest_token_accounts(&mint).await }
            })
            .await?;

        let gateway = Arc::clone(&self.gateway);
        let mint_owned = mint.to_string();
        let supply = self
            .executor
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let mint = mint_owned.clone();
                async move { gateway.get_token_supply(&mint).await }
            })
            .await?;

        let mut records = Vec::new();
        for (i, account) in largest.iter().take(self.config.top_n).enumerate() {
            let owner = self.resolve_owner(&account.address).await;
            let pct = if supply.amount > 0 {
                account.amount as f64 / supply.amount as f64 * 100.0
            } else {
                0.0
            };
            records.push(HolderRecord {
                address: owner,
                token_account: account.address.clone(),
                balance: account.amount,
                ui_amount: account.ui_amount,
                pct_of_supply: pct,
                rank: i + 1,
            });
        }

        // Funding walks are independent; fan out and let the executor's
        // semaphore bound the actual RPC concurrency.
        let mut handles = Vec::new();
        for record in &records {
            let gateway = Arc::clone(&self.gateway);
            let executor = self.executor.clone();
            let entities = Arc::clone(&self.entities);
            let config = self.config.clone();
            let wallet = record.address.clone();
            handles.push(tokio::spawn(async move {
                trace_funding(gateway, executor, entities, config, wallet).await
            }));
        }

        let mut result = Vec::with_capacity(records.len());
        for (record, handle) in records.into_iter().zip(handles) {
            let funding = match handle.await {
                Ok(funding) => funding,
                Err(e) => {
                    tracing::warn!(error = %e, "funding trace task panicked");
                    None
                }
            };
            result.push((record, funding));
        }

        Ok(result)
    }

    /// Token account -> owner wallet. Falls back to the token account
    /// address itself when the account cannot be parsed.
    async fn resolve_owner(&self, token_account: &str) -> String {
        let gateway = Arc::clone(&self.gateway);
        let address = token_account.to_string();
        let state = self
            .executor
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let address = address.clone();
                async move { gateway.get_account_state(&address).await }
            })
            .await;

        match state {
            Ok(Some(state)) => state
                .token_account_owner
                .unwrap_or_else(|| token_account.to_string()),
            Ok(None) => token_account.to_string(),
            Err(e) => {
                tracing::debug!(token_account, error = %e, "owner resolution failed");
                token_account.to_string()
            }
        }
    }
}

/// Walk `wallet`'s history oldest-first within the page bound and return
/// the earliest native transfer in. `None` when nothing resolves within
/// the bound; errors degrade to `None` as well.
async fn trace_funding(
    gateway: Arc<dyn LedgerGateway>,
    executor: FetchExecutor,
    entities: Arc<KnownEntities>,
    config: TracerConfig,
    wallet: String,
) -> Option<FundingSource> {
    let mut collected: Vec<SignatureInfo> = Vec::new();
    let mut before: Option<String> = None;

    for _ in 0..config.funding_pages {
        let gateway = Arc::clone(&gateway);
        let wallet_owned = wallet.clone();
        let before_owned = before.clone();
        let page_size = config.funding_page_size;
        let page = executor
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let wallet = wallet_owned.clone();
                let before = before_owned.clone();
                async move {
                    gateway
                        .get_signatures_for_address(&wallet, page_size, before.as_deref())
                        .await
                }
            })
            .await;

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(wallet = %wallet, error = %e, "signature listing failed during funding walk");
                return None;
            }
        };
        if page.is_empty() {
            break;
        }
        let exhausted = page.len() < config.funding_page_size;
        before = page.last().map(|s| s.signature.clone());
        collected.extend(page);
        if exhausted {
            break;
        }
    }

    // Oldest within the window first. When the window did not reach the
    // wallet's genesis this is only the oldest *visible* activity.
    let mut inspected = 0usize;
    for info in collected.iter().rev().filter(|s| !s.failed) {
        if inspected >= config.max_tx_inspections {
            break;
        }
        inspected += 1;

        let gateway_ref = Arc::clone(&gateway);
        let signature = info.signature.clone();
        let tx = executor
            .run(|| {
                let gateway = Arc::clone(&gateway_ref);
                let signature = signature.clone();
                async move { gateway.get_parsed_transaction(&signature).await }
            })
            .await;

        let tx = match tx {
            Ok(Some(tx)) if !tx.failed => tx,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(wallet = %wallet, error = %e, "transaction unreadable during funding walk");
                continue;
            }
        };

        if let Some(source) = extract_funding(&tx, &wallet, &entities) {
            return Some(source);
        }
    }

    None
}

/// Identify the sender of a native transfer into `wallet` within one
/// transaction: balance-delta inspection first, parsed system-transfer
/// instruction as fallback.
fn extract_funding(
    tx: &ParsedTransaction,
    wallet: &str,
    entities: &KnownEntities,
) -> Option<FundingSource> {
    let delta = tx.balance_delta(wallet);

    if let Some(received) = delta.filter(|d| *d > 0) {
        // Sender is the account that lost the most lamports.
        let sender = tx
            .account_keys
            .iter()
            .filter(|k| k.as_str() != wallet)
            .filter_map(|k| tx.balance_delta(k).map(|d| (k, d)))
            .filter(|(_, d)| *d < 0)
            .min_by_key(|(_, d)| *d)
            .map(|(k, _)| k.clone());

        if let Some(funder) = sender {
            return Some(build_source(
                funder,
                tx.signature.clone(),
                tx.block_time,
                received as u64,
                entities,
            ));
        }
    }

    // Fallback: a parsed system transfer naming the wallet as destination.
    for ix in &tx.instructions {
        if !is_system_program(&ix.program_id) || ix.kind.as_deref() != Some("transfer") {
            continue;
        }
        let destination = ix.info.get("destination").and_then(|v| v.as_str());
        if destination != Some(wallet) {
            continue;
        }
        let source = ix.info.get("source").and_then(|v| v.as_str())?;
        let lamports = ix.info.get("lamports").and_then(|v| v.as_u64()).unwrap_or(0);
        return Some(build_source(
            source.to_string(),
            tx.signature.clone(),
            tx.block_time,
            lamports,
            entities,
        ));
    }

    None
}

fn build_source(
    funder: String,
    signature: String,
    block_time: Option<i64>,
    lamports: u64,
    entities: &KnownEntities,
) -> FundingSource {
    let is_known_exchange = entities.is_exchange(&funder);
    let is_known_mixer = entities.is_mixer(&funder);
    FundingSource {
        funder,
        signature,
        block_time,
        lamports,
        is_known_exchange,
        is_known_mixer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::executor::ExecutorConfig;
    use crate::ports::ledger::{
        AccountState, ParsedInstruction, TokenAccountBalance, TokenSupply,
    };
    use crate::ports::mocks::MockLedger;

    const MINT: &str = "So11111111111111111111111111111111111111112";

    fn tracer(ledger: MockLedger, entities: KnownEntities) -> HolderTracer {
        HolderTracer::new(
            Arc::new(ledger),
            FetchExecutor::new(ExecutorConfig {
                min_request_interval: std::time::Duration::ZERO,
                retry_base_delay: std::time::Duration::from_millis(1),
                retry_max_jitter: std::time::Duration::ZERO,
                ..Default::default()
            }),
            Arc::new(entities),
            TracerConfig {
                top_n: 10,
                funding_pages: 2,
                funding_page_size: 10,
                max_tx_inspections: 10,
            },
        )
    }

    fn token_account(address: &str, amount: u64) -> TokenAccountBalance {
        TokenAccountBalance {
            address: address.to_string(),
            amount,
            ui_amount: amount as f64 / 1e6,
        }
    }

    fn owner_state(owner: &str) -> AccountState {
        AccountState {
            owner_program: crate::domain::known_programs::TOKEN_PROGRAM_ID.to_string(),
            lamports: 2_039_280,
            token_account_owner: Some(owner.to_string()),
        }
    }

    fn funding_tx(signature: &str, funder: &str, wallet: &str, lamports: u64) -> ParsedTransaction {
        ParsedTransaction {
            signature: signature.to_string(),
            block_time: Some(1_699_000_000),
            account_keys: vec![funder.to_string(), wallet.to_string()],
            signers: vec![funder.to_string()],
            pre_balances: vec![10_000_000_000, 0],
            post_balances: vec![10_000_000_000 - lamports - 5_000, lamports],
            instructions: vec![],
            failed: false,
        }
    }

    fn sig(signature: &str) -> SignatureInfo {
        SignatureInfo {
            signature: signature.to_string(),
            block_time: Some(1_699_000_000),
            failed: false,
        }
    }

    #[tokio::test]
    async fn test_trace_resolves_holders_and_funders() {
        let supply = 1_000_000_000;
        let ledger = MockLedger::new()
            .with_largest_accounts(
                MINT,
                vec![token_account("ata1", 600_000_000), token_account("ata2", 100_000_000)],
            )
            .with_supply(MINT, TokenSupply { amount: supply, decimals: 6 })
            .with_account_state("ata1", owner_state("wallet1"))
            .with_account_state("ata2", owner_state("wallet2"))
            .with_signatures("wallet1", vec![sig("fund1")])
            .with_signatures("wallet2", vec![sig("fund2")])
            .with_transaction(funding_tx("fund1", "funderX", "wallet1", 1_000_000_000))
            .with_transaction(funding_tx("fund2", "funderX", "wallet2", 2_000_000_000));

        let result = tracer(ledger, KnownEntities::default()).trace(MINT).await.unwrap();
        assert_eq!(result.len(), 2);

        let (first, funding) = &result[0];
        assert_eq!(first.address, "wallet1");
        assert_eq!(first.rank, 1);
        assert!((first.pct_of_supply - 60.0).abs() < 1e-9);
        assert_eq!(funding.as_ref().unwrap().funder, "funderX");

        let (_, funding2) = &result[1];
        assert_eq!(funding2.as_ref().unwrap().funder, "funderX");
    }

    #[tokio::test]
    async fn test_absent_funding_is_not_an_error() {
        let ledger = MockLedger::new()
            .with_largest_accounts(MINT, vec![token_account("ata1", 500)])
            .with_supply(MINT, TokenSupply { amount: 1_000, decimals: 0 })
            .with_account_state("ata1", owner_state("wallet1"));
        // wallet1 has no signatures at all.

        let result = tracer(ledger, KnownEntities::default()).trace(MINT).await.unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].1.is_none());
    }

    #[tokio::test]
    async fn test_too_many_holders_is_distinct() {
        let ledger = MockLedger::new().with_too_many_holders(MINT);
        let result = tracer(ledger, KnownEntities::default()).trace(MINT).await;
        assert!(matches!(result, Err(TraceError::TooManyHolders(_))));
    }

    #[tokio::test]
    async fn test_exchange_funder_flagged() {
        let entities = KnownEntities::from_lists(&["cexHotWallet".to_string()], &[]);
        let ledger = MockLedger::new()
            .with_largest_accounts(MINT, vec![token_account("ata1", 500)])
            .with_supply(MINT, TokenSupply { amount: 1_000, decimals: 0 })
            .with_account_state("ata1", owner_state("wallet1"))
            .with_signatures("wallet1", vec![sig("fund1")])
            .with_transaction(funding_tx("fund1", "cexHotWallet", "wallet1", 5_000_000));

        let result = tracer(ledger, entities).trace(MINT).await.unwrap();
        let funding = result[0].1.as_ref().unwrap();
        assert!(funding.is_known_exchange);
        assert!(!funding.is_known_mixer);
    }

    #[tokio::test]
    async fn test_earliest_transfer_wins() {
        // Newest-first listing: "later" then "first". The walk must pick
        // the oldest, i.e. "first".
        let ledger = MockLedger::new()
            .with_largest_accounts(MINT, vec![token_account("ata1", 500)])
            .with_supply(MINT, TokenSupply { amount: 1_000, decimals: 0 })
            .with_account_state("ata1", owner_state("wallet1"))
            .with_signatures("wallet1", vec![sig("later"), sig("first")])
            .with_transaction(funding_tx("later", "funderLate", "wallet1", 1_000))
            .with_transaction(funding_tx("first", "funderEarly", "wallet1", 2_000));

        let result = tracer(ledger, KnownEntities::default()).trace(MINT).await.unwrap();
        assert_eq!(result[0].1.as_ref().unwrap().funder, "funderEarly");
    }

    #[test]
    fn test_extract_funding_instruction_fallback() {
        // No balance movement recorded for the wallet, but a parsed system
        // transfer names it as destination.
        let tx = ParsedTransaction {
            signature: "sig".to_string(),
            block_time: Some(1),
            account_keys: vec!["funder".to_string(), "other".to_string()],
            signers: vec!["funder".to_string()],
            pre_balances: vec![100, 0],
            post_balances: vec![100, 0],
            instructions: vec![ParsedInstruction {
                program_id: crate::domain::known_programs::SYSTEM_PROGRAM_ID.to_string(),
                kind: Some("transfer".to_string()),
                accounts: vec![],
                info: serde_json::json!({
                    "source": "funder",
                    "destination": "wallet1",
                    "lamports": 777,
                }),
            }],
            failed: false,
        };

        let source = extract_funding(&tx, "wallet1", &KnownEntities::default()).unwrap();
        assert_eq!(source.funder, "funder");
        assert_eq!(source.lamports, 777);
    }

    #[test]
    fn test_extract_funding_ignores_outgoing() {
        let tx = ParsedTransaction {
            signature: "sig".to_string(),
            block_time: Some(1),
            account_keys: vec!["wallet1".to_string(), "dest".to_string()],
            signers: vec!["wallet1".to_string()],
            pre_balances: vec![5_000, 0],
            post_balances: vec![1_000, 4_000],
            instructions: vec![],
            failed: false,
        };
        assert!(extract_funding(&tx, "wallet1", &KnownEntities::default()).is_none());
    }
}

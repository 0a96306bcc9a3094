//! Hand-rolled mock gateways for unit and integration tests.
//!
//! Builder-style: configure responses up front, then hand the mock to the
//! component under test. Calls are recorded so tests can assert on traffic.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::ledger::{
    AccountState, LedgerError, LedgerGateway, LedgerResult, MintState, ParsedTransaction,
    SignatureInfo, TokenAccountBalance, TokenSupply,
};
use super::lookup::{
    CreatorLookup, LiquidityProbe, LiquiditySnapshot, LookupError, MetadataLookup, TokenDisplay,
};

/// In-memory ledger gateway with configurable responses.
#[derive(Debug, Default, Clone)]
pub struct MockLedger {
    mint_states: HashMap<String, MintState>,
    account_states: HashMap<String, AccountState>,
    largest_accounts: HashMap<String, Vec<TokenAccountBalance>>,
    too_many_holders: HashSet<String>,
    /// Full signature history per address, newest first.
    signatures: HashMap<String, Vec<SignatureInfo>>,
    transactions: HashMap<String, ParsedTransaction>,
    supplies: HashMap<String, TokenSupply>,
    /// Addresses whose calls fail with the given error.
    failures: HashMap<String, LedgerError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mint_state(mut self, state: MintState) -> Self {
        self.mint_states.insert(state.mint.clone(), state);
        self
    }

    pub fn with_account_state(mut self, address: &str, state: AccountState) -> Self {
        self.account_states.insert(address.to_string(), state);
        self
    }

    pub fn with_largest_accounts(mut self, mint: &str, accounts: Vec<TokenAccountBalance>) -> Self {
        self.largest_accounts.insert(mint.to_string(), accounts);
        self
    }

    pub fn with_too_many_holders(mut self, mint: &str) -> Self {
        self.too_many_holders.insert(mint.to_string());
        self
    }

    pub fn with_signatures(mut self, address: &str, sigs: Vec<SignatureInfo>) -> Self {
        self.signatures.insert(address.to_string(), sigs);
        self
    }

    pub fn with_transaction(mut self, tx: ParsedTransaction) -> Self {
        self.transactions.insert(tx.signature.clone(), tx);
        self
    }

    pub fn with_supply(mut self, mint: &str, supply: TokenSupply) -> Self {
        self.supplies.insert(mint.to_string(), supply);
        self
    }

    /// Make every call for `address` fail with `error`.
    pub fn with_failure(mut self, address: &str, error: LedgerError) -> Self {
        self.failures.insert(address.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, address: &str) -> LedgerResult<()> {
        match self.failures.get(address) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerGateway for MockLedger {
    async fn get_account_state(&self, address: &str) -> LedgerResult<Option<AccountState>> {
        self.record(format!("get_account_state:{}", address));
        self.check_failure(address)?;
        Ok(self.account_states.get(address).cloned())
    }

    async fn get_mint_state(&self, mint: &str) -> LedgerResult<MintState> {
        self.record(format!("get_mint_state:{}", mint));
        self.check_failure(mint)?;
        self.mint_states
            .get(mint)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(mint.to_string()))
    }

    async fn get_largest_token_accounts(
        &self,
        mint: &str,
    ) -> LedgerResult<Vec<TokenAccountBalance>> {
        self.record(format!("get_largest_token_accounts:{}", mint));
        self.check_failure(mint)?;
        if self.too_many_holders.contains(mint) {
            return Err(LedgerError::TooManyHolders(mint.to_string()));
        }
        Ok(self.largest_accounts.get(mint).cloned().unwrap_or_default())
    }

    async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> LedgerResult<Vec<SignatureInfo>> {
        self.record(format!("get_signatures_for_address:{}", address));
        self.check_failure(address)?;
        let all = self.signatures.get(address).cloned().unwrap_or_default();
        let start = match before {
            Some(sig) => match all.iter().position(|s| s.signature == sig) {
                Some(idx) => idx + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };
        Ok(all.into_iter().skip(start).take(limit).collect())
    }

    async fn get_parsed_transaction(
        &self,
        signature: &str,
    ) -> LedgerResult<Option<ParsedTransaction>> {
        self.record(format!("get_parsed_transaction:{}", signature));
        self.check_failure(signature)?;
        Ok(self.transactions.get(signature).cloned())
    }

    async fn get_token_supply(&self, mint: &str) -> LedgerResult<TokenSupply> {
        self.record(format!("get_token_supply:{}", mint));
        self.check_failure(mint)?;
        self.supplies
            .get(mint)
            .copied()
            .ok_or_else(|| LedgerError::NotFound(mint.to_string()))
    }
}

/// Creator lookup backed by a fixed map.
#[derive(Debug, Default)]
pub struct MockCreatorLookup {
    creators: HashMap<String, String>,
    fail: bool,
}

impl MockCreatorLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_creator(mut self, mint: &str, creator: &str) -> Self {
        self.creators.insert(mint.to_string(), creator.to_string());
        self
    }

    /// Make every lookup fail, to exercise the fallback path.
    pub fn failing() -> Self {
        Self {
            creators: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl CreatorLookup for MockCreatorLookup {
    async fn creator_of(&self, mint: &str) -> Result<Option<String>, LookupError> {
        if self.fail {
            return Err(LookupError::Unavailable("mock failure".to_string()));
        }
        Ok(self.creators.get(mint).cloned())
    }
}

/// Metadata lookup backed by a fixed map.
#[derive(Debug, Default)]
pub struct MockMetadataLookup {
    displays: HashMap<String, TokenDisplay>,
}

impl MockMetadataLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(mut self, mint: &str, display: TokenDisplay) -> Self {
        self.displays.insert(mint.to_string(), display);
        self
    }
}

#[async_trait]
impl MetadataLookup for MockMetadataLookup {
    async fn display_of(&self, mint: &str) -> Result<Option<TokenDisplay>, LookupError> {
        Ok(self.displays.get(mint).cloned())
    }
}

/// Liquidity probe returning a fixed snapshot, optionally after a delay to
/// exercise the deadline path.
#[derive(Debug, Default)]
pub struct MockLiquidityProbe {
    snapshot: Option<LiquiditySnapshot>,
    delay_ms: u64,
}

impl MockLiquidityProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, snapshot: LiquiditySnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

#[async_trait]
impl LiquidityProbe for MockLiquidityProbe {
    async fn probe(&self, _mint: &str) -> Result<Option<LiquiditySnapshot>, LookupError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_ledger_records_calls() {
        let ledger = MockLedger::new().with_supply(
            "mint1",
            TokenSupply {
                amount: 100,
                decimals: 0,
            },
        );
        let supply = ledger.get_token_supply("mint1").await.unwrap();
        assert_eq!(supply.amount, 100);
        assert_eq!(ledger.calls(), vec!["get_token_supply:mint1"]);
    }

    #[tokio::test]
    async fn test_mock_ledger_pagination() {
        let sigs: Vec<SignatureInfo> = (0..5)
            .map(|i| SignatureInfo {
                signature: format!("sig{}", i),
                block_time: Some(i),
                failed: false,
            })
            .collect();
        let ledger = MockLedger::new().with_signatures("wallet", sigs);

        let page1 = ledger
            .get_signatures_for_address("wallet", 2, None)
            .await
            .unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].signature, "sig0");

        let page2 = ledger
            .get_signatures_for_address("wallet", 2, Some("sig1"))
            .await
            .unwrap();
        assert_eq!(page2[0].signature, "sig2");
    }

    #[tokio::test]
    async fn test_mock_ledger_too_many_holders() {
        let ledger = MockLedger::new().with_too_many_holders("bigmint");
        let result = ledger.get_largest_token_accounts("bigmint").await;
        assert!(matches!(result, Err(LedgerError::TooManyHolders(_))));
    }

    #[tokio::test]
    async fn test_mock_ledger_failure_injection() {
        let ledger = MockLedger::new().with_failure("wallet", LedgerError::RateLimited);
        let result = ledger.get_signatures_for_address("wallet", 10, None).await;
        assert!(matches!(result, Err(LedgerError::RateLimited)));
    }
}

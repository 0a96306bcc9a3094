//! Ledger Data Gateway port.
//!
//! The engine consumes ledger primitives through this trait and never talks
//! to an RPC endpoint directly, so every analysis component can run against
//! the mock gateway in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use thiserror::Error;

/// Common result type for gateway operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error taxonomy for gateway calls.
///
/// Only `RateLimited` and `Timeout` are transient; everything else
/// indicates a non-retryable condition and propagates immediately.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum LedgerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by RPC provider")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    /// The holder set exceeds what the largest-accounts primitive supports.
    /// Cluster analysis is unsuitable for such tokens; the rest of the
    /// audit continues.
    #[error("Token {0} has too many holders for largest-accounts analysis")]
    TooManyHolders(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl LedgerError {
    /// Whether the executor should retry this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::RateLimited | LedgerError::Timeout)
    }
}

/// Reject malformed addresses before any gateway call is made.
pub fn validate_address(address: &str) -> LedgerResult<()> {
    if address.trim().is_empty() {
        return Err(LedgerError::InvalidAddress("empty address".to_string()));
    }
    Pubkey::from_str(address)
        .map(|_| ())
        .map_err(|e| LedgerError::InvalidAddress(format!("{}: {}", address, e)))
}

/// Parsed state of an arbitrary account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountState {
    /// Program that owns the account.
    pub owner_program: String,
    pub lamports: u64,
    /// Owner wallet, when the account parses as an SPL token account.
    pub token_account_owner: Option<String>,
}

/// Mint account facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintState {
    pub mint: String,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    /// Supply in base units.
    pub supply: u64,
    pub decimals: u8,
}

impl MintState {
    pub fn mint_authority_active(&self) -> bool {
        self.mint_authority.is_some()
    }

    pub fn freeze_authority_active(&self) -> bool {
        self.freeze_authority.is_some()
    }
}

/// One entry of the largest-accounts list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAccountBalance {
    /// Token account address (not the owner wallet).
    pub address: String,
    /// Balance in base units.
    pub amount: u64,
    /// Balance adjusted for decimals.
    pub ui_amount: f64,
}

/// One entry of a signature listing, newest first as returned by the RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub block_time: Option<i64>,
    /// The transaction failed on chain.
    pub failed: bool,
}

/// Token supply snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenSupply {
    /// Supply in base units.
    pub amount: u64,
    pub decimals: u8,
}

impl TokenSupply {
    /// Supply adjusted for decimals.
    pub fn ui_amount(&self) -> f64 {
        self.amount as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// A single instruction of a parsed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedInstruction {
    pub program_id: String,
    /// Parsed instruction type, e.g. "initializeMint" or "transfer",
    /// when the RPC could decode it.
    pub kind: Option<String>,
    /// Account addresses referenced by the instruction, in order.
    pub accounts: Vec<String>,
    /// Parsed info blob for decoded instructions.
    #[serde(default)]
    pub info: serde_json::Value,
}

/// A transaction with parsed instructions and balance deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub signature: String,
    pub block_time: Option<i64>,
    /// All account keys; index 0 is the fee payer.
    pub account_keys: Vec<String>,
    /// Subset of account_keys that signed.
    pub signers: Vec<String>,
    /// Lamport balances before execution, aligned with account_keys.
    pub pre_balances: Vec<u64>,
    /// Lamport balances after execution, aligned with account_keys.
    pub post_balances: Vec<u64>,
    pub instructions: Vec<ParsedInstruction>,
    pub failed: bool,
}

impl ParsedTransaction {
    pub fn fee_payer(&self) -> Option<&str> {
        self.account_keys.first().map(|k| k.as_str())
    }

    pub fn first_signer(&self) -> Option<&str> {
        self.signers.first().map(|k| k.as_str())
    }

    /// Lamport delta for one account across this transaction.
    pub fn balance_delta(&self, address: &str) -> Option<i128> {
        let idx = self.account_keys.iter().position(|k| k == address)?;
        let pre = *self.pre_balances.get(idx)? as i128;
        let post = *self.post_balances.get(idx)? as i128;
        Some(post - pre)
    }
}

/// Read-only ledger primitives the engine consumes.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Parsed account state, `None` when the account does not exist.
    async fn get_account_state(&self, address: &str) -> LedgerResult<Option<AccountState>>;

    /// Mint account state; `NotFound` when the mint does not exist.
    async fn get_mint_state(&self, mint: &str) -> LedgerResult<MintState>;

    /// Largest token accounts, descending by balance; `TooManyHolders` when
    /// the holder set exceeds what this primitive supports.
    async fn get_largest_token_accounts(
        &self,
        mint: &str,
    ) -> LedgerResult<Vec<TokenAccountBalance>>;

    /// Signatures touching `address`, newest first, optionally paged with
    /// `before`.
    async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> LedgerResult<Vec<SignatureInfo>>;

    /// Parsed transaction, `None` when the signature is unknown.
    async fn get_parsed_transaction(
        &self,
        signature: &str,
    ) -> LedgerResult<Option<ParsedTransaction>>;

    async fn get_token_supply(&self, mint: &str) -> LedgerResult<TokenSupply>;
}

//! Solana JSON-RPC implementation of the ledger gateway.
//!
//! Thin, single-attempt client: it maps HTTP and RPC failures onto the
//! gateway error taxonomy and leaves retry, pacing, and concurrency to the
//! fetch executor that wraps every call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::ports::ledger::{
    AccountState, LedgerError, LedgerGateway, LedgerResult, MintState, ParsedInstruction,
    ParsedTransaction, SignatureInfo, TokenAccountBalance, TokenSupply,
};

use super::types::{
    AccountData, AccountInfoResult, AccountInfoValue, LargestAccountsResult, RpcResponse,
    SignatureEntry, SupplyResult, TransactionResult,
};

/// Gateway endpoint settings.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub rpc_url: String,
    /// Commitment level passed on every call.
    pub commitment: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RpcConfig {
    pub fn with_rpc_url(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }
}

/// Ledger gateway over Solana JSON-RPC.
#[derive(Debug, Clone)]
pub struct SolanaRpcGateway {
    config: RpcConfig,
    http: Client,
}

impl SolanaRpcGateway {
    pub fn new(config: RpcConfig) -> LedgerResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LedgerError::Http(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    /// One JSON-RPC call. `Ok(None)` means the RPC returned a null result.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> LedgerResult<Option<T>> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Timeout
                } else {
                    LedgerError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LedgerError::RateLimited);
        }
        if status.is_server_error() {
            return Err(LedgerError::Rpc(format!("server error: {}", status)));
        }
        if !status.is_success() {
            return Err(LedgerError::Http(format!("unexpected status: {}", status)));
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Parse(e.to_string()))?;

        if let Some(err) = envelope.error {
            return Err(LedgerError::Rpc(format!("{} ({})", err.message, err.code)));
        }
        Ok(envelope.result)
    }
}

#[async_trait]
impl LedgerGateway for SolanaRpcGateway {
    async fn get_account_state(&self, address: &str) -> LedgerResult<Option<AccountState>> {
        let result: Option<AccountInfoResult> = self
            .call(
                "getAccountInfo",
                json!([address, {
                    "encoding": "jsonParsed",
                    "commitment": self.config.commitment,
                }]),
            )
            .await?;

        Ok(result
            .and_then(|r| r.value)
            .map(account_state_from_value))
    }

    async fn get_mint_state(&self, mint: &str) -> LedgerResult<MintState> {
        let result: Option<AccountInfoResult> = self
            .call(
                "getAccountInfo",
                json!([mint, {
                    "encoding": "jsonParsed",
                    "commitment": self.config.commitment,
                }]),
            )
            .await?;

        let value = result
            .and_then(|r| r.value)
            .ok_or_else(|| LedgerError::NotFound(mint.to_string()))?;
        mint_state_from_value(mint, value)
    }

    async fn get_largest_token_accounts(
        &self,
        mint: &str,
    ) -> LedgerResult<Vec<TokenAccountBalance>> {
        let result: Result<Option<LargestAccountsResult>, LedgerError> = self
            .call(
                "getTokenLargestAccounts",
                json!([mint, { "commitment": self.config.commitment }]),
            )
            .await;

        let result = match result {
            Err(LedgerError::Rpc(message)) if is_holder_overflow(&message) => {
                return Err(LedgerError::TooManyHolders(mint.to_string()));
            }
            other => other?,
        };

        let entries = result.map(|r| r.value).unwrap_or_default();
        entries
            .into_iter()
            .map(|entry| {
                let amount = parse_base_units(&entry.amount)?;
                let ui_amount = entry
                    .ui_amount
                    .unwrap_or_else(|| amount as f64 / 10f64.powi(entry.decimals as i32));
                Ok(TokenAccountBalance {
                    address: entry.address,
                    amount,
                    ui_amount,
                })
            })
            .collect()
    }

    async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> LedgerResult<Vec<SignatureInfo>> {
        let mut options = json!({
            "limit": limit,
            "commitment": self.config.commitment,
        });
        if let Some(before) = before {
            options["before"] = json!(before);
        }

        let result: Option<Vec<SignatureEntry>> = self
            .call("getSignaturesForAddress", json!([address, options]))
            .await?;

        Ok(result
            .unwrap_or_default()
            .into_iter()
            .map(|entry| SignatureInfo {
                signature: entry.signature,
                block_time: entry.block_time,
                failed: entry.err.is_some(),
            })
            .collect())
    }

    async fn get_parsed_transaction(
        &self,
        signature: &str,
    ) -> LedgerResult<Option<ParsedTransaction>> {
        let result: Option<TransactionResult> = self
            .call(
                "getTransaction",
                json!([signature, {
                    "encoding": "jsonParsed",
                    "commitment": self.config.commitment,
                    "maxSupportedTransactionVersion": 0,
                }]),
            )
            .await?;

        Ok(result.map(|r| transaction_from_result(signature, r)))
    }

    async fn get_token_supply(&self, mint: &str) -> LedgerResult<TokenSupply> {
        let result: Option<SupplyResult> = self
            .call(
                "getTokenSupply",
                json!([mint, { "commitment": self.config.commitment }]),
            )
            .await?;

        let value = result
            .map(|r| r.value)
            .ok_or_else(|| LedgerError::NotFound(mint.to_string()))?;
        Ok(TokenSupply {
            amount: parse_base_units(&value.amount)?,
            decimals: value.decimals,
        })
    }
}

/// RPC refuses `getTokenLargestAccounts` for tokens with very large holder
/// sets; providers phrase the error differently.
fn is_holder_overflow(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("too large") || lower.contains("exceed") || lower.contains("too many")
}

fn parse_base_units(amount: &str) -> LedgerResult<u64> {
    amount
        .parse::<u64>()
        .map_err(|e| LedgerError::Parse(format!("bad base-unit amount {:?}: {}", amount, e)))
}

fn account_state_from_value(value: AccountInfoValue) -> AccountState {
    let token_account_owner = match &value.data {
        AccountData::Parsed(parsed)
            if parsed.program == "spl-token" && parsed.parsed.account_type == "account" =>
        {
            parsed
                .parsed
                .info
                .get("owner")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        }
        _ => None,
    };

    AccountState {
        owner_program: value.owner,
        lamports: value.lamports,
        token_account_owner,
    }
}

fn mint_state_from_value(mint: &str, value: AccountInfoValue) -> LedgerResult<MintState> {
    let parsed = match value.data {
        AccountData::Parsed(parsed) => parsed,
        AccountData::Raw(_) => {
            return Err(LedgerError::Parse(format!(
                "account {} is not parseable as a token account",
                mint
            )))
        }
    };
    if parsed.parsed.account_type != "mint" {
        return Err(LedgerError::NotFound(format!(
            "{} is a {} account, not a mint",
            mint, parsed.parsed.account_type
        )));
    }

    let info = parsed.parsed.info;
    let supply = info
        .get("supply")
        .and_then(|v| v.as_str())
        .ok_or_else(|| LedgerError::Parse(format!("mint {} has no supply field", mint)))
        .and_then(parse_base_units)?;
    let decimals = info
        .get("decimals")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| LedgerError::Parse(format!("mint {} has no decimals field", mint)))?
        as u8;

    Ok(MintState {
        mint: mint.to_string(),
        mint_authority: info
            .get("mintAuthority")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        freeze_authority: info
            .get("freezeAuthority")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        supply,
        decimals,
    })
}

fn transaction_from_result(signature: &str, result: TransactionResult) -> ParsedTransaction {
    let message = result.transaction.message;
    let account_keys: Vec<String> = message
        .account_keys
        .iter()
        .map(|k| k.pubkey.clone())
        .collect();
    let signers: Vec<String> = message
        .account_keys
        .iter()
        .filter(|k| k.signer)
        .map(|k| k.pubkey.clone())
        .collect();

    let instructions: Vec<ParsedInstruction> = message
        .instructions
        .into_iter()
        .map(|ix| {
            let kind = ix
                .parsed
                .get("type")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let info = ix.parsed.get("info").cloned().unwrap_or(serde_json::Value::Null);
            ParsedInstruction {
                program_id: ix.program_id,
                kind,
                accounts: ix.accounts,
                info,
            }
        })
        .collect();

    let (failed, pre_balances, post_balances) = match result.meta {
        Some(meta) => (meta.err.is_some(), meta.pre_balances, meta.post_balances),
        None => (false, Vec::new(), Vec::new()),
    };

    ParsedTransaction {
        signature: signature.to_string(),
        block_time: result.block_time,
        account_keys,
        signers,
        pre_balances,
        post_balances,
        instructions,
        failed,
    }
}

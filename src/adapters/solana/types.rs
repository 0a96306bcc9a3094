//! Wire types for the Solana JSON-RPC gateway.
//!
//! Only the fields the engine reads are modeled; everything else the RPC
//! returns is ignored by serde. Parsed-account payloads keep their `info`
//! blob as raw JSON because the shape varies by owning program.

use serde::Deserialize;

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

/// `getAccountInfo` result.
#[derive(Debug, Deserialize)]
pub struct AccountInfoResult {
    pub value: Option<AccountInfoValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoValue {
    pub lamports: u64,
    pub owner: String,
    pub data: AccountData,
}

/// jsonParsed encoding yields an object; accounts the RPC cannot parse come
/// back as `[base64, encoding]` arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AccountData {
    Parsed(ParsedAccountData),
    Raw(serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub struct ParsedAccountData {
    pub program: String,
    pub parsed: ParsedAccount,
}

#[derive(Debug, Deserialize)]
pub struct ParsedAccount {
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub info: serde_json::Value,
}

/// `getTokenLargestAccounts` result.
#[derive(Debug, Deserialize)]
pub struct LargestAccountsResult {
    pub value: Vec<LargestAccountEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestAccountEntry {
    pub address: String,
    /// Base-unit amount, as a decimal string.
    pub amount: String,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
}

/// One entry of a `getSignaturesForAddress` result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEntry {
    pub signature: String,
    pub block_time: Option<i64>,
    /// Present when the transaction failed on chain.
    pub err: Option<serde_json::Value>,
}

/// `getTokenSupply` result.
#[derive(Debug, Deserialize)]
pub struct SupplyResult {
    pub value: SupplyValue,
}

#[derive(Debug, Deserialize)]
pub struct SupplyValue {
    pub amount: String,
    pub decimals: u8,
}

/// `getTransaction` result with jsonParsed encoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub block_time: Option<i64>,
    pub meta: Option<TransactionMeta>,
    pub transaction: TransactionBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub pre_balances: Vec<u64>,
    #[serde(default)]
    pub post_balances: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionBody {
    pub message: TransactionMessage,
    #[serde(default)]
    pub signatures: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    pub account_keys: Vec<AccountKeyEntry>,
    #[serde(default)]
    pub instructions: Vec<InstructionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AccountKeyEntry {
    pub pubkey: String,
    #[serde(default)]
    pub signer: bool,
}

/// jsonParsed instruction. Decoded instructions carry a `parsed` object
/// with `type` and `info`; undecoded ones carry raw `accounts`/`data`, and
/// the memo program puts a bare string under `parsed`, so the field stays
/// raw JSON here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionEntry {
    pub program_id: String,
    #[serde(default)]
    pub parsed: serde_json::Value,
    #[serde(default)]
    pub accounts: Vec<String>,
}

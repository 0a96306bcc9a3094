//! Solana JSON-RPC ledger gateway.

pub mod rpc;
pub mod types;

pub use rpc::{RpcConfig, SolanaRpcGateway};

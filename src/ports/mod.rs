//! Port traits and shared models.
//!
//! The seams between the engine and the outside world: the ledger gateway
//! plus the optional best-effort lookups, with mocks for tests.

pub mod ledger;
pub mod lookup;
pub mod mocks;

pub use ledger::{
    validate_address, AccountState, LedgerError, LedgerGateway, LedgerResult, MintState,
    ParsedInstruction, ParsedTransaction, SignatureInfo, TokenAccountBalance, TokenSupply,
};
pub use lookup::{
    CreatorLookup, LiquidityProbe, LiquiditySnapshot, LookupError, MetadataLookup, TokenDisplay,
};

//! Well-known program and platform addresses.
//!
//! Protocol-level constants, not configuration: these identify programs and
//! the shared-launch platform, and are the same on every mainnet deployment.
//! Environment-specific allowlists (exchanges, mixers) live in
//! `known_entities` and are injected instead.

/// SPL Token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// System program (native SOL transfers).
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Pump.fun bonding-curve program: the shared-launch platform.
pub const SHARED_LAUNCH_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

/// Pump.fun shared mint authority. Held on every token the platform
/// launches, so it identifies the platform, never the human deployer.
pub const SHARED_LAUNCH_MINT_AUTHORITY: &str = "TSLvdd1pWpHVjahSpsvCXUbgwsL3JAcvokwaKt1eokM";

/// Parsed instruction types that initialize a new mint.
pub const MINT_INIT_INSTRUCTIONS: &[&str] = &["initializeMint", "initializeMint2"];

pub fn is_token_program(program_id: &str) -> bool {
    program_id == TOKEN_PROGRAM_ID
}

pub fn is_system_program(program_id: &str) -> bool {
    program_id == SYSTEM_PROGRAM_ID
}

pub fn is_shared_launch_program(program_id: &str) -> bool {
    program_id == SHARED_LAUNCH_PROGRAM_ID
}

pub fn is_shared_launch_authority(address: &str) -> bool {
    address == SHARED_LAUNCH_MINT_AUTHORITY
}

pub fn is_mint_init_instruction(kind: &str) -> bool {
    MINT_INIT_INSTRUCTIONS.contains(&kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_checks() {
        assert!(is_token_program(TOKEN_PROGRAM_ID));
        assert!(is_system_program(SYSTEM_PROGRAM_ID));
        assert!(is_shared_launch_program(SHARED_LAUNCH_PROGRAM_ID));
        assert!(!is_shared_launch_program(TOKEN_PROGRAM_ID));
    }

    #[test]
    fn test_known_addresses_decode_to_32_bytes() {
        for addr in [
            TOKEN_PROGRAM_ID,
            SYSTEM_PROGRAM_ID,
            SHARED_LAUNCH_PROGRAM_ID,
            SHARED_LAUNCH_MINT_AUTHORITY,
        ] {
            assert_eq!(bs58::decode(addr).into_vec().unwrap().len(), 32, "{}", addr);
        }
    }

    #[test]
    fn test_mint_init_instructions() {
        assert!(is_mint_init_instruction("initializeMint"));
        assert!(is_mint_init_instruction("initializeMint2"));
        assert!(!is_mint_init_instruction("transfer"));
    }
}

//! # Protocol Configuration & Constants
//!
//! Every magic number in SIGNET lives here. Network identifiers, address
//! prefixes, cryptographic parameter sizes, and the domain-separation
//! context strings that keep the protocol's hash derivations from ever
//! colliding with each other.
//!
//! These values define the identity of the network. An account address is
//! a pure function of (factory, token, network, salt) — change any
//! constant that feeds that derivation and every counterfactual address
//! on the network silently moves. Treat edits here accordingly.

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Mainnet — the real deal. Mistakes here cost real money.
pub const NETWORK_ID_MAINNET: u32 = 0x5349474E; // "SIGN" in ASCII hex.

/// Testnet — where we break things on purpose and call it "testing."
pub const NETWORK_ID_TESTNET: u32 = 0x53494754; // "SIGT"

/// Devnet — reset weekly, no promises, no survivors.
pub const NETWORK_ID_DEVNET: u32 = 0x53494744; // "SIGD"

/// Human-readable network prefixes for addresses.
/// Bech32 HRP values — short enough to type, long enough to be unambiguous.
pub const MAINNET_HRP: &str = "signet";
pub const TESTNET_HRP: &str = "tsignet";
pub const DEVNET_HRP: &str = "dsignet";

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Protocol fingerprint for identification in records and handshakes.
pub const PROTOCOL_FINGERPRINT: &str = "ALAS-SIGNET-2026";

/// Major version — bump on breaking changes to the derivation scheme.
pub const PROTOCOL_VERSION_MAJOR: u16 = 0;

/// Minor version — bump on backward-compatible additions.
pub const PROTOCOL_VERSION_MINOR: u16 = 1;

/// The full version string, assembled once so nothing allocates for it.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 — deterministic signatures, no k-value footguns.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Ed25519 secret keys are 32 bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Public (verifying) key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes. If yours isn't, something
/// has gone terribly wrong.
pub const SIGNATURE_LENGTH: usize = 64;

/// The hash function behind every address and digest in SIGNET.
pub const PRIMARY_HASH_FUNCTION: &str = "BLAKE3";

/// Hash output length in bytes. BLAKE3 produces 32-byte digests.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Address payload length in bytes — a full BLAKE3 digest. We don't
/// truncate: 32 bytes of collision resistance is the whole point.
pub const ADDRESS_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Domain-Separation Contexts
// ---------------------------------------------------------------------------
//
// Each distinct derivation in the protocol gets its own BLAKE3 derive_key
// context. Same input bytes, different context, unrelated output — which
// is exactly what keeps an account salt from masquerading as an operation
// digest. Never reuse a context for a new purpose; mint a new one.

/// Salt derivation for bound accounts: (factory, token, network, entropy).
pub const DOMAIN_ACCOUNT_SALT: &str = "signet-account-salt-v1";

/// Deterministic account address derivation: (factory, token, network, salt).
pub const DOMAIN_ACCOUNT_ADDRESS: &str = "signet-account-address-v1";

/// Digests of authorization requests submitted to bound accounts.
pub const DOMAIN_OPERATION: &str = "signet-operation-v1";

/// Module identifiers, derived from human-readable module names.
pub const DOMAIN_MODULE_ID: &str = "signet-module-v1";

/// Digests of signed module install/uninstall requests.
pub const DOMAIN_MODULE_REQUEST: &str = "signet-module-request-v1";

/// Implementation code hashes behind the upgrade indirection.
pub const DOMAIN_IMPLEMENTATION: &str = "signet-implementation-v1";

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// The smallest denomination of value forwarded to bound accounts.
/// 8 decimals, same as Bitcoin. We're not reinventing this wheel.
pub const VALUE_DECIMALS: u8 = 8;

/// Upper bound on the factory's configurable mint fee, in grains.
/// A factory asking for more than this is misconfigured, not ambitious.
pub const MAX_MINT_FEE_GRAINS: u64 = 100_000_000;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Returns the human-readable prefix for a given network ID.
/// Returns `None` for unrecognized networks — we don't guess.
pub fn hrp_for_network(network_id: u32) -> Option<&'static str> {
    match network_id {
        NETWORK_ID_MAINNET => Some(MAINNET_HRP),
        NETWORK_ID_TESTNET => Some(TESTNET_HRP),
        NETWORK_ID_DEVNET => Some(DEVNET_HRP),
        _ => None,
    }
}

/// Returns a friendly name for a network ID, mainly for logging.
/// Unknown networks get a hex dump because we're helpful like that.
pub fn network_name(network_id: u32) -> String {
    match network_id {
        NETWORK_ID_MAINNET => "mainnet".to_string(),
        NETWORK_ID_TESTNET => "testnet".to_string(),
        NETWORK_ID_DEVNET => "devnet".to_string(),
        other => format!("unknown(0x{:08X})", other),
    }
}

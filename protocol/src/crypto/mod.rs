//! # Cryptographic Primitives for SIGNET
//!
//! Everything security-relevant in the protocol flows through this module:
//! key generation, signing, signature-envelope recovery, and hashing.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **Ed25519** for signatures — fast, deterministic, and nobody has
//!   broken it.
//! - **BLAKE3** for hashing — with `derive_key` domain separation on
//!   every protocol derivation, because "same hash function, different
//!   purpose" is how collisions become exploits.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. If you're tempted to optimize these functions,
//! reconsider, then go read about timing attacks and come back when
//! you've lost the urge.

pub mod hash;
pub mod keys;
pub mod signatures;

// Re-export the things people actually need so they don't have to memorize
// our module hierarchy.
pub use hash::{blake3_hash, domain_hash, hash_parts};
pub use keys::{SignetKeypair, SignetPublicKey, SignetSignature};
pub use signatures::{recover_signer, SignedAuthorization};

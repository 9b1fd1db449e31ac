//! # Identity Module
//!
//! One address format for everything in SIGNET. An address is a 32-byte
//! BLAKE3 digest rendered as a Bech32 string with the `signet` prefix —
//! human-readable, checksummed, hard to fat-finger.
//!
//! What the digest is a hash *of* depends on who owns the address:
//!
//! 1. **Signer addresses** — BLAKE3 of an Ed25519 public key. These are
//!    the addresses that hold tokens and sign authorization requests.
//! 2. **Account addresses** — the domain-separated derivation over
//!    (factory, token id, network, salt) computed by the contracts
//!    layer. These exist before any code is deployed at them; the whole
//!    point is that they are computable counterfactually.
//!
//! Both kinds are indistinguishable on the wire, which is deliberate:
//! a bound account can own tokens (and therefore other bound accounts)
//! exactly like a human signer can.

pub mod address;

pub use address::{AddressError, SignetAddress};

// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SIGNET Protocol — Core Primitives
//!
//! SIGNET binds a tradable, unique token to a deterministically derived
//! modular account: whoever holds the token controls the account, full stop.
//! This crate is the substrate that makes that binding enforceable — the
//! key material, the hashing, and the address scheme that the contracts
//! layer builds on.
//!
//! The stack is deliberately boring:
//!
//! - **Ed25519** for signatures — deterministic, fast, unbroken.
//! - **BLAKE3** for hashing — domain-separated everywhere, because an
//!   address derivation and an operation digest must never collide.
//! - **Bech32** for addresses — checksummed and hard to fat-finger.
//!
//! ## Architecture
//!
//! - **config** — Network identifiers, parameter sizes, domain tags.
//!   Every magic number lives there.
//! - **crypto** — Keypairs, signature envelopes, hashing. Thin wrappers
//!   over audited implementations; we do not roll our own.
//! - **identity** — The `SignetAddress` type: one address format for
//!   signers (derived from a public key) and for bound accounts (derived
//!   from factory + token + salt).
//!
//! The account-binding state machines — factory, registry, ownership
//! validator, transfer guard — live in the `signet-contracts` crate.

pub mod config;
pub mod crypto;
pub mod identity;

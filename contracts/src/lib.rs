//! # SIGNET Contracts — Token-Bound Modular Accounts
//!
//! The account-binding core of SIGNET: every unique token minted through
//! the factory controls exactly one deterministically-addressed modular
//! account, and holding the token is the *only* source of authority over
//! that account. Sell the token, sell the account — along with whatever
//! it holds.
//!
//! The moving parts:
//!
//! - **Account Factory** — atomic mint + deploy + initialize; computes
//!   the deterministic account address, enforces the self-transfer lock,
//!   and resets modules on every ownership change.
//! - **Address Registry** — the bijective token ↔ account mapping, with
//!   deployment status and persisted addresses for deployers that cannot
//!   promise a predictable one.
//! - **Ownership Validator** — the one permanent module on every bound
//!   account. Authorizes operations and signatures only for the *current*
//!   token owner, read live at validation time.
//! - **Transfer Guard** — the synchronous pre/post hooks on the transfer
//!   path: reject self-referential destinations, wipe the module set down
//!   to validator-only state.
//!
//! ## Design Principles
//!
//! 1. Deterministic addresses are pure functions — the same inputs give
//!    the same address before, during, and after deployment.
//! 2. Ownership is never cached. The validator re-reads the token ledger
//!    on every authorization, which is what closes the race between a
//!    request being signed and being executed.
//! 3. State transitions are atomic: every fallible step runs before the
//!    first mutation, so a failed operation leaves nothing behind.
//! 4. Rejecting an unauthorized request is routine behavior, not a fault:
//!    validation returns outcome enums, errors are reserved for broken
//!    operations.

pub mod account_deployer;
pub mod account_factory;
pub mod address_registry;
pub mod bound_account;
pub mod derivation;
pub mod events;
pub mod metadata;
pub mod ownership_validator;
pub mod token_ledger;
pub mod transfer_guard;

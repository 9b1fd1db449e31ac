//! # Address Registry
//!
//! The bidirectional token ↔ account mapping. One entry per minted token,
//! created at mint time, and the (token, address) pair is frozen at
//! creation — the only field that ever changes is the `deployed` flag,
//! which flips false → true at most once.
//!
//! The registry also serves a subtler purpose: when an external deployer
//! cannot promise a predictable address, the factory persists whatever
//! address it actually produced here, so `address_of` stays deterministic
//! from the caller's point of view even when the derivation alone would
//! not have predicted it.
//!
//! The registry is exclusively owned and mutated by the account factory;
//! nothing else holds a `&mut` to it.

use serde::{Deserialize, Serialize};
use signet_protocol::identity::SignetAddress;
use std::collections::HashMap;
use thiserror::Error;

use crate::token_ledger::TokenId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Lookup on a token id that was never minted.
    #[error("invalid token id: {0} was never minted")]
    InvalidTokenId(TokenId),

    /// Reverse lookup on an address no token is bound to.
    #[error("no token is bound to address {0}")]
    NotFound(SignetAddress),

    /// A second entry was recorded for an already-registered token.
    #[error("token {0} already has a registered account")]
    TokenAlreadyRegistered(TokenId),

    /// The address is already bound to a different token. Recording it
    /// again would break the bijection.
    #[error("address {address} is already bound to token {existing}")]
    AddressCollision {
        /// The address that collided.
        address: SignetAddress,
        /// The token it is already bound to.
        existing: TokenId,
    },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One token's binding: which account it controls, and whether code has
/// been produced there yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// The controlling token.
    pub token_id: TokenId,
    /// The bound account's address. Never changes after creation.
    pub address: SignetAddress,
    /// Whether the account has been deployed. Flips false → true once.
    pub deployed: bool,
}

/// The token ↔ account registry for one factory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressRegistry {
    /// Forward map: token id → entry.
    by_token: HashMap<TokenId, RegistryEntry>,
    /// Reverse index: account address → token id.
    by_address: HashMap<SignetAddress, TokenId>,
}

impl AddressRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fresh (token, address) binding with `deployed = false`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TokenAlreadyRegistered`] if the token
    /// already has an entry, or [`RegistryError::AddressCollision`] if
    /// the address is already bound to another token. Either would break
    /// the bijection, so neither mutates anything.
    pub fn record(&mut self, token_id: TokenId, address: SignetAddress) -> Result<(), RegistryError> {
        if self.by_token.contains_key(&token_id) {
            return Err(RegistryError::TokenAlreadyRegistered(token_id));
        }
        if let Some(&existing) = self.by_address.get(&address) {
            return Err(RegistryError::AddressCollision { address, existing });
        }

        self.by_token.insert(
            token_id,
            RegistryEntry {
                token_id,
                address,
                deployed: false,
            },
        );
        self.by_address.insert(address, token_id);
        Ok(())
    }

    /// Marks the token's account as deployed. Idempotent: returns `true`
    /// if this call performed the flip, `false` if it was already set.
    pub fn mark_deployed(&mut self, token_id: TokenId) -> Result<bool, RegistryError> {
        let entry = self
            .by_token
            .get_mut(&token_id)
            .ok_or(RegistryError::InvalidTokenId(token_id))?;
        let flipped = !entry.deployed;
        entry.deployed = true;
        Ok(flipped)
    }

    /// The bound account address for `token_id`. Identical before and
    /// after deployment.
    pub fn address_of(&self, token_id: TokenId) -> Result<SignetAddress, RegistryError> {
        self.by_token
            .get(&token_id)
            .map(|e| e.address)
            .ok_or(RegistryError::InvalidTokenId(token_id))
    }

    /// Reverse lookup: the token bound to `address`.
    pub fn token_of(&self, address: &SignetAddress) -> Result<TokenId, RegistryError> {
        self.by_address
            .get(address)
            .copied()
            .ok_or(RegistryError::NotFound(*address))
    }

    /// Whether the token's account has been deployed.
    pub fn is_deployed(&self, token_id: TokenId) -> Result<bool, RegistryError> {
        self.by_token
            .get(&token_id)
            .map(|e| e.deployed)
            .ok_or(RegistryError::InvalidTokenId(token_id))
    }

    /// The full entry for a token, if one exists.
    pub fn entry(&self, token_id: TokenId) -> Option<&RegistryEntry> {
        self.by_token.get(&token_id)
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    /// Whether the registry has no bindings.
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

//! # Token Ledger — The Ownership Collaborator
//!
//! The factory's view of "who currently owns token N". The generic
//! transfer/approval machinery of a full token standard is out of scope
//! for this core; what the binding logic actually needs is narrow enough
//! to fit in one trait: the collection's identity, and a live owner
//! lookup. [`OwnershipSource`] is that trait, and everything downstream
//! of it — operation validation above all — depends on the lookup being
//! *live*, never a cached snapshot.
//!
//! [`TokenLedger`] is the minimal in-memory implementation. In production
//! this state belongs to the external ownership engine; the in-memory
//! representation here backs the validation logic and the test suites,
//! and its mutating surface is deliberately `pub(crate)` so that every
//! ownership change flows through the factory's transfer pipeline (where
//! the guard hooks run) rather than around it.

use serde::{Deserialize, Serialize};
use signet_protocol::identity::SignetAddress;
use std::collections::HashMap;
use thiserror::Error;

/// Unique identifier for a controlling token. Allocated sequentially by
/// the factory's ledger, starting at 1.
pub type TokenId = u64;

/// Errors from ledger bookkeeping.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The referenced token was never minted.
    #[error("unknown token id: {0}")]
    UnknownToken(TokenId),
}

/// Live read access to token ownership.
///
/// The ownership validator takes this as `&dyn OwnershipSource` at
/// validation time so that the owner it compares against is the owner
/// *now* — not at signing time, and not whatever the request claims.
pub trait OwnershipSource {
    /// The address identifying the token collection this source answers
    /// for. A validator bound to a different collection must treat this
    /// source as unable to answer.
    fn collection(&self) -> SignetAddress;

    /// The current owner of `token_id`, or `None` if it was never minted.
    fn owner_of(&self, token_id: TokenId) -> Option<SignetAddress>;
}

/// Minimal in-memory token ownership ledger for one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    /// The collection identity — in SIGNET, the factory's own address.
    collection: SignetAddress,
    /// Current owner per minted token.
    owners: HashMap<TokenId, SignetAddress>,
    /// The next token id to allocate. Ids start at 1 and never recycle.
    next_id: TokenId,
}

impl TokenLedger {
    /// Creates an empty ledger for the given collection.
    pub fn new(collection: SignetAddress) -> Self {
        Self {
            collection,
            owners: HashMap::new(),
            next_id: 1,
        }
    }

    /// The id the next mint will receive. Read-only: the factory uses
    /// this to derive the account address before committing anything.
    pub fn peek_next_id(&self) -> TokenId {
        self.next_id
    }

    /// Number of tokens minted so far.
    pub fn total_minted(&self) -> u64 {
        self.next_id - 1
    }

    /// Allocates the next token id to `owner`. Infallible by design —
    /// the factory performs it only after every fallible mint step has
    /// already passed.
    pub(crate) fn mint_to(&mut self, owner: SignetAddress) -> TokenId {
        let token_id = self.next_id;
        self.owners.insert(token_id, owner);
        self.next_id += 1;
        token_id
    }

    /// Reassigns ownership of an existing token, returning the previous
    /// owner. Callers are expected to have run the transfer guard first.
    pub(crate) fn reassign(
        &mut self,
        token_id: TokenId,
        to: SignetAddress,
    ) -> Result<SignetAddress, LedgerError> {
        let slot = self
            .owners
            .get_mut(&token_id)
            .ok_or(LedgerError::UnknownToken(token_id))?;
        let previous = *slot;
        *slot = to;
        Ok(previous)
    }
}

impl OwnershipSource for TokenLedger {
    fn collection(&self) -> SignetAddress {
        self.collection
    }

    fn owner_of(&self, token_id: TokenId) -> Option<SignetAddress> {
        self.owners.get(&token_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_protocol::crypto::SignetKeypair;

    fn addr(seed: u8) -> SignetAddress {
        SignetAddress::from_public_key(&SignetKeypair::from_seed(&[seed; 32]).public_key())
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut ledger = TokenLedger::new(addr(0));
        assert_eq!(ledger.peek_next_id(), 1);
        assert_eq!(ledger.mint_to(addr(1)), 1);
        assert_eq!(ledger.mint_to(addr(2)), 2);
        assert_eq!(ledger.peek_next_id(), 3);
        assert_eq!(ledger.total_minted(), 2);
    }

    #[test]
    fn owner_of_reflects_mint_and_reassign() {
        let mut ledger = TokenLedger::new(addr(0));
        let alice = addr(1);
        let bob = addr(2);

        let id = ledger.mint_to(alice);
        assert_eq!(ledger.owner_of(id), Some(alice));

        let previous = ledger.reassign(id, bob).unwrap();
        assert_eq!(previous, alice);
        assert_eq!(ledger.owner_of(id), Some(bob));
    }

    #[test]
    fn reassign_unknown_token_rejected() {
        let mut ledger = TokenLedger::new(addr(0));
        assert!(matches!(
            ledger.reassign(99, addr(1)),
            Err(LedgerError::UnknownToken(99))
        ));
    }

    #[test]
    fn owner_of_unminted_is_none() {
        let ledger = TokenLedger::new(addr(0));
        assert_eq!(ledger.owner_of(1), None);
    }

    #[test]
    fn collection_identity_is_stable() {
        let collection = addr(9);
        let ledger = TokenLedger::new(collection);
        assert_eq!(ledger.collection(), collection);
    }
}

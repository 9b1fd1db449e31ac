//! # Ownership Validator
//!
//! The one module every bound account carries and none may remove. It is
//! installed at deployment with an immutable binding to the controlling
//! `(collection, token id)` pair, and from then on answers exactly one
//! question: *is this request signed by whoever owns the token right
//! now?*
//!
//! "Right now" is load-bearing. A request can be signed under one owner
//! and executed under another — a transfer can land in between — so the
//! validator re-reads ownership through [`OwnershipSource`] at validation
//! time, every time. Nothing from the request itself is trusted for the
//! ownership side of the check.
//!
//! Rejections here are explicit outcomes, not errors: turning away an
//! unauthorized request is the validator doing its job.

use serde::{Deserialize, Serialize};
use signet_protocol::config::{DOMAIN_IMPLEMENTATION, DOMAIN_OPERATION};
use signet_protocol::crypto::hash::{domain_hash, hash_parts};
use signet_protocol::crypto::signatures::{recover_signer, SignedAuthorization};
use signet_protocol::identity::SignetAddress;
use std::fmt;
use thiserror::Error;

use crate::token_ledger::{OwnershipSource, TokenId};

/// Magic value returned for a positive signature verdict, in the spirit
/// of interface-selector magic constants: an accidental zero or
/// uninitialized word can never be mistaken for approval.
pub const SIGNATURE_VALID_MAGIC: u32 = 0x5347_4F4B; // "SGOK"

/// Explicit marker for a negative signature verdict.
pub const SIGNATURE_INVALID_MARKER: u32 = 0xFFFF_FFFF;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Faults in validator management. Routine validation rejections are
/// [`ValidationOutcome`] values, not errors.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Any attempt to remove the ownership validator, by any caller, at
    /// any time.
    #[error("the ownership validator cannot be uninstalled")]
    UninstallRejected,

    /// An upgrade that does not strictly supersede the current
    /// implementation version.
    #[error("proposed implementation v{proposed} does not supersede v{current}")]
    StaleImplementation {
        /// Version currently installed.
        current: u32,
        /// Version that was proposed.
        proposed: u32,
    },
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of validating an operation. Exactly one of these is returned
/// for every request; only [`Authorized`](ValidationOutcome::Authorized)
/// permits execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// The signer is the current owner of the controlling token.
    Authorized,
    /// The signature did not verify, or the supplied hash does not
    /// commit to the operation.
    SignatureInvalid,
    /// The signature is genuine, but the signer does not own the
    /// controlling token at validation time.
    NotTokenOwner,
    /// The ownership source cannot answer for this binding — wrong
    /// collection, or the token does not exist there.
    UnknownToken,
}

impl ValidationOutcome {
    /// Whether this outcome permits execution.
    pub fn is_authorized(&self) -> bool {
        matches!(self, ValidationOutcome::Authorized)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Authorized => write!(f, "authorized"),
            ValidationOutcome::SignatureInvalid => write!(f, "signature invalid"),
            ValidationOutcome::NotTokenOwner => write!(f, "signer is not the token owner"),
            ValidationOutcome::UnknownToken => write!(f, "unknown token for this binding"),
        }
    }
}

/// Verdict of standalone signature validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureVerdict {
    /// The signature is from the current token owner.
    Valid,
    /// Anything else.
    Invalid,
}

impl SignatureVerdict {
    /// The wire-level constant for this verdict: the magic value for
    /// [`Valid`](SignatureVerdict::Valid), the explicit invalid marker
    /// otherwise.
    pub fn magic(&self) -> u32 {
        match self {
            SignatureVerdict::Valid => SIGNATURE_VALID_MAGIC,
            SignatureVerdict::Invalid => SIGNATURE_INVALID_MARKER,
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// An authorization request presented to a bound account.
///
/// The payload is opaque to this core — executing it is the modular
/// execution framework's business. What the validator cares about is the
/// digest and the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// The bound account the operation targets.
    pub account: SignetAddress,
    /// Opaque call data for the account's execution framework.
    pub payload: Vec<u8>,
    /// Caller-chosen replay discriminator.
    pub nonce: u64,
    /// The signed authorization over [`digest`](Self::digest).
    pub authorization: SignedAuthorization,
}

impl Operation {
    /// The digest a signer commits to. Domain-separated over the target
    /// account, nonce, and payload (the one variable-width field, fed
    /// last).
    pub fn digest(&self) -> [u8; 32] {
        hash_parts(
            DOMAIN_OPERATION,
            &[
                self.account.digest(),
                &self.nonce.to_le_bytes(),
                &self.payload,
            ],
        )
    }
}

// ---------------------------------------------------------------------------
// Implementation indirection
// ---------------------------------------------------------------------------

/// A replaceable implementation reference: stable code hash + version.
///
/// The indirection behind factory/validator upgradeability. Swapping it
/// never touches the validator's binding — that is checked structurally
/// (the binding simply isn't part of this type) and by the version rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationRef {
    /// Domain-separated hash of the implementation code.
    pub code_hash: [u8; 32],
    /// Monotonically increasing version. Swaps must strictly increase it.
    pub version: u32,
}

impl ImplementationRef {
    /// Reference an implementation by its code bytes.
    pub fn from_code(code: &[u8], version: u32) -> Self {
        Self {
            code_hash: domain_hash(DOMAIN_IMPLEMENTATION, code),
            version,
        }
    }

    /// The version-1 reference a component starts life with.
    pub fn genesis(component: &str) -> Self {
        Self::from_code(component.as_bytes(), 1)
    }
}

impl fmt::Display for ImplementationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{} ({})", self.version, &hex::encode(self.code_hash)[..12])
    }
}

// ---------------------------------------------------------------------------
// OwnershipValidator
// ---------------------------------------------------------------------------

/// The permanent ownership-validation module of a bound account.
///
/// The binding is set exactly once, at install time, as explicit
/// constructor data — which is also what keeps collections namespaced:
/// a validator bound to factory A's collection can never be satisfied by
/// an ownership source answering for factory B.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipValidator {
    /// The controlling token's collection (the factory address).
    collection: SignetAddress,
    /// The controlling token within that collection.
    token_id: TokenId,
    /// The swappable logic reference. The binding above is *not* part
    /// of it and survives every upgrade.
    implementation: ImplementationRef,
}

impl OwnershipValidator {
    /// Install a validator bound to `(collection, token_id)`.
    pub fn install(collection: SignetAddress, token_id: TokenId) -> Self {
        Self {
            collection,
            token_id,
            implementation: ImplementationRef::genesis("ownership-validator"),
        }
    }

    /// The immutable `(collection, token id)` binding.
    pub fn controller(&self) -> (SignetAddress, TokenId) {
        (self.collection, self.token_id)
    }

    /// The current implementation reference.
    pub fn implementation(&self) -> &ImplementationRef {
        &self.implementation
    }

    /// Core authorization check shared by every validation surface:
    /// recover the signer from the envelope over `message`, then compare
    /// against the token's owner as of *now*.
    pub fn authorize(
        &self,
        owners: &dyn OwnershipSource,
        message: &[u8],
        auth: &SignedAuthorization,
    ) -> ValidationOutcome {
        let Some(signer) = recover_signer(message, auth) else {
            return ValidationOutcome::SignatureInvalid;
        };
        if owners.collection() != self.collection {
            return ValidationOutcome::UnknownToken;
        }
        let Some(owner) = owners.owner_of(self.token_id) else {
            return ValidationOutcome::UnknownToken;
        };
        if signer == owner {
            ValidationOutcome::Authorized
        } else {
            ValidationOutcome::NotTokenOwner
        }
    }

    /// Validate an operation against live token ownership.
    ///
    /// The supplied `op_hash` must commit to the operation — a hash that
    /// does not match [`Operation::digest`] is rejected outright, so a
    /// caller cannot validate one operation under another's legitimately
    /// signed hash.
    pub fn validate_operation(
        &self,
        owners: &dyn OwnershipSource,
        op: &Operation,
        op_hash: &[u8; 32],
    ) -> ValidationOutcome {
        if *op_hash != op.digest() {
            return ValidationOutcome::SignatureInvalid;
        }
        self.authorize(owners, op_hash, &op.authorization)
    }

    /// Standalone signature validation: is `auth` a signature over
    /// `hash` by `sender`, and is `sender` the current token owner?
    pub fn validate_signature(
        &self,
        owners: &dyn OwnershipSource,
        sender: &SignetAddress,
        hash: &[u8; 32],
        auth: &SignedAuthorization,
    ) -> SignatureVerdict {
        let Some(signer) = recover_signer(hash, auth) else {
            return SignatureVerdict::Invalid;
        };
        if signer != *sender {
            return SignatureVerdict::Invalid;
        }
        if self.authorize(owners, hash, auth).is_authorized() {
            SignatureVerdict::Valid
        } else {
            SignatureVerdict::Invalid
        }
    }

    /// Attempt to uninstall the validator. Always fails — this is the
    /// immutability invariant, enforced for every caller at every time.
    pub fn uninstall(&self) -> Result<(), ValidatorError> {
        Err(ValidatorError::UninstallRejected)
    }

    /// Swap the implementation reference, preserving the binding.
    ///
    /// Returns the previous reference so the caller can emit an upgrade
    /// record. The binding is untouchable by construction; the version
    /// must strictly increase.
    pub fn upgrade(
        &mut self,
        next: ImplementationRef,
    ) -> Result<ImplementationRef, ValidatorError> {
        if next.version <= self.implementation.version {
            return Err(ValidatorError::StaleImplementation {
                current: self.implementation.version,
                proposed: next.version,
            });
        }
        let previous = self.implementation;
        self.implementation = next;
        Ok(previous)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

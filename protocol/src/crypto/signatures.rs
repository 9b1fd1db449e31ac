//! # Signature Envelopes & Signer Recovery
//!
//! The signature-recovery facility behind operation validation. Ed25519
//! deliberately has no key-recovery trick (that's an ECDSA quirk), so the
//! wire form of an authorization carries the claimed public key alongside
//! the signature. "Recovery" is then verify-then-derive: check the
//! signature against the enveloped key, and only on success derive the
//! signer's address from that key.
//!
//! An attacker gains nothing from the enveloped key being self-reported:
//! substituting someone else's key makes the signature check fail, and
//! substituting their own key just recovers their own (unauthorized)
//! address. Whoever the envelope recovers to actually signed the message
//! — which is exactly the property the ownership validator needs.

use serde::{Deserialize, Serialize};

use crate::crypto::keys::{SignetKeypair, SignetPublicKey, SignetSignature};
use crate::identity::SignetAddress;

/// A signature bundled with the public key that (allegedly) produced it.
///
/// This is the unit of authorization everywhere in SIGNET: operations
/// against a bound account, module-management requests, and standalone
/// signature validation all consume one of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
    /// The claimed signer's public key. Unverified until recovery.
    pub public_key: SignetPublicKey,
    /// The Ed25519 signature over the message being authorized.
    pub signature: SignetSignature,
}

impl SignedAuthorization {
    /// Sign a message and package the result as an envelope.
    pub fn sign(keypair: &SignetKeypair, message: &[u8]) -> Self {
        Self {
            public_key: keypair.public_key(),
            signature: keypair.sign(message),
        }
    }

    /// The address this envelope *claims* to be from.
    ///
    /// No verification happens here — use [`recover_signer`] when you
    /// need the claim proven.
    pub fn claimed_signer(&self) -> SignetAddress {
        SignetAddress::from_public_key(&self.public_key)
    }
}

/// Recover the signer's address from an authorization envelope.
///
/// Returns `Some(address)` only if `signature` verifies over `message`
/// under the enveloped public key; an invalid signature recovers nobody.
/// This is the single entry point the ownership validator trusts — note
/// that it yields an *address*, never a bare "valid" flag, so callers
/// are pushed toward comparing identities rather than booleans.
pub fn recover_signer(message: &[u8], auth: &SignedAuthorization) -> Option<SignetAddress> {
    if auth.public_key.verify(message, &auth.signature) {
        Some(SignetAddress::from_public_key(&auth.public_key))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_returns_signer_address() {
        let kp = SignetKeypair::generate();
        let msg = b"authorize operation 1";
        let auth = SignedAuthorization::sign(&kp, msg);

        let recovered = recover_signer(msg, &auth).unwrap();
        assert_eq!(recovered, SignetAddress::from_public_key(&kp.public_key()));
    }

    #[test]
    fn recover_fails_on_wrong_message() {
        let kp = SignetKeypair::generate();
        let auth = SignedAuthorization::sign(&kp, b"signed this");
        assert!(recover_signer(b"but validating that", &auth).is_none());
    }

    #[test]
    fn substituted_public_key_recovers_nobody() {
        // An attacker replacing the enveloped key with their own cannot
        // make someone else's signature verify.
        let victim = SignetKeypair::generate();
        let attacker = SignetKeypair::generate();
        let msg = b"drain the account";

        let mut auth = SignedAuthorization::sign(&victim, msg);
        auth.public_key = attacker.public_key();

        assert!(recover_signer(msg, &auth).is_none());
    }

    #[test]
    fn claimed_signer_matches_recovered_signer_for_honest_envelope() {
        let kp = SignetKeypair::generate();
        let msg = b"honest message";
        let auth = SignedAuthorization::sign(&kp, msg);
        assert_eq!(auth.claimed_signer(), recover_signer(msg, &auth).unwrap());
    }

    #[test]
    fn envelope_serde_roundtrip() {
        let kp = SignetKeypair::generate();
        let auth = SignedAuthorization::sign(&kp, b"wire transport");
        let json = serde_json::to_string(&auth).unwrap();
        let restored: SignedAuthorization = serde_json::from_str(&json).unwrap();
        assert_eq!(auth, restored);
        assert!(recover_signer(b"wire transport", &restored).is_some());
    }
}

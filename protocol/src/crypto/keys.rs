//! # Key Management
//!
//! Ed25519 keypair generation and serialization for SIGNET identities.
//!
//! Everyone who can sign anything in SIGNET — a token holder authorizing
//! an operation against their bound account, a minter, a factory admin —
//! does it with an Ed25519 keypair from this module.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key generation uses OS-level RNG (`OsRng`). If your OS RNG is
//!   broken, you have bigger problems than SIGNET.
//! - Key bytes are never logged, and `Debug` never prints secret
//!   material. If you add logging to this module, you will be asked
//!   to leave.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed — leaking details
/// about key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// A SIGNET identity keypair wrapping Ed25519 signing and verification keys.
///
/// The signing key is the sole source of authority for whatever this
/// identity owns — including, transitively, any bound account whose
/// controlling token it holds.
///
/// `SignetKeypair` intentionally does NOT implement `Serialize` /
/// `Deserialize`. Serializing private keys should be a deliberate,
/// conscious act, not something that happens because a keypair ended up
/// inside a JSON response. Use [`secret_key_bytes`](Self::secret_key_bytes)
/// / [`from_seed`](Self::from_seed) explicitly.
pub struct SignetKeypair {
    signing_key: SigningKey,
}

/// The public half of a SIGNET identity, safe to share with the world.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignetPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a message.
///
/// 64 bytes, deterministic for a given (key, message) pair. Stored as
/// `Vec<u8>` for serde compatibility, but always exactly 64 bytes when
/// produced by this crate. A signature of any other length simply fails
/// verification — no panics, no undefined behavior, just `false`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignetSignature {
    bytes: Vec<u8>,
}

impl SignetKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the 32-byte secret key *is* the seed. Useful for tests
    /// and for deriving keypairs from KDF output.
    ///
    /// **Warning**: a weak seed gives a weak key. Use a proper CSPRNG or
    /// KDF to produce the seed bytes.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&arr))
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> SignetPublicKey {
        SignetPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The raw public key bytes (32 bytes). Safe to share, log, tattoo
    /// on your arm, etc.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message and return a `SignetSignature`.
    ///
    /// Ed25519 signatures are deterministic — same (key, message) pair,
    /// same signature. No nonce management, no RNG at signing time.
    pub fn sign(&self, message: &[u8]) -> SignetSignature {
        let sig = self.signing_key.sign(message);
        SignetSignature {
            bytes: sig.to_bytes().to_vec(),
        }
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &SignetSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Export the raw 32-byte secret key material.
    ///
    /// **Handle with extreme care.** This is the only secret standing
    /// between an attacker and every account controlled by tokens this
    /// identity holds.
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Clone for SignetKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for SignetKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even
        // "partially" — a partial leak is still a leak.
        write!(f, "SignetKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for SignetKeypair {
    /// Two keypairs are equal if their public keys match. Comparing
    /// secret material in a non-constant-time way is a bad habit, and
    /// for identity purposes the public key is what matters.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for SignetKeypair {}

// ---------------------------------------------------------------------------
// SignetPublicKey
// ---------------------------------------------------------------------------

impl SignetPublicKey {
    /// Create a `SignetPublicKey` from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Try to create a `SignetPublicKey` from a byte slice.
    ///
    /// Validates the length and that the bytes represent a valid Ed25519
    /// point. This catches low-order points and other degenerate cases.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise. We
    /// intentionally don't distinguish "invalid signature" from "invalid
    /// key bytes" — both are just "nope". Detailed failure oracles help
    /// attackers, not users.
    pub fn verify(&self, message: &[u8], signature: &SignetSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Hex-encoded representation. 64 characters for 32 bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse a hex-encoded public key string.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }

    /// Base58-encoded representation — more compact than hex, handy for
    /// display surfaces.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.bytes).into_string()
    }
}

impl Hash for SignetPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for SignetPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SignetPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignetPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// SignetSignature
// ---------------------------------------------------------------------------

impl SignetSignature {
    /// Create a signature from its raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// The raw signature bytes (always 64 for signatures we produced).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex-encoded signature string. 128 characters for a valid sig.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parse a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 64 {
            return Err(hex::FromHexError::OddLength);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for SignetSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SignetSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() >= 128 {
            write!(f, "SignetSignature({}...{})", &hex_str[..8], &hex_str[120..])
        } else {
            write!(f, "SignetSignature({})", hex_str)
        }
    }
}

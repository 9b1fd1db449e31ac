//! # SIGNET Addresses
//!
//! The address format used across the protocol, derived via BLAKE3
//! hashing and Bech32 encoding:
//!
//! ```text
//! payload (public key, or account derivation input)
//!     -> BLAKE3 -> 32 bytes
//!     -> Bech32("signet", digest) -> signet1qw508d6qe...
//! ```
//!
//! The `signet` human-readable prefix makes addresses immediately
//! recognizable, and Bech32's checksum detects up to 4 character errors —
//! which matters when users copy-paste an address that is about to
//! receive an account's entire forwarded value.

use crate::config::{ADDRESS_LENGTH, MAINNET_HRP};
use crate::crypto::hash::blake3_hash;
use crate::crypto::keys::SignetPublicKey;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing an address string.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The Bech32 string could not be decoded.
    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    /// The decoded address has an unexpected human-readable prefix.
    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp {
        /// The expected HRP.
        expected: String,
        /// The HRP that was actually found.
        got: String,
    },

    /// The decoded data has an unexpected length.
    #[error("invalid address data length: expected {expected} bytes, got {got}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// SignetAddress
// ---------------------------------------------------------------------------

/// A SIGNET address — 32 bytes of BLAKE3 digest behind a Bech32 string.
///
/// `Copy` on purpose: an address is a value, and the registry, the
/// factory, and the validator all pass them around constantly. Equality,
/// ordering, and hashing are over the digest alone.
///
/// # Examples
///
/// ```
/// use signet_protocol::crypto::SignetKeypair;
/// use signet_protocol::identity::SignetAddress;
///
/// let kp = SignetKeypair::generate();
/// let addr = SignetAddress::from_public_key(&kp.public_key());
/// assert!(addr.to_bech32().starts_with("signet1"));
///
/// let parsed = SignetAddress::from_bech32(&addr.to_bech32()).unwrap();
/// assert_eq!(addr, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignetAddress {
    digest: [u8; 32],
}

impl SignetAddress {
    /// Derive the address of a signer from their Ed25519 public key.
    ///
    /// The hash indirection (rather than using the raw key) keeps the
    /// address format independent of any future key-scheme change and
    /// gives account addresses and signer addresses the same shape.
    pub fn from_public_key(pk: &SignetPublicKey) -> Self {
        Self {
            digest: blake3_hash(pk.as_bytes()),
        }
    }

    /// Wrap an already-computed 32-byte digest as an address.
    ///
    /// This is how the contracts layer turns its deterministic account
    /// derivation into an address. The caller is responsible for having
    /// produced the digest under the right domain context.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self { digest }
    }

    /// Encode this address as a Bech32 string with the `signet` prefix.
    pub fn to_bech32(&self) -> String {
        let hrp = Hrp::parse(MAINNET_HRP).expect("static HRP is valid");
        bech32::encode::<Bech32>(hrp, &self.digest)
            .expect("encoding a 32-byte payload should never fail")
    }

    /// Parse a Bech32-encoded SIGNET address.
    ///
    /// Validates the HRP, checksum, and payload length.
    pub fn from_bech32(addr: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(addr).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;

        let expected_hrp = Hrp::parse(MAINNET_HRP).expect("static HRP is valid");
        if hrp != expected_hrp {
            return Err(AddressError::InvalidHrp {
                expected: MAINNET_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        let digest: [u8; 32] = data
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidDataLength {
                expected: ADDRESS_LENGTH,
                got: data.len(),
            })?;

        Ok(Self { digest })
    }

    /// The raw 32-byte digest underlying this address.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }
}

impl fmt::Display for SignetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bech32())
    }
}

impl fmt::Debug for SignetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignetAddress({})", self.to_bech32())
    }
}

impl Serialize for SignetAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_bech32())
        } else {
            serializer.serialize_bytes(&self.digest)
        }
    }
}

impl<'de> Deserialize<'de> for SignetAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            SignetAddress::from_bech32(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            let digest: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                serde::de::Error::custom(format!("expected 32-byte digest, got {}", bytes.len()))
            })?;
            Ok(SignetAddress { digest })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::SignetKeypair;

    #[test]
    fn address_starts_with_signet1() {
        let kp = SignetKeypair::generate();
        let addr = SignetAddress::from_public_key(&kp.public_key());
        assert!(
            addr.to_bech32().starts_with("signet1"),
            "address was: {}",
            addr
        );
    }

    #[test]
    fn bech32_roundtrip() {
        let kp = SignetKeypair::generate();
        let addr = SignetAddress::from_public_key(&kp.public_key());
        let parsed = SignetAddress::from_bech32(&addr.to_bech32()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn different_keys_different_addresses() {
        let a = SignetAddress::from_public_key(&SignetKeypair::generate().public_key());
        let b = SignetAddress::from_public_key(&SignetKeypair::generate().public_key());
        assert_ne!(a, b);
    }

    #[test]
    fn deterministic_address_from_same_key() {
        let kp = SignetKeypair::from_seed(&[7u8; 32]);
        let a = SignetAddress::from_public_key(&kp.public_key());
        let b = SignetAddress::from_public_key(&kp.public_key());
        assert_eq!(a, b);
    }

    #[test]
    fn from_digest_preserves_bytes() {
        let digest = [0xABu8; 32];
        let addr = SignetAddress::from_digest(digest);
        assert_eq!(addr.digest(), &digest);
    }

    #[test]
    fn invalid_hrp_rejected() {
        let hrp = Hrp::parse("btc").unwrap();
        let encoded = bech32::encode::<Bech32>(hrp, &[0u8; 32]).unwrap();
        let err = SignetAddress::from_bech32(&encoded).unwrap_err();
        assert!(matches!(err, AddressError::InvalidHrp { .. }));
    }

    #[test]
    fn wrong_payload_length_rejected() {
        let hrp = Hrp::parse(MAINNET_HRP).unwrap();
        let encoded = bech32::encode::<Bech32>(hrp, &[0u8; 20]).unwrap();
        let err = SignetAddress::from_bech32(&encoded).unwrap_err();
        assert!(matches!(err, AddressError::InvalidDataLength { .. }));
    }

    #[test]
    fn corrupted_address_rejected() {
        let kp = SignetKeypair::generate();
        let mut addr = SignetAddress::from_public_key(&kp.public_key()).to_bech32();
        // Corrupt a character in the middle of the data part.
        let mid = addr.len() / 2;
        let original = addr.as_bytes()[mid];
        let replacement = if original == b'q' { b'p' } else { b'q' };
        addr.replace_range(mid..mid + 1, &(replacement as char).to_string());
        assert!(SignetAddress::from_bech32(&addr).is_err());
    }

    #[test]
    fn serde_json_roundtrip() {
        let kp = SignetKeypair::generate();
        let addr = SignetAddress::from_public_key(&kp.public_key());
        let json = serde_json::to_string(&addr).unwrap();
        assert!(json.contains("signet1"));
        let recovered: SignetAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, recovered);
    }
}

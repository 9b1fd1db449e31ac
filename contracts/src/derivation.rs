//! # Deterministic Account Derivation
//!
//! Pure functions, no state: given (factory, token id, network, salt),
//! produce the address the bound account will live at. The same inputs
//! give the same address whether the account is deployed, undeployed, or
//! purely hypothetical — which is what lets anyone compute where token
//! N's account *will* be before anyone pays to put it there.
//!
//! Layout of the derivation:
//!
//! ```text
//! salt    = H("signet-account-salt-v1",    factory ‖ token_le ‖ network_le ‖ entropy?)
//! address = H("signet-account-address-v1", factory ‖ token_le ‖ network_le ‖ salt)
//! ```
//!
//! Both hashes are BLAKE3 `derive_key` under their own context, and every
//! part is fixed-width, so the concatenation is unambiguous. The optional
//! entropy lets a caller carve out a distinct address universe under the
//! same (factory, token, network) triple.

use serde::{Deserialize, Serialize};
use signet_protocol::config::{DOMAIN_ACCOUNT_ADDRESS, DOMAIN_ACCOUNT_SALT};
use signet_protocol::crypto::hash_parts;
use signet_protocol::identity::SignetAddress;
use std::fmt;

use crate::token_ledger::TokenId;

/// Additional entropy folded into the deterministic address function.
///
/// A `Salt` is itself derived, never random: re-deriving with the same
/// inputs must reproduce the same salt years later, or counterfactual
/// addresses stop being counterfactual.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; 32]);

impl Salt {
    /// Derive the salt for a bound account.
    ///
    /// `extra_entropy` is the caller-provided component from the deploy
    /// configuration; `None` is the default internal code path. Presence
    /// and absence hash differently, so "no entropy" is not the same
    /// salt as "32 zero bytes of entropy".
    pub fn derive(
        factory: &SignetAddress,
        token_id: TokenId,
        network_id: u32,
        extra_entropy: Option<&[u8; 32]>,
    ) -> Self {
        let token_bytes = token_id.to_le_bytes();
        let network_bytes = network_id.to_le_bytes();
        let mut parts: Vec<&[u8]> = vec![factory.digest(), &token_bytes, &network_bytes];
        if let Some(entropy) = extra_entropy {
            parts.push(entropy);
        }
        Self(hash_parts(DOMAIN_ACCOUNT_SALT, &parts))
    }

    /// Wrap raw salt bytes (e.g. received from an external deployer).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 salt bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", &hex::encode(self.0)[..16])
    }
}

/// Compute the deterministic address for a bound account.
///
/// This is invariant-grade: identical inputs yield an identical address
/// at every point in the account's lifecycle, and it is the *only* way
/// an embedded deployment decides where code lands.
pub fn account_address(
    factory: &SignetAddress,
    token_id: TokenId,
    network_id: u32,
    salt: &Salt,
) -> SignetAddress {
    let digest = hash_parts(
        DOMAIN_ACCOUNT_ADDRESS,
        &[
            factory.digest(),
            &token_id.to_le_bytes(),
            &network_id.to_le_bytes(),
            salt.as_bytes(),
        ],
    );
    SignetAddress::from_digest(digest)
}

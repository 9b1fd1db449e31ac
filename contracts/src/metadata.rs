//! # Token Metadata
//!
//! The metadata surface for controlling tokens. Rendering and display
//! belong to layers above this core; what the core guarantees is exactly
//! one required attribute — `Account Address` — whose value is the bound
//! account's address. Everything else is optional decoration.

use serde::{Deserialize, Serialize};
use signet_protocol::identity::SignetAddress;

use crate::token_ledger::TokenId;

/// The one attribute every controlling token must expose.
pub const ACCOUNT_ADDRESS_TRAIT: &str = "Account Address";

/// A single display attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    /// Attribute name, e.g. `Account Address`.
    pub trait_type: String,
    /// Attribute value.
    pub value: String,
}

/// Metadata for one controlling token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable token name.
    pub name: String,
    /// Attribute list. Always contains [`ACCOUNT_ADDRESS_TRAIT`].
    pub attributes: Vec<MetadataAttribute>,
}

impl TokenMetadata {
    /// Build the canonical metadata for a bound account's token.
    pub fn for_bound_account(token_id: TokenId, account: &SignetAddress) -> Self {
        Self {
            name: format!("SIGNET Account #{token_id}"),
            attributes: vec![MetadataAttribute {
                trait_type: ACCOUNT_ADDRESS_TRAIT.to_string(),
                value: account.to_bech32(),
            }],
        }
    }

    /// Append an optional descriptive attribute.
    pub fn with_attribute(mut self, trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(MetadataAttribute {
            trait_type: trait_type.into(),
            value: value.into(),
        });
        self
    }

    /// The required `Account Address` attribute value, if present.
    pub fn account_address(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.trait_type == ACCOUNT_ADDRESS_TRAIT)
            .map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_attribute_is_present_and_correct() {
        let account = SignetAddress::from_digest([0xAB; 32]);
        let meta = TokenMetadata::for_bound_account(7, &account);
        assert_eq!(meta.name, "SIGNET Account #7");
        assert_eq!(meta.account_address(), Some(account.to_bech32().as_str()));
    }

    #[test]
    fn optional_attributes_do_not_displace_the_required_one() {
        let account = SignetAddress::from_digest([0xAB; 32]);
        let meta = TokenMetadata::for_bound_account(7, &account)
            .with_attribute("Network", "mainnet")
            .with_attribute("Generation", "1");
        assert_eq!(meta.attributes.len(), 3);
        assert_eq!(meta.account_address(), Some(account.to_bech32().as_str()));
    }

    #[test]
    fn metadata_serde_roundtrip() {
        let account = SignetAddress::from_digest([0xAB; 32]);
        let meta = TokenMetadata::for_bound_account(1, &account).with_attribute("Network", "devnet");
        let json = serde_json::to_string(&meta).unwrap();
        let restored: TokenMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, restored);
    }
}

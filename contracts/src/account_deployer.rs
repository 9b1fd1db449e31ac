//! # Deployment Strategies
//!
//! How account code actually comes to exist at the deterministic address.
//! Two variants of one tagged union, selected by the mint configuration:
//! the factory's own embedded path (the default — no configuration, no
//! extra salt), or delegation to a registered external deployer that
//! receives the derivation inputs and initialization data.
//!
//! External deployers come in two temperaments. A *predictable* one
//! promises code at exactly the requested address — if it produces
//! anything else, the factory treats the deployment as failed and the
//! whole mint unwinds. A non-predictable one is allowed to pick its own
//! address; the factory then persists the result in the registry so that
//! lookups remain deterministic from the caller's point of view.

use serde::{Deserialize, Serialize};
use signet_protocol::identity::SignetAddress;
use thiserror::Error;

use crate::derivation::Salt;
use crate::token_ledger::TokenId;

/// Ways a deployer can fail. All of them abort the enclosing mint.
#[derive(Debug, Error)]
pub enum DeployError {
    /// No code could be produced at any address.
    #[error("deployer could not produce account code: {reason}")]
    CodeNotProduced {
        /// Deployer-supplied detail.
        reason: String,
    },

    /// Code was produced but the account failed to initialize.
    #[error("account initialization failed: {reason}")]
    InitializationFailed {
        /// Deployer-supplied detail.
        reason: String,
    },
}

/// Everything a deployer needs to materialize one account.
#[derive(Debug)]
pub struct DeployRequest<'a> {
    /// The token the account will be bound to.
    pub token_id: TokenId,
    /// The deterministically derived address the factory expects.
    pub expected_address: SignetAddress,
    /// The salt that produced it.
    pub salt: Salt,
    /// The network the derivation was computed for.
    pub network_id: u32,
    /// Opaque initialization data passed through from the mint config.
    pub init_data: &'a [u8],
}

/// The deployment seam. The factory owns registered deployers as boxed
/// trait objects and consults them only from inside `mint`.
pub trait AccountDeployer {
    /// Whether this deployer guarantees code at the requested address.
    /// The factory holds predictable deployers to their word.
    fn predictable(&self) -> bool;

    /// Produce account code, returning the address it actually landed at.
    fn deploy(&mut self, request: &DeployRequest<'_>) -> Result<SignetAddress, DeployError>;
}

// ---------------------------------------------------------------------------
// Mint configuration
// ---------------------------------------------------------------------------

/// Which deployment path a mint takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployStrategy {
    /// The factory materializes the account itself at the derived
    /// address. The default.
    Embedded,
    /// Delegate to the external deployer registered under this name.
    Delegated {
        /// Registration name of the deployer.
        deployer: String,
    },
}

/// Deployment configuration attached to a mint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Embedded or delegated.
    pub strategy: DeployStrategy,
    /// Initialization data forwarded to a delegated deployer.
    pub init_data: Vec<u8>,
    /// Extra entropy folded into the salt derivation. `None` is the
    /// default salt of the internal code path.
    pub extra_salt: Option<[u8; 32]>,
}

impl DeployConfig {
    /// The empty configuration: embedded deployment, default salt.
    pub fn embedded() -> Self {
        Self {
            strategy: DeployStrategy::Embedded,
            init_data: Vec::new(),
            extra_salt: None,
        }
    }

    /// Delegate deployment to the named external deployer.
    pub fn delegated(deployer: impl Into<String>) -> Self {
        Self {
            strategy: DeployStrategy::Delegated {
                deployer: deployer.into(),
            },
            init_data: Vec::new(),
            extra_salt: None,
        }
    }

    /// Attach initialization data.
    pub fn with_init_data(mut self, init_data: Vec<u8>) -> Self {
        self.init_data = init_data;
        self
    }

    /// Attach extra salt entropy.
    pub fn with_extra_salt(mut self, extra_salt: [u8; 32]) -> Self {
        self.extra_salt = Some(extra_salt);
        self
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_embedded_with_default_salt() {
        let config = DeployConfig::default();
        assert_eq!(config.strategy, DeployStrategy::Embedded);
        assert!(config.init_data.is_empty());
        assert!(config.extra_salt.is_none());
    }

    #[test]
    fn builders_compose() {
        let config = DeployConfig::delegated("vault-deployer")
            .with_init_data(vec![1, 2, 3])
            .with_extra_salt([7u8; 32]);
        assert_eq!(
            config.strategy,
            DeployStrategy::Delegated {
                deployer: "vault-deployer".into()
            }
        );
        assert_eq!(config.init_data, vec![1, 2, 3]);
        assert_eq!(config.extra_salt, Some([7u8; 32]));
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = DeployConfig::delegated("d").with_extra_salt([9u8; 32]);
        let json = serde_json::to_string(&config).unwrap();
        let restored: DeployConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}

//! # Bound Accounts
//!
//! The account record on the other end of the token binding: an address,
//! a balance of forwarded value, and an explicit, enumerable set of
//! installed module identifiers. No wallet-type hierarchy — capabilities
//! are data, and the set always contains exactly one permanent member,
//! the ownership validator.
//!
//! The module set is exclusively owned by the account. The only public
//! way to mutate it is [`BoundAccount::apply_module_request`], which runs
//! every request through the account's own ownership validator before
//! touching anything. The crate-internal reset path exists solely for the
//! transfer guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signet_protocol::config::{DOMAIN_MODULE_ID, DOMAIN_MODULE_REQUEST};
use signet_protocol::crypto::hash::{domain_hash, hash_parts};
use signet_protocol::crypto::signatures::SignedAuthorization;
use signet_protocol::identity::SignetAddress;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::ownership_validator::{OwnershipValidator, ValidationOutcome};
use crate::token_ledger::OwnershipSource;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from account-side module management.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Any attempt to remove the ownership validator.
    #[error("the ownership validator cannot be uninstalled")]
    UninstallRejected,

    /// Install of a module that is already present.
    #[error("module {0} is already installed")]
    ModuleAlreadyInstalled(ModuleId),

    /// Uninstall of a module that is not present.
    #[error("module {0} is not installed")]
    ModuleNotInstalled(ModuleId),

    /// The request names a different account than the one it was
    /// submitted to.
    #[error("request targets account {requested}, not {actual}")]
    RequestAccountMismatch {
        /// The account named in the request.
        requested: SignetAddress,
        /// The account the request was submitted to.
        actual: SignetAddress,
    },

    /// The ownership validator turned the request away.
    #[error("request rejected by ownership validator: {0}")]
    Unauthorized(ValidationOutcome),

    /// Crediting the account would overflow its balance.
    #[error("balance overflow while crediting account")]
    BalanceOverflow,
}

// ---------------------------------------------------------------------------
// Module identifiers
// ---------------------------------------------------------------------------

/// An installable capability on a bound account, identified by the
/// domain-separated hash of its name.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ModuleId([u8; 32]);

impl ModuleId {
    /// Derive a module id from its human-readable name.
    pub fn named(name: &str) -> Self {
        Self(domain_hash(DOMAIN_MODULE_ID, name.as_bytes()))
    }

    /// The permanent ownership-validator module present on every account.
    pub fn ownership_validator() -> Self {
        Self::named("ownership-validator")
    }

    /// The raw 32 identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &hex::encode(self.0)[..16])
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", &hex::encode(self.0)[..16])
    }
}

// ---------------------------------------------------------------------------
// Module requests
// ---------------------------------------------------------------------------

/// What a module request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleAction {
    /// Add a capability to the account.
    Install(ModuleId),
    /// Remove a capability from the account.
    Uninstall(ModuleId),
}

impl ModuleAction {
    /// The module this action concerns.
    pub fn module(&self) -> &ModuleId {
        match self {
            ModuleAction::Install(id) | ModuleAction::Uninstall(id) => id,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            ModuleAction::Install(_) => 0,
            ModuleAction::Uninstall(_) => 1,
        }
    }
}

/// A signed request to change an account's module set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRequest {
    /// The account whose module set should change.
    pub account: SignetAddress,
    /// Install or uninstall, and of what.
    pub action: ModuleAction,
    /// Caller-chosen replay discriminator.
    pub nonce: u64,
}

impl ModuleRequest {
    /// The digest the token owner signs. All fixed-width fields.
    pub fn digest(&self) -> [u8; 32] {
        hash_parts(
            DOMAIN_MODULE_REQUEST,
            &[
                self.account.digest(),
                &[self.action.tag()],
                self.action.module().as_bytes(),
                &self.nonce.to_le_bytes(),
            ],
        )
    }
}

// ---------------------------------------------------------------------------
// BoundAccount
// ---------------------------------------------------------------------------

/// A deployed token-bound account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundAccount {
    /// Where this account lives. For embedded deployments this is the
    /// deterministic derivation; for delegated ones, whatever the
    /// deployer produced (and the registry persisted).
    address: SignetAddress,
    /// The permanent validator, bound at install time.
    validator: OwnershipValidator,
    /// The enumerable capability set. Always contains the validator.
    modules: BTreeSet<ModuleId>,
    /// Value forwarded to this account, in grains.
    balance: u64,
    /// When the account was deployed.
    created_at: DateTime<Utc>,
}

impl BoundAccount {
    /// Create a freshly deployed account with only the validator
    /// installed. Factory-internal: accounts come into existence through
    /// `mint`, nowhere else.
    pub(crate) fn new(address: SignetAddress, validator: OwnershipValidator) -> Self {
        let mut modules = BTreeSet::new();
        modules.insert(ModuleId::ownership_validator());
        Self {
            address,
            validator,
            modules,
            balance: 0,
            created_at: Utc::now(),
        }
    }

    /// The account's address.
    pub fn address(&self) -> SignetAddress {
        self.address
    }

    /// The account's ownership validator.
    pub fn validator(&self) -> &OwnershipValidator {
        &self.validator
    }

    pub(crate) fn validator_mut(&mut self) -> &mut OwnershipValidator {
        &mut self.validator
    }

    /// Forwarded value held by the account, in grains.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Deployment timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The installed modules, in stable order.
    pub fn modules(&self) -> Vec<ModuleId> {
        self.modules.iter().copied().collect()
    }

    /// Whether a module is installed.
    pub fn has_module(&self, id: &ModuleId) -> bool {
        self.modules.contains(id)
    }

    /// Apply a signed module request, gated by the ownership validator.
    ///
    /// The request digest is recovered against live token ownership — a
    /// request signed by anyone but the *current* owner of the
    /// controlling token is turned away, including the previous owner
    /// moments after a transfer.
    pub fn apply_module_request(
        &mut self,
        owners: &dyn OwnershipSource,
        request: &ModuleRequest,
        auth: &SignedAuthorization,
    ) -> Result<(), AccountError> {
        if request.account != self.address {
            return Err(AccountError::RequestAccountMismatch {
                requested: request.account,
                actual: self.address,
            });
        }

        let digest = request.digest();
        let outcome = self.validator.authorize(owners, &digest, auth);
        if !outcome.is_authorized() {
            return Err(AccountError::Unauthorized(outcome));
        }

        match request.action {
            ModuleAction::Install(id) => {
                if !self.modules.insert(id) {
                    return Err(AccountError::ModuleAlreadyInstalled(id));
                }
            }
            ModuleAction::Uninstall(id) => {
                if id == ModuleId::ownership_validator() {
                    return Err(AccountError::UninstallRejected);
                }
                if !self.modules.remove(&id) {
                    return Err(AccountError::ModuleNotInstalled(id));
                }
            }
        }
        Ok(())
    }

    /// Forward value into the account.
    pub(crate) fn credit(&mut self, amount: u64) -> Result<(), AccountError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(AccountError::BalanceOverflow)?;
        Ok(())
    }

    /// Wipe the module set down to the validator alone, returning what
    /// was removed. Transfer-guard path only: this deliberately bypasses
    /// authorization, because it runs as part of the ownership change
    /// itself — the new owner has not signed anything yet, and the old
    /// owner must not be consulted.
    pub(crate) fn reset_modules(&mut self) -> Vec<ModuleId> {
        let keep = ModuleId::ownership_validator();
        let removed: Vec<ModuleId> = self
            .modules
            .iter()
            .filter(|id| **id != keep)
            .copied()
            .collect();
        self.modules.retain(|id| *id == keep);
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_ledger::TokenLedger;
    use signet_protocol::crypto::SignetKeypair;

    struct Fixture {
        ledger: TokenLedger,
        account: BoundAccount,
        owner: SignetKeypair,
    }

    fn fixture() -> Fixture {
        let collection = SignetAddress::from_digest([0xFA; 32]);
        let mut ledger = TokenLedger::new(collection);
        let owner = SignetKeypair::from_seed(&[1u8; 32]);
        let owner_addr = SignetAddress::from_public_key(&owner.public_key());
        let token_id = ledger.mint_to(owner_addr);

        let address = SignetAddress::from_digest([0xAC; 32]);
        let validator = OwnershipValidator::install(collection, token_id);
        let account = BoundAccount::new(address, validator);
        Fixture {
            ledger,
            account,
            owner,
        }
    }

    fn signed_request(
        account: SignetAddress,
        action: ModuleAction,
        signer: &SignetKeypair,
    ) -> (ModuleRequest, SignedAuthorization) {
        let request = ModuleRequest {
            account,
            action,
            nonce: 1,
        };
        let auth = SignedAuthorization::sign(signer, &request.digest());
        (request, auth)
    }

    #[test]
    fn fresh_account_has_exactly_the_validator() {
        let f = fixture();
        assert_eq!(f.account.modules(), vec![ModuleId::ownership_validator()]);
        assert_eq!(f.account.balance(), 0);
    }

    #[test]
    fn owner_can_install_and_uninstall_modules() {
        let mut f = fixture();
        let session_keys = ModuleId::named("session-keys");

        let (req, auth) = signed_request(
            f.account.address(),
            ModuleAction::Install(session_keys),
            &f.owner,
        );
        f.account
            .apply_module_request(&f.ledger, &req, &auth)
            .unwrap();
        assert!(f.account.has_module(&session_keys));
        assert_eq!(f.account.modules().len(), 2);

        let (req, auth) = signed_request(
            f.account.address(),
            ModuleAction::Uninstall(session_keys),
            &f.owner,
        );
        f.account
            .apply_module_request(&f.ledger, &req, &auth)
            .unwrap();
        assert!(!f.account.has_module(&session_keys));
    }

    #[test]
    fn non_owner_cannot_manage_modules() {
        let mut f = fixture();
        let stranger = SignetKeypair::from_seed(&[9u8; 32]);
        let (req, auth) = signed_request(
            f.account.address(),
            ModuleAction::Install(ModuleId::named("backdoor")),
            &stranger,
        );
        let err = f
            .account
            .apply_module_request(&f.ledger, &req, &auth)
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::Unauthorized(ValidationOutcome::NotTokenOwner)
        ));
        assert_eq!(f.account.modules().len(), 1);
    }

    #[test]
    fn validator_uninstall_rejected_even_for_owner() {
        let mut f = fixture();
        let (req, auth) = signed_request(
            f.account.address(),
            ModuleAction::Uninstall(ModuleId::ownership_validator()),
            &f.owner,
        );
        let err = f
            .account
            .apply_module_request(&f.ledger, &req, &auth)
            .unwrap_err();
        assert!(matches!(err, AccountError::UninstallRejected));
        assert!(f.account.has_module(&ModuleId::ownership_validator()));
    }

    #[test]
    fn duplicate_install_rejected() {
        let mut f = fixture();
        let id = ModuleId::named("spending-limits");
        let (req, auth) = signed_request(f.account.address(), ModuleAction::Install(id), &f.owner);
        f.account
            .apply_module_request(&f.ledger, &req, &auth)
            .unwrap();

        let (req, auth) = signed_request(f.account.address(), ModuleAction::Install(id), &f.owner);
        assert!(matches!(
            f.account.apply_module_request(&f.ledger, &req, &auth),
            Err(AccountError::ModuleAlreadyInstalled(_))
        ));
    }

    #[test]
    fn uninstall_of_absent_module_rejected() {
        let mut f = fixture();
        let (req, auth) = signed_request(
            f.account.address(),
            ModuleAction::Uninstall(ModuleId::named("never-installed")),
            &f.owner,
        );
        assert!(matches!(
            f.account.apply_module_request(&f.ledger, &req, &auth),
            Err(AccountError::ModuleNotInstalled(_))
        ));
    }

    #[test]
    fn request_for_other_account_rejected() {
        let mut f = fixture();
        let (req, auth) = signed_request(
            SignetAddress::from_digest([0xDD; 32]),
            ModuleAction::Install(ModuleId::named("misdirected")),
            &f.owner,
        );
        assert!(matches!(
            f.account.apply_module_request(&f.ledger, &req, &auth),
            Err(AccountError::RequestAccountMismatch { .. })
        ));
    }

    #[test]
    fn tampered_request_fails_signature() {
        let mut f = fixture();
        let id = ModuleId::named("session-keys");
        let (mut req, auth) =
            signed_request(f.account.address(), ModuleAction::Install(id), &f.owner);
        // Signed as install, replayed as uninstall.
        req.action = ModuleAction::Uninstall(id);
        assert!(matches!(
            f.account.apply_module_request(&f.ledger, &req, &auth),
            Err(AccountError::Unauthorized(ValidationOutcome::SignatureInvalid))
        ));
    }

    #[test]
    fn reset_removes_everything_but_the_validator() {
        let mut f = fixture();
        for name in ["session-keys", "spending-limits", "recovery-hooks"] {
            let (req, auth) = signed_request(
                f.account.address(),
                ModuleAction::Install(ModuleId::named(name)),
                &f.owner,
            );
            f.account
                .apply_module_request(&f.ledger, &req, &auth)
                .unwrap();
        }
        assert_eq!(f.account.modules().len(), 4);

        let removed = f.account.reset_modules();
        assert_eq!(removed.len(), 3);
        assert_eq!(f.account.modules(), vec![ModuleId::ownership_validator()]);

        // Reset on an already-clean account removes nothing.
        assert!(f.account.reset_modules().is_empty());
    }

    #[test]
    fn credit_accumulates_and_checks_overflow() {
        let mut f = fixture();
        f.account.credit(500).unwrap();
        f.account.credit(250).unwrap();
        assert_eq!(f.account.balance(), 750);

        assert!(matches!(
            f.account.credit(u64::MAX),
            Err(AccountError::BalanceOverflow)
        ));
        assert_eq!(f.account.balance(), 750);
    }

    #[test]
    fn module_id_is_name_stable() {
        assert_eq!(ModuleId::named("x"), ModuleId::named("x"));
        assert_ne!(ModuleId::named("x"), ModuleId::named("y"));
        assert_eq!(
            ModuleId::ownership_validator(),
            ModuleId::named("ownership-validator")
        );
    }

    #[test]
    fn account_serde_roundtrip() {
        let f = fixture();
        let json = serde_json::to_string(&f.account).unwrap();
        let restored: BoundAccount = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.address(), f.account.address());
        assert_eq!(restored.modules(), f.account.modules());
        assert_eq!(
            restored.validator().controller(),
            f.account.validator().controller()
        );
    }
}

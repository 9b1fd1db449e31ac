//! # Account Factory
//!
//! The entry point of the whole binding: mints controlling tokens,
//! deploys their accounts at deterministic addresses, and polices the
//! transfer path. One factory instance owns one collection, one address
//! registry, one token ledger, and the accounts it has deployed — there
//! is no ambient global state, and nothing else holds a mutable handle
//! to any of it.
//!
//! ## Atomicity
//!
//! Every operation here is a single state transition: all fallible steps
//! run before the first mutation, so a failed mint leaves no token, no
//! registry entry, no account, and no moved value behind. The execution
//! environment serializes operations per factory (`&mut self` does that
//! for free in Rust), and nothing is retried internally — a rejected
//! operation is the caller's to resubmit.
//!
//! ## Security Model
//!
//! - **Mint**: permissionless; whoever mints owns the new token and
//!   therefore the new account.
//! - **Transfer**: only the current owner can move a token, the
//!   destination may never be the token's own bound account, and every
//!   completed transfer strips the account back to validator-only state.
//! - **Fees**: explicit, caller-visible policy fixed at construction.
//!   No inferred defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use signet_protocol::config::MAX_MINT_FEE_GRAINS;
use signet_protocol::crypto::signatures::SignedAuthorization;
use signet_protocol::identity::SignetAddress;

use crate::account_deployer::{AccountDeployer, DeployConfig, DeployRequest, DeployStrategy};
use crate::address_registry::{AddressRegistry, RegistryError};
use crate::bound_account::{AccountError, BoundAccount, ModuleId, ModuleRequest};
use crate::derivation::{account_address, Salt};
use crate::events::ProtocolRecord;
use crate::metadata::TokenMetadata;
use crate::ownership_validator::{
    ImplementationRef, Operation, OwnershipValidator, SignatureVerdict, ValidationOutcome,
    ValidatorError,
};
use crate::token_ledger::{LedgerError, OwnershipSource, TokenId, TokenLedger};
use crate::transfer_guard::{self, GuardError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during factory operations.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Lookup on a token id that was never minted.
    #[error("invalid token id: {0} was never minted")]
    InvalidTokenId(TokenId),

    /// Reverse lookup on an address with no bound account.
    #[error("no token-bound account is registered at {0}")]
    NotFound(SignetAddress),

    /// Account code could not be produced at the deterministic address,
    /// or initialization failed. The mint rolled back entirely.
    #[error("deployment failed for token {token_id}: {reason}")]
    DeploymentFailed {
        /// The token id the failed mint would have used.
        token_id: TokenId,
        /// What went wrong.
        reason: String,
    },

    /// The deploy config names a deployer nobody registered.
    #[error("no deployer registered under '{0}'")]
    UnknownDeployer(String),

    /// A deployer is already registered under this name.
    #[error("a deployer is already registered under '{0}'")]
    DeployerExists(String),

    /// The configured mint fee exceeds the attached value.
    #[error("configured mint fee {fee} exceeds attached value {value}")]
    FeeExceedsValue {
        /// The configured fee, in grains.
        fee: u64,
        /// The value the minter attached.
        value: u64,
    },

    /// A flat fee above the protocol bound was configured.
    #[error("mint fee {fee} exceeds protocol maximum {max}")]
    FeeAboveBound {
        /// The configured fee.
        fee: u64,
        /// The protocol ceiling.
        max: u64,
    },

    /// A transfer was initiated by someone other than the current owner.
    #[error("{claimed} does not own token {token_id}")]
    NotTokenOwner {
        /// The token in question.
        token_id: TokenId,
        /// Who claimed to own it.
        claimed: SignetAddress,
    },

    /// The transfer destination is the token's own bound account.
    #[error("transfer of token {token_id} to its own bound account {account} is forbidden")]
    SelfTransferRejected {
        /// The token being transferred.
        token_id: TokenId,
        /// Its bound account.
        account: SignetAddress,
    },

    /// The produced account address is already bound to another token.
    #[error("address {address} is already bound to token {existing}")]
    AddressCollision {
        /// The colliding address.
        address: SignetAddress,
        /// The token already bound to it.
        existing: TokenId,
    },

    /// An upgrade that does not strictly supersede the current version.
    #[error("proposed implementation v{proposed} does not supersede v{current}")]
    StaleImplementation {
        /// Version currently installed.
        current: u32,
        /// Version that was proposed.
        proposed: u32,
    },

    /// A module-management request was rejected at the account layer.
    #[error("module management rejected: {0}")]
    Module(#[from] AccountError),

    /// Fee accounting would overflow.
    #[error("value overflow while accounting fees")]
    ValueOverflow,
}

impl From<RegistryError> for FactoryError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidTokenId(id) => FactoryError::InvalidTokenId(id),
            RegistryError::NotFound(addr) => FactoryError::NotFound(addr),
            RegistryError::TokenAlreadyRegistered(id) => FactoryError::DeploymentFailed {
                token_id: id,
                reason: "registry already holds an entry for this token".into(),
            },
            RegistryError::AddressCollision { address, existing } => {
                FactoryError::AddressCollision { address, existing }
            }
        }
    }
}

impl From<GuardError> for FactoryError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::SelfTransferRejected { token_id, account } => {
                FactoryError::SelfTransferRejected { token_id, account }
            }
        }
    }
}

impl From<LedgerError> for FactoryError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownToken(id) => FactoryError::InvalidTokenId(id),
        }
    }
}

impl From<ValidatorError> for FactoryError {
    fn from(err: ValidatorError) -> Self {
        match err {
            ValidatorError::UninstallRejected => FactoryError::Module(AccountError::UninstallRejected),
            ValidatorError::StaleImplementation { current, proposed } => {
                FactoryError::StaleImplementation { current, proposed }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The factory's explicit mint-fee configuration.
///
/// Deliberately a policy value, not a hardcoded rule: whether value
/// forwarding deducts anything is the deployer-of-the-factory's visible
/// choice, and callers can read it back via
/// [`AccountFactory::fee_policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeePolicy {
    /// Forward the full attached value.
    None,
    /// Deduct a flat amount of grains from every mint.
    Flat(u64),
}

impl FeePolicy {
    /// The fee owed for a mint carrying `value` grains.
    fn fee_for(&self, value: u64) -> Result<u64, FactoryError> {
        match *self {
            FeePolicy::None => Ok(0),
            FeePolicy::Flat(fee) => {
                if fee > value {
                    Err(FactoryError::FeeExceedsValue { fee, value })
                } else {
                    Ok(fee)
                }
            }
        }
    }
}

impl fmt::Display for FeePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeePolicy::None => write!(f, "no fee"),
            FeePolicy::Flat(fee) => write!(f, "flat {fee} grains"),
        }
    }
}

/// What a successful mint hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// The freshly minted controlling token.
    pub token_id: TokenId,
    /// The deployed bound account.
    pub account: SignetAddress,
}

// ---------------------------------------------------------------------------
// AccountFactory
// ---------------------------------------------------------------------------

/// The factory for one collection of token-bound accounts.
pub struct AccountFactory {
    /// The factory's own address — doubles as the collection identity in
    /// every validator binding it installs.
    address: SignetAddress,
    /// The network the derivations are computed for.
    network_id: u32,
    /// Explicit mint-fee policy, fixed at construction.
    fee: FeePolicy,
    /// The swappable factory logic reference.
    implementation: ImplementationRef,
    /// Token ownership for this collection.
    ledger: TokenLedger,
    /// The token ↔ account registry. Exclusively owned here.
    registry: AddressRegistry,
    /// Deployed accounts by address.
    accounts: HashMap<SignetAddress, BoundAccount>,
    /// External deployers by registration name.
    deployers: HashMap<String, Box<dyn AccountDeployer>>,
    /// Append-only record log.
    events: Vec<ProtocolRecord>,
    /// Fees accrued across all mints, in grains.
    collected_fees: u64,
}

impl AccountFactory {
    /// Create a factory for a new collection.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::FeeAboveBound`] for a flat fee above the
    /// protocol ceiling.
    pub fn new(
        address: SignetAddress,
        network_id: u32,
        fee: FeePolicy,
    ) -> Result<Self, FactoryError> {
        if let FeePolicy::Flat(amount) = fee {
            if amount > MAX_MINT_FEE_GRAINS {
                return Err(FactoryError::FeeAboveBound {
                    fee: amount,
                    max: MAX_MINT_FEE_GRAINS,
                });
            }
        }
        Ok(Self {
            address,
            network_id,
            fee,
            implementation: ImplementationRef::genesis("account-factory"),
            ledger: TokenLedger::new(address),
            registry: AddressRegistry::new(),
            accounts: HashMap::new(),
            deployers: HashMap::new(),
            events: Vec::new(),
            collected_fees: 0,
        })
    }

    /// Register an external deployer under a name mint configs can
    /// reference.
    pub fn register_deployer(
        &mut self,
        name: impl Into<String>,
        deployer: Box<dyn AccountDeployer>,
    ) -> Result<(), FactoryError> {
        let name = name.into();
        if self.deployers.contains_key(&name) {
            return Err(FactoryError::DeployerExists(name));
        }
        self.deployers.insert(name, deployer);
        Ok(())
    }

    // -- mint ---------------------------------------------------------------

    /// Mint a controlling token and deploy its bound account, atomically.
    ///
    /// The account lands at the deterministic derivation for the embedded
    /// path; a delegated deployer either honors that address (if it
    /// promises predictability) or picks its own, which is then persisted
    /// in the registry. Value is forwarded minus the configured fee. Any
    /// failure — unknown deployer, deployment, fee shortfall — unwinds
    /// the whole operation: no token, no entry, no moved value.
    pub fn mint(
        &mut self,
        minter: SignetAddress,
        config: &DeployConfig,
        value: u64,
    ) -> Result<MintReceipt, FactoryError> {
        let token_id = self.ledger.peek_next_id();
        let salt = Salt::derive(
            &self.address,
            token_id,
            self.network_id,
            config.extra_salt.as_ref(),
        );
        let predicted = account_address(&self.address, token_id, self.network_id, &salt);

        let fee = self.fee.fee_for(value)?;
        let forwarded = value - fee;
        let collected = self
            .collected_fees
            .checked_add(fee)
            .ok_or(FactoryError::ValueOverflow)?;

        let account_addr = match &config.strategy {
            DeployStrategy::Embedded => predicted,
            DeployStrategy::Delegated { deployer } => {
                let handler = self
                    .deployers
                    .get_mut(deployer)
                    .ok_or_else(|| FactoryError::UnknownDeployer(deployer.clone()))?;
                let request = DeployRequest {
                    token_id,
                    expected_address: predicted,
                    salt,
                    network_id: self.network_id,
                    init_data: &config.init_data,
                };
                let produced = handler.deploy(&request).map_err(|e| {
                    warn!(token_id, deployer = %deployer, "delegated deployment failed");
                    FactoryError::DeploymentFailed {
                        token_id,
                        reason: e.to_string(),
                    }
                })?;
                if handler.predictable() && produced != predicted {
                    return Err(FactoryError::DeploymentFailed {
                        token_id,
                        reason: format!(
                            "deployer promised {predicted} but produced {produced}"
                        ),
                    });
                }
                produced
            }
        };

        if let Ok(existing) = self.registry.token_of(&account_addr) {
            return Err(FactoryError::AddressCollision {
                address: account_addr,
                existing,
            });
        }

        // Every fallible step has passed; the mint now commits as a whole.
        self.registry.record(token_id, account_addr)?;
        self.registry.mark_deployed(token_id)?;
        let minted = self.ledger.mint_to(minter);

        let validator = OwnershipValidator::install(self.address, minted);
        let mut account = BoundAccount::new(account_addr, validator);
        account.credit(forwarded)?;
        self.accounts.insert(account_addr, account);

        self.collected_fees = collected;
        self.events
            .push(ProtocolRecord::account_created(minted, account_addr, minter));
        info!(
            token_id = minted,
            account = %account_addr,
            minter = %minter,
            forwarded,
            fee,
            "minted token-bound account"
        );

        Ok(MintReceipt {
            token_id: minted,
            account: account_addr,
        })
    }

    // -- reads --------------------------------------------------------------

    /// The bound account address for `token_id`. Pure lookup; identical
    /// before and after deployment.
    pub fn account_address(&self, token_id: TokenId) -> Result<SignetAddress, FactoryError> {
        Ok(self.registry.address_of(token_id)?)
    }

    /// Reverse lookup: the controlling token for `address`.
    pub fn token_of(&self, address: &SignetAddress) -> Result<TokenId, FactoryError> {
        Ok(self.registry.token_of(address)?)
    }

    /// Whether the token's account has been deployed.
    pub fn is_account_deployed(&self, token_id: TokenId) -> Result<bool, FactoryError> {
        Ok(self.registry.is_deployed(token_id)?)
    }

    /// The current owner of a token, if it exists.
    pub fn owner_of(&self, token_id: TokenId) -> Option<SignetAddress> {
        self.ledger.owner_of(token_id)
    }

    /// The deployed account at `address`, if any. Read-only: mutation
    /// flows through the factory's authorized entrypoints.
    pub fn account(&self, address: &SignetAddress) -> Option<&BoundAccount> {
        self.accounts.get(address)
    }

    /// The deployed account bound to `token_id`.
    pub fn account_for_token(&self, token_id: TokenId) -> Result<&BoundAccount, FactoryError> {
        let address = self.registry.address_of(token_id)?;
        self.accounts
            .get(&address)
            .ok_or(FactoryError::NotFound(address))
    }

    /// The live ownership view validators read from.
    pub fn ownership(&self) -> &TokenLedger {
        &self.ledger
    }

    /// Metadata for a controlling token. Exactly one required attribute:
    /// `Account Address`.
    pub fn token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata, FactoryError> {
        let address = self.registry.address_of(token_id)?;
        Ok(TokenMetadata::for_bound_account(token_id, &address))
    }

    /// The factory's address (and collection identity).
    pub fn address(&self) -> SignetAddress {
        self.address
    }

    /// The network this factory derives addresses for.
    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    /// The explicit, caller-visible fee configuration.
    pub fn fee_policy(&self) -> FeePolicy {
        self.fee
    }

    /// Fees accrued so far, in grains.
    pub fn collected_fees(&self) -> u64 {
        self.collected_fees
    }

    /// The factory's implementation reference.
    pub fn implementation(&self) -> &ImplementationRef {
        &self.implementation
    }

    /// Records emitted so far, oldest first.
    pub fn events(&self) -> &[ProtocolRecord] {
        &self.events
    }

    // -- validation ---------------------------------------------------------

    /// Validate an operation against the targeted account's validator.
    ///
    /// Routine rejections are [`ValidationOutcome`] values; an `Err` means
    /// the target account does not exist at all.
    pub fn validate_operation(
        &self,
        op: &Operation,
        op_hash: &[u8; 32],
    ) -> Result<ValidationOutcome, FactoryError> {
        let account = self
            .accounts
            .get(&op.account)
            .ok_or(FactoryError::NotFound(op.account))?;
        Ok(account
            .validator()
            .validate_operation(&self.ledger, op, op_hash))
    }

    /// Validate a standalone signature against an account's validator.
    pub fn validate_signature(
        &self,
        account: &SignetAddress,
        sender: &SignetAddress,
        hash: &[u8; 32],
        auth: &SignedAuthorization,
    ) -> Result<SignatureVerdict, FactoryError> {
        let account = self
            .accounts
            .get(account)
            .ok_or(FactoryError::NotFound(*account))?;
        Ok(account
            .validator()
            .validate_signature(&self.ledger, sender, hash, auth))
    }

    /// Apply a signed module-management request to its target account.
    pub fn apply_module_request(
        &mut self,
        request: &ModuleRequest,
        auth: &SignedAuthorization,
    ) -> Result<(), FactoryError> {
        let account = self
            .accounts
            .get_mut(&request.account)
            .ok_or(FactoryError::NotFound(request.account))?;
        account.apply_module_request(&self.ledger, request, auth)?;
        Ok(())
    }

    // -- transfers ----------------------------------------------------------

    /// Transfer a controlling token, running the guard pipeline.
    ///
    /// Ordered stages, all synchronous: ownership check, self-transfer
    /// lock, ledger reassignment, unconditional module reset, record.
    /// Returns the modules the reset removed.
    pub fn transfer_token(
        &mut self,
        token_id: TokenId,
        from: SignetAddress,
        to: SignetAddress,
    ) -> Result<Vec<ModuleId>, FactoryError> {
        let owner = self
            .ledger
            .owner_of(token_id)
            .ok_or(FactoryError::InvalidTokenId(token_id))?;
        if owner != from {
            return Err(FactoryError::NotTokenOwner {
                token_id,
                claimed: from,
            });
        }

        transfer_guard::check_destination(&self.registry, token_id, &to)?;

        let account_addr = self.registry.address_of(token_id)?;
        let account = self
            .accounts
            .get_mut(&account_addr)
            .ok_or(FactoryError::NotFound(account_addr))?;

        // Checks done; the transfer commits as a whole from here.
        self.ledger.reassign(token_id, to)?;
        let removed = transfer_guard::reset_account(account);

        self.events.push(ProtocolRecord::ownership_transferred(
            token_id,
            from,
            to,
            removed.clone(),
        ));
        info!(
            token_id,
            from = %from,
            to = %to,
            modules_removed = removed.len(),
            "controlling token transferred, account reset to validator-only"
        );

        Ok(removed)
    }

    // -- upgrades -----------------------------------------------------------

    /// Swap the factory's implementation reference.
    pub fn upgrade_implementation(
        &mut self,
        next: ImplementationRef,
    ) -> Result<(), FactoryError> {
        if next.version <= self.implementation.version {
            return Err(FactoryError::StaleImplementation {
                current: self.implementation.version,
                proposed: next.version,
            });
        }
        let previous = self.implementation;
        self.implementation = next;
        self.events.push(ProtocolRecord::implementation_upgraded(
            "account-factory",
            previous,
            next,
        ));
        info!(previous = %previous, current = %next, "factory implementation upgraded");
        Ok(())
    }

    /// Swap the validator implementation behind a token's account.
    ///
    /// The binding is preserved by construction; the swap is refused if
    /// the version does not strictly increase.
    pub fn upgrade_validator(
        &mut self,
        token_id: TokenId,
        next: ImplementationRef,
    ) -> Result<(), FactoryError> {
        let address = self.registry.address_of(token_id)?;
        let account = self
            .accounts
            .get_mut(&address)
            .ok_or(FactoryError::NotFound(address))?;
        let previous = account.validator_mut().upgrade(next)?;
        self.events.push(ProtocolRecord::implementation_upgraded(
            "ownership-validator",
            previous,
            next,
        ));
        info!(token_id, previous = %previous, current = %next, "validator implementation upgraded");
        Ok(())
    }
}

impl fmt::Debug for AccountFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountFactory")
            .field("address", &self.address)
            .field("network_id", &self.network_id)
            .field("fee", &self.fee)
            .field("minted", &self.ledger.total_minted())
            .field("deployers", &self.deployers.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_deployer::DeployError;
    use signet_protocol::config::NETWORK_ID_DEVNET;
    use signet_protocol::crypto::SignetKeypair;

    fn signer(seed: u8) -> (SignetKeypair, SignetAddress) {
        let kp = SignetKeypair::from_seed(&[seed; 32]);
        let addr = SignetAddress::from_public_key(&kp.public_key());
        (kp, addr)
    }

    fn factory() -> AccountFactory {
        let factory_addr = SignetAddress::from_digest([0xF0; 32]);
        AccountFactory::new(factory_addr, NETWORK_ID_DEVNET, FeePolicy::None).unwrap()
    }

    /// A deployer that honors the requested address.
    struct HonestDeployer;

    impl AccountDeployer for HonestDeployer {
        fn predictable(&self) -> bool {
            true
        }
        fn deploy(&mut self, request: &DeployRequest<'_>) -> Result<SignetAddress, DeployError> {
            Ok(request.expected_address)
        }
    }

    /// A predictable deployer that breaks its promise.
    struct LyingDeployer;

    impl AccountDeployer for LyingDeployer {
        fn predictable(&self) -> bool {
            true
        }
        fn deploy(&mut self, _request: &DeployRequest<'_>) -> Result<SignetAddress, DeployError> {
            Ok(SignetAddress::from_digest([0xBD; 32]))
        }
    }

    /// A deployer that picks its own addresses and says so.
    struct VanityDeployer(u8);

    impl AccountDeployer for VanityDeployer {
        fn predictable(&self) -> bool {
            false
        }
        fn deploy(&mut self, request: &DeployRequest<'_>) -> Result<SignetAddress, DeployError> {
            Ok(SignetAddress::from_digest([
                self.0.wrapping_add(request.token_id as u8);
                32
            ]))
        }
    }

    /// A deployer that always fails.
    struct BrokenDeployer;

    impl AccountDeployer for BrokenDeployer {
        fn predictable(&self) -> bool {
            true
        }
        fn deploy(&mut self, _request: &DeployRequest<'_>) -> Result<SignetAddress, DeployError> {
            Err(DeployError::CodeNotProduced {
                reason: "out of gas".into(),
            })
        }
    }

    #[test]
    fn mint_returns_sequential_ids_and_deploys() {
        let mut f = factory();
        let (_, alice) = signer(1);

        let r1 = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();
        let r2 = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();
        assert_eq!(r1.token_id, 1);
        assert_eq!(r2.token_id, 2);
        assert_ne!(r1.account, r2.account);
        assert!(f.is_account_deployed(1).unwrap());
        assert!(f.is_account_deployed(2).unwrap());
    }

    #[test]
    fn account_address_matches_receipt_and_is_stable() {
        let mut f = factory();
        let (_, alice) = signer(1);
        let receipt = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();

        assert_eq!(f.account_address(receipt.token_id).unwrap(), receipt.account);
        assert_eq!(f.account_address(receipt.token_id).unwrap(), receipt.account);
    }

    #[test]
    fn reverse_lookup_inverts_forward_lookup() {
        let mut f = factory();
        let (_, alice) = signer(1);
        let receipt = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();
        assert_eq!(f.token_of(&receipt.account).unwrap(), receipt.token_id);
    }

    #[test]
    fn lookups_on_unminted_token_fail() {
        let f = factory();
        assert!(matches!(
            f.account_address(99),
            Err(FactoryError::InvalidTokenId(99))
        ));
        assert!(matches!(
            f.is_account_deployed(99),
            Err(FactoryError::InvalidTokenId(99))
        ));
        assert!(matches!(
            f.token_of(&SignetAddress::from_digest([1; 32])),
            Err(FactoryError::NotFound(_))
        ));
    }

    #[test]
    fn value_is_forwarded_to_the_account() {
        let mut f = factory();
        let (_, alice) = signer(1);
        let receipt = f.mint(alice, &DeployConfig::embedded(), 10_000).unwrap();
        assert_eq!(f.account(&receipt.account).unwrap().balance(), 10_000);
        assert_eq!(f.collected_fees(), 0);
    }

    #[test]
    fn flat_fee_is_deducted_and_accrued() {
        let factory_addr = SignetAddress::from_digest([0xF0; 32]);
        let mut f =
            AccountFactory::new(factory_addr, NETWORK_ID_DEVNET, FeePolicy::Flat(250)).unwrap();
        let (_, alice) = signer(1);

        let receipt = f.mint(alice, &DeployConfig::embedded(), 1_000).unwrap();
        assert_eq!(f.account(&receipt.account).unwrap().balance(), 750);
        assert_eq!(f.collected_fees(), 250);
    }

    #[test]
    fn fee_exceeding_value_rejects_the_mint() {
        let factory_addr = SignetAddress::from_digest([0xF0; 32]);
        let mut f =
            AccountFactory::new(factory_addr, NETWORK_ID_DEVNET, FeePolicy::Flat(500)).unwrap();
        let (_, alice) = signer(1);

        let err = f.mint(alice, &DeployConfig::embedded(), 100).unwrap_err();
        assert!(matches!(err, FactoryError::FeeExceedsValue { fee: 500, value: 100 }));
        // Nothing was minted.
        assert_eq!(f.ownership().total_minted(), 0);
        assert!(f.events().is_empty());
    }

    #[test]
    fn fee_above_protocol_bound_rejected_at_construction() {
        let factory_addr = SignetAddress::from_digest([0xF0; 32]);
        let result = AccountFactory::new(
            factory_addr,
            NETWORK_ID_DEVNET,
            FeePolicy::Flat(MAX_MINT_FEE_GRAINS + 1),
        );
        assert!(matches!(result, Err(FactoryError::FeeAboveBound { .. })));
    }

    #[test]
    fn honest_predictable_deployer_lands_at_derived_address() {
        let mut f = factory();
        f.register_deployer("honest", Box::new(HonestDeployer)).unwrap();
        let (_, alice) = signer(1);

        let embedded_prediction = {
            let salt = Salt::derive(&f.address(), 1, f.network_id(), None);
            account_address(&f.address(), 1, f.network_id(), &salt)
        };
        let receipt = f.mint(alice, &DeployConfig::delegated("honest"), 0).unwrap();
        assert_eq!(receipt.account, embedded_prediction);
    }

    #[test]
    fn lying_predictable_deployer_fails_atomically() {
        let mut f = factory();
        f.register_deployer("liar", Box::new(LyingDeployer)).unwrap();
        let (_, alice) = signer(1);

        let err = f.mint(alice, &DeployConfig::delegated("liar"), 500).unwrap_err();
        assert!(matches!(err, FactoryError::DeploymentFailed { token_id: 1, .. }));

        // No token minted, no registry entry, no value moved.
        assert_eq!(f.ownership().total_minted(), 0);
        assert!(matches!(f.account_address(1), Err(FactoryError::InvalidTokenId(1))));
        assert!(f.events().is_empty());

        // The id was not burned either: the next mint still gets 1.
        let receipt = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();
        assert_eq!(receipt.token_id, 1);
    }

    #[test]
    fn broken_deployer_fails_atomically() {
        let mut f = factory();
        f.register_deployer("broken", Box::new(BrokenDeployer)).unwrap();
        let (_, alice) = signer(1);

        let err = f.mint(alice, &DeployConfig::delegated("broken"), 0).unwrap_err();
        assert!(matches!(err, FactoryError::DeploymentFailed { .. }));
        assert_eq!(f.ownership().total_minted(), 0);
    }

    #[test]
    fn unknown_deployer_rejected() {
        let mut f = factory();
        let (_, alice) = signer(1);
        assert!(matches!(
            f.mint(alice, &DeployConfig::delegated("ghost"), 0),
            Err(FactoryError::UnknownDeployer(_))
        ));
    }

    #[test]
    fn duplicate_deployer_name_rejected() {
        let mut f = factory();
        f.register_deployer("d", Box::new(HonestDeployer)).unwrap();
        assert!(matches!(
            f.register_deployer("d", Box::new(HonestDeployer)),
            Err(FactoryError::DeployerExists(_))
        ));
    }

    #[test]
    fn unpredictable_address_is_persisted_in_registry() {
        let mut f = factory();
        f.register_deployer("vanity", Box::new(VanityDeployer(0x40))).unwrap();
        let (_, alice) = signer(1);

        let receipt = f.mint(alice, &DeployConfig::delegated("vanity"), 0).unwrap();
        // The produced address differs from the pure derivation, but the
        // registry makes the lookup deterministic anyway.
        let salt = Salt::derive(&f.address(), receipt.token_id, f.network_id(), None);
        let derived = account_address(&f.address(), receipt.token_id, f.network_id(), &salt);
        assert_ne!(receipt.account, derived);
        assert_eq!(f.account_address(receipt.token_id).unwrap(), receipt.account);
        assert_eq!(f.token_of(&receipt.account).unwrap(), receipt.token_id);
    }

    #[test]
    fn distinct_extra_salts_give_distinct_addresses() {
        let mut f = factory();
        let (_, alice) = signer(1);
        let r1 = f
            .mint(
                alice,
                &DeployConfig::embedded().with_extra_salt([1u8; 32]),
                0,
            )
            .unwrap();
        let r2 = f
            .mint(
                alice,
                &DeployConfig::embedded().with_extra_salt([2u8; 32]),
                0,
            )
            .unwrap();
        assert_ne!(r1.token_id, r2.token_id);
        assert_ne!(r1.account, r2.account);
    }

    #[test]
    fn mint_emits_a_creation_record() {
        let mut f = factory();
        let (_, alice) = signer(1);
        let receipt = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();

        assert_eq!(f.events().len(), 1);
        match &f.events()[0] {
            ProtocolRecord::AccountCreated {
                token_id,
                account,
                minter,
                ..
            } => {
                assert_eq!(*token_id, receipt.token_id);
                assert_eq!(*account, receipt.account);
                assert_eq!(*minter, alice);
            }
            other => panic!("expected AccountCreated, got {other:?}"),
        }
    }

    #[test]
    fn validator_binding_names_this_factory_and_token() {
        let mut f = factory();
        let (_, alice) = signer(1);
        let receipt = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();
        let account = f.account(&receipt.account).unwrap();
        assert_eq!(
            account.validator().controller(),
            (f.address(), receipt.token_id)
        );
    }

    #[test]
    fn metadata_exposes_the_account_address() {
        let mut f = factory();
        let (_, alice) = signer(1);
        let receipt = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();
        let meta = f.token_metadata(receipt.token_id).unwrap();
        assert_eq!(
            meta.account_address(),
            Some(receipt.account.to_bech32().as_str())
        );
    }

    #[test]
    fn factory_upgrade_emits_record_and_rejects_stale() {
        let mut f = factory();
        f.upgrade_implementation(ImplementationRef::from_code(b"factory-v2", 2))
            .unwrap();
        assert_eq!(f.implementation().version, 2);
        assert!(matches!(
            f.upgrade_implementation(ImplementationRef::from_code(b"factory-old", 2)),
            Err(FactoryError::StaleImplementation { .. })
        ));
        assert!(matches!(
            f.events().last().unwrap(),
            ProtocolRecord::ImplementationUpgraded { component, .. } if component == "account-factory"
        ));
    }

    #[test]
    fn validator_upgrade_preserves_binding() {
        let mut f = factory();
        let (_, alice) = signer(1);
        let receipt = f.mint(alice, &DeployConfig::embedded(), 0).unwrap();

        f.upgrade_validator(receipt.token_id, ImplementationRef::from_code(b"ov-v2", 2))
            .unwrap();
        let account = f.account(&receipt.account).unwrap();
        assert_eq!(
            account.validator().controller(),
            (f.address(), receipt.token_id)
        );
        assert_eq!(account.validator().implementation().version, 2);
    }
}

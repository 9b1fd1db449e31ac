//! # Transfer Guard
//!
//! The pre/post hooks on the token-transfer path. Stateless by design —
//! not a persistent entity, just two checks the transfer routine must run
//! in order, as explicit pipeline stages rather than virtual dispatch:
//!
//! 1. **Before** the ownership change commits: reject a destination equal
//!    to the token's own bound account. An account that needs its
//!    controlling token's authorization could never again authorize
//!    sending that token anywhere — the deadlock would be permanent, so
//!    the transfer is refused loudly rather than ignored silently.
//! 2. **After** a successful ownership change: wipe the account's module
//!    set down to the validator alone, unconditionally, however many
//!    modules the previous owner had installed. Residual capabilities
//!    are residual authority.

use thiserror::Error;

use signet_protocol::identity::SignetAddress;

use crate::address_registry::AddressRegistry;
use crate::bound_account::{BoundAccount, ModuleId};
use crate::token_ledger::TokenId;

/// Rejections raised on the pre-transfer stage.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The destination is the token's own bound account.
    #[error("transfer of token {token_id} to its own bound account {account} is forbidden")]
    SelfTransferRejected {
        /// The token being transferred.
        token_id: TokenId,
        /// The bound account it was aimed at.
        account: SignetAddress,
    },
}

/// Pre-transfer stage: refuse self-referential destinations.
///
/// Tokens the registry does not know about pass through — whether such a
/// transfer is meaningful at all is the caller's problem, not the
/// guard's.
pub fn check_destination(
    registry: &AddressRegistry,
    token_id: TokenId,
    to: &SignetAddress,
) -> Result<(), GuardError> {
    if let Ok(account) = registry.address_of(token_id) {
        if account == *to {
            return Err(GuardError::SelfTransferRejected { token_id, account });
        }
    }
    Ok(())
}

/// Post-transfer stage: collapse the module set to `{validator}`.
///
/// Returns the modules that were removed, for the transfer record.
pub fn reset_account(account: &mut BoundAccount) -> Vec<ModuleId> {
    account.reset_modules()
}

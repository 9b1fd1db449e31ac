//! # Protocol Records
//!
//! The append-only event log the factory emits as it works: one record
//! per account creation, per completed ownership transfer, and per
//! implementation swap. Records are plain serializable data — whatever
//! indexing or display layer sits above this core gets the facts, not an
//! interpretation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signet_protocol::identity::SignetAddress;
use uuid::Uuid;

use crate::bound_account::ModuleId;
use crate::ownership_validator::ImplementationRef;
use crate::token_ledger::TokenId;

/// One entry in the factory's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProtocolRecord {
    /// A token and its bound account came into existence.
    AccountCreated {
        /// Unique record identifier.
        record_id: Uuid,
        /// The minted controlling token.
        token_id: TokenId,
        /// The deployed account address.
        account: SignetAddress,
        /// Who paid for the mint.
        minter: SignetAddress,
        /// When the mint committed.
        created_at: DateTime<Utc>,
    },

    /// A controlling token changed hands and the bound account was
    /// reset to validator-only state.
    OwnershipTransferred {
        /// Unique record identifier.
        record_id: Uuid,
        /// The token that moved.
        token_id: TokenId,
        /// Previous owner.
        from: SignetAddress,
        /// New owner.
        to: SignetAddress,
        /// Modules wiped from the bound account by the transfer guard.
        modules_removed: Vec<ModuleId>,
        /// When the transfer committed.
        occurred_at: DateTime<Utc>,
    },

    /// A swappable implementation behind the factory or a validator
    /// changed.
    ImplementationUpgraded {
        /// Unique record identifier.
        record_id: Uuid,
        /// Which component was upgraded ("account-factory" or
        /// "ownership-validator").
        component: String,
        /// The reference before the swap.
        previous: ImplementationRef,
        /// The reference after the swap.
        current: ImplementationRef,
        /// When the upgrade committed.
        occurred_at: DateTime<Utc>,
    },
}

impl ProtocolRecord {
    pub(crate) fn account_created(
        token_id: TokenId,
        account: SignetAddress,
        minter: SignetAddress,
    ) -> Self {
        Self::AccountCreated {
            record_id: Uuid::new_v4(),
            token_id,
            account,
            minter,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn ownership_transferred(
        token_id: TokenId,
        from: SignetAddress,
        to: SignetAddress,
        modules_removed: Vec<ModuleId>,
    ) -> Self {
        Self::OwnershipTransferred {
            record_id: Uuid::new_v4(),
            token_id,
            from,
            to,
            modules_removed,
            occurred_at: Utc::now(),
        }
    }

    pub(crate) fn implementation_upgraded(
        component: impl Into<String>,
        previous: ImplementationRef,
        current: ImplementationRef,
    ) -> Self {
        Self::ImplementationUpgraded {
            record_id: Uuid::new_v4(),
            component: component.into(),
            previous,
            current,
            occurred_at: Utc::now(),
        }
    }

    /// The record's unique id.
    pub fn record_id(&self) -> Uuid {
        match self {
            Self::AccountCreated { record_id, .. }
            | Self::OwnershipTransferred { record_id, .. }
            | Self::ImplementationUpgraded { record_id, .. } => *record_id,
        }
    }

    /// The token this record concerns, when it concerns one.
    pub fn token_id(&self) -> Option<TokenId> {
        match self {
            Self::AccountCreated { token_id, .. }
            | Self::OwnershipTransferred { token_id, .. } => Some(*token_id),
            Self::ImplementationUpgraded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> SignetAddress {
        SignetAddress::from_digest([byte; 32])
    }

    #[test]
    fn records_carry_unique_ids() {
        let a = ProtocolRecord::account_created(1, addr(1), addr(2));
        let b = ProtocolRecord::account_created(1, addr(1), addr(2));
        assert_ne!(a.record_id(), b.record_id());
    }

    #[test]
    fn token_id_accessor() {
        let created = ProtocolRecord::account_created(3, addr(1), addr(2));
        assert_eq!(created.token_id(), Some(3));

        let upgraded = ProtocolRecord::implementation_upgraded(
            "account-factory",
            ImplementationRef::from_code(b"a", 1),
            ImplementationRef::from_code(b"b", 2),
        );
        assert_eq!(upgraded.token_id(), None);
    }

    #[test]
    fn record_serde_roundtrip() {
        let record =
            ProtocolRecord::ownership_transferred(5, addr(1), addr(2), vec![]);
        let json = serde_json::to_string(&record).unwrap();
        let restored: ProtocolRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.record_id(), restored.record_id());
        assert_eq!(restored.token_id(), Some(5));
    }
}

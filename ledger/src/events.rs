//! # Audit Events
//!
//! Every mutating operation that changes durable state appends exactly one
//! [`LedgerEvent`] to the ledger's in-order journal. The journal is the
//! only externally observable "wire format" of the core -- dashboards and
//! indexers consume it; the ledger itself never reads it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::AccountId;
use crate::vault::token::TokenId;

/// One audit record per durable mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A new identity registered.
    UserRegistered {
        /// The registering identity.
        account: AccountId,
        /// The claimed username.
        username: String,
        /// When.
        timestamp: DateTime<Utc>,
    },

    /// An existing profile changed.
    UserProfileUpdated {
        /// The identity.
        account: AccountId,
        /// The (possibly unchanged) username after the update.
        new_username: String,
        /// When.
        timestamp: DateTime<Utc>,
    },

    /// An identity performed the emergency unwind.
    UserDeactivated {
        /// The identity that was erased.
        account: AccountId,
        /// When.
        timestamp: DateTime<Utc>,
        /// Total principal returned across all force-withdrawn locks.
        refunded_total: u64,
    },

    /// A deposit became a lock.
    SavingsLockCreated {
        /// The new lock's global id.
        lock_id: u64,
        /// The depositor.
        account: AccountId,
        /// The locked asset.
        token: TokenId,
        /// Locked principal in smallest units.
        amount: u64,
        /// When the lock matures.
        unlock_time: DateTime<Utc>,
    },

    /// A lock was withdrawn.
    SavingsWithdrawn {
        /// The withdrawn lock.
        lock_id: u64,
        /// The recipient.
        account: AccountId,
        /// What was paid out.
        payout: u64,
        /// What was withheld.
        penalty: u64,
        /// Whether maturity had not yet been reached.
        was_early: bool,
    },

    /// The owner paused deposits.
    VaultPaused {
        /// When.
        timestamp: DateTime<Utc>,
    },

    /// The owner lifted the pause.
    VaultUnpaused {
        /// When.
        timestamp: DateTime<Utc>,
    },

    /// The owner repointed a token slot.
    TokenUpdated {
        /// Which slot changed.
        slot: usize,
        /// The identifier that was replaced.
        old_token: TokenId,
        /// The identifier now in the slot.
        new_token: TokenId,
    },
}

impl LedgerEvent {
    /// Stable label for log lines and journal filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::UserRegistered { .. } => "user_registered",
            LedgerEvent::UserProfileUpdated { .. } => "user_profile_updated",
            LedgerEvent::UserDeactivated { .. } => "user_deactivated",
            LedgerEvent::SavingsLockCreated { .. } => "savings_lock_created",
            LedgerEvent::SavingsWithdrawn { .. } => "savings_withdrawn",
            LedgerEvent::VaultPaused { .. } => "vault_paused",
            LedgerEvent::VaultUnpaused { .. } => "vault_unpaused",
            LedgerEvent::TokenUpdated { .. } => "token_updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let now = Utc::now();
        let account = AccountId::random();
        let events = vec![
            LedgerEvent::UserRegistered {
                account,
                username: "alice_saves".into(),
                timestamp: now,
            },
            LedgerEvent::UserProfileUpdated {
                account,
                new_username: "alice_updated".into(),
                timestamp: now,
            },
            LedgerEvent::UserDeactivated {
                account,
                timestamp: now,
                refunded_total: 0,
            },
            LedgerEvent::SavingsLockCreated {
                lock_id: 0,
                account,
                token: TokenId::from_bytes([1; 32]),
                amount: 1,
                unlock_time: now,
            },
            LedgerEvent::SavingsWithdrawn {
                lock_id: 0,
                account,
                payout: 1,
                penalty: 0,
                was_early: false,
            },
            LedgerEvent::VaultPaused { timestamp: now },
            LedgerEvent::VaultUnpaused { timestamp: now },
            LedgerEvent::TokenUpdated {
                slot: 0,
                old_token: TokenId::from_bytes([1; 32]),
                new_token: TokenId::from_bytes([2; 32]),
            },
        ];
        let mut kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), events.len());
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = LedgerEvent::SavingsWithdrawn {
            lock_id: 42,
            account: AccountId::random(),
            payout: 999_990,
            penalty: 10,
            was_early: true,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let recovered: LedgerEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(event, recovered);
    }
}

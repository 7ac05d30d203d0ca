//! # Lock Records
//!
//! A [`Lock`] is one deposit: its amount, token, and maturity window. The
//! record is immutable after creation except for the withdrawal-time flip,
//! which moves it through a two-state machine:
//!
//! ```text
//!    ┌──────────┐   withdraw / deactivate   ┌─────────────┐
//!    │  Active  │ ─────────────────────────►│  Withdrawn  │ ← terminal
//!    └──────────┘                           └─────────────┘
//! ```
//!
//! There is no third state. `is_active` and `is_withdrawn` are stored as
//! two booleans (matching the external record shape indexers consume) but
//! are flipped together, exactly once.
//!
//! [`UserLockInfo`] is the per-identity aggregate: totals over active locks
//! plus the append-only id history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{
    MAX_LOCK_AMOUNT, MAX_LOCK_DURATION_SECS, MAX_TITLE_LENGTH, MAX_USER_LOCKS,
    MIN_LOCK_DURATION_SECS,
};
use crate::identity::AccountId;
use crate::vault::token::TokenId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from lock-store operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock id was never issued.
    #[error("lock not found: {0}")]
    NotFound(u64),

    /// The caller does not own this lock.
    #[error("lock {lock_id} does not belong to caller {caller}")]
    NotLockOwner {
        /// The lock in question.
        lock_id: u64,
        /// Who tried to touch it.
        caller: AccountId,
    },

    /// The lock was already withdrawn.
    #[error("lock already withdrawn: {0}")]
    AlreadyWithdrawn(u64),

    /// Deposits of zero are rejected.
    #[error("amount must be greater than 0")]
    ZeroAmount,

    /// Duration outside the configured window.
    #[error(
        "invalid lock duration: {seconds}s (allowed {MIN_LOCK_DURATION_SECS}..={MAX_LOCK_DURATION_SECS})"
    )]
    InvalidDuration {
        /// The rejected duration.
        seconds: u64,
    },

    /// Amount above the per-lock ceiling.
    #[error("amount exceeds maximum limit: {amount} (maximum {MAX_LOCK_AMOUNT})")]
    AmountAboveMaximum {
        /// The rejected amount.
        amount: u64,
    },

    /// The caller is at the active-lock cap.
    #[error("too many locks for user (maximum {MAX_USER_LOCKS})")]
    TooManyLocks,

    /// Title longer than the display limit.
    #[error("title too long: {length} bytes (maximum {MAX_TITLE_LENGTH})")]
    TitleTooLong {
        /// Length of the rejected title.
        length: usize,
    },

    /// An aggregate counter would overflow. If you're hitting this, someone
    /// is locking more than 18.4 quintillion smallest units. That's either
    /// a bug or an attack.
    #[error("aggregate overflow while applying amount {amount}")]
    Overflow {
        /// The amount that caused the overflow.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// Lock
// ---------------------------------------------------------------------------

/// A single deposit record with its own amount, token, and maturity time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    /// Global monotonically increasing id. Stable, never reused.
    pub id: u64,

    /// The identity that made the deposit.
    pub owner: AccountId,

    /// Which fungible asset this lock holds. Fixed at creation; token
    /// migrations in the vault configuration never rewrite it.
    pub token: TokenId,

    /// Original deposited quantity in smallest units. Immutable.
    pub amount: u64,

    /// When the deposit was made (UTC).
    pub lock_time: DateTime<Utc>,

    /// When the lock matures: `lock_time + duration`.
    pub unlock_time: DateTime<Utc>,

    /// Optional display title, at most 50 bytes. The ledger never reads it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// `true` from creation until withdrawal.
    pub is_active: bool,

    /// `true` once withdrawn. Together with `is_active` this forms the
    /// two-state machine; the pair is flipped atomically.
    pub is_withdrawn: bool,

    /// Penalty assessed at withdrawal. Zero unless withdrawn early; set
    /// exactly once.
    pub penalty_amount: u64,
}

impl Lock {
    /// Creates an active lock. Callers validate bounds first; this only
    /// assembles the record.
    pub(crate) fn new(
        id: u64,
        owner: AccountId,
        token: TokenId,
        amount: u64,
        duration_secs: u64,
        title: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            token,
            amount,
            lock_time: now,
            unlock_time: now + Duration::seconds(duration_secs as i64),
            title,
            is_active: true,
            is_withdrawn: false,
            penalty_amount: 0,
        }
    }

    /// Returns `true` once the maturity time has been reached.
    pub fn is_matured(&self, now: DateTime<Utc>) -> bool {
        now >= self.unlock_time
    }

    /// Flips the record into its terminal state. Internal: the store is
    /// responsible for checking `is_active` first and for updating the
    /// aggregates in the same operation.
    pub(crate) fn mark_withdrawn(&mut self, penalty: u64) {
        debug_assert!(self.is_active && !self.is_withdrawn);
        self.is_active = false;
        self.is_withdrawn = true;
        self.penalty_amount = penalty;
    }

    /// Reverses [`mark_withdrawn`](Self::mark_withdrawn). Only used when
    /// the payout transfer failed and the operation must roll back.
    pub(crate) fn reinstate(&mut self) {
        debug_assert!(!self.is_active && self.is_withdrawn);
        self.is_active = true;
        self.is_withdrawn = false;
        self.penalty_amount = 0;
    }
}

/// Validates an optional lock title.
pub fn validate_title(title: Option<&str>) -> Result<(), LockError> {
    if let Some(title) = title {
        if title.len() > MAX_TITLE_LENGTH {
            return Err(LockError::TitleTooLong {
                length: title.len(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// UserLockInfo
// ---------------------------------------------------------------------------

/// Per-identity aggregate over that user's locks.
///
/// `total_active_amount` and `total_active_locks` always equal the sum and
/// count over the user's currently-active locks; `lock_ids` is the full
/// history in insertion order, withdrawn locks included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLockInfo {
    /// Sum of `amount` over this user's active locks.
    pub total_active_amount: u64,

    /// Count of this user's active locks.
    pub total_active_locks: u64,

    /// Every lock id ever issued to this user, in insertion order.
    pub lock_ids: Vec<u64>,
}

impl UserLockInfo {
    pub(crate) fn record_creation(&mut self, lock_id: u64, amount: u64) -> Result<(), LockError> {
        let total = self
            .total_active_amount
            .checked_add(amount)
            .ok_or(LockError::Overflow { amount })?;
        self.total_active_amount = total;
        self.total_active_locks += 1;
        self.lock_ids.push(lock_id);
        Ok(())
    }

    pub(crate) fn record_withdrawal(&mut self, amount: u64) {
        debug_assert!(self.total_active_amount >= amount && self.total_active_locks > 0);
        self.total_active_amount -= amount;
        self.total_active_locks -= 1;
    }

    pub(crate) fn undo_withdrawal(&mut self, amount: u64) {
        self.total_active_amount += amount;
        self.total_active_locks += 1;
    }
}

//! # Lock Store
//!
//! The vault's book of record: an append-only, indexable collection of
//! [`Lock`]s with monotonic ids, the per-user [`UserLockInfo`] aggregates,
//! and the global [`PenaltyPool`]. Every mutation keeps the aggregate
//! invariant intact in the same call:
//!
//! ```text
//! pool.total_active_savings == Σ amount over all active locks
//! users[u].total_active_amount == Σ amount over u's active locks
//! ```
//!
//! The store validates value bounds (amounts, durations, per-user caps) and
//! lock-level state preconditions; identity and pause preconditions belong
//! to the engine. Mutations that the engine may need to unwind after a
//! failed custody transfer come with explicit reverse operations --
//! [`revert_withdrawal`](LockStore::revert_withdrawal) and the
//! [`capture_user`](LockStore::capture_user)/[`restore_user`](LockStore::restore_user)
//! snapshot pair -- so a transfer failure leaves no trace.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{
    MAX_LOCK_AMOUNT, MAX_LOCK_DURATION_SECS, MAX_USER_LOCKS, MIN_LOCK_DURATION_SECS,
};
use crate::identity::AccountId;
use crate::vault::lock::{validate_title, Lock, LockError, UserLockInfo};
use crate::vault::penalty;
use crate::vault::token::TokenId;

// ---------------------------------------------------------------------------
// PenaltyPool
// ---------------------------------------------------------------------------

/// Global accumulators, one set per ledger instance.
///
/// `total_penalties` is a nominal mixed-token sum -- bookkeeping for the
/// product dashboard, not a balance anyone can spend. It only increases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyPool {
    /// Cumulative penalties ever assessed, across all users and tokens.
    pub total_penalties: u64,

    /// Sum of `amount` over all currently-active locks, system-wide.
    pub total_active_savings: u64,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a withdrawal did, with everything the engine needs to pay out,
/// emit the audit record, or roll the operation back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawalOutcome {
    /// The withdrawn lock.
    pub lock_id: u64,
    /// The lock's owner (and payout recipient).
    pub owner: AccountId,
    /// The asset to pay out, from the lock's own record.
    pub token: TokenId,
    /// Original principal.
    pub amount: u64,
    /// Penalty withheld.
    pub penalty: u64,
    /// Amount owed to the owner: `amount - penalty`.
    pub payout: u64,
    /// Whether the withdrawal beat the maturity time.
    pub was_early: bool,
}

/// What a deactivation unwound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeactivationOutcome {
    /// Refunds aggregated per token, in first-seen lock order. At most one
    /// entry per configured token, which bounds the custody transfers a
    /// deactivation can issue.
    pub refunds: Vec<(TokenId, u64)>,
    /// Sum over `refunds` -- the figure carried by the audit record.
    pub total_refunded: u64,
    /// The locks that were force-withdrawn.
    pub lock_ids: Vec<u64>,
}

/// Snapshot of one user's slice of the store, for deactivation rollback.
/// Bounded: at most `MAX_USER_LOCKS` lock records.
#[derive(Clone, Debug)]
pub struct UserStoreSnapshot {
    owner: AccountId,
    info: Option<UserLockInfo>,
    locks: Vec<Lock>,
    pool: PenaltyPool,
    active_locks: u64,
}

// ---------------------------------------------------------------------------
// LockStore
// ---------------------------------------------------------------------------

/// Append-only lock collection plus aggregates.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LockStore {
    /// Every lock ever issued, keyed by id. `BTreeMap` keeps global
    /// iteration in id order, which is also creation order.
    locks: BTreeMap<u64, Lock>,

    /// Next id to issue. Ids start at 0 and are never reused.
    next_id: u64,

    /// Per-user aggregates. An entry exists from registration until
    /// deactivation, even when the user holds no locks.
    users: HashMap<AccountId, UserLockInfo>,

    /// The global accumulators.
    pool: PenaltyPool,

    /// Count of currently-active locks system-wide.
    active_locks: u64,
}

impl LockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // User lifecycle
    // -----------------------------------------------------------------------

    /// Initializes an empty aggregate for a newly registered user.
    pub(crate) fn init_user(&mut self, owner: AccountId) {
        self.users.entry(owner).or_default();
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Validates everything about a prospective lock without mutating.
    ///
    /// Check order is part of the observable contract: zero amount, then
    /// duration window, then amount ceiling, then per-user cap, then title
    /// length, then aggregate headroom. The engine calls this before moving
    /// any funds so a rejected deposit never touches custody.
    pub(crate) fn validate_creation(
        &self,
        owner: &AccountId,
        duration_secs: u64,
        amount: u64,
        title: Option<&str>,
    ) -> Result<(), LockError> {
        if amount == 0 {
            return Err(LockError::ZeroAmount);
        }
        if !(MIN_LOCK_DURATION_SECS..=MAX_LOCK_DURATION_SECS).contains(&duration_secs) {
            return Err(LockError::InvalidDuration {
                seconds: duration_secs,
            });
        }
        if amount > MAX_LOCK_AMOUNT {
            return Err(LockError::AmountAboveMaximum { amount });
        }
        let active = self
            .users
            .get(owner)
            .map(|info| info.total_active_locks)
            .unwrap_or(0);
        if active as usize >= MAX_USER_LOCKS {
            return Err(LockError::TooManyLocks);
        }
        validate_title(title)?;

        // Aggregate headroom, so the post-transfer bookkeeping is
        // infallible and never needs to claw funds back.
        let user_total = self
            .users
            .get(owner)
            .map(|info| info.total_active_amount)
            .unwrap_or(0);
        if user_total.checked_add(amount).is_none()
            || self.pool.total_active_savings.checked_add(amount).is_none()
        {
            return Err(LockError::Overflow { amount });
        }
        Ok(())
    }

    /// Appends a validated lock and applies the aggregate bumps.
    ///
    /// Callers must have run [`validate_creation`](Self::validate_creation)
    /// in the same critical section.
    pub(crate) fn insert(
        &mut self,
        owner: AccountId,
        token: TokenId,
        amount: u64,
        duration_secs: u64,
        title: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&Lock, LockError> {
        let id = self.next_id;
        let lock = Lock::new(id, owner, token, amount, duration_secs, title, now);

        // Fallible steps first, so a rejection leaves nothing half-applied.
        let new_total = self
            .pool
            .total_active_savings
            .checked_add(amount)
            .ok_or(LockError::Overflow { amount })?;
        self.users
            .entry(owner)
            .or_default()
            .record_creation(id, amount)?;
        self.pool.total_active_savings = new_total;
        self.active_locks += 1;
        self.next_id += 1;

        debug!(lock_id = id, owner = %owner, amount, "lock created");
        Ok(self.locks.entry(id).or_insert(lock))
    }

    // -----------------------------------------------------------------------
    // Withdrawal
    // -----------------------------------------------------------------------

    /// Withdraws a lock: precondition checks, penalty assessment, state
    /// flip, aggregate updates. Does NOT move funds -- the engine performs
    /// the custody transfer after this returns and calls
    /// [`revert_withdrawal`](Self::revert_withdrawal) if that transfer fails.
    pub(crate) fn withdraw(
        &mut self,
        caller: AccountId,
        lock_id: u64,
        now: DateTime<Utc>,
    ) -> Result<WithdrawalOutcome, LockError> {
        let lock = self
            .locks
            .get_mut(&lock_id)
            .ok_or(LockError::NotFound(lock_id))?;
        if lock.owner != caller {
            return Err(LockError::NotLockOwner { lock_id, caller });
        }
        if !lock.is_active {
            return Err(LockError::AlreadyWithdrawn(lock_id));
        }

        let assessment = penalty::assess(lock.amount, now, lock.unlock_time);
        let new_penalties = self
            .pool
            .total_penalties
            .checked_add(assessment.penalty)
            .ok_or(LockError::Overflow {
                amount: assessment.penalty,
            })?;

        lock.mark_withdrawn(assessment.penalty);
        let outcome = WithdrawalOutcome {
            lock_id,
            owner: lock.owner,
            token: lock.token,
            amount: lock.amount,
            penalty: assessment.penalty,
            payout: assessment.payout,
            was_early: assessment.was_early,
        };

        self.pool.total_penalties = new_penalties;
        self.pool.total_active_savings -= outcome.amount;
        self.active_locks -= 1;
        self.users
            .get_mut(&caller)
            .expect("active lock implies a user entry")
            .record_withdrawal(outcome.amount);

        debug!(
            lock_id,
            owner = %caller,
            payout = outcome.payout,
            penalty = outcome.penalty,
            early = outcome.was_early,
            "lock withdrawn"
        );
        Ok(outcome)
    }

    /// Reverses a withdrawal whose payout transfer failed: reinstates the
    /// lock and puts every aggregate back exactly where it was.
    pub(crate) fn revert_withdrawal(&mut self, outcome: &WithdrawalOutcome) {
        let lock = self
            .locks
            .get_mut(&outcome.lock_id)
            .expect("reverting a withdrawal we just performed");
        lock.reinstate();
        self.pool.total_penalties -= outcome.penalty;
        self.pool.total_active_savings += outcome.amount;
        self.active_locks += 1;
        self.users
            .get_mut(&outcome.owner)
            .expect("reverting a withdrawal we just performed")
            .undo_withdrawal(outcome.amount);
        debug!(lock_id = outcome.lock_id, "withdrawal rolled back");
    }

    // -----------------------------------------------------------------------
    // Deactivation
    // -----------------------------------------------------------------------

    /// Captures everything [`deactivate`](Self::deactivate) will touch, so
    /// the engine can restore it if a refund transfer fails.
    pub(crate) fn capture_user(&self, owner: AccountId) -> UserStoreSnapshot {
        let info = self.users.get(&owner).cloned();
        let locks = info
            .iter()
            .flat_map(|i| i.lock_ids.iter())
            .filter_map(|id| self.locks.get(id).cloned())
            .collect();
        UserStoreSnapshot {
            owner,
            info,
            locks,
            pool: self.pool,
            active_locks: self.active_locks,
        }
    }

    /// Restores a snapshot taken by [`capture_user`](Self::capture_user).
    pub(crate) fn restore_user(&mut self, snapshot: UserStoreSnapshot) {
        match snapshot.info {
            Some(info) => {
                self.users.insert(snapshot.owner, info);
            }
            None => {
                self.users.remove(&snapshot.owner);
            }
        }
        for lock in snapshot.locks {
            self.locks.insert(lock.id, lock);
        }
        self.pool = snapshot.pool;
        self.active_locks = snapshot.active_locks;
        debug!(owner = %snapshot.owner, "user state restored from snapshot");
    }

    /// Force-withdraws every active lock the user holds -- full principal,
    /// zero penalty -- and deletes the user's aggregate entry.
    ///
    /// Iteration is in stored (insertion) order and bounded by
    /// `MAX_USER_LOCKS`; refunds come back aggregated per token so the
    /// engine issues at most one transfer per token.
    pub(crate) fn deactivate(
        &mut self,
        owner: AccountId,
        _now: DateTime<Utc>,
    ) -> DeactivationOutcome {
        let info = self.users.remove(&owner).unwrap_or_default();

        let mut refunds: Vec<(TokenId, u64)> = Vec::new();
        let mut total_refunded: u64 = 0;
        let mut unwound: Vec<u64> = Vec::new();

        for id in &info.lock_ids {
            let lock = self
                .locks
                .get_mut(id)
                .expect("lock history references issued ids");
            if !lock.is_active {
                continue;
            }
            // Emergency unwind: the one early-withdrawal path with no
            // penalty. Not a user-initiated early exit.
            lock.mark_withdrawn(0);
            self.active_locks -= 1;
            total_refunded += lock.amount;
            match refunds.iter_mut().find(|(token, _)| *token == lock.token) {
                Some((_, sum)) => *sum += lock.amount,
                None => refunds.push((lock.token, lock.amount)),
            }
            unwound.push(*id);
        }

        debug_assert_eq!(total_refunded, info.total_active_amount);
        self.pool.total_active_savings -= total_refunded;

        debug!(owner = %owner, total_refunded, locks = unwound.len(), "user deactivated");
        DeactivationOutcome {
            refunds,
            total_refunded,
            lock_ids: unwound,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Looks up a single lock by global id.
    pub fn get(&self, lock_id: u64) -> Result<&Lock, LockError> {
        self.locks.get(&lock_id).ok_or(LockError::NotFound(lock_id))
    }

    /// Returns the user's full lock history -- withdrawn locks included --
    /// as parallel `(ids, records)` vectors in stored order.
    pub fn user_locks_with_details(&self, owner: &AccountId) -> (Vec<u64>, Vec<Lock>) {
        match self.users.get(owner) {
            Some(info) => {
                let locks = info
                    .lock_ids
                    .iter()
                    .filter_map(|id| self.locks.get(id).cloned())
                    .collect();
                (info.lock_ids.clone(), locks)
            }
            None => (Vec::new(), Vec::new()),
        }
    }

    /// Per-user aggregate, if the user has one.
    pub fn user_info(&self, owner: &AccountId) -> Option<&UserLockInfo> {
        self.users.get(owner)
    }

    /// Count of active locks system-wide.
    pub fn active_count(&self) -> u64 {
        self.active_locks
    }

    /// Count of active locks for one user.
    pub fn active_count_for(&self, owner: &AccountId) -> u64 {
        self.users
            .get(owner)
            .map(|info| info.total_active_locks)
            .unwrap_or(0)
    }

    /// The global accumulators.
    pub fn penalty_pool(&self) -> PenaltyPool {
        self.pool
    }

    /// Total locks ever issued.
    pub fn issued_count(&self) -> u64 {
        self.next_id
    }

    /// Recomputes every aggregate from the raw lock records and asserts
    /// they match the maintained counters. Test-harness helper.
    #[cfg(test)]
    pub fn assert_aggregate_consistency(&self) {
        let mut global_sum = 0u64;
        let mut global_count = 0u64;
        let mut per_user: HashMap<AccountId, (u64, u64)> = HashMap::new();
        for lock in self.locks.values().filter(|l| l.is_active) {
            global_sum += lock.amount;
            global_count += 1;
            let entry = per_user.entry(lock.owner).or_default();
            entry.0 += lock.amount;
            entry.1 += 1;
        }
        assert_eq!(self.pool.total_active_savings, global_sum);
        assert_eq!(self.active_locks, global_count);
        for (owner, info) in &self.users {
            let (sum, count) = per_user.get(owner).copied().unwrap_or((0, 0));
            assert_eq!(info.total_active_amount, sum, "user {} amount", owner);
            assert_eq!(info.total_active_locks, count, "user {} count", owner);
        }
    }
}

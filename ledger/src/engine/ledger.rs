//! # The Vault Ledger
//!
//! The four concerns of the accounting engine -- identity registry, lock
//! store, penalty/withdrawal arithmetic, and the access guards -- composed
//! behind one mutating surface. Everything a caller can do to the vault
//! goes through a [`Ledger`] method; everything a dashboard can ask is on
//! the read-only query surface.
//!
//! ## Atomicity
//!
//! Every mutating operation takes `&mut self`, so within one ledger
//! instance operations are serial by construction -- the borrow checker is
//! the critical section. Multi-threaded hosts wrap the engine in
//! [`SharedLedger`](super::shared::SharedLedger).
//!
//! ## Checks-effects-interactions
//!
//! The custody capability is external code. Both payout paths flip lock
//! state *before* invoking it, so any hypothetical re-entrant call finds
//! the lock already withdrawn and bounces off the precondition check. If
//! the transfer itself fails, the staged state changes are rolled back and
//! the custody error propagates as-is: fail cleanly, change nothing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::custody::{CustodyError, TokenCustody};
use crate::events::LedgerEvent;
use crate::identity::{AccountId, IdentityRegistry, RegistryError, UserProfile};
use crate::time::Clock;
use crate::vault::lock::{Lock, LockError, UserLockInfo};
use crate::vault::store::{LockStore, PenaltyPool, WithdrawalOutcome};
use crate::vault::token::{default_token_slots, AcceptedTokens, TokenError, TokenId};

use super::guards::{GuardError, PausePolicy, PauseState, PauseStatus};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Top-level error type for ledger operations.
///
/// Every failure is a synchronous rejection of the one invoking call, with
/// no partial state change. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An owner-only operation was invoked by somebody else.
    #[error("caller is not the owner: {caller}")]
    NotOwner {
        /// Who tried.
        caller: AccountId,
    },

    /// The vault is paused and the operation is gated by the pause policy.
    #[error("vault is paused")]
    Paused,

    /// The zero identity cannot own a vault.
    #[error("invalid owner: the zero identity cannot own a vault")]
    ZeroOwner,

    /// Pause-switch error (already paused / not paused).
    #[error("guard error: {0}")]
    Guard(#[from] GuardError),

    /// Identity-registry error.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Lock-store error.
    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    /// Token-configuration error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Fund-custody error, propagated as-is after rollback.
    #[error("custody error: {0}")]
    Custody(#[from] CustodyError),
}

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Construction parameters for a vault ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The administrative owner: may pause, unpause, and repoint tokens.
    pub owner: AccountId,

    /// Accepted token slots, in order. Slot 0 is the default deposit
    /// asset. 1 to 5 entries, no zero identifiers.
    pub tokens: Vec<TokenId>,

    /// What a pause blocks. Defaults to deposits only.
    pub pause_policy: PausePolicy,
}

impl LedgerConfig {
    /// Standard configuration: the five stock stablecoins, deposits-only
    /// pause scope.
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            tokens: default_token_slots(),
            pause_policy: PausePolicy::default(),
        }
    }

    /// Replaces the token slots.
    pub fn with_tokens(mut self, tokens: Vec<TokenId>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replaces the pause policy.
    pub fn with_pause_policy(mut self, policy: PausePolicy) -> Self {
        self.pause_policy = policy;
        self
    }
}

// ---------------------------------------------------------------------------
// WithdrawalReceipt
// ---------------------------------------------------------------------------

/// Receipt returned by [`Ledger::withdraw_savings`] with everything the
/// caller needs to reconcile the payout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// The withdrawn lock.
    pub lock_id: u64,

    /// The asset that was paid out.
    pub token: TokenId,

    /// Original principal of the lock.
    pub amount: u64,

    /// What was transferred to the caller: `amount - penalty`.
    pub payout: u64,

    /// What the penalty pool kept.
    pub penalty: u64,

    /// Whether the withdrawal beat `unlock_time`.
    pub was_early: bool,
}

impl From<WithdrawalOutcome> for WithdrawalReceipt {
    fn from(outcome: WithdrawalOutcome) -> Self {
        Self {
            lock_id: outcome.lock_id,
            token: outcome.token,
            amount: outcome.amount,
            payout: outcome.payout,
            penalty: outcome.penalty,
            was_early: outcome.was_early,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// A vault ledger instance.
///
/// All state is owned by the instance -- no process-wide globals -- so a
/// test harness can run any number of independent ledgers side by side.
/// Generic over the custody implementation so hosts keep typed access to
/// their custody layer via [`custody`](Self::custody)/[`custody_mut`](Self::custody_mut).
pub struct Ledger<C: TokenCustody> {
    owner: AccountId,
    tokens: AcceptedTokens,
    pause_policy: PausePolicy,
    pause: PauseState,
    registry: IdentityRegistry,
    store: LockStore,
    custody: C,
    clock: Arc<dyn Clock>,
    events: Vec<LedgerEvent>,
}

impl<C: TokenCustody> fmt::Debug for Ledger<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("owner", &self.owner)
            .field("tokens", &self.tokens)
            .field("paused", &self.pause.is_paused())
            .field("registered_users", &self.registry.len())
            .field("active_locks", &self.store.active_count())
            .finish_non_exhaustive()
    }
}

impl<C: TokenCustody> Ledger<C> {
    /// Constructs a vault, failing fast on a broken configuration: a zero
    /// owner, an empty token set, too many slots, or any zero token id.
    pub fn new(config: LedgerConfig, custody: C, clock: Arc<dyn Clock>) -> Result<Self, LedgerError> {
        if config.owner.is_zero() {
            return Err(LedgerError::ZeroOwner);
        }
        let tokens = AcceptedTokens::new(config.tokens)?;
        Ok(Self {
            owner: config.owner,
            tokens,
            pause_policy: config.pause_policy,
            pause: PauseState::default(),
            registry: IdentityRegistry::new(),
            store: LockStore::new(),
            custody,
            clock,
            events: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Identity Operations
    // -----------------------------------------------------------------------

    /// Registers the caller with a unique username.
    pub fn register_user(
        &mut self,
        caller: AccountId,
        username: &str,
        profile_image_hash: &str,
    ) -> Result<(), LedgerError> {
        let now = self.clock.now();
        self.registry.register(caller, username, profile_image_hash, now)?;
        self.store.init_user(caller);
        info!(account = %caller, username, "user registered");
        self.record(LedgerEvent::UserRegistered {
            account: caller,
            username: username.to_string(),
            timestamp: now,
        });
        Ok(())
    }

    /// Updates the caller's profile, renaming if the username differs.
    pub fn update_profile(
        &mut self,
        caller: AccountId,
        new_username: &str,
        new_profile_image_hash: &str,
    ) -> Result<(), LedgerError> {
        let now = self.clock.now();
        self.registry
            .update(caller, new_username, new_profile_image_hash, now)?;
        info!(account = %caller, username = new_username, "profile updated");
        self.record(LedgerEvent::UserProfileUpdated {
            account: caller,
            new_username: new_username.to_string(),
            timestamp: now,
        });
        Ok(())
    }

    /// Emergency account teardown: force-withdraws every active lock at
    /// full principal with zero penalty, releases the username, and erases
    /// the profile. Returns the total refunded.
    ///
    /// Bounded work: at most `MAX_USER_LOCKS` locks are unwound, and
    /// refunds are aggregated so at most one custody transfer per token is
    /// issued. Custody coverage is pre-checked before any state changes.
    pub fn deactivate_account(&mut self, caller: AccountId) -> Result<u64, LedgerError> {
        let now = self.clock.now();
        if !self.registry.is_registered(&caller) {
            return Err(RegistryError::NotRegistered(caller).into());
        }
        if self.pause_policy.blocks_withdrawals() && self.pause.is_paused() {
            return Err(LedgerError::Paused);
        }

        // Effects before interactions: locks flip and the profile is erased
        // before any transfer runs. The snapshot makes the whole operation
        // reversible if custody rejects a refund.
        let snapshot = self.store.capture_user(caller);
        let outcome = self.store.deactivate(caller, now);
        let profile = self.registry.remove(caller)?;

        for (token, refund) in &outcome.refunds {
            let held = self.custody.vault_balance(*token);
            if held < *refund {
                self.store.restore_user(snapshot);
                self.registry.reinstate(caller, profile);
                warn!(account = %caller, token = %token, "deactivation aborted: custody cannot cover refund");
                return Err(CustodyError::VaultInsufficient {
                    token: *token,
                    held,
                    requested: *refund,
                }
                .into());
            }
        }
        for (index, (token, refund)) in outcome.refunds.iter().enumerate() {
            if let Err(err) = self.custody.transfer_out(*token, caller, *refund) {
                // The pre-check passed, so custody changed underneath us.
                // Restore ledger state and surface the failure untouched;
                // refunds already paid in this call stay with the user and
                // reconcile against the restored (still-active) locks.
                warn!(account = %caller, transferred = index, "deactivation rolled back mid-refund");
                self.store.restore_user(snapshot);
                self.registry.reinstate(caller, profile);
                return Err(err.into());
            }
        }

        info!(account = %caller, refunded = outcome.total_refunded, "account deactivated");
        self.record(LedgerEvent::UserDeactivated {
            account: caller,
            timestamp: now,
            refunded_total: outcome.total_refunded,
        });
        Ok(outcome.total_refunded)
    }

    // -----------------------------------------------------------------------
    // Lock Operations
    // -----------------------------------------------------------------------

    /// Deposits `amount` of `token` (default: slot 0) into a new lock that
    /// matures `duration_secs` from now. Returns the new lock's id.
    ///
    /// Preconditions are checked in a fixed, observable order: registered;
    /// not paused; amount nonzero; duration in window; amount under the
    /// ceiling; caller under the active-lock cap; then title length and
    /// token acceptance. Funds move only after every check passes, and
    /// state changes only after the funds have moved.
    pub fn create_savings_lock(
        &mut self,
        caller: AccountId,
        duration_secs: u64,
        amount: u64,
        title: Option<&str>,
        token: Option<TokenId>,
    ) -> Result<u64, LedgerError> {
        let now = self.clock.now();
        if !self.registry.is_registered(&caller) {
            return Err(RegistryError::NotRegistered(caller).into());
        }
        if self.pause.is_paused() {
            return Err(LedgerError::Paused);
        }
        self.store
            .validate_creation(&caller, duration_secs, amount, title)?;
        let token = token.unwrap_or_else(|| self.tokens.primary());
        self.tokens.ensure_accepted(token)?;

        self.custody.transfer_in(token, caller, amount)?;
        let lock = self.store.insert(
            caller,
            token,
            amount,
            duration_secs,
            title.map(str::to_string),
            now,
        )?;
        let (lock_id, unlock_time) = (lock.id, lock.unlock_time);

        info!(account = %caller, lock_id, amount, "savings lock created");
        self.record(LedgerEvent::SavingsLockCreated {
            lock_id,
            account: caller,
            token,
            amount,
            unlock_time,
        });
        Ok(lock_id)
    }

    /// Withdraws a lock. Early withdrawals pay the flat penalty; matured
    /// ones are free. Either way the lock becomes terminal and the caller
    /// receives the payout in the lock's own token.
    pub fn withdraw_savings(
        &mut self,
        caller: AccountId,
        lock_id: u64,
    ) -> Result<WithdrawalReceipt, LedgerError> {
        let now = self.clock.now();
        if self.pause_policy.blocks_withdrawals() && self.pause.is_paused() {
            return Err(LedgerError::Paused);
        }

        // Effects first: the lock flips to Withdrawn before custody runs.
        let outcome = self.store.withdraw(caller, lock_id, now)?;
        if let Err(err) = self.custody.transfer_out(outcome.token, caller, outcome.payout) {
            self.store.revert_withdrawal(&outcome);
            warn!(account = %caller, lock_id, "withdrawal rolled back: payout transfer failed");
            return Err(err.into());
        }

        info!(
            account = %caller,
            lock_id,
            payout = outcome.payout,
            penalty = outcome.penalty,
            early = outcome.was_early,
            "savings withdrawn"
        );
        self.record(LedgerEvent::SavingsWithdrawn {
            lock_id,
            account: caller,
            payout: outcome.payout,
            penalty: outcome.penalty,
            was_early: outcome.was_early,
        });
        Ok(outcome.into())
    }

    // -----------------------------------------------------------------------
    // Administrative Operations
    // -----------------------------------------------------------------------

    /// Pauses the vault. Owner-only; rejects if already paused.
    pub fn pause(&mut self, caller: AccountId) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        let now = self.clock.now();
        self.pause.pause(now)?;
        info!("vault paused");
        self.record(LedgerEvent::VaultPaused { timestamp: now });
        Ok(())
    }

    /// Unpauses the vault. Owner-only; rejects if not paused.
    pub fn unpause(&mut self, caller: AccountId) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.pause.unpause()?;
        let now = self.clock.now();
        info!("vault unpaused");
        self.record(LedgerEvent::VaultUnpaused { timestamp: now });
        Ok(())
    }

    /// Repoints one accepted-token slot. Owner-only. Existing locks keep
    /// their stored token and remain withdrawable; only future deposits
    /// see the new configuration.
    pub fn update_token(
        &mut self,
        caller: AccountId,
        slot: usize,
        new_token: TokenId,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        let old_token = self.tokens.update_slot(slot, new_token)?;
        info!(slot, old = %old_token, new = %new_token, "token slot updated");
        self.record(LedgerEvent::TokenUpdated {
            slot,
            old_token,
            new_token,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Query Surface (read-only, side-effect-free)
    // -----------------------------------------------------------------------

    /// The profile behind an identity, if registered.
    pub fn get_user_profile(&self, account: &AccountId) -> Option<&UserProfile> {
        self.registry.profile(account)
    }

    /// Whether an identity has a live profile.
    pub fn is_user_registered(&self, account: &AccountId) -> bool {
        self.registry.is_registered(account)
    }

    /// Whether a username is unclaimed.
    pub fn is_username_available(&self, username: &str) -> bool {
        self.registry.is_username_available(username)
    }

    /// The identity behind a username, if claimed.
    pub fn resolve_username(&self, username: &str) -> Option<AccountId> {
        self.registry.resolve_username(username)
    }

    /// A user's full lock history (withdrawn locks included) in stored
    /// order, as parallel `(ids, records)` vectors.
    pub fn get_user_locks_with_details(&self, account: &AccountId) -> (Vec<u64>, Vec<Lock>) {
        self.store.user_locks_with_details(account)
    }

    /// A user's aggregate counters, if the user is registered.
    pub fn get_user_lock_info(&self, account: &AccountId) -> Option<&UserLockInfo> {
        self.store.user_info(account)
    }

    /// One lock by global id. Fails with `NotFound` for ids never issued.
    pub fn get_lock_details(&self, lock_id: u64) -> Result<&Lock, LedgerError> {
        Ok(self.store.get(lock_id)?)
    }

    /// The global accumulators.
    pub fn get_penalty_pool(&self) -> PenaltyPool {
        self.store.penalty_pool()
    }

    /// Count of active locks system-wide.
    pub fn get_active_savings_count(&self) -> u64 {
        self.store.active_count()
    }

    /// Count of one user's active locks.
    pub fn active_savings_count_for(&self, account: &AccountId) -> u64 {
        self.store.active_count_for(account)
    }

    /// The pause flag and timestamp.
    pub fn get_pause_status(&self) -> PauseStatus {
        self.pause.status()
    }

    /// The vault's administrative owner.
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    /// The accepted-token configuration.
    pub fn accepted_tokens(&self) -> &AcceptedTokens {
        &self.tokens
    }

    /// The audit journal, in emission order.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Drains the audit journal, handing the records to an indexer.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read access to the custody layer.
    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Mutable access to the custody layer, for host administration
    /// (minting test funds, adjusting allowances).
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    // -----------------------------------------------------------------------
    // Internal Helpers
    // -----------------------------------------------------------------------

    fn ensure_owner(&self, caller: AccountId) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::NotOwner { caller });
        }
        Ok(())
    }

    fn record(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }
}

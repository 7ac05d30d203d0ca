//! # Access & Safety Guards
//!
//! The pause switch and its policy. Pausing is a two-state machine with
//! explicit no-op rejection: pausing an already-paused vault and unpausing
//! a running one both fail loudly instead of silently succeeding -- an
//! operator who thinks they just paused a vault that was already paused is
//! an operator working from a stale picture of production.
//!
//! What a pause actually blocks is configurable via [`PausePolicy`]. The
//! deployed product only ever blocked new deposits; stricter hosts can gate
//! the payout paths too. Read-only queries are never blocked, and profile
//! operations move no funds so they are never blocked either.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the pause switch.
#[derive(Debug, Error)]
pub enum GuardError {
    /// `pause` called while already paused.
    #[error("vault is already paused")]
    AlreadyPaused,

    /// `unpause` called while not paused.
    #[error("vault is not paused")]
    NotPaused,
}

// ---------------------------------------------------------------------------
// PausePolicy
// ---------------------------------------------------------------------------

/// Which mutating operations a pause blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PausePolicy {
    /// Only `create_savings_lock` is blocked. Users can always get their
    /// money out. This matches the deployed product's observed behavior
    /// and is the default.
    #[default]
    DepositsOnly,

    /// `withdraw_savings` and `deactivate_account` are blocked as well --
    /// a full freeze of every fund-moving entry point.
    AllMutations,
}

impl PausePolicy {
    /// Whether this policy gates the payout paths.
    pub fn blocks_withdrawals(&self) -> bool {
        matches!(self, PausePolicy::AllMutations)
    }
}

// ---------------------------------------------------------------------------
// PauseState / PauseStatus
// ---------------------------------------------------------------------------

/// The pause flag plus when it was last raised.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct PauseState {
    paused: bool,
    paused_at: Option<DateTime<Utc>>,
}

impl PauseState {
    /// Raises the flag.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), GuardError> {
        if self.paused {
            return Err(GuardError::AlreadyPaused);
        }
        self.paused = true;
        self.paused_at = Some(now);
        Ok(())
    }

    /// Lowers the flag. The `paused_at` timestamp is cleared -- status
    /// reports only ever describe the current pause, not historical ones.
    pub fn unpause(&mut self) -> Result<(), GuardError> {
        if !self.paused {
            return Err(GuardError::NotPaused);
        }
        self.paused = false;
        self.paused_at = None;
        Ok(())
    }

    /// Current flag value.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Snapshot for the query surface.
    pub fn status(&self) -> PauseStatus {
        PauseStatus {
            paused: self.paused,
            paused_at: self.paused_at,
        }
    }
}

/// Read-only pause report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseStatus {
    /// Whether the vault is currently paused.
    pub paused: bool,

    /// When the current pause began; `None` while running.
    pub paused_at: Option<DateTime<Utc>>,
}

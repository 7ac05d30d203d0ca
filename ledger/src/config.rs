//! # Ledger Configuration & Constants
//!
//! Every magic number in Coffer lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! These values are part of the vault's observable contract -- clients
//! preview penalties and validate lock parameters against them before
//! submitting, so changing them after launch is a breaking change, not a
//! tuning knob.

// ---------------------------------------------------------------------------
// Lock Durations
// ---------------------------------------------------------------------------

/// Minimum lock duration: one day, in seconds.
///
/// Anything shorter isn't savings, it's a checking account with extra steps.
pub const MIN_LOCK_DURATION_SECS: u64 = 24 * 60 * 60;

/// Maximum lock duration: 365 days, in seconds.
///
/// A hard ceiling keeps "fat-fingered the duration field" from becoming a
/// multi-decade custody problem.
pub const MAX_LOCK_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Maximum amount for a single lock, in smallest units.
///
/// 10^18 -- large enough that no legitimate deposit will ever hit it, small
/// enough that aggregate sums stay comfortably inside `u64` headroom.
pub const MAX_LOCK_AMOUNT: u64 = 1_000_000_000_000_000_000;

/// Early-withdrawal penalty divisor.
///
/// `penalty = amount / PENALTY_DIVISOR`, integer division truncating toward
/// zero. 100_000 means a flat 0.001% of principal; amounts below 100_000
/// smallest units yield a zero penalty. The rate is flat on purpose -- one
/// second early and 364 days early pay the same -- and clients reproduce the
/// exact figure before submitting, so it must never round.
pub const PENALTY_DIVISOR: u64 = 100_000;

// ---------------------------------------------------------------------------
// Per-User Limits
// ---------------------------------------------------------------------------

/// Maximum simultaneously-active locks per user.
///
/// This bound is load-bearing: account deactivation force-withdraws every
/// active lock in a single call, so the worst case must stay constant-sized.
pub const MAX_USER_LOCKS: usize = 10;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Minimum username length in bytes.
pub const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length in bytes.
pub const USERNAME_MAX_LENGTH: usize = 32;

/// Human-readable prefix for Coffer account addresses (Bech32 HRP).
pub const ACCOUNT_HRP: &str = "cof";

// ---------------------------------------------------------------------------
// Locks: Display Metadata
// ---------------------------------------------------------------------------

/// Maximum length of a lock's optional title, in bytes. Display-only field;
/// the ledger never interprets it.
pub const MAX_TITLE_LENGTH: usize = 50;

// ---------------------------------------------------------------------------
// Token Configuration
// ---------------------------------------------------------------------------

/// Maximum number of accepted token slots a vault can be constructed with.
///
/// Five parallel stablecoin-like assets is the deployed configuration; the
/// cap also bounds the number of custody transfers a deactivation can issue
/// (one per token at most).
pub const MAX_ACCEPTED_TOKENS: usize = 5;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Returns `true` if the given duration (seconds) is an acceptable lock
/// duration. Mainly for client-side pre-validation; the ledger re-checks.
pub fn is_valid_lock_duration(duration_secs: u64) -> bool {
    (MIN_LOCK_DURATION_SECS..=MAX_LOCK_DURATION_SECS).contains(&duration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_bounds_sanity() {
        // If the minimum exceeds the maximum, no lock can ever be created.
        // Stranger things have shipped to production.
        assert!(MIN_LOCK_DURATION_SECS < MAX_LOCK_DURATION_SECS);
        assert_eq!(MIN_LOCK_DURATION_SECS, 86_400);
        assert_eq!(MAX_LOCK_DURATION_SECS, 31_536_000);
    }

    #[test]
    fn duration_validation_edges() {
        assert!(!is_valid_lock_duration(MIN_LOCK_DURATION_SECS - 1));
        assert!(is_valid_lock_duration(MIN_LOCK_DURATION_SECS));
        assert!(is_valid_lock_duration(MAX_LOCK_DURATION_SECS));
        assert!(!is_valid_lock_duration(MAX_LOCK_DURATION_SECS + 1));
    }

    #[test]
    fn penalty_divisor_matches_flat_rate() {
        // 0.001% == 1/100_000. The whole penalty engine hangs off this value.
        assert_eq!(PENALTY_DIVISOR, 100_000);
    }

    #[test]
    fn aggregate_headroom() {
        // The global active-savings counter must be able to absorb many
        // maximum-sized locks before overflowing u64.
        assert!(u64::MAX / MAX_LOCK_AMOUNT >= 18);
    }

    #[test]
    fn username_bounds_sanity() {
        assert!(USERNAME_MIN_LENGTH < USERNAME_MAX_LENGTH);
        assert_eq!(USERNAME_MIN_LENGTH, 3);
        assert_eq!(USERNAME_MAX_LENGTH, 32);
    }
}

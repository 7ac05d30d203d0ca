//! # Penalty Computation
//!
//! The single most safety-critical arithmetic path in the vault, so it is
//! a pure function of `(amount, now, unlock_time)` -- no hidden state, no
//! price feed, reproducible by any client before submitting a withdrawal.
//!
//! The rule: withdrawing before `unlock_time` costs a flat
//! `amount / 100_000` (0.001% of principal), integer division truncating
//! toward zero. One second early and 364 days early pay the identical rate.
//! That flatness is deliberate product behavior, not an oversight -- do not
//! "improve" it into a time-decaying curve.
//!
//! Integer-only arithmetic, like everything else in the vault: no floats,
//! no rounding modes, no surprises.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PENALTY_DIVISOR;

/// The outcome of assessing a withdrawal at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyAssessment {
    /// The penalty withheld. Zero at or after maturity.
    pub penalty: u64,

    /// What the withdrawer receives: `amount - penalty`.
    pub payout: u64,

    /// `true` if the withdrawal happened before `unlock_time`.
    pub was_early: bool,
}

/// Computes the flat early-withdrawal penalty for a principal amount.
///
/// `amount / 100_000`, truncating. Amounts below 100_000 smallest units
/// therefore incur no penalty at all.
pub fn early_withdrawal_penalty(amount: u64) -> u64 {
    amount / PENALTY_DIVISOR
}

/// Assesses a withdrawal of `amount` at time `now` against `unlock_time`.
///
/// Guarantees, for every input: `payout + penalty == amount`, and
/// `payout <= amount` (the penalty can never exceed principal because the
/// divisor is greater than one).
pub fn assess(amount: u64, now: DateTime<Utc>, unlock_time: DateTime<Utc>) -> PenaltyAssessment {
    if now < unlock_time {
        let penalty = early_withdrawal_penalty(amount);
        PenaltyAssessment {
            penalty,
            payout: amount - penalty,
            was_early: true,
        }
    } else {
        PenaltyAssessment {
            penalty: 0,
            payout: amount,
            was_early: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    #[test]
    fn one_million_costs_ten() {
        assert_eq!(early_withdrawal_penalty(1_000_000), 10);
    }

    #[test]
    fn below_divisor_costs_nothing() {
        assert_eq!(early_withdrawal_penalty(50_000), 0);
        assert_eq!(early_withdrawal_penalty(99_999), 0);
        assert_eq!(early_withdrawal_penalty(100_000), 1);
    }

    #[test]
    fn truncation_never_rounds_up() {
        // 199_999 / 100_000 == 1, not 2.
        assert_eq!(early_withdrawal_penalty(199_999), 1);
    }

    #[test]
    fn early_assessment_splits_amount() {
        let now = Utc::now();
        let unlock = now + Duration::days(7);
        let assessment = assess(1_000_000, now, unlock);
        assert_eq!(
            assessment,
            PenaltyAssessment {
                penalty: 10,
                payout: 999_990,
                was_early: true,
            }
        );
    }

    #[test]
    fn matured_assessment_is_free() {
        let now = Utc::now();
        // Exactly at maturity counts as matured.
        let assessment = assess(1_000_000, now, now);
        assert_eq!(
            assessment,
            PenaltyAssessment {
                penalty: 0,
                payout: 1_000_000,
                was_early: false,
            }
        );
    }

    #[test]
    fn one_second_early_still_pays_full_rate() {
        let now = Utc::now();
        let unlock = now + Duration::seconds(1);
        let assessment = assess(1_000_000, now, unlock);
        assert!(assessment.was_early);
        assert_eq!(assessment.penalty, 10);
    }

    proptest! {
        #[test]
        fn penalty_is_floor_division(amount in 0u64..=u64::MAX) {
            prop_assert_eq!(early_withdrawal_penalty(amount), amount / 100_000);
        }

        #[test]
        fn early_split_conserves_amount(amount in 0u64..=u64::MAX) {
            let now = Utc::now();
            let unlock = now + Duration::days(1);
            let a = assess(amount, now, unlock);
            prop_assert_eq!(a.payout + a.penalty, amount);
            prop_assert!(a.payout <= amount);
        }

        #[test]
        fn tiny_amounts_are_penalty_free(amount in 0u64..100_000) {
            let now = Utc::now();
            let unlock = now + Duration::days(1);
            let a = assess(amount, now, unlock);
            prop_assert_eq!(a.penalty, 0);
            prop_assert_eq!(a.payout, amount);
        }
    }
}

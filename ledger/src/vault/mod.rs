//! # Vault Module — Locks, Tokens & Penalty Math
//!
//! The vault is where money lives in Coffer. Every deposit becomes a
//! [`Lock`]; every lock belongs to exactly one user and one token; every
//! mutation keeps the books straight.
//!
//! ## Architecture
//!
//! ```text
//! token.rs    — Token standard: identifiers, metadata, accepted-slot config
//! lock.rs     — The Lock record and per-user aggregates
//! store.rs    — The book of record: ids, locks, penalty pool, invariants
//! penalty.rs  — Pure early-withdrawal arithmetic
//! ```
//!
//! ## Design Principles
//!
//! 1. **All amounts are `u64` in smallest-unit denomination.** No floating
//!    point. No decimals in arithmetic. The `decimals` field in
//!    [`TokenInfo`] is for display only — the ledger never divides, except
//!    for the one integer division the penalty rule is defined by.
//!
//! 2. **Locks are append-only.** Ids are issued once and never reused;
//!    withdrawn locks stay queryable forever. The only post-creation
//!    mutation is the single Active → Withdrawn flip.
//!
//! 3. **Aggregates never drift.** Counters are updated in the same call
//!    that mutates the underlying locks, and every mutation the engine
//!    might need to unwind has an explicit reverse operation.
//!
//! 4. **Serializable state.** Every struct in this module derives
//!    `Serialize`/`Deserialize` so ledger state can be persisted,
//!    transmitted, or snapshotted for recovery.

pub mod lock;
pub mod penalty;
pub mod store;
pub mod token;

pub use lock::{Lock, LockError, UserLockInfo};
pub use penalty::{assess, early_withdrawal_penalty, PenaltyAssessment};
pub use store::{DeactivationOutcome, LockStore, PenaltyPool, WithdrawalOutcome};
pub use token::{AcceptedTokens, TokenError, TokenId, TokenInfo};

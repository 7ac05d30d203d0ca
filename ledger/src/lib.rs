// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Coffer Ledger — Core Library
//!
//! The accounting engine behind Coffer, a time-locked savings vault: users
//! register an identity, lock fungible tokens for a chosen duration, and
//! withdraw later -- the full amount at maturity, or early for a flat
//! 0.001% penalty. Everything else in the product (dashboards, wallets,
//! deployment plumbing) renders this engine's state or submits intents to
//! it; nothing else holds lock-accounting logic.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! custody ledger:
//!
//! - **config** — Protocol constants. Every magic number, one place.
//! - **identity** — Who can hold locks: accounts, profiles, usernames.
//! - **vault** — The book of record: locks, tokens, penalty arithmetic.
//! - **custody** — The fund-movement boundary. The ledger counts; custody pays.
//! - **events** — The audit journal downstream indexers consume.
//! - **engine** — The composed ledger: operations, guards, query surface.
//! - **time** — The injected clock. Maturity is lazy, never scheduled.
//!
//! ## Design Philosophy
//!
//! 1. Integer arithmetic only. If it touches money, it has tests. Plural.
//! 2. Fail cleanly, change nothing — every rejection leaves no partial state.
//! 3. State flips before external transfers, always.
//! 4. No process-wide globals — instantiate as many ledgers as you like.

pub mod config;
pub mod custody;
pub mod engine;
pub mod events;
pub mod identity;
pub mod time;
pub mod vault;

pub use custody::{CustodyError, InMemoryCustody, TokenCustody};
pub use engine::{
    Ledger, LedgerConfig, LedgerError, PausePolicy, PauseStatus, SharedLedger, WithdrawalReceipt,
};
pub use events::LedgerEvent;
pub use identity::{AccountId, IdentityRegistry, RegistryError, UserProfile};
pub use time::{Clock, ManualClock, SystemClock};
pub use vault::{
    AcceptedTokens, Lock, LockError, LockStore, PenaltyPool, TokenError, TokenId, TokenInfo,
    UserLockInfo,
};

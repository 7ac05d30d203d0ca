//! # Engine Module — The Vault Ledger
//!
//! Where the four concerns meet: the identity registry decides *who*, the
//! lock store decides *what*, the penalty math decides *how much*, and the
//! guards decide *whether right now*. The [`Ledger`] composes them behind
//! a single mutating surface with one rule everywhere: an operation either
//! completes fully -- state, funds, audit record -- or fails and changes
//! nothing.
//!
//! ```text
//! guards.rs  — Pause switch, pause policy, pause status
//! ledger.rs  — The engine: configuration, operations, query surface
//! shared.rs  — Arc<Mutex<Ledger>> handle for multi-threaded hosts
//! ```

pub mod guards;
pub mod ledger;
pub mod shared;

pub use guards::{GuardError, PausePolicy, PauseState, PauseStatus};
pub use ledger::{Ledger, LedgerConfig, LedgerError, WithdrawalReceipt};
pub use shared::SharedLedger;

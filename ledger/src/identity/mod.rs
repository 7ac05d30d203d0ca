//! # Identity Module
//!
//! Who is allowed to hold locks, and under what name. The identity stack
//! is deliberately thin -- authentication happens upstream in the host
//! runtime, so this module never touches key material:
//!
//! 1. **AccountId** -- the authenticated principal. 32 bytes, Bech32
//!    `cof1...` address form for display and serde.
//! 2. **UserProfile** -- the registered record: unique username, opaque
//!    image hash, activity timestamps.
//! 3. **IdentityRegistry** -- the two-way bookkeeping between identities
//!    and usernames, kept bijective under every mutation.
//!
//! Deactivation is handled at the engine level (it also unwinds locks and
//! moves funds); the registry only knows how to erase a record cleanly.

pub mod account;
pub mod profile;
pub mod registry;

pub use account::{AccountId, AccountIdError};
pub use profile::{validate_username, RegistryError, UserProfile};
pub use registry::IdentityRegistry;

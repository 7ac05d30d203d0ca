//! # User Profiles
//!
//! A [`UserProfile`] is the durable record behind a registered identity:
//! the human-chosen username, an opaque profile-image hash, and the
//! activity timestamps. Usernames are globally unique and case-sensitive;
//! the uniqueness bookkeeping lives in
//! [`IdentityRegistry`](super::registry::IdentityRegistry) -- this module
//! owns the record itself and the validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{USERNAME_MAX_LENGTH, USERNAME_MIN_LENGTH};
use crate::identity::account::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from identity-registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The caller already has a profile.
    #[error("user already registered: {0}")]
    AlreadyRegistered(AccountId),

    /// The caller has no profile.
    #[error("user not registered: {0}")]
    NotRegistered(AccountId),

    /// Username shorter than the minimum.
    #[error("username too short: {length} bytes (minimum {USERNAME_MIN_LENGTH})")]
    UsernameTooShort {
        /// Length of the rejected username.
        length: usize,
    },

    /// Username longer than the maximum.
    #[error("username too long: {length} bytes (maximum {USERNAME_MAX_LENGTH})")]
    UsernameTooLong {
        /// Length of the rejected username.
        length: usize,
    },

    /// Username already claimed by a different identity.
    #[error("username already taken: {0}")]
    UsernameTaken(String),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates username length bounds.
///
/// Checked in order: too-short before too-long. Content is deliberately
/// unconstrained beyond length -- the original product allowed any bytes
/// and uniqueness is case-sensitive.
pub fn validate_username(username: &str) -> Result<(), RegistryError> {
    let length = username.len();
    if length < USERNAME_MIN_LENGTH {
        return Err(RegistryError::UsernameTooShort { length });
    }
    if length > USERNAME_MAX_LENGTH {
        return Err(RegistryError::UsernameTooLong { length });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// The durable profile record for one registered identity.
///
/// Deactivation deletes the record outright -- there is no soft-delete
/// state. A profile you can look up is a live profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Globally unique, case-sensitive display name (3-32 bytes).
    pub username: String,

    /// Opaque content hash for the profile image. The ledger stores it,
    /// never validates it.
    pub profile_image_hash: String,

    /// When this identity registered (UTC).
    pub registration_date: DateTime<Utc>,

    /// Timestamp of the last profile-affecting mutation.
    pub last_activity: DateTime<Utc>,

    /// Always `true` for a stored profile; retained so serialized profiles
    /// are self-describing for downstream indexers.
    pub is_active: bool,
}

impl UserProfile {
    /// Creates a fresh profile at registration time.
    pub fn new(username: String, profile_image_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            username,
            profile_image_hash,
            registration_date: now,
            last_activity: now,
            is_active: true,
        }
    }
}

//! # Identity Registry
//!
//! Maps caller identities to [`UserProfile`]s and maintains the reverse
//! username index. The two maps move in lockstep -- every claim, rename,
//! and removal updates both sides in the same call, so the bijection
//! invariant (each username resolves to exactly one live identity, and
//! back) holds at every quiescent point.
//!
//! The registry is a plain in-memory structure with no interior locking;
//! the owning [`Ledger`](crate::engine::Ledger) serializes access.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::account::AccountId;
use super::profile::{validate_username, RegistryError, UserProfile};

// ---------------------------------------------------------------------------
// IdentityRegistry
// ---------------------------------------------------------------------------

/// Profiles plus the username reverse index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdentityRegistry {
    /// Profile records keyed by identity.
    profiles: HashMap<AccountId, UserProfile>,

    /// Reverse map: username -> owning identity. Case-sensitive.
    username_index: HashMap<String, AccountId>,
}

impl IdentityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Registers a new identity.
    ///
    /// Precondition order is observable: already-registered, then length
    /// bounds, then uniqueness.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyRegistered`], [`RegistryError::UsernameTooShort`],
    /// [`RegistryError::UsernameTooLong`], or [`RegistryError::UsernameTaken`].
    pub fn register(
        &mut self,
        account: AccountId,
        username: &str,
        profile_image_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<&UserProfile, RegistryError> {
        if self.profiles.contains_key(&account) {
            return Err(RegistryError::AlreadyRegistered(account));
        }
        validate_username(username)?;
        if self.username_index.contains_key(username) {
            return Err(RegistryError::UsernameTaken(username.to_string()));
        }

        self.username_index.insert(username.to_string(), account);
        let profile = UserProfile::new(username.to_string(), profile_image_hash.to_string(), now);
        debug!(account = %account, username, "identity registered");
        Ok(self.profiles.entry(account).or_insert(profile))
    }

    /// Updates an existing profile, releasing and re-claiming the username
    /// mapping when the name changes.
    ///
    /// A no-op rename (same username) is allowed -- the collision check
    /// excludes the caller's own claim.
    pub fn update(
        &mut self,
        account: AccountId,
        new_username: &str,
        new_profile_image_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<&UserProfile, RegistryError> {
        if !self.profiles.contains_key(&account) {
            return Err(RegistryError::NotRegistered(account));
        }
        validate_username(new_username)?;
        if let Some(claimant) = self.username_index.get(new_username) {
            if *claimant != account {
                return Err(RegistryError::UsernameTaken(new_username.to_string()));
            }
        }

        let profile = self
            .profiles
            .get_mut(&account)
            .expect("presence checked above");
        if profile.username != new_username {
            self.username_index.remove(&profile.username);
            self.username_index
                .insert(new_username.to_string(), account);
            profile.username = new_username.to_string();
        }
        profile.profile_image_hash = new_profile_image_hash.to_string();
        profile.last_activity = now;
        debug!(account = %account, username = new_username, "profile updated");
        Ok(profile)
    }

    /// Removes an identity entirely, releasing its username.
    ///
    /// Returns the deleted profile so the caller can audit what was erased.
    pub fn remove(&mut self, account: AccountId) -> Result<UserProfile, RegistryError> {
        let profile = self
            .profiles
            .remove(&account)
            .ok_or(RegistryError::NotRegistered(account))?;
        self.username_index.remove(&profile.username);
        debug!(account = %account, username = %profile.username, "identity removed");
        Ok(profile)
    }

    /// Puts a just-removed profile back, reclaiming its username. Rollback
    /// path for deactivations whose refund transfer failed; the username
    /// cannot have been re-claimed in between because the removal and the
    /// rollback happen inside one ledger operation.
    pub(crate) fn reinstate(&mut self, account: AccountId, profile: UserProfile) {
        self.username_index
            .insert(profile.username.clone(), account);
        self.profiles.insert(account, profile);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns the profile for an identity, if registered.
    pub fn profile(&self, account: &AccountId) -> Option<&UserProfile> {
        self.profiles.get(account)
    }

    /// Returns `true` if the identity has a live profile.
    pub fn is_registered(&self, account: &AccountId) -> bool {
        self.profiles.contains_key(account)
    }

    /// Returns `true` iff the username is unclaimed.
    pub fn is_username_available(&self, username: &str) -> bool {
        !self.username_index.contains_key(username)
    }

    /// Resolves a username back to its owning identity.
    pub fn resolve_username(&self, username: &str) -> Option<AccountId> {
        self.username_index.get(username).copied()
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns `true` if nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Asserts the username bijection. Test-harness helper.
    #[cfg(test)]
    pub fn assert_bijection(&self) {
        assert_eq!(self.profiles.len(), self.username_index.len());
        for (account, profile) in &self.profiles {
            assert_eq!(self.username_index.get(&profile.username), Some(account));
        }
    }
}

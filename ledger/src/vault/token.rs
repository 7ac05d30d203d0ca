//! # Token Standard
//!
//! Every asset the vault can hold -- the deployed configuration is five
//! parallel stablecoin-like tokens -- is represented as a [`TokenInfo`]
//! with a unique [`TokenId`].
//!
//! Token IDs are deterministic BLAKE3 hashes of the token's canonical
//! properties (name, symbol, issuer). The same token always gets the same
//! ID regardless of when or where it's referenced -- no registry needed,
//! no coordination required.
//!
//! [`AcceptedTokens`] is the vault-side configuration: an ordered set of
//! 1 to 5 slots fixed at construction. The owner can repoint a slot later
//! (token migrations), which only affects which identifiers *new* locks
//! may reference -- existing locks carry their own `token` field and stay
//! withdrawable.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::MAX_ACCEPTED_TOKENS;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from token configuration and lookups.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The all-zero token identifier was supplied where a real token is
    /// required (construction, slot update).
    #[error("invalid token id: the zero identifier is not a token")]
    ZeroTokenId,

    /// A vault cannot be constructed with no accepted tokens.
    #[error("no token slots configured")]
    NoSlots,

    /// More slots than the vault supports.
    #[error("too many token slots: {count} (maximum {MAX_ACCEPTED_TOKENS})")]
    TooManySlots {
        /// Number of slots that were supplied.
        count: usize,
    },

    /// Slot index outside the configured range.
    #[error("token slot {slot} out of range (configured slots: {slots})")]
    SlotOutOfRange {
        /// The requested slot index.
        slot: usize,
        /// How many slots are configured.
        slots: usize,
    },

    /// The token is not in the accepted configuration.
    #[error("token not accepted by this vault: {0}")]
    NotAccepted(TokenId),
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// A unique, content-addressed identifier for a token type.
///
/// Computed as `BLAKE3(name || symbol || issuer)` with `0x00` separators so
/// one field's suffix can't masquerade as another field's prefix. Two tokens
/// with identical properties always produce the same ID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId([u8; 32]);

impl TokenId {
    /// The null token. Rejected wherever a real token is required.
    pub const ZERO: TokenId = TokenId([0u8; 32]);

    /// Creates a `TokenId` from a raw 32-byte hash.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` if this is the null token.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Returns the hex-encoded token ID.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded token ID.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derives a `TokenId` from the canonical token properties.
    pub fn derive(name: &str, symbol: &str, issuer: &str) -> Self {
        let mut preimage = Vec::with_capacity(name.len() + symbol.len() + issuer.len() + 2);
        preimage.extend_from_slice(name.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(symbol.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(issuer.as_bytes());

        Self(*blake3::hash(&preimage).as_bytes())
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for TokenId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// TokenInfo
// ---------------------------------------------------------------------------

/// Display metadata for a token the vault can hold.
///
/// The `decimals` field is for UI rendering only -- the ledger keeps every
/// amount in smallest units and never divides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Content-addressed identifier derived from this token's properties.
    pub id: TokenId,

    /// Human-readable token name (e.g., "Celo Dollar").
    pub name: String,

    /// Trading symbol / ticker (e.g., "cUSD").
    pub symbol: String,

    /// Display decimal places.
    pub decimals: u8,

    /// Identifier of the issuing entity, as an opaque string.
    pub issuer: String,
}

impl TokenInfo {
    /// Creates a [`TokenInfo`] with a deterministically derived [`TokenId`].
    pub fn new(name: &str, symbol: &str, decimals: u8, issuer: &str) -> Self {
        Self {
            id: TokenId::derive(name, symbol, issuer),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            issuer: issuer.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pre-defined Tokens
// ---------------------------------------------------------------------------

/// System issuer tag for the stablecoins the vault ships with.
const SYSTEM_ISSUER: &str = "coffer:system";

/// Celo Dollar -- the vault's primary deposit asset (slot 0 by default).
pub fn cusd() -> TokenInfo {
    TokenInfo::new("Celo Dollar", "cUSD", 18, SYSTEM_ISSUER)
}

/// Tether USD.
pub fn usdt() -> TokenInfo {
    TokenInfo::new("Tether USD", "USDT", 6, SYSTEM_ISSUER)
}

/// Celo Ghana Cedi.
pub fn cghs() -> TokenInfo {
    TokenInfo::new("Celo Ghana Cedi", "cGHS", 18, SYSTEM_ISSUER)
}

/// Celo Nigerian Naira.
pub fn cngn() -> TokenInfo {
    TokenInfo::new("Celo Nigerian Naira", "cNGN", 18, SYSTEM_ISSUER)
}

/// Celo Kenyan Shilling.
pub fn ckes() -> TokenInfo {
    TokenInfo::new("Celo Kenyan Shilling", "cKES", 18, SYSTEM_ISSUER)
}

/// The standard five-asset configuration, in slot order.
pub fn default_token_slots() -> Vec<TokenId> {
    vec![cusd().id, usdt().id, cghs().id, cngn().id, ckes().id]
}

// ---------------------------------------------------------------------------
// AcceptedTokens
// ---------------------------------------------------------------------------

/// The vault's accepted-token configuration: an ordered set of slots.
///
/// Slot 0 is the default asset for locks created without an explicit token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedTokens {
    slots: Vec<TokenId>,
}

impl AcceptedTokens {
    /// Builds the configuration, failing fast on an empty set, too many
    /// slots, or any null identifier -- a vault must never deploy broken.
    pub fn new(slots: Vec<TokenId>) -> Result<Self, TokenError> {
        if slots.is_empty() {
            return Err(TokenError::NoSlots);
        }
        if slots.len() > MAX_ACCEPTED_TOKENS {
            return Err(TokenError::TooManySlots { count: slots.len() });
        }
        if slots.iter().any(TokenId::is_zero) {
            return Err(TokenError::ZeroTokenId);
        }
        Ok(Self { slots })
    }

    /// The default token (slot 0).
    pub fn primary(&self) -> TokenId {
        self.slots[0]
    }

    /// Returns the token in a slot.
    pub fn get(&self, slot: usize) -> Result<TokenId, TokenError> {
        self.slots
            .get(slot)
            .copied()
            .ok_or(TokenError::SlotOutOfRange {
                slot,
                slots: self.slots.len(),
            })
    }

    /// Returns `true` if the token is currently accepted.
    pub fn contains(&self, token: TokenId) -> bool {
        self.slots.contains(&token)
    }

    /// Ensures the token is accepted.
    pub fn ensure_accepted(&self, token: TokenId) -> Result<(), TokenError> {
        if self.contains(token) {
            Ok(())
        } else {
            Err(TokenError::NotAccepted(token))
        }
    }

    /// Repoints one slot to a new token identifier.
    ///
    /// Returns the identifier that was replaced. Locks denominated in the
    /// old token are unaffected -- withdrawal references the lock's own
    /// stored token.
    pub fn update_slot(&mut self, slot: usize, new_token: TokenId) -> Result<TokenId, TokenError> {
        if new_token.is_zero() {
            return Err(TokenError::ZeroTokenId);
        }
        let slots = self.slots.len();
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(TokenError::SlotOutOfRange { slot, slots })?;
        let old = *entry;
        *entry = new_token;
        Ok(old)
    }

    /// The configured slots, in order.
    pub fn slots(&self) -> &[TokenId] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_derivation_is_deterministic() {
        let id1 = TokenId::derive("Test", "TST", "coffer:issuer");
        let id2 = TokenId::derive("Test", "TST", "coffer:issuer");
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_properties_produce_different_ids() {
        let base = TokenId::derive("Token", "TKN", "coffer:issuer");
        assert_ne!(base, TokenId::derive("Other", "TKN", "coffer:issuer"));
        assert_ne!(base, TokenId::derive("Token", "OTH", "coffer:issuer"));
        assert_ne!(base, TokenId::derive("Token", "TKN", "coffer:other"));
    }

    #[test]
    fn separator_prevents_field_bleed() {
        // "ab" + "c" must not collide with "a" + "bc".
        assert_ne!(
            TokenId::derive("ab", "c", "x"),
            TokenId::derive("a", "bc", "x")
        );
    }

    #[test]
    fn token_id_hex_roundtrip() {
        let id = TokenId::derive("Test", "TST", "coffer:issuer");
        let recovered = TokenId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn predefined_tokens_are_distinct() {
        let slots = default_token_slots();
        assert_eq!(slots.len(), 5);
        let mut deduped = slots.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 5, "pre-defined token ids must be unique");
    }

    #[test]
    fn predefined_cusd_properties() {
        let token = cusd();
        assert_eq!(token.symbol, "cUSD");
        assert_eq!(token.decimals, 18);
        assert!(!token.id.is_zero());
    }

    #[test]
    fn accepted_tokens_rejects_empty() {
        assert!(matches!(
            AcceptedTokens::new(vec![]),
            Err(TokenError::NoSlots)
        ));
    }

    #[test]
    fn accepted_tokens_rejects_zero_id_in_any_slot() {
        for zero_slot in 0..5 {
            let mut slots = default_token_slots();
            slots[zero_slot] = TokenId::ZERO;
            assert!(
                matches!(AcceptedTokens::new(slots), Err(TokenError::ZeroTokenId)),
                "zero id in slot {} must be rejected",
                zero_slot
            );
        }
    }

    #[test]
    fn accepted_tokens_rejects_too_many_slots() {
        let mut slots = default_token_slots();
        slots.push(TokenId::derive("Extra", "XTR", "coffer:issuer"));
        assert!(matches!(
            AcceptedTokens::new(slots),
            Err(TokenError::TooManySlots { count: 6 })
        ));
    }

    #[test]
    fn primary_is_slot_zero() {
        let tokens = AcceptedTokens::new(default_token_slots()).unwrap();
        assert_eq!(tokens.primary(), cusd().id);
    }

    #[test]
    fn contains_and_ensure_accepted() {
        let tokens = AcceptedTokens::new(default_token_slots()).unwrap();
        assert!(tokens.contains(usdt().id));
        assert!(tokens.ensure_accepted(ckes().id).is_ok());

        let stranger = TokenId::derive("Stranger", "STR", "coffer:issuer");
        assert!(!tokens.contains(stranger));
        assert!(matches!(
            tokens.ensure_accepted(stranger),
            Err(TokenError::NotAccepted(t)) if t == stranger
        ));
    }

    #[test]
    fn update_slot_repoints_and_returns_old() {
        let mut tokens = AcceptedTokens::new(default_token_slots()).unwrap();
        let replacement = TokenId::derive("New Dollar", "nUSD", "coffer:issuer");
        let old = tokens.update_slot(0, replacement).unwrap();

        assert_eq!(old, cusd().id);
        assert_eq!(tokens.primary(), replacement);
        assert!(!tokens.contains(cusd().id));
    }

    #[test]
    fn update_slot_rejects_zero_and_out_of_range() {
        let mut tokens = AcceptedTokens::new(default_token_slots()).unwrap();
        assert!(matches!(
            tokens.update_slot(0, TokenId::ZERO),
            Err(TokenError::ZeroTokenId)
        ));
        assert!(matches!(
            tokens.update_slot(9, usdt().id),
            Err(TokenError::SlotOutOfRange { slot: 9, slots: 5 })
        ));
    }

    #[test]
    fn token_info_serialization_roundtrip() {
        let token = cusd();
        let json = serde_json::to_string(&token).expect("serialize");
        let recovered: TokenInfo = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(token, recovered);
    }
}

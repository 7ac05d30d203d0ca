//! # Account Identifiers
//!
//! An [`AccountId`] is the authenticated principal behind every ledger
//! operation -- the "who" that deposits, withdraws, and registers usernames.
//! It is a 32-byte value, Bech32-encoded with the `cof` human-readable
//! prefix for display:
//!
//! ```text
//! principal (32 bytes) -> Bech32("cof", bytes) -> cof1qw508d6qe...
//! ```
//!
//! The ledger does not mint, verify, or otherwise interpret these bytes.
//! Authentication happens upstream (wallet signatures, session tokens,
//! whatever the host runtime uses); by the time an `AccountId` reaches a
//! mutating operation it is already trusted. Bech32's built-in error
//! detection matters where it always does -- humans copy-pasting addresses
//! into payment forms.

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ACCOUNT_HRP;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when parsing account addresses.
#[derive(Debug, Error)]
pub enum AccountIdError {
    /// The Bech32 string could not be decoded.
    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    /// The decoded address has an unexpected human-readable prefix.
    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp {
        /// The expected HRP.
        expected: String,
        /// The HRP that was actually found.
        got: String,
    },

    /// The decoded data has an unexpected length.
    #[error("invalid address data length: expected {expected} bytes, got {got}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A caller identity -- the ledger's notion of a principal.
///
/// The all-zero value is the null identity and is rejected wherever an
/// identity is configured (vault owner, token issuer slots).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// The null identity. Never a valid owner or caller.
    pub const ZERO: AccountId = AccountId([0u8; 32]);

    /// Creates an `AccountId` from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` if this is the null identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Generates a random identity. Test and demo convenience -- real
    /// identities come from the host's authentication layer.
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Encodes this identity as a Bech32 address string (`cof1...`).
    pub fn to_address(&self) -> String {
        let hrp = Hrp::parse(ACCOUNT_HRP).expect("static HRP is valid");
        bech32::encode::<Bech32>(hrp, &self.0)
            .expect("encoding a 32-byte payload should never fail")
    }

    /// Parses a Bech32-encoded address back into an [`AccountId`].
    ///
    /// Validates the HRP, checksum, and data length.
    pub fn from_address(addr: &str) -> Result<Self, AccountIdError> {
        let (hrp, data) =
            bech32::decode(addr).map_err(|e| AccountIdError::Bech32Decode(e.to_string()))?;

        let expected_hrp = Hrp::parse(ACCOUNT_HRP).expect("static HRP is valid");
        if hrp != expected_hrp {
            return Err(AccountIdError::InvalidHrp {
                expected: ACCOUNT_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        if data.len() != 32 {
            return Err(AccountIdError::InvalidDataLength {
                expected: 32,
                got: data.len(),
            });
        }

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&data);
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_address())
    }
}

impl std::str::FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_address())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            AccountId::from_address(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            if bytes.len() != 32 {
                return Err(serde::de::Error::custom(format!(
                    "expected 32-byte account id, got {}",
                    bytes.len()
                )));
            }
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&bytes);
            Ok(AccountId(arr))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_starts_with_cof1() {
        let id = AccountId::random();
        let addr = id.to_address();
        assert!(addr.starts_with("cof1"), "address was: {}", addr);
    }

    #[test]
    fn address_roundtrip() {
        let id = AccountId::random();
        let addr = id.to_address();
        let recovered = AccountId::from_address(&addr).unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn different_identities_different_addresses() {
        let a = AccountId::random();
        let b = AccountId::random();
        assert_ne!(a.to_address(), b.to_address());
    }

    #[test]
    fn zero_identity_is_zero() {
        assert!(AccountId::ZERO.is_zero());
        assert!(!AccountId::from_bytes([1u8; 32]).is_zero());
    }

    #[test]
    fn invalid_hrp_rejected() {
        let hrp = Hrp::parse("btc").unwrap();
        let data = [0u8; 32];
        let encoded = bech32::encode::<Bech32>(hrp, &data).unwrap();
        let err = AccountId::from_address(&encoded).unwrap_err();
        assert!(matches!(err, AccountIdError::InvalidHrp { .. }));
    }

    #[test]
    fn wrong_length_rejected() {
        let hrp = Hrp::parse(ACCOUNT_HRP).unwrap();
        let data = [0u8; 16];
        let encoded = bech32::encode::<Bech32>(hrp, &data).unwrap();
        let err = AccountId::from_address(&encoded).unwrap_err();
        assert!(matches!(err, AccountIdError::InvalidDataLength { .. }));
    }

    #[test]
    fn corrupted_address_rejected() {
        let mut addr = AccountId::random().to_address();
        let mid = addr.len() / 2;
        let original = addr.as_bytes()[mid];
        let replacement = if original == b'q' { b'p' } else { b'q' };
        unsafe {
            addr.as_bytes_mut()[mid] = replacement;
        }
        assert!(AccountId::from_address(&addr).is_err());
    }

    #[test]
    fn serde_json_roundtrip() {
        let id = AccountId::random();
        let json = serde_json::to_string(&id).unwrap();
        let recovered: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, recovered);
    }
}

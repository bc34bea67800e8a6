//! Identifier types for ledger entities.

use hex::{FromHex, FromHexError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the user that funds an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of the service provider an account is held with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create a new provider ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Composite key identifying exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    /// The user that owns the account.
    pub user: UserId,
    /// The provider the account is held with.
    pub provider: ProviderId,
}

impl AccountKey {
    /// Create a new account key.
    pub fn new(user: impl Into<UserId>, provider: impl Into<ProviderId>) -> Self {
        Self {
            user: user.into(),
            provider: provider.into(),
        }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.provider)
    }
}

/// Provider signing credential bound to an account at creation.
///
/// Two 32-byte components, typically the coordinates of a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignerKey([[u8; 32]; 2]);

impl SignerKey {
    /// Create a signer key from its two components.
    pub fn new(first: [u8; 32], second: [u8; 32]) -> Self {
        Self([first, second])
    }

    /// Parse from two hex strings (an optional `0x` prefix is accepted).
    pub fn parse(first: &str, second: &str) -> Result<Self, FromHexError> {
        let first = <[u8; 32]>::from_hex(first.strip_prefix("0x").unwrap_or(first))?;
        let second = <[u8; 32]>::from_hex(second.strip_prefix("0x").unwrap_or(second))?;
        Ok(Self([first, second]))
    }
}

impl fmt::Display for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{}, 0x{}]", hex::encode(self.0[0]), hex::encode(self.0[1]))
    }
}

/// Identifier of a deliverable, unique within one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliverableId([u8; 32]);

impl DeliverableId {
    /// Create from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an ID from a short label, zero-padded on the right.
    ///
    /// Labels longer than 32 bytes are truncated.
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; 32];
        let src = label.as_bytes();
        let len = src.len().min(32);
        bytes[..len].copy_from_slice(&src[..len]);
        Self(bytes)
    }

    /// Parse from a 64-character hex string, with or without `0x`.
    pub fn parse(s: &str) -> Result<Self, FromHexError> {
        <[u8; 32]>::from_hex(s.strip_prefix("0x").unwrap_or(s)).map(Self)
    }
}

impl fmt::Display for DeliverableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

//! Types for the diploma registry

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of raw bytes in a credential fingerprint.
pub const FINGERPRINT_BYTES: usize = 32;
/// Number of raw bytes in an identity.
pub const IDENTITY_BYTES: usize = 20;

/// Errors that can occur when parsing a fingerprint or identity string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("value is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

fn decode_fixed<const N: usize>(value: &str) -> Result<[u8; N], ParseError> {
    let payload = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if payload.len() != N * 2 {
        return Err(ParseError::InvalidLength {
            expected: N * 2,
            actual: payload.len(),
        });
    }

    let mut bytes = [0u8; N];
    hex::decode_to_slice(payload, &mut bytes)?;
    Ok(bytes)
}

/// Content fingerprint of an issued credential (Keccak-256 sized).
///
/// Every value is a valid lookup key; only the all-zero value is rejected on
/// issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(pub [u8; FINGERPRINT_BYTES]);

impl Fingerprint {
    /// The all-zero fingerprint.
    pub const ZERO: Fingerprint = Fingerprint([0u8; FINGERPRINT_BYTES]);

    pub fn new(bytes: [u8; FINGERPRINT_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<FINGERPRINT_BYTES>(s.trim()).map(Fingerprint)
    }
}

impl From<[u8; FINGERPRINT_BYTES]> for Fingerprint {
    fn from(value: [u8; FINGERPRINT_BYTES]) -> Self {
        Fingerprint(value)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Address-like identity of an admin or a credential holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(pub [u8; IDENTITY_BYTES]);

impl Identity {
    /// The zero identity, never a valid admin or recipient.
    pub const ZERO: Identity = Identity([0u8; IDENTITY_BYTES]);

    pub fn new(bytes: [u8; IDENTITY_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<IDENTITY_BYTES>(s.trim()).map(Identity)
    }
}

impl From<[u8; IDENTITY_BYTES]> for Identity {
    fn from(value: [u8; IDENTITY_BYTES]) -> Self {
        Identity(value)
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Identity {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One issued credential.
///
/// The `Default` value is the absent record: zero fingerprint and recipient,
/// no issuance time, no scores and `exists == false`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiplomaRecord {
    pub fingerprint: Fingerprint,
    pub recipient: Identity,
    /// Seconds since the Unix epoch at issuance
    pub issued_at: u64,
    pub scores: Vec<u64>,
    pub exists: bool,
}

/// Public verification result returned by [`crate::DiplomaRegistry::lookup`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verification {
    pub exists: bool,
    pub recipient: Identity,
    pub issued_at: u64,
    pub scores: Vec<u64>,
}

impl From<&DiplomaRecord> for Verification {
    fn from(record: &DiplomaRecord) -> Self {
        Self {
            exists: record.exists,
            recipient: record.recipient,
            issued_at: record.issued_at,
            scores: record.scores.clone(),
        }
    }
}

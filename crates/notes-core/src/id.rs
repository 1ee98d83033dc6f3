//! Record identifiers.
//!
//! # RecordId Format
//!
//! A `RecordId` is 12 bytes, always rendered as a fixed-length 24-character
//! lowercase hex string:
//! 1. The first 4 bytes are the unix timestamp in seconds, big-endian
//! 2. The remaining 8 bytes are random
//!
//! The timestamp prefix makes lexicographic order on the hex form
//! approximate creation order, which the store relies on as a stable
//! secondary sort key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of the hex rendering of a `RecordId`.
pub const RECORD_ID_HEX_LEN: usize = 24;

/// Opaque identifier for users and notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; 12]);

impl RecordId {
    /// Generate a new identifier from the current time and random bytes.
    pub fn generate() -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as u32;
        Self::from_parts(now, rand::random())
    }

    /// Build an identifier from an explicit timestamp and suffix.
    pub fn from_parts(unix_seconds: u32, suffix: [u8; 8]) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&unix_seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&suffix);
        Self(bytes)
    }

    /// The raw 12 bytes.
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Unix timestamp (seconds) encoded in the identifier.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Render as a 24-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Errors parsing a `RecordId` from its hex form.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseIdError {
    /// The string is not exactly 24 characters.
    #[error("identifier must be {RECORD_ID_HEX_LEN} hex characters, got {0}")]
    WrongLength(usize),

    /// The string contains non-hex characters.
    #[error("identifier contains non-hex characters")]
    InvalidHex,
}

impl FromStr for RecordId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != RECORD_ID_HEX_LEN {
            return Err(ParseIdError::WrongLength(s.len()));
        }
        let bytes = hex::decode(s).map_err(|_| ParseIdError::InvalidHex)?;
        let mut arr = [0u8; 12];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let id = RecordId::generate();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 24);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(hex.chars().all(|c| !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_roundtrip() {
        let id = RecordId::generate();
        let parsed: RecordId = id.to_hex().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_timestamp_prefix() {
        let id = RecordId::from_parts(0x1234_5678, [0xab; 8]);
        assert_eq!(id.timestamp(), 0x1234_5678);
        assert!(id.to_hex().starts_with("12345678"));
    }

    #[test]
    fn test_order_follows_timestamp() {
        let older = RecordId::from_parts(1_000, [0xff; 8]);
        let newer = RecordId::from_parts(2_000, [0x00; 8]);
        assert!(older < newer);
        assert!(older.to_hex() < newer.to_hex());
    }

    #[test]
    fn test_parse_wrong_length() {
        let err = "abc123".parse::<RecordId>().unwrap_err();
        assert_eq!(err, ParseIdError::WrongLength(6));
    }

    #[test]
    fn test_parse_non_hex() {
        let err = "z".repeat(24).parse::<RecordId>().unwrap_err();
        assert_eq!(err, ParseIdError::InvalidHex);
    }

    #[test]
    fn test_serde_as_string() {
        let id = RecordId::from_parts(1, [2; 8]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_serde_rejects_bad_string() {
        let result = serde_json::from_str::<RecordId>("\"not-an-id\"");
        assert!(result.is_err());
    }
}

//! Secret preimages and their SHA-256 payment hashes.

use crate::params::SECRET_LEN;
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte secret preimage.
///
/// Equality and hashing are by value, so a `Secret` is safe to use as a
/// `HashMap` key. Neither `Debug` nor `Display` reveal the preimage bytes;
/// both print the derived [`SecretHash`] instead, so a secret can be logged
/// freely before it is disclosed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
    /// Size of a secret in bytes.
    pub const BYTES: usize = SECRET_LEN;

    /// Wrap raw preimage bytes.
    pub const fn new(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a secret from an attachment blob.
    ///
    /// The blob must be exactly [`Secret::BYTES`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SecretLengthError> {
        let arr: [u8; SECRET_LEN] = bytes.try_into().map_err(|_| SecretLengthError {
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parse a secret from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, HexError> {
        decode_hex32(hex).map(Self)
    }

    /// Payment hash of this preimage: `SHA-256(preimage)`.
    pub fn hash(&self) -> SecretHash {
        SecretHash(Sha256::digest(self.0).into())
    }

    /// Raw preimage bytes.
    ///
    /// Only the disclosure path should need these.
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }

    /// Hex encoding of the raw preimage.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(hash={:?})", self.hash())
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hash())
    }
}

/// SHA-256 hash of a [`Secret`], used for correlation and logging.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretHash([u8; 32]);

impl SecretHash {
    /// Size of hash in bytes.
    pub const BYTES: usize = 32;

    /// Parse hash from hex string.
    pub fn from_hex(hex: &str) -> Result<Self, HexError> {
        decode_hex32(hex).map(Self)
    }

    /// Convert hash to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get bytes as slice reference.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "SecretHash({}..{})", &hex[..8], &hex[56..])
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn decode_hex32(hex: &str) -> Result<[u8; 32], HexError> {
    if hex.len() != 64 {
        return Err(HexError::InvalidLength {
            expected: 64,
            actual: hex.len(),
        });
    }

    let mut bytes = [0u8; 32];
    hex::decode_to_slice(hex, &mut bytes).map_err(|_| HexError::InvalidHex)?;
    Ok(bytes)
}

/// An attachment blob of the wrong length was offered as a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid secret length: expected {}, got {actual}", SECRET_LEN)]
pub struct SecretLengthError {
    /// Length of the rejected blob.
    pub actual: usize,
}

/// Errors that can occur when parsing hex strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    /// Invalid hex string length.
    #[error("Invalid hex length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Invalid hex characters.
    #[error("Invalid hex string")]
    InvalidHex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_preimage_hash() {
        // SHA-256 of 32 zero bytes.
        let secret = Secret::new([0u8; 32]);
        assert_eq!(
            secret.hash().to_hex(),
            "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925"
        );
    }

    #[test]
    fn test_from_slice_requires_exact_length() {
        assert!(Secret::from_slice(&[7u8; 32]).is_ok());
        assert_eq!(
            Secret::from_slice(&[7u8; 31]),
            Err(SecretLengthError { actual: 31 })
        );
        assert_eq!(
            Secret::from_slice(&[7u8; 33]),
            Err(SecretLengthError { actual: 33 })
        );
        assert_eq!(
            Secret::from_slice(&[]),
            Err(SecretLengthError { actual: 0 })
        );
    }

    #[test]
    fn test_equality_is_by_value() {
        let a = Secret::from_slice(&[9u8; 32]).unwrap();
        let b = Secret::new([9u8; 32]);
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a, Secret::new([8u8; 32]));
    }

    #[test]
    fn test_debug_and_display_hide_preimage() {
        let secret = Secret::new([0xAB; 32]);
        let preimage_hex = secret.to_hex();

        let debug = format!("{:?}", secret);
        let display = format!("{}", secret);

        assert!(!debug.contains(&preimage_hex));
        assert!(!display.contains(&preimage_hex));
        assert_eq!(display, secret.hash().to_hex());
    }

    #[test]
    fn test_hex_parsing() {
        let secret = Secret::new([0x11; 32]);
        assert_eq!(Secret::from_hex(&secret.to_hex()), Ok(secret));

        let hash = secret.hash();
        assert_eq!(SecretHash::from_hex(&hash.to_hex()), Ok(hash));

        assert_eq!(
            Secret::from_hex("abcd"),
            Err(HexError::InvalidLength {
                expected: 64,
                actual: 4
            })
        );
        assert_eq!(Secret::from_hex(&"zz".repeat(32)), Err(HexError::InvalidHex));
    }
}

//! Commitment and Salt for the commit-reveal scheme.
//!
//! Byte layout fed to SHA-256: one tag byte for the move followed by the salt
//! as a 256-bit unsigned integer in big-endian order (33 bytes in total).

use crate::error::GameError;
use crate::rules::Move;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Human-readable description of the digest input, published per deployment.
pub const COMMITMENT_LAYOUT: &str = "sha256(u8 move_tag || u256 salt big-endian)";

/// Width of a salt in bytes.
pub const SALT_LEN: usize = 32;

fn strip_hex_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// 256-bit secret blended into a commitment
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Draw a fresh salt from the operating system's CSPRNG
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw big-endian bytes
    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a small integer, mostly useful for fixtures
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; SALT_LEN];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({}..)", hex::encode(&self.0[..4]))
    }
}

impl FromStr for Salt {
    type Err = GameError;

    /// Parses `0x`-prefixed (or bare) hex of up to 64 digits as an integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s);
        if digits.is_empty() || digits.len() > SALT_LEN * 2 {
            return Err(GameError::InvalidInput(format!(
                "salt must be 1 to {} hex digits",
                SALT_LEN * 2
            )));
        }

        let padded = format!("{:0>width$}", digits, width = SALT_LEN * 2);
        let mut bytes = [0u8; SALT_LEN];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| GameError::InvalidInput(format!("salt is not valid hex: {}", e)))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(s)
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let text = String::deserialize(d)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Commitment = SHA-256(move_tag || salt)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment([u8; 32]);

impl Commitment {
    /// Commit to a move under the given salt
    pub fn new(mv: Move, salt: &Salt) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([mv.tag()]);
        hasher.update(salt.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify that the given move and salt produce this commitment
    pub fn verify(&self, mv: Move, salt: &Salt) -> bool {
        *self == Self::new(mv, salt)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Commitment {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| {
            GameError::InvalidInput(format!("commitment must be 64 hex digits: {}", e))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(s)
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let text = String::deserialize(d)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

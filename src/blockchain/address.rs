//! Account addresses.
//!
//! An address is the 32-byte Ed25519 public key followed by the last four
//! bytes of its SHA-512/256 digest, base32 encoded without padding.

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha512_256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an encoded address.
pub const ADDRESS_LENGTH: usize = 58;

const KEY_LENGTH: usize = 32;
const CHECKSUM_LENGTH: usize = 4;

/// Reasons an address string is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("expected {} characters, got {}", ADDRESS_LENGTH, .0)]
    Length(usize),

    #[error("not valid base32: {0}")]
    Encoding(String),

    #[error("checksum mismatch")]
    Checksum,
}

/// A decoded account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; KEY_LENGTH]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; KEY_LENGTH]);

    pub fn from_public_key(key: [u8; KEY_LENGTH]) -> Self {
        Self(key)
    }

    pub fn public_key(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Base32 form including the checksum.
    pub fn encode(&self) -> String {
        let mut bytes = Vec::with_capacity(KEY_LENGTH + CHECKSUM_LENGTH);
        bytes.extend_from_slice(&self.0);
        bytes.extend_from_slice(&checksum(&self.0));
        BASE32_NOPAD.encode(&bytes)
    }
}

fn checksum(key: &[u8; KEY_LENGTH]) -> [u8; CHECKSUM_LENGTH] {
    let digest = Sha512_256::digest(key);
    let mut sum = [0u8; CHECKSUM_LENGTH];
    sum.copy_from_slice(&digest[digest.len() - CHECKSUM_LENGTH..]);
    sum
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_LENGTH {
            return Err(AddressError::Length(s.len()));
        }

        let bytes = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|e| AddressError::Encoding(e.to_string()))?;
        if bytes.len() != KEY_LENGTH + CHECKSUM_LENGTH {
            return Err(AddressError::Encoding(format!(
                "decoded to {} bytes",
                bytes.len()
            )));
        }

        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(&bytes[..KEY_LENGTH]);
        if checksum(&key)[..] != bytes[KEY_LENGTH..] {
            return Err(AddressError::Checksum);
        }

        Ok(Self(key))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

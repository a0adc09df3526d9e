//! Account keys derived from a recovery passphrase.
//!
//! # Security
//! - The passphrase is held in zeroizing memory and never logged
//! - The Ed25519 signing key is derived for a single signing call and
//!   dropped (and wiped) as soon as that call returns
//! - The address is derived together with the key, never set independently

use bip39::Language;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha512_256};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::blockchain::address::Address;

/// Environment variable holding the passphrase for CLI commands.
pub const PASSPHRASE_ENV_VAR: &str = "ALGO_MNEMONIC";

/// Number of words in a recovery passphrase (24 key words + 1 checksum word).
pub const PASSPHRASE_WORDS: usize = 25;

const SEED_LENGTH: usize = 32;
const BITS_PER_WORD: u32 = 11;
const WORD_MASK: u32 = (1 << BITS_PER_WORD) - 1;

/// Errors raised while decoding a passphrase.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Passphrase must have {expected} words, got {actual}")]
    WordCount { expected: usize, actual: usize },

    #[error("Unknown word at position {0}")]
    UnknownWord(usize),

    #[error("Passphrase checksum mismatch")]
    Checksum,

    #[error("Passphrase does not encode a 32-byte key")]
    KeyLength,

    #[error("Environment variable {0} not set")]
    MissingEnv(&'static str),
}

/// A 25-word recovery passphrase.
#[derive(Clone)]
pub struct Passphrase {
    words: Zeroizing<String>,
}

impl Passphrase {
    /// Generate a passphrase for a fresh random key.
    pub fn generate() -> Self {
        let key = SigningKey::generate(&mut OsRng);
        let seed = Zeroizing::new(key.to_bytes());
        Self::from_seed(&seed)
    }

    /// Encode a 32-byte Ed25519 seed as a passphrase.
    pub fn from_seed(seed: &[u8; SEED_LENGTH]) -> Self {
        let list = Language::English.word_list();
        let mut words: Vec<&str> = to_11_bit(seed)
            .into_iter()
            .map(|index| list[index as usize])
            .collect();
        words.push(list[checksum_word(seed) as usize]);
        Self {
            words: Zeroizing::new(words.join(" ")),
        }
    }

    /// Parse and verify a passphrase. Case and spacing are normalized.
    pub fn parse(phrase: &str) -> Result<Self, WalletError> {
        let seed = decode(phrase)?;
        Ok(Self::from_seed(&seed))
    }

    /// Read the passphrase from `ALGO_MNEMONIC`.
    pub fn from_env() -> Result<Self, WalletError> {
        let phrase = Zeroizing::new(
            std::env::var(PASSPHRASE_ENV_VAR)
                .map_err(|_| WalletError::MissingEnv(PASSPHRASE_ENV_VAR))?,
        );
        Self::parse(&phrase)
    }

    /// The words, for showing to the user once at account creation.
    pub fn expose(&self) -> &str {
        &self.words
    }

    /// Derive the signing key, hand it to `f`, and drop it.
    pub(crate) fn with_signing_key<T>(
        &self,
        f: impl FnOnce(&SigningKey) -> T,
    ) -> Result<T, WalletError> {
        let seed = decode(&self.words)?;
        let key = SigningKey::from_bytes(&seed);
        Ok(f(&key))
    }

    /// Address belonging to this passphrase.
    pub fn address(&self) -> Result<Address, WalletError> {
        self.with_signing_key(|key| Address::from_public_key(key.verifying_key().to_bytes()))
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

impl PartialEq for Passphrase {
    fn eq(&self, other: &Self) -> bool {
        *self.words == *other.words
    }
}

impl Eq for Passphrase {}

/// An address together with the passphrase that controls it.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    address: Address,
    passphrase: Passphrase,
}

impl Account {
    pub fn from_passphrase(passphrase: Passphrase) -> Result<Self, WalletError> {
        let address = passphrase.address()?;
        tracing::debug!(address = %address, "Account loaded");
        Ok(Self {
            address,
            passphrase,
        })
    }

    /// Create a brand new account.
    pub fn generate() -> Result<Self, WalletError> {
        Self::from_passphrase(Passphrase::generate())
    }

    /// Load the account from `ALGO_MNEMONIC`.
    pub fn from_env() -> Result<Self, WalletError> {
        Self::from_passphrase(Passphrase::from_env()?)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn passphrase(&self) -> &Passphrase {
        &self.passphrase
    }

    /// Sign `message` with a freshly derived key.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, WalletError> {
        self.passphrase.with_signing_key(|key| key.sign(message))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn decode(phrase: &str) -> Result<Zeroizing<[u8; SEED_LENGTH]>, WalletError> {
    let words: Vec<String> = phrase
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.len() != PASSPHRASE_WORDS {
        return Err(WalletError::WordCount {
            expected: PASSPHRASE_WORDS,
            actual: words.len(),
        });
    }

    let list = Language::English.word_list();
    let mut indices = Zeroizing::new(Vec::with_capacity(PASSPHRASE_WORDS));
    for (position, word) in words.iter().enumerate() {
        let index = list
            .iter()
            .position(|candidate| *candidate == word.as_str())
            .ok_or(WalletError::UnknownWord(position + 1))?;
        indices.push(index as u16);
    }

    let (key_words, checksum) = indices.split_at(PASSPHRASE_WORDS - 1);
    let bytes = Zeroizing::new(from_11_bit(key_words));
    // 24 words carry 264 bits; the final byte is padding and must be zero.
    if bytes.len() != SEED_LENGTH + 1 || bytes[SEED_LENGTH] != 0 {
        return Err(WalletError::KeyLength);
    }

    let mut seed = Zeroizing::new([0u8; SEED_LENGTH]);
    seed.copy_from_slice(&bytes[..SEED_LENGTH]);
    if checksum_word(&seed) != checksum[0] {
        return Err(WalletError::Checksum);
    }
    Ok(seed)
}

fn checksum_word(seed: &[u8; SEED_LENGTH]) -> u16 {
    let digest = Sha512_256::digest(seed);
    to_11_bit(&digest[..2])[0]
}

/// Split bytes into little-endian 11-bit groups; a partial group is kept.
fn to_11_bit(data: &[u8]) -> Vec<u16> {
    let mut buffer: u32 = 0;
    let mut bits = 0;
    let mut out = Vec::with_capacity(data.len() * 8 / BITS_PER_WORD as usize + 1);
    for &byte in data {
        buffer |= (byte as u32) << bits;
        bits += 8;
        if bits >= BITS_PER_WORD {
            out.push((buffer & WORD_MASK) as u16);
            buffer >>= BITS_PER_WORD;
            bits -= BITS_PER_WORD;
        }
    }
    if bits != 0 {
        out.push((buffer & WORD_MASK) as u16);
    }
    out
}

fn from_11_bit(words: &[u16]) -> Vec<u8> {
    let mut buffer: u32 = 0;
    let mut bits = 0;
    let mut out = Vec::with_capacity(words.len() * BITS_PER_WORD as usize / 8 + 1);
    for &word in words {
        buffer |= (word as u32) << bits;
        bits += BITS_PER_WORD;
        while bits >= 8 {
            out.push((buffer & 0xff) as u8);
            buffer >>= 8;
            bits -= 8;
        }
    }
    if bits != 0 {
        out.push((buffer & 0xff) as u8);
    }
    out
}

//! Byte radix and the byte-level view of words.
//!
//! A MIX byte holds between 64 and 100 distinct values; the exact number is
//! fixed when a machine is built. Every operation that needs to see the
//! bytes of a word (field slicing, stores, shifts, instruction decoding)
//! goes through a [`ByteRadix`].

use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::word::{FieldSpec, Sign, Word};

/// Smallest permitted radix.
pub const RADIX_MIN: u32 = 64;

/// Largest permitted radix.
pub const RADIX_MAX: u32 = 100;

/// A validated byte radix, 64 to 100 inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ByteRadix {
    base: u32,
}

impl ByteRadix {
    /// Binary MIX: six-bit bytes.
    pub const BINARY: ByteRadix = ByteRadix { base: 64 };

    /// Decimal MIX: two-digit bytes.
    pub const DECIMAL: ByteRadix = ByteRadix { base: 100 };

    /// Validate a radix.
    pub fn new(base: u32) -> Result<Self, ConfigError> {
        if (RADIX_MIN..=RADIX_MAX).contains(&base) {
            Ok(Self { base })
        } else {
            Err(ConfigError::RadixOutOfRange(base))
        }
    }

    #[inline]
    pub const fn base(self) -> u32 {
        self.base
    }

    /// `radix^width`, the number of magnitudes a `width`-byte field holds.
    #[inline]
    pub fn capacity(self, width: usize) -> u64 {
        (self.base as u64).pow(width as u32)
    }

    /// `radix^5`.
    #[inline]
    pub fn word_capacity(self) -> u64 {
        self.capacity(Word::BYTES)
    }

    /// True if the word's magnitude fits in five bytes.
    #[inline]
    pub fn fits(self, word: Word) -> bool {
        word.magnitude() < self.word_capacity()
    }

    /// The five bytes of a magnitude, most significant first.
    ///
    /// Magnitudes of `radix^5` or more lose their high part.
    pub fn encode(self, magnitude: u64) -> [u8; 5] {
        let base = self.base as u64;
        let mut bytes = [0u8; 5];
        let mut rest = magnitude;
        for byte in bytes.iter_mut().rev() {
            *byte = (rest % base) as u8;
            rest /= base;
        }
        bytes
    }

    /// Positional value of a big-endian byte slice.
    pub fn decode(self, bytes: &[u8]) -> u64 {
        let base = self.base as u64;
        bytes.iter().fold(0u64, |acc, &b| acc * base + b as u64)
    }

    /// The ten bytes of the A:X register pair.
    pub fn encode_pair(self, high: u64, low: u64) -> [u8; 10] {
        let mut bytes = [0u8; 10];
        bytes[..5].copy_from_slice(&self.encode(high));
        bytes[5..].copy_from_slice(&self.encode(low));
        bytes
    }

    /// Split ten bytes back into the A and X magnitudes.
    pub fn decode_pair(self, bytes: &[u8; 10]) -> (u64, u64) {
        (self.decode(&bytes[..5]), self.decode(&bytes[5..]))
    }

    /// Extract a field as a signed value.
    ///
    /// When the field includes the sign the result carries the word's sign;
    /// otherwise the result is positive. The selected bytes are
    /// right-justified in the result.
    pub fn slice(self, word: Word, spec: FieldSpec) -> Word {
        let sign = if spec.includes_sign() { word.sign() } else { Sign::Pos };
        if spec.byte_count() == 0 {
            return Word::new(sign, 0);
        }
        let bytes = self.encode(word.magnitude());
        let first = spec.first_byte() as usize - 1;
        let last = spec.right() as usize;
        Word::new(sign, self.decode(&bytes[first..last]))
    }

    /// Replace a field of `dest` with the rightmost bytes of `src`.
    ///
    /// This is the store rule: the sign is replaced only when the field
    /// includes it.
    pub fn splice(self, dest: Word, src: Word, spec: FieldSpec) -> Word {
        let sign = if spec.includes_sign() { src.sign() } else { dest.sign() };
        let count = spec.byte_count();
        let mut bytes = self.encode(dest.magnitude());
        let src_bytes = self.encode(src.magnitude());
        let first = spec.first_byte() as usize - 1;
        bytes[first..first + count].copy_from_slice(&src_bytes[Word::BYTES - count..]);
        Word::new(sign, self.decode(&bytes))
    }

    /// Build a positive word from five bytes.
    pub fn word_from_bytes(self, sign: Sign, bytes: [u8; 5]) -> Word {
        Word::new(sign, self.decode(&bytes))
    }
}

impl Default for ByteRadix {
    fn default() -> Self {
        Self::BINARY
    }
}

impl TryFrom<u32> for ByteRadix {
    type Error = ConfigError;

    fn try_from(base: u32) -> Result<Self, Self::Error> {
        ByteRadix::new(base)
    }
}

impl From<ByteRadix> for u32 {
    fn from(radix: ByteRadix) -> u32 {
        radix.base
    }
}

/// Errors raised while configuring a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("byte radix {0} out of range ({RADIX_MIN} to {RADIX_MAX})")]
    RadixOutOfRange(u32),
}

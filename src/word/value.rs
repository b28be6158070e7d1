//! The MIX word: a sign plus a five-byte magnitude.
//!
//! A `Word` does not know its byte radix. Byte-level views (encoding,
//! field slicing, splicing) live on [`ByteRadix`](super::ByteRadix), which
//! also bounds the magnitude to `radix^5`.

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::word::Sign;

/// A signed-magnitude word.
///
/// Used for:
/// - Memory cells (4000 of them)
/// - The contents of every register (2-byte registers just hold smaller
///   magnitudes)
/// - Instructions, once fetched
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Word {
    sign: Sign,
    magnitude: u64,
}

impl Word {
    /// Number of bytes in a word (the sign is not a byte).
    pub const BYTES: usize = 5;

    /// Positive zero.
    #[inline]
    pub const fn zero() -> Self {
        Self { sign: Sign::Pos, magnitude: 0 }
    }

    /// Build a word from its parts.
    #[inline]
    pub const fn new(sign: Sign, magnitude: u64) -> Self {
        Self { sign, magnitude }
    }

    /// Positive word with the given magnitude.
    #[inline]
    pub const fn positive(magnitude: u64) -> Self {
        Self::new(Sign::Pos, magnitude)
    }

    /// Convert from a signed integer. Zero becomes `+0`.
    pub fn from_i64(value: i64) -> Self {
        Self {
            sign: Sign::of(value),
            magnitude: value.unsigned_abs(),
        }
    }

    /// Signed value; `-0` and `+0` both give `0`.
    pub fn to_i64(&self) -> i64 {
        self.sign.to_i64() * self.magnitude as i64
    }

    #[inline]
    pub const fn sign(&self) -> Sign {
        self.sign
    }

    #[inline]
    pub const fn magnitude(&self) -> u64 {
        self.magnitude
    }

    /// True for `+0` and `-0`.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.magnitude == 0
    }

    /// Same magnitude, opposite sign.
    #[inline]
    pub const fn negated(&self) -> Self {
        Self { sign: self.sign.flip(), magnitude: self.magnitude }
    }

    /// Same magnitude, given sign.
    #[inline]
    pub const fn with_sign(&self, sign: Sign) -> Self {
        Self { sign, magnitude: self.magnitude }
    }
}

impl From<i64> for Word {
    fn from(value: i64) -> Self {
        Word::from_i64(value)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({}{})", self.sign, self.magnitude)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:010}", self.sign, self.magnitude)
    }
}

impl std::ops::Neg for Word {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

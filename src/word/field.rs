//! Field specifications: the `(L:R)` part of an instruction.
//!
//! Field 0 is the sign, fields 1 to 5 are the bytes of the word, most
//! significant first. The raw F byte encodes `8L + R`.

use std::fmt;
use serde::{Serialize, Deserialize};

/// A decoded `(L:R)` field specification, `0 <= L <= R <= 5`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    left: u8,
    right: u8,
}

impl FieldSpec {
    /// The whole word, `(0:5)`.
    pub const FULL: FieldSpec = FieldSpec { left: 0, right: 5 };

    /// Sign only, `(0:0)`.
    pub const SIGN: FieldSpec = FieldSpec { left: 0, right: 0 };

    /// Build from explicit bounds.
    pub fn new(left: u8, right: u8) -> Option<Self> {
        if left <= right && right <= 5 {
            Some(Self { left, right })
        } else {
            None
        }
    }

    /// Decode a raw F value (`L = F / 8`, `R = F % 8`).
    ///
    /// Returns `None` when the result is not a valid field, e.g. F = 7
    /// gives `(0:7)` and F = 40 gives `(5:0)`.
    pub fn decode(raw: u8) -> Option<Self> {
        Self::new(raw / 8, raw % 8)
    }

    /// The raw F value, `8L + R`.
    pub const fn to_raw(self) -> u8 {
        self.left * 8 + self.right
    }

    #[inline]
    pub const fn left(self) -> u8 {
        self.left
    }

    #[inline]
    pub const fn right(self) -> u8 {
        self.right
    }

    /// True when the sign is part of the field.
    #[inline]
    pub const fn includes_sign(self) -> bool {
        self.left == 0
    }

    /// First byte of the field (1-based); the sign does not count.
    #[inline]
    pub const fn first_byte(self) -> u8 {
        if self.left == 0 { 1 } else { self.left }
    }

    /// Number of bytes covered, not counting the sign.
    #[inline]
    pub const fn byte_count(self) -> usize {
        if self.right == 0 {
            0
        } else {
            (self.right - self.first_byte() + 1) as usize
        }
    }
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.left, self.right)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.left, self.right)
    }
}

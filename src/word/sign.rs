//! The sign indicator carried by every MIX word and register.
//!
//! MIX is a signed-magnitude machine: the sign is stored independently of
//! the magnitude, so a negative zero is representable and distinct in
//! storage even though it compares equal to positive zero.

use std::fmt;
use serde::{Serialize, Deserialize};

/// The sign of a word or register.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sign {
    /// Plus (`+`)
    #[default]
    Pos,
    /// Minus (`-`)
    Neg,
}

impl Sign {
    /// Both signs, plus first.
    pub const ALL: [Sign; 2] = [Sign::Pos, Sign::Neg];

    /// The sign of a signed integer; zero is positive.
    #[inline]
    pub const fn of(value: i64) -> Self {
        if value < 0 { Sign::Neg } else { Sign::Pos }
    }

    /// `+1` or `-1`.
    #[inline]
    pub const fn to_i64(self) -> i64 {
        match self {
            Sign::Pos => 1,
            Sign::Neg => -1,
        }
    }

    /// The opposite sign.
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Sign::Pos => Sign::Neg,
            Sign::Neg => Sign::Pos,
        }
    }

    /// Sign of a product or quotient: negative iff exactly one input is.
    #[inline]
    pub const fn product(self, other: Self) -> Self {
        match (self, other) {
            (Sign::Pos, Sign::Pos) | (Sign::Neg, Sign::Neg) => Sign::Pos,
            _ => Sign::Neg,
        }
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        matches!(self, Sign::Neg)
    }

    /// The character used in listings.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Sign::Pos => '+',
            Sign::Neg => '-',
        }
    }
}

impl fmt::Debug for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl std::ops::Neg for Sign {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.flip()
    }
}

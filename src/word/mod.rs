//! MIX data primitives.
//!
//! This module provides the core types for working with MIX words:
//! - [`Sign`] - The sign carried by every word and register
//! - [`Word`] - A sign plus a five-byte magnitude
//! - [`ByteRadix`] - The configured byte size and the byte-level view of words
//! - [`FieldSpec`] - An `(L:R)` field specification

mod sign;
mod value;
mod field;
pub mod radix;

pub use sign::Sign;
pub use value::Word;
pub use field::FieldSpec;
pub use radix::{ByteRadix, ConfigError, RADIX_MAX, RADIX_MIN};

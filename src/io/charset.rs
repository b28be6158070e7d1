//! MIX character codes.
//!
//! Codes 0 to 55 are defined; `Δ`, `Σ` and `Π` are the three Greek
//! letters in Knuth's table. Character-oriented devices carry five codes
//! per word, one per byte.

use thiserror::Error;
use crate::word::{ByteRadix, Sign, Word};

/// Characters for codes 0..=55.
pub const CHARSET: [char; 56] = [
    ' ', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'Δ', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'Σ', 'Π', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    '.', ',', '(', ')', '+', '-', '*', '/', '=', '$',
    '<', '>', '@', ';', ':', '\'',
];

/// Code of the digit `0`; digit `d` is `DIGIT_ZERO + d`.
pub const DIGIT_ZERO: u8 = 30;

/// The character for a code.
pub fn to_char(code: u8) -> Option<char> {
    CHARSET.get(code as usize).copied()
}

/// The code for a character. Lower-case letters map to upper case.
pub fn from_char(c: char) -> Option<u8> {
    let c = c.to_ascii_uppercase();
    CHARSET.iter().position(|&x| x == c).map(|i| i as u8)
}

/// Pack text into positive words, five characters each, padding the last
/// word with blanks.
pub fn encode_text(text: &str, radix: ByteRadix) -> Result<Vec<Word>, CharsetError> {
    let codes = text
        .chars()
        .map(|c| from_char(c).ok_or(CharsetError::UnknownChar(c)))
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(codes
        .chunks(Word::BYTES)
        .map(|chunk| {
            let mut bytes = [0u8; 5];
            bytes[..chunk.len()].copy_from_slice(chunk);
            radix.word_from_bytes(Sign::Pos, bytes)
        })
        .collect())
}

/// Render words as text, five characters per word. Signs are ignored.
pub fn decode_text(words: &[Word], radix: ByteRadix) -> Result<String, CharsetError> {
    let mut text = String::with_capacity(words.len() * Word::BYTES);
    for word in words {
        for code in radix.encode(word.magnitude()) {
            text.push(to_char(code).ok_or(CharsetError::UndefinedCode(code))?);
        }
    }
    Ok(text)
}

/// Errors from character conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharsetError {
    #[error("no MIX character code for {0:?}")]
    UnknownChar(char),

    #[error("character code {0} is undefined")]
    UndefinedCode(u8),
}

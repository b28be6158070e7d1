//! Instruction decoder for MIX.
//!
//! An instruction is an ordinary word laid out as `± A A I F C`:
//! - sign and bytes 1-2: the signed address
//! - byte 3: index register selector (0 = none, 1..=6 = rI1..rI6)
//! - byte 4: field specification or operation modifier
//! - byte 5: opcode
//!
//! The decoder only splits the word. What F means (a field, a shift
//! variant, a jump condition, a unit number) is resolved by the dispatch
//! table.

use std::fmt;
use crate::cpu::registers::RegisterId;
use crate::word::{ByteRadix, Sign, Word};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// A fetched instruction split into its fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub sign: Sign,
    /// Magnitude of the address part (bytes 1-2).
    pub address: u64,
    pub index: u8,
    pub field: u8,
    pub opcode: u8,
}

impl Instruction {
    /// Build an instruction from a signed address.
    pub fn new(opcode: u8, address: i64, index: u8, field: u8) -> Self {
        Self {
            sign: Sign::of(address),
            address: address.unsigned_abs(),
            index,
            field,
            opcode,
        }
    }

    /// Same instruction with a different sign on the address.
    pub fn with_sign(mut self, sign: Sign) -> Self {
        self.sign = sign;
        self
    }

    /// Signed value of the address part.
    pub fn address_value(&self) -> i64 {
        self.sign.to_i64() * self.address as i64
    }

    /// The index register named by the I byte, if any.
    pub fn index_register(&self) -> Option<RegisterId> {
        RegisterId::index(self.index)
    }

    /// Pack back into a word.
    ///
    /// Fails when the address does not fit two bytes or another part does
    /// not fit one byte.
    pub fn encode(&self, radix: ByteRadix) -> Result<Word, EncodeError> {
        if self.address >= radix.capacity(2) {
            return Err(EncodeError::AddressOutOfRange(self.address_value()));
        }
        for (part, value) in [("index", self.index), ("field", self.field), ("opcode", self.opcode)] {
            if value as u32 >= radix.base() {
                return Err(EncodeError::ByteOutOfRange { part, value });
            }
        }

        let base = radix.base() as u64;
        Ok(radix.word_from_bytes(
            self.sign,
            [
                (self.address / base) as u8,
                (self.address % base) as u8,
                self.index,
                self.field,
                self.opcode,
            ],
        ))
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instruction({}{} {} {} {})",
            self.sign, self.address, self.index, self.field, self.opcode
        )
    }
}

/// Split an instruction word into its parts.
pub fn decode(word: Word, radix: ByteRadix) -> Result<Instruction, DecodeError> {
    let [a1, a2, index, field, opcode] = radix.encode(word.magnitude());

    if index > 6 {
        return Err(DecodeError::UndefinedRegister(index));
    }

    Ok(Instruction {
        sign: word.sign(),
        address: radix.decode(&[a1, a2]),
        index,
        field,
        opcode,
    })
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("undefined index register {0}")]
    UndefinedRegister(u8),

    #[error("unsupported opcode {opcode} with modifier {field}")]
    UnsupportedOpcode { opcode: u8, field: u8 },
}

/// Errors from packing an instruction into a word.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("address {0} does not fit two bytes")]
    AddressOutOfRange(i64),

    #[error("{part} {value} does not fit one byte")]
    ByteOutOfRange { part: &'static str, value: u8 },
}

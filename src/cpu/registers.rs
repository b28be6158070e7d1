//! MIX CPU registers.
//!
//! The MIX register file:
//! - A: 5-byte accumulator
//! - X: 5-byte extension register
//! - I1..I6: 2-byte index registers
//! - J: 2-byte jump register, always positive
//! - the overflow toggle, the comparison indicator, and the program counter

use std::fmt;
use crate::word::{ByteRadix, Sign, Word};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Names the nine addressable registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterId {
    A,
    I1,
    I2,
    I3,
    I4,
    I5,
    I6,
    X,
    J,
}

impl RegisterId {
    /// The eight registers addressed by an opcode offset 0..=7 in the
    /// LD, LDN, ST, jump, address-transfer and CMP families.
    pub const FAMILY: [RegisterId; 8] = [
        RegisterId::A,
        RegisterId::I1,
        RegisterId::I2,
        RegisterId::I3,
        RegisterId::I4,
        RegisterId::I5,
        RegisterId::I6,
        RegisterId::X,
    ];

    /// The index register selected by an instruction's I byte (1..=6).
    pub fn index(i: u8) -> Option<Self> {
        match i {
            1..=6 => Some(Self::FAMILY[i as usize]),
            _ => None,
        }
    }

    pub fn kind(self) -> RegisterKind {
        match self {
            RegisterId::A | RegisterId::X => RegisterKind::Full,
            RegisterId::J => RegisterKind::Jump,
            _ => RegisterKind::Index,
        }
    }

    /// Mnemonic suffix: `A`, `1`..`6`, `X`, `J`.
    pub fn suffix(self) -> &'static str {
        match self {
            RegisterId::A => "A",
            RegisterId::I1 => "1",
            RegisterId::I2 => "2",
            RegisterId::I3 => "3",
            RegisterId::I4 => "4",
            RegisterId::I5 => "5",
            RegisterId::I6 => "6",
            RegisterId::X => "X",
            RegisterId::J => "J",
        }
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterId::A | RegisterId::X | RegisterId::J => write!(f, "r{}", self.suffix()),
            _ => write!(f, "rI{}", self.suffix()),
        }
    }
}

/// Register width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterKind {
    /// Five bytes plus sign (A, X).
    Full,
    /// Two bytes plus sign (I1..I6).
    Index,
    /// Two bytes, sign always `+` (J).
    Jump,
}

impl RegisterKind {
    /// Width in bytes.
    pub const fn width(self) -> usize {
        match self {
            RegisterKind::Full => 5,
            RegisterKind::Index | RegisterKind::Jump => 2,
        }
    }
}

/// A single register: a width class, a sign and a magnitude.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    kind: RegisterKind,
    sign: Sign,
    magnitude: u64,
}

impl Register {
    /// A register holding `+0`.
    pub const fn new(kind: RegisterKind) -> Self {
        Self { kind, sign: Sign::Pos, magnitude: 0 }
    }

    pub const fn kind(&self) -> RegisterKind {
        self.kind
    }

    /// Current contents as a word.
    pub const fn word(&self) -> Word {
        Word::new(self.sign, self.magnitude)
    }

    /// Replace the contents. The J register ignores the sign it is given.
    ///
    /// Fails without changing the register if the magnitude does not fit
    /// its width.
    fn load(&mut self, value: Word, radix: ByteRadix) -> Result<(), u64> {
        if value.magnitude() >= radix.capacity(self.kind.width()) {
            return Err(value.magnitude());
        }
        self.sign = match self.kind {
            RegisterKind::Jump => Sign::Pos,
            _ => value.sign(),
        };
        self.magnitude = value.magnitude();
        Ok(())
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sign, self.magnitude)
    }
}

/// State of the comparison indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Comparison {
    Less,
    #[default]
    Equal,
    Greater,
}

impl Comparison {
    /// Compare two signed values (so `+0` equals `-0`).
    pub fn of(lhs: i64, rhs: i64) -> Self {
        match lhs.cmp(&rhs) {
            std::cmp::Ordering::Less => Comparison::Less,
            std::cmp::Ordering::Equal => Comparison::Equal,
            std::cmp::Ordering::Greater => Comparison::Greater,
        }
    }
}

/// The MIX register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    a: Register,
    x: Register,
    i: [Register; 6],
    j: Register,

    /// Overflow toggle. Sticky: only JOV and JNOV clear it.
    pub overflow: bool,

    /// Comparison indicator, set by CMP and read by conditional jumps.
    pub comparison: Comparison,

    /// Program counter: address of the next instruction to fetch.
    pub pc: u16,

    radix: ByteRadix,
}

impl Registers {
    /// Create a register file with every register at `+0`.
    pub fn new(radix: ByteRadix) -> Self {
        Self {
            a: Register::new(RegisterKind::Full),
            x: Register::new(RegisterKind::Full),
            i: [Register::new(RegisterKind::Index); 6],
            j: Register::new(RegisterKind::Jump),
            overflow: false,
            comparison: Comparison::Equal,
            pc: 0,
            radix,
        }
    }

    /// Reset all registers and flags.
    pub fn reset(&mut self) {
        *self = Self::new(self.radix);
    }

    pub fn radix(&self) -> ByteRadix {
        self.radix
    }

    fn slot(&self, id: RegisterId) -> &Register {
        match id {
            RegisterId::A => &self.a,
            RegisterId::X => &self.x,
            RegisterId::J => &self.j,
            RegisterId::I1 => &self.i[0],
            RegisterId::I2 => &self.i[1],
            RegisterId::I3 => &self.i[2],
            RegisterId::I4 => &self.i[3],
            RegisterId::I5 => &self.i[4],
            RegisterId::I6 => &self.i[5],
        }
    }

    fn slot_mut(&mut self, id: RegisterId) -> &mut Register {
        match id {
            RegisterId::A => &mut self.a,
            RegisterId::X => &mut self.x,
            RegisterId::J => &mut self.j,
            RegisterId::I1 => &mut self.i[0],
            RegisterId::I2 => &mut self.i[1],
            RegisterId::I3 => &mut self.i[2],
            RegisterId::I4 => &mut self.i[3],
            RegisterId::I5 => &mut self.i[4],
            RegisterId::I6 => &mut self.i[5],
        }
    }

    /// Read a register.
    #[inline]
    pub fn get(&self, id: RegisterId) -> Word {
        self.slot(id).word()
    }

    /// Write a register, rejecting magnitudes wider than the register.
    pub fn set(&mut self, id: RegisterId, value: Word) -> Result<(), RegisterError> {
        let radix = self.radix;
        self.slot_mut(id)
            .load(value, radix)
            .map_err(|magnitude| RegisterError::Overflow { register: id, magnitude })
    }

    /// Accumulator contents.
    #[inline]
    pub fn a(&self) -> Word {
        self.a.word()
    }

    /// Extension register contents.
    #[inline]
    pub fn x(&self) -> Word {
        self.x.word()
    }

    /// Jump register contents (always positive).
    #[inline]
    pub fn j(&self) -> Word {
        self.j.word()
    }

    /// Store a value in A or X that is already known to fit in five bytes.
    pub(crate) fn set_full(&mut self, id: RegisterId, value: Word) {
        debug_assert_eq!(id.kind(), RegisterKind::Full);
        let word_capacity = self.radix.word_capacity();
        let slot = self.slot_mut(id);
        slot.sign = value.sign();
        slot.magnitude = value.magnitude() % word_capacity;
    }

    /// Record a return address in J.
    pub(crate) fn set_jump(&mut self, addr: u16) {
        self.j.sign = Sign::Pos;
        self.j.magnitude = addr as u64;
    }

    /// Increment the program counter by 1.
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> u16 {
        let old = self.pc;
        self.pc += 1;
        old
    }

    /// Compute an effective address: the signed address field plus the
    /// contents of the selected index register, if any.
    pub fn effective_address(&self, address: i64, index: Option<RegisterId>) -> i64 {
        match index {
            Some(id) => address + self.get(id).to_i64(),
            None => address,
        }
    }
}

/// Errors raised by register writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("value {magnitude} does not fit in {register}")]
    Overflow { register: RegisterId, magnitude: u64 },
}

//! Opcode dispatch.
//!
//! MIX has 64 opcodes, but many of them are families: one opcode per
//! register (LD, LDN, ST, CMP, the register jumps), or one opcode whose F
//! byte picks the operation (shifts, NUM/CHAR/HLT, the general jumps,
//! INC/DEC/ENT/ENN). The table below is built once from an explicit
//! enumeration and resolves `(opcode, F)` to an [`Operation`].

use once_cell::sync::Lazy;
use serde::{Serialize, Deserialize};
use crate::cpu::decode::DecodeError;
use crate::cpu::registers::RegisterId;

/// Linear and circular shift variants (opcode 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftKind {
    /// SLA: A left, zero fill.
    LeftA,
    /// SRA: A right, zero fill.
    RightA,
    /// SLAX: A:X left, zero fill.
    LeftAX,
    /// SRAX: A:X right, zero fill.
    RightAX,
    /// SLC: A:X left, circular.
    LeftCircular,
    /// SRC: A:X right, circular.
    RightCircular,
}

/// A sign/zero test applied to a register by the opcode 40..=47 jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterTest {
    Negative,
    Zero,
    Positive,
    NonNegative,
    NonZero,
    NonPositive,
}

impl RegisterTest {
    const ALL: [RegisterTest; 6] = [
        RegisterTest::Negative,
        RegisterTest::Zero,
        RegisterTest::Positive,
        RegisterTest::NonNegative,
        RegisterTest::NonZero,
        RegisterTest::NonPositive,
    ];

    /// Apply the test to a signed value (`-0` counts as zero).
    pub fn holds(self, value: i64) -> bool {
        match self {
            RegisterTest::Negative => value < 0,
            RegisterTest::Zero => value == 0,
            RegisterTest::Positive => value > 0,
            RegisterTest::NonNegative => value >= 0,
            RegisterTest::NonZero => value != 0,
            RegisterTest::NonPositive => value <= 0,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            RegisterTest::Negative => "N",
            RegisterTest::Zero => "Z",
            RegisterTest::Positive => "P",
            RegisterTest::NonNegative => "NN",
            RegisterTest::NonZero => "NZ",
            RegisterTest::NonPositive => "NP",
        }
    }
}

/// What a jump instruction tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpCondition {
    /// JMP
    Always,
    /// JSJ: jump without saving rJ.
    AlwaysNoSave,
    /// JOV: overflow on (and clear it).
    Overflow,
    /// JNOV: overflow off (and clear it).
    NoOverflow,
    Less,
    Equal,
    Greater,
    GreaterOrEqual,
    NotEqual,
    LessOrEqual,
    /// JAN, J1Z, JXNP, ...
    Register(RegisterId, RegisterTest),
}

impl JumpCondition {
    const GENERAL: [JumpCondition; 10] = [
        JumpCondition::Always,
        JumpCondition::AlwaysNoSave,
        JumpCondition::Overflow,
        JumpCondition::NoOverflow,
        JumpCondition::Less,
        JumpCondition::Equal,
        JumpCondition::Greater,
        JumpCondition::GreaterOrEqual,
        JumpCondition::NotEqual,
        JumpCondition::LessOrEqual,
    ];

    /// True unless this is JSJ.
    pub fn saves_return_address(self) -> bool {
        self != JumpCondition::AlwaysNoSave
    }
}

/// Address transfer operations (opcodes 48..=55, selected by F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferOp {
    Increase,
    Decrease,
    Enter,
    EnterNegative,
}

impl TransferOp {
    const ALL: [TransferOp; 4] = [
        TransferOp::Increase,
        TransferOp::Decrease,
        TransferOp::Enter,
        TransferOp::EnterNegative,
    ];
}

/// A fully resolved operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Nop,
    Add,
    Sub,
    Mul,
    Div,
    Num,
    Char,
    Halt,
    Shift(ShiftKind),
    Move,
    Load(RegisterId),
    LoadNegative(RegisterId),
    /// STA..STX and STJ.
    Store(RegisterId),
    StoreZero,
    JumpBusy,
    IoControl,
    Input,
    Output,
    JumpReady,
    Jump(JumpCondition),
    Transfer(TransferOp, RegisterId),
    Compare(RegisterId),
}

impl Operation {
    /// True if the F byte of this operation is an `(L:R)` field.
    pub fn uses_field(self) -> bool {
        matches!(
            self,
            Operation::Add
                | Operation::Sub
                | Operation::Mul
                | Operation::Div
                | Operation::Load(_)
                | Operation::LoadNegative(_)
                | Operation::Store(_)
                | Operation::StoreZero
                | Operation::Compare(_)
        )
    }

    /// True if the F byte names an I/O unit.
    pub fn uses_unit(self) -> bool {
        matches!(
            self,
            Operation::JumpBusy
                | Operation::IoControl
                | Operation::Input
                | Operation::Output
                | Operation::JumpReady
        )
    }

    /// The MIXAL mnemonic.
    pub fn mnemonic(self) -> String {
        match self {
            Operation::Nop => "NOP".into(),
            Operation::Add => "ADD".into(),
            Operation::Sub => "SUB".into(),
            Operation::Mul => "MUL".into(),
            Operation::Div => "DIV".into(),
            Operation::Num => "NUM".into(),
            Operation::Char => "CHAR".into(),
            Operation::Halt => "HLT".into(),
            Operation::Shift(kind) => match kind {
                ShiftKind::LeftA => "SLA",
                ShiftKind::RightA => "SRA",
                ShiftKind::LeftAX => "SLAX",
                ShiftKind::RightAX => "SRAX",
                ShiftKind::LeftCircular => "SLC",
                ShiftKind::RightCircular => "SRC",
            }
            .into(),
            Operation::Move => "MOVE".into(),
            Operation::Load(r) => format!("LD{}", r.suffix()),
            Operation::LoadNegative(r) => format!("LD{}N", r.suffix()),
            Operation::Store(r) => format!("ST{}", r.suffix()),
            Operation::StoreZero => "STZ".into(),
            Operation::JumpBusy => "JBUS".into(),
            Operation::IoControl => "IOC".into(),
            Operation::Input => "IN".into(),
            Operation::Output => "OUT".into(),
            Operation::JumpReady => "JRED".into(),
            Operation::Jump(cond) => match cond {
                JumpCondition::Always => "JMP".into(),
                JumpCondition::AlwaysNoSave => "JSJ".into(),
                JumpCondition::Overflow => "JOV".into(),
                JumpCondition::NoOverflow => "JNOV".into(),
                JumpCondition::Less => "JL".into(),
                JumpCondition::Equal => "JE".into(),
                JumpCondition::Greater => "JG".into(),
                JumpCondition::GreaterOrEqual => "JGE".into(),
                JumpCondition::NotEqual => "JNE".into(),
                JumpCondition::LessOrEqual => "JLE".into(),
                JumpCondition::Register(r, test) => format!("J{}{}", r.suffix(), test.suffix()),
            },
            Operation::Transfer(op, r) => {
                let stem = match op {
                    TransferOp::Increase => "INC",
                    TransferOp::Decrease => "DEC",
                    TransferOp::Enter => "ENT",
                    TransferOp::EnterNegative => "ENN",
                };
                format!("{}{}", stem, r.suffix())
            }
            Operation::Compare(r) => format!("CMP{}", r.suffix()),
        }
    }
}

/// How one opcode resolves.
#[derive(Debug, Clone)]
enum Slot {
    /// The opcode alone decides; F is an operand.
    Fixed(Operation),
    /// F selects among these; an F past the end is unsupported.
    ByField(Vec<Operation>),
}

/// The `(opcode, F) -> Operation` mapping.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    slots: Vec<Slot>,
}

/// The dispatch table shared by every simulator.
pub static DISPATCH: Lazy<DispatchTable> = Lazy::new(DispatchTable::build);

impl DispatchTable {
    /// Number of opcodes.
    pub const OPCODES: usize = 64;

    fn build() -> Self {
        let mut slots = Vec::with_capacity(Self::OPCODES);

        slots.push(Slot::Fixed(Operation::Nop));
        slots.push(Slot::Fixed(Operation::Add));
        slots.push(Slot::Fixed(Operation::Sub));
        slots.push(Slot::Fixed(Operation::Mul));
        slots.push(Slot::Fixed(Operation::Div));
        slots.push(Slot::ByField(vec![Operation::Num, Operation::Char, Operation::Halt]));
        slots.push(Slot::ByField(vec![
            Operation::Shift(ShiftKind::LeftA),
            Operation::Shift(ShiftKind::RightA),
            Operation::Shift(ShiftKind::LeftAX),
            Operation::Shift(ShiftKind::RightAX),
            Operation::Shift(ShiftKind::LeftCircular),
            Operation::Shift(ShiftKind::RightCircular),
        ]));
        slots.push(Slot::Fixed(Operation::Move));

        // 8..=15 LD, 16..=23 LDN, 24..=31 ST
        for r in RegisterId::FAMILY {
            slots.push(Slot::Fixed(Operation::Load(r)));
        }
        for r in RegisterId::FAMILY {
            slots.push(Slot::Fixed(Operation::LoadNegative(r)));
        }
        for r in RegisterId::FAMILY {
            slots.push(Slot::Fixed(Operation::Store(r)));
        }

        slots.push(Slot::Fixed(Operation::Store(RegisterId::J)));
        slots.push(Slot::Fixed(Operation::StoreZero));
        slots.push(Slot::Fixed(Operation::JumpBusy));
        slots.push(Slot::Fixed(Operation::IoControl));
        slots.push(Slot::Fixed(Operation::Input));
        slots.push(Slot::Fixed(Operation::Output));
        slots.push(Slot::Fixed(Operation::JumpReady));
        slots.push(Slot::ByField(
            JumpCondition::GENERAL.iter().map(|&c| Operation::Jump(c)).collect(),
        ));

        // 40..=47 register jumps
        for r in RegisterId::FAMILY {
            slots.push(Slot::ByField(
                RegisterTest::ALL
                    .iter()
                    .map(|&t| Operation::Jump(JumpCondition::Register(r, t)))
                    .collect(),
            ));
        }

        // 48..=55 INC/DEC/ENT/ENN
        for r in RegisterId::FAMILY {
            slots.push(Slot::ByField(
                TransferOp::ALL.iter().map(|&op| Operation::Transfer(op, r)).collect(),
            ));
        }

        // 56..=63 CMP
        for r in RegisterId::FAMILY {
            slots.push(Slot::Fixed(Operation::Compare(r)));
        }

        debug_assert_eq!(slots.len(), Self::OPCODES);
        Self { slots }
    }

    /// Resolve an opcode and its F byte.
    pub fn resolve(&self, opcode: u8, field: u8) -> Result<Operation, DecodeError> {
        let unsupported = DecodeError::UnsupportedOpcode { opcode, field };
        match self.slots.get(opcode as usize) {
            Some(Slot::Fixed(op)) => Ok(*op),
            Some(Slot::ByField(ops)) => ops.get(field as usize).copied().ok_or(unsupported),
            None => Err(unsupported),
        }
    }
}

/// Resolve through the shared table.
pub fn resolve(opcode: u8, field: u8) -> Result<Operation, DecodeError> {
    DISPATCH.resolve(opcode, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_families() {
        assert_eq!(resolve(8, 5), Ok(Operation::Load(RegisterId::A)));
        assert_eq!(resolve(15, 5), Ok(Operation::Load(RegisterId::X)));
        assert_eq!(resolve(17, 5), Ok(Operation::LoadNegative(RegisterId::I1)));
        assert_eq!(resolve(30, 5), Ok(Operation::Store(RegisterId::I6)));
        assert_eq!(resolve(32, 2), Ok(Operation::Store(RegisterId::J)));
        assert_eq!(resolve(33, 5), Ok(Operation::StoreZero));
        assert_eq!(resolve(63, 5), Ok(Operation::Compare(RegisterId::X)));
    }

    #[test]
    fn test_field_selected_families() {
        assert_eq!(resolve(5, 2), Ok(Operation::Halt));
        assert_eq!(resolve(6, 4), Ok(Operation::Shift(ShiftKind::LeftCircular)));
        assert_eq!(resolve(39, 1), Ok(Operation::Jump(JumpCondition::AlwaysNoSave)));
        assert_eq!(resolve(39, 9), Ok(Operation::Jump(JumpCondition::LessOrEqual)));
        assert_eq!(
            resolve(47, 3),
            Ok(Operation::Jump(JumpCondition::Register(RegisterId::X, RegisterTest::NonNegative)))
        );
        assert_eq!(resolve(49, 2), Ok(Operation::Transfer(TransferOp::Enter, RegisterId::I1)));
    }

    #[test]
    fn test_unsupported_combinations() {
        assert_eq!(resolve(5, 3), Err(DecodeError::UnsupportedOpcode { opcode: 5, field: 3 }));
        assert_eq!(resolve(6, 6), Err(DecodeError::UnsupportedOpcode { opcode: 6, field: 6 }));
        assert_eq!(resolve(39, 10), Err(DecodeError::UnsupportedOpcode { opcode: 39, field: 10 }));
        assert_eq!(resolve(48, 4), Err(DecodeError::UnsupportedOpcode { opcode: 48, field: 4 }));
        assert_eq!(resolve(64, 0), Err(DecodeError::UnsupportedOpcode { opcode: 64, field: 0 }));
    }

    #[test]
    fn test_every_opcode_has_a_slot() {
        assert_eq!(DISPATCH.slots.len(), DispatchTable::OPCODES);
        for opcode in 0..64u8 {
            assert!(resolve(opcode, 0).is_ok(), "opcode {} has no F=0 entry", opcode);
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(resolve(9, 5).unwrap().mnemonic(), "LD1");
        assert_eq!(resolve(23, 5).unwrap().mnemonic(), "LDXN");
        assert_eq!(resolve(40, 4).unwrap().mnemonic(), "JANZ");
        assert_eq!(resolve(53, 3).unwrap().mnemonic(), "ENN5");
        assert_eq!(resolve(39, 3).unwrap().mnemonic(), "JNOV");
    }
}

//! Disassembler for MIX programs.
//!
//! Renders instruction words as MIXAL, e.g. `LDA -2000,3(1:5)`. Field
//! parts equal to the opcode's default are left out.

use crate::cpu::decode::{decode, Instruction};
use crate::cpu::dispatch::{resolve, Operation};
use crate::cpu::registers::RegisterId;
use crate::word::{ByteRadix, FieldSpec, Word};

/// Disassemble a single word.
pub fn disassemble_word(word: Word, radix: ByteRadix) -> String {
    match decode(word, radix) {
        Ok(instr) => match resolve(instr.opcode, instr.field) {
            Ok(op) => format_instruction(&instr, op),
            Err(_) => format!("??? ; {}", word),
        },
        Err(_) => format!("??? ; {}", word),
    }
}

/// Disassemble consecutive words as a listing, starting at `origin`.
pub fn disassemble(words: &[Word], origin: usize, radix: ByteRadix) -> String {
    let mut output = String::new();
    for (offset, word) in words.iter().enumerate() {
        output.push_str(&format!(
            "{:04}: {:<20} ; {}\n",
            origin + offset,
            disassemble_word(*word, radix),
            word
        ));
    }
    output
}

/// Format a decoded instruction as MIXAL.
pub fn format_instruction(instr: &Instruction, op: Operation) -> String {
    let mut text = op.mnemonic();

    let bare = matches!(op, Operation::Nop | Operation::Halt | Operation::Num | Operation::Char);
    if bare && instr.address == 0 && instr.index == 0 {
        return text;
    }

    text.push(' ');
    text.push_str(&format_address(instr));
    if let Some(field) = format_field(instr, op) {
        text.push_str(&field);
    }
    text
}

fn format_address(instr: &Instruction) -> String {
    let mut text = format!("{}", instr.address_value());
    if instr.address == 0 && instr.sign.is_negative() {
        text = "-0".to_string();
    }
    if instr.index != 0 {
        text.push_str(&format!(",{}", instr.index));
    }
    text
}

/// The parenthesised F part, if it differs from the default.
fn format_field(instr: &Instruction, op: Operation) -> Option<String> {
    let f = instr.field;
    if op.uses_unit() {
        return Some(format!("({})", f));
    }
    if op == Operation::Move {
        return (f != 1).then(|| format!("({})", f));
    }
    if op.uses_field() {
        let default = match op {
            Operation::Store(RegisterId::J) => 2,
            _ => 5,
        };
        if f == default {
            return None;
        }
        return Some(match FieldSpec::decode(f) {
            Some(spec) => format!("{}", spec),
            None => format!("({})", f),
        });
    }
    None
}

//! Shifts and the NUM / CHAR conversions. None of these touch a sign.

use crate::cpu::decode::Instruction;
use crate::cpu::dispatch::ShiftKind;
use crate::cpu::execute::{CpuError, Simulator};
use crate::cpu::registers::RegisterId;
use crate::io::charset::DIGIT_ZERO;
use crate::word::Word;

/// Shift bytes by `count` places, filling with zeros.
fn shift_bytes<const N: usize>(bytes: [u8; N], count: u64, left: bool) -> [u8; N] {
    let mut out = [0u8; N];
    if count >= N as u64 {
        return out;
    }
    let n = count as usize;
    if left {
        out[..N - n].copy_from_slice(&bytes[n..]);
    } else {
        out[n..].copy_from_slice(&bytes[..N - n]);
    }
    out
}

impl Simulator {
    pub(super) fn op_shift(&mut self, instr: &Instruction, kind: ShiftKind) -> Result<(), CpuError> {
        let m = self.address(instr)?;
        if m < 0 {
            return Err(CpuError::NegativeShift(m));
        }
        let count = m as u64;
        let radix = self.radix();
        let a = self.regs.a();
        let x = self.regs.x();

        let (new_a, new_x) = match kind {
            ShiftKind::LeftA | ShiftKind::RightA => {
                let bytes = shift_bytes(radix.encode(a.magnitude()), count, kind == ShiftKind::LeftA);
                (radix.decode(&bytes), x.magnitude())
            }
            ShiftKind::LeftAX | ShiftKind::RightAX => {
                let pair = radix.encode_pair(a.magnitude(), x.magnitude());
                radix.decode_pair(&shift_bytes(pair, count, kind == ShiftKind::LeftAX))
            }
            ShiftKind::LeftCircular | ShiftKind::RightCircular => {
                let mut pair = radix.encode_pair(a.magnitude(), x.magnitude());
                let n = (count % pair.len() as u64) as usize;
                if kind == ShiftKind::LeftCircular {
                    pair.rotate_left(n);
                } else {
                    pair.rotate_right(n);
                }
                radix.decode_pair(&pair)
            }
        };

        self.regs.set_full(RegisterId::A, Word::new(a.sign(), new_a));
        self.regs.set_full(RegisterId::X, Word::new(x.sign(), new_x));
        Ok(())
    }

    /// NUM: read the ten bytes of A:X as decimal digits (each byte mod 10)
    /// into A.
    pub(super) fn op_num(&mut self) {
        let radix = self.radix();
        let a = self.regs.a();
        let pair = radix.encode_pair(a.magnitude(), self.regs.x().magnitude());

        let value = pair.iter().fold(0u64, |acc, &b| acc * 10 + (b % 10) as u64);
        self.regs
            .set_full(RegisterId::A, Word::new(a.sign(), value % radix.word_capacity()));
    }

    /// CHAR: write the low ten decimal digits of A as character codes into
    /// A:X.
    pub(super) fn op_char(&mut self) {
        let radix = self.radix();
        let a = self.regs.a();
        let x = self.regs.x();

        let mut digits = [0u8; 10];
        let mut rest = a.magnitude();
        for d in digits.iter_mut().rev() {
            *d = DIGIT_ZERO + (rest % 10) as u8;
            rest /= 10;
        }

        self.regs
            .set_full(RegisterId::A, Word::new(a.sign(), radix.decode(&digits[..5])));
        self.regs
            .set_full(RegisterId::X, Word::new(x.sign(), radix.decode(&digits[5..])));
    }
}

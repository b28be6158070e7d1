//! Arithmetic operations: ADD, SUB, MUL, DIV, the address transfer family
//! (INC, DEC, ENT, ENN) and MOVE.

use tracing::{event, Level};

use crate::cpu::decode::Instruction;
use crate::cpu::dispatch::TransferOp;
use crate::cpu::execute::{CpuError, Simulator};
use crate::cpu::registers::{RegisterId, RegisterKind};
use crate::word::{Sign, Word};

impl Simulator {
    fn set_overflow(&mut self) {
        if !self.regs.overflow {
            event!(Level::DEBUG, "overflow set at {:04}", self.regs.pc.saturating_sub(1));
        }
        self.regs.overflow = true;
    }

    /// Store a signed sum in A or X, reducing it mod `radix^5` and setting
    /// overflow when it does not fit. A zero sum is `+0`.
    fn store_sum(&mut self, id: RegisterId, sum: i64) {
        let capacity = self.radix().word_capacity();
        let mut magnitude = sum.unsigned_abs();
        if magnitude >= capacity {
            self.set_overflow();
            magnitude %= capacity;
        }
        self.regs.set_full(id, Word::new(Sign::of(sum), magnitude));
    }

    pub(super) fn op_add(&mut self, instr: &Instruction, subtract: bool) -> Result<(), CpuError> {
        let operand = self.operand(instr)?;
        let operand = if subtract { operand.negated() } else { operand };
        let sum = self.regs.a().to_i64() + operand.to_i64();
        self.store_sum(RegisterId::A, sum);
        Ok(())
    }

    /// A:X = A * V. Both signs are the sign of the product.
    pub(super) fn op_mul(&mut self, instr: &Instruction) -> Result<(), CpuError> {
        let operand = self.operand(instr)?;
        let a = self.regs.a();
        let capacity = self.radix().word_capacity() as u128;

        let product = a.magnitude() as u128 * operand.magnitude() as u128;
        let sign = a.sign().product(operand.sign());
        self.regs.set_full(RegisterId::A, Word::new(sign, (product / capacity) as u64));
        self.regs.set_full(RegisterId::X, Word::new(sign, (product % capacity) as u64));
        Ok(())
    }

    /// A = A:X / V, X = remainder.
    ///
    /// A zero divisor, or `|A| >= |V|`, sets overflow and leaves A and X
    /// as they were.
    pub(super) fn op_div(&mut self, instr: &Instruction) -> Result<(), CpuError> {
        let operand = self.operand(instr)?;
        let a = self.regs.a();
        let x = self.regs.x();

        if operand.is_zero() || a.magnitude() >= operand.magnitude() {
            self.set_overflow();
            return Ok(());
        }

        let capacity = self.radix().word_capacity() as u128;
        let dividend = a.magnitude() as u128 * capacity + x.magnitude() as u128;
        let divisor = operand.magnitude() as u128;

        let quotient = (dividend / divisor) as u64;
        let remainder = (dividend % divisor) as u64;
        self.regs.set_full(RegisterId::A, Word::new(a.sign().product(operand.sign()), quotient));
        self.regs.set_full(RegisterId::X, Word::new(a.sign(), remainder));
        Ok(())
    }

    /// INCr, DECr, ENTr, ENNr.
    pub(super) fn op_transfer(
        &mut self,
        instr: &Instruction,
        op: TransferOp,
        r: RegisterId,
    ) -> Result<(), CpuError> {
        let m = self.address(instr)?;

        match op {
            TransferOp::Enter | TransferOp::EnterNegative => {
                // ENT1 0 keeps the instruction's sign, so `ENTA -0` loads -0
                let sign = if m == 0 { instr.sign } else { Sign::of(m) };
                let value = Word::new(sign, m.unsigned_abs());
                let value = if op == TransferOp::EnterNegative { value.negated() } else { value };
                self.set_register(r, value)
            }
            TransferOp::Increase | TransferOp::Decrease => {
                let delta = if op == TransferOp::Increase { m } else { -m };
                let sum = self.regs.get(r).to_i64() + delta;
                match r.kind() {
                    RegisterKind::Full => {
                        self.store_sum(r, sum);
                        Ok(())
                    }
                    _ => self.set_register(r, Word::from_i64(sum)),
                }
            }
        }
    }

    /// Copy F words from M to the location in rI1, then advance rI1 by F.
    pub(super) fn op_move(&mut self, instr: &Instruction) -> Result<(), CpuError> {
        let from = self.address(instr)?;
        let to = self.regs.get(RegisterId::I1).to_i64();
        let count = instr.field as i64;

        for k in 0..count {
            let word = self.mem.read(from + k)?;
            self.mem.write(to + k, word)?;
        }
        self.set_register(RegisterId::I1, Word::from_i64(to + count))
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::execute::tests::{hlt, machine};
    use crate::cpu::execute::CpuError;
    use crate::cpu::decode::Instruction;
    use crate::cpu::registers::RegisterId;
    use crate::word::{Sign, Word};

    fn add(address: i64) -> Instruction {
        Instruction::new(1, address, 0, 5)
    }

    #[test]
    fn test_add_accumulation() {
        let mut sim = machine(&[add(100), add(101), add(102), add(103), hlt()]);
        sim.load_block(
            100,
            &[Word::from_i64(400), Word::from_i64(532), Word::from_i64(-932), Word::from_i64(-20)],
        )
        .unwrap();

        let expected = [Word::new(Sign::Pos, 400), Word::new(Sign::Pos, 932), Word::new(Sign::Pos, 0), Word::new(Sign::Neg, 20)];
        for want in expected {
            sim.step().unwrap();
            assert_eq!(sim.registers().a(), want);
            assert!(!sim.registers().overflow);
        }
    }

    #[test]
    fn test_add_overflow_boundary() {
        let capacity = 64u64.pow(5);

        let mut sim = machine(&[add(100), hlt()]);
        sim.registers_mut().set(RegisterId::A, Word::positive(capacity - 2)).unwrap();
        sim.load_block(100, &[Word::positive(1)]).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.registers().a().magnitude(), capacity - 1);
        assert!(!sim.registers().overflow);

        let mut sim = machine(&[add(100), hlt()]);
        sim.registers_mut().set(RegisterId::A, Word::positive(capacity - 1)).unwrap();
        sim.load_block(100, &[Word::positive(1)]).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.registers().a(), Word::new(Sign::Pos, 0));
        assert!(sim.registers().overflow);
    }

    #[test]
    fn test_sub_overflow_keeps_negative_sign() {
        let capacity = 64u64.pow(5);

        let mut sim = machine(&[Instruction::new(2, 100, 0, 5), hlt()]); // SUB 100
        sim.registers_mut()
            .set(RegisterId::A, Word::new(Sign::Neg, capacity - 1))
            .unwrap();
        sim.load_block(100, &[Word::positive(1)]).unwrap();
        sim.run().unwrap();

        assert_eq!(sim.registers().a(), Word::new(Sign::Neg, 0));
        assert!(sim.registers().overflow);
    }

    #[test]
    fn test_sub_field() {
        // SUB 100(4:5)
        let mut sim = machine(&[Instruction::new(2, 100, 0, 4 * 8 + 5), hlt()]);
        let radix = sim.radix();
        sim.registers_mut().set(RegisterId::A, Word::from_i64(-10)).unwrap();
        sim.load_block(100, &[radix.word_from_bytes(Sign::Neg, [9, 9, 9, 0, 5])]).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.registers().a().to_i64(), -15);
    }

    #[test]
    fn test_mul_splits_product() {
        let mut sim = machine(&[Instruction::new(3, 100, 0, 5), hlt()]);
        let radix = sim.radix();
        sim.registers_mut()
            .set(RegisterId::A, radix.word_from_bytes(Sign::Neg, [0, 0, 0, 1, 0]))
            .unwrap();
        sim.load_block(100, &[radix.word_from_bytes(Sign::Pos, [0, 0, 1, 0, 0])]).unwrap();
        sim.run().unwrap();

        // 64 * 4096 = 64^3, which sits in X's byte 2
        assert_eq!(sim.registers().a(), Word::new(Sign::Neg, 0));
        assert_eq!(sim.registers().x(), radix.word_from_bytes(Sign::Neg, [0, 1, 0, 0, 0]));
        assert_eq!(sim.clock(), 10 + 10);
    }

    #[test]
    fn test_mul_high_half() {
        let mut sim = machine(&[Instruction::new(3, 100, 0, 5), hlt()]);
        let capacity = 64u64.pow(5);
        sim.registers_mut().set(RegisterId::A, Word::positive(capacity - 1)).unwrap();
        sim.load_block(100, &[Word::from_i64(-((capacity - 1) as i64))]).unwrap();
        sim.run().unwrap();

        // (c-1)^2 = (c-2)*c + 1
        assert_eq!(sim.registers().a(), Word::new(Sign::Neg, capacity - 2));
        assert_eq!(sim.registers().x(), Word::new(Sign::Neg, 1));
        assert!(!sim.registers().overflow);
    }

    #[test]
    fn test_div() {
        let mut sim = machine(&[Instruction::new(4, 100, 0, 5), hlt()]);
        sim.registers_mut().set(RegisterId::A, Word::new(Sign::Neg, 0)).unwrap();
        sim.registers_mut().set(RegisterId::X, Word::positive(17)).unwrap();
        sim.load_block(100, &[Word::positive(3)]).unwrap();
        sim.run().unwrap();

        assert_eq!(sim.registers().a(), Word::new(Sign::Neg, 5));
        assert_eq!(sim.registers().x(), Word::new(Sign::Neg, 2));
        assert!(!sim.registers().overflow);
    }

    #[test]
    fn test_div_by_zero_leaves_registers() {
        let mut sim = machine(&[Instruction::new(4, 100, 0, 5), hlt()]);
        sim.registers_mut().set(RegisterId::A, Word::positive(1)).unwrap();
        sim.registers_mut().set(RegisterId::X, Word::from_i64(-2)).unwrap();
        sim.run().unwrap();

        assert!(sim.registers().overflow);
        assert_eq!(sim.registers().a(), Word::positive(1));
        assert_eq!(sim.registers().x(), Word::from_i64(-2));
    }

    #[test]
    fn test_div_quotient_too_large() {
        let mut sim = machine(&[Instruction::new(4, 100, 0, 5), hlt()]);
        sim.registers_mut().set(RegisterId::A, Word::positive(7)).unwrap();
        sim.load_block(100, &[Word::from_i64(-7)]).unwrap();
        sim.run().unwrap();

        assert!(sim.registers().overflow);
        assert_eq!(sim.registers().a(), Word::positive(7));
        assert_eq!(sim.registers().x(), Word::zero());
    }

    #[test]
    fn test_enter_keeps_instruction_sign_for_zero() {
        let mut sim = machine(&[
            Instruction::new(48, 0, 0, 2).with_sign(Sign::Neg), // ENTA -0
            Instruction::new(55, 0, 0, 3),                      // ENNX 0
            Instruction::new(49, -20, 0, 2),                    // ENT1 -20
            Instruction::new(50, 5, 1, 3),                      // ENN2 5,1
            hlt(),
        ]);
        sim.run().unwrap();

        assert_eq!(sim.registers().a(), Word::new(Sign::Neg, 0));
        assert_eq!(sim.registers().x(), Word::new(Sign::Neg, 0));
        assert_eq!(sim.registers().get(RegisterId::I1).to_i64(), -20);
        assert_eq!(sim.registers().get(RegisterId::I2).to_i64(), 15);
    }

    #[test]
    fn test_inc_dec() {
        let mut sim = machine(&[
            Instruction::new(48, 100, 0, 0), // INCA 100
            Instruction::new(48, 30, 0, 1),  // DECA 30
            Instruction::new(51, 7, 0, 1),   // DEC3 7
            hlt(),
        ]);
        sim.run().unwrap();

        assert_eq!(sim.registers().a().to_i64(), 70);
        assert_eq!(sim.registers().get(RegisterId::I3).to_i64(), -7);
        assert!(!sim.registers().overflow);
    }

    #[test]
    fn test_inca_overflow() {
        let mut sim = machine(&[Instruction::new(48, 1, 0, 0), hlt()]);
        sim.registers_mut().set(RegisterId::A, Word::positive(64u64.pow(5) - 1)).unwrap();
        sim.run().unwrap();

        assert!(sim.registers().overflow);
        assert_eq!(sim.registers().a(), Word::zero());
    }

    #[test]
    fn test_index_overflow_faults() {
        let mut sim = machine(&[
            Instruction::new(52, 4000, 0, 2), // ENT4 4000
            Instruction::new(52, 100, 0, 0),  // INC4 100
        ]);
        sim.step().unwrap();
        let err = sim.step().unwrap_err();
        assert!(matches!(
            err,
            CpuError::IndexOverflow { register: RegisterId::I4, value: 4100 }
        ));
    }

    #[test]
    fn test_move() {
        let mut sim = machine(&[
            Instruction::new(49, 500, 0, 2), // ENT1 500
            Instruction::new(7, 100, 0, 3),  // MOVE 100(3)
            hlt(),
        ]);
        sim.load_block(100, &[Word::from_i64(1), Word::from_i64(-2), Word::from_i64(3)]).unwrap();
        sim.run().unwrap();

        let moved: Vec<i64> = (500..503).map(|a| sim.memory().read(a).unwrap().to_i64()).collect();
        assert_eq!(moved, vec![1, -2, 3]);
        assert_eq!(sim.registers().get(RegisterId::I1).to_i64(), 503);
        // ENT1 1, MOVE 1 + 2*3, HLT 10
        assert_eq!(sim.clock(), 1 + 7 + 10);
    }

    #[test]
    fn test_move_overlapping_forward() {
        // Moving 100..103 to 101..104 one word at a time smears word 100
        let mut sim = machine(&[
            Instruction::new(49, 101, 0, 2), // ENT1 101
            Instruction::new(7, 100, 0, 3),  // MOVE 100(3)
            hlt(),
        ]);
        sim.load_block(100, &[Word::from_i64(9), Word::from_i64(8), Word::from_i64(7)]).unwrap();
        sim.run().unwrap();

        let words: Vec<i64> = (100..104).map(|a| sim.memory().read(a).unwrap().to_i64()).collect();
        assert_eq!(words, vec![9, 9, 9, 9]);
    }
}

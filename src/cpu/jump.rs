//! Comparison and jumps.

use crate::cpu::decode::Instruction;
use crate::cpu::dispatch::JumpCondition;
use crate::cpu::execute::{CpuError, Simulator};
use crate::cpu::memory::Memory;
use crate::cpu::registers::{Comparison, RegisterId};

impl Simulator {
    /// CMPr: compare a field of r with the same field of `CONTENTS(M)`.
    pub(super) fn op_compare(&mut self, instr: &Instruction, r: RegisterId) -> Result<(), CpuError> {
        let spec = Self::field(instr)?;
        let lhs = self.radix().slice(self.regs.get(r), spec);
        let rhs = self.operand(instr)?;
        self.regs.comparison = Comparison::of(lhs.to_i64(), rhs.to_i64());
        Ok(())
    }

    pub(super) fn op_jump(&mut self, instr: &Instruction, cond: JumpCondition) -> Result<(), CpuError> {
        let m = self.address(instr)?;
        let cmp = self.regs.comparison;

        let taken = match cond {
            JumpCondition::Always | JumpCondition::AlwaysNoSave => true,
            JumpCondition::Overflow => std::mem::take(&mut self.regs.overflow),
            JumpCondition::NoOverflow => !std::mem::take(&mut self.regs.overflow),
            JumpCondition::Less => cmp == Comparison::Less,
            JumpCondition::Equal => cmp == Comparison::Equal,
            JumpCondition::Greater => cmp == Comparison::Greater,
            JumpCondition::GreaterOrEqual => cmp != Comparison::Less,
            JumpCondition::NotEqual => cmp != Comparison::Equal,
            JumpCondition::LessOrEqual => cmp != Comparison::Greater,
            JumpCondition::Register(r, test) => test.holds(self.regs.get(r).to_i64()),
        };

        if taken {
            self.jump_to(m, cond.saves_return_address())?;
        }
        Ok(())
    }

    /// Transfer control to M, saving the address of the next instruction
    /// in rJ when asked.
    pub(super) fn jump_to(&mut self, m: i64, save: bool) -> Result<(), CpuError> {
        let target = Memory::index(m)? as u16;
        if save {
            let next = self.regs.pc;
            self.regs.set_jump(next);
        }
        self.regs.pc = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::decode::Instruction;
    use crate::cpu::execute::tests::{hlt, machine};
    use crate::cpu::execute::{CpuError, MachineState};
    use crate::cpu::memory::MemoryError;
    use crate::cpu::registers::{Comparison, RegisterId};
    use crate::word::{Sign, Word};

    fn jmp(field: u8, address: i64) -> Instruction {
        Instruction::new(39, address, 0, field)
    }

    #[test]
    fn test_compare_ignores_sign_of_zero() {
        let mut sim = machine(&[Instruction::new(56, 100, 0, 5), hlt()]); // CMPA 100
        sim.registers_mut().set(RegisterId::A, Word::new(Sign::Neg, 0)).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.registers().comparison, Comparison::Equal);
    }

    #[test]
    fn test_compare_fields() {
        let mut sim = machine(&[
            Instruction::new(63, 100, 0, 5),         // CMPX 100
            Instruction::new(63, 100, 0, 4 * 8 + 5), // CMPX 100(4:5)
            Instruction::new(57, 101, 0, 5),         // CMP1 101
            hlt(),
        ]);
        let radix = sim.radix();
        sim.registers_mut().set(RegisterId::X, Word::from_i64(-3)).unwrap();
        sim.registers_mut().set(RegisterId::I1, Word::positive(12)).unwrap();
        sim.load_block(100, &[Word::from_i64(2), radix.word_from_bytes(Sign::Pos, [0, 0, 0, 0, 11])])
            .unwrap();

        sim.step().unwrap();
        assert_eq!(sim.registers().comparison, Comparison::Less);
        sim.step().unwrap();
        assert_eq!(sim.registers().comparison, Comparison::Greater);
        sim.step().unwrap();
        assert_eq!(sim.registers().comparison, Comparison::Greater);
    }

    #[test]
    fn test_jmp_saves_return_address() {
        let mut sim = machine(&[Instruction::new(0, 0, 0, 0), jmp(0, 10)]);
        sim.load_block(10, &[hlt().encode(sim.radix()).unwrap()]).unwrap();
        sim.run().unwrap();

        assert_eq!(sim.registers().j(), Word::positive(2));
        assert_eq!(sim.registers().pc, 11);
    }

    #[test]
    fn test_jsj_does_not_save() {
        let mut sim = machine(&[jmp(1, 10)]);
        sim.registers_mut().set(RegisterId::J, Word::positive(99)).unwrap();
        sim.step().unwrap();

        assert_eq!(sim.registers().j(), Word::positive(99));
        assert_eq!(sim.registers().pc, 10);
    }

    #[test]
    fn test_overflow_jumps_clear_toggle() {
        let mut sim = machine(&[jmp(2, 10)]); // JOV 10
        sim.registers_mut().overflow = true;
        sim.step().unwrap();
        assert_eq!(sim.registers().pc, 10);
        assert!(!sim.registers().overflow);

        let mut sim = machine(&[jmp(3, 10)]); // JNOV 10
        sim.registers_mut().overflow = true;
        sim.step().unwrap();
        assert_eq!(sim.registers().pc, 1);
        assert!(!sim.registers().overflow);
        assert_eq!(sim.registers().j(), Word::zero());
    }

    #[test]
    fn test_comparison_jumps() {
        let cases = [
            (Comparison::Less, [true, false, false, false, true, true]),
            (Comparison::Equal, [false, true, false, true, false, true]),
            (Comparison::Greater, [false, false, true, true, true, false]),
        ];
        for (cmp, expected) in cases {
            for (i, &taken) in expected.iter().enumerate() {
                let mut sim = machine(&[jmp(4 + i as u8, 20)]);
                sim.registers_mut().comparison = cmp;
                sim.step().unwrap();

                let want_pc = if taken { 20 } else { 1 };
                assert_eq!(sim.registers().pc, want_pc, "{:?} with F={}", cmp, 4 + i);
                let want_j = if taken { 1 } else { 0 };
                assert_eq!(sim.registers().j().magnitude(), want_j);
            }
        }
    }

    #[test]
    fn test_register_jumps() {
        let values = [Word::from_i64(-5), Word::new(Sign::Neg, 0), Word::zero(), Word::from_i64(5)];
        // N, Z, P, NN, NZ, NP
        let expected = [
            [true, false, false, false, true, true],
            [false, true, false, true, false, true],
            [false, true, false, true, false, true],
            [false, false, true, true, true, false],
        ];

        for (value, row) in values.iter().zip(expected) {
            for (f, &taken) in row.iter().enumerate() {
                for (offset, r) in [(0u8, RegisterId::A), (3, RegisterId::I3), (7, RegisterId::X)] {
                    let mut sim = machine(&[Instruction::new(40 + offset, 30, 0, f as u8)]);
                    sim.registers_mut().set(r, *value).unwrap();
                    sim.step().unwrap();
                    assert_eq!(sim.registers().pc == 30, taken, "{} = {:?}, F={}", r, value, f);
                }
            }
        }
    }

    #[test]
    fn test_jump_outside_memory_faults() {
        let mut sim = machine(&[jmp(0, 4000)]);
        assert!(matches!(sim.step(), Err(CpuError::Memory(MemoryError::OutOfBounds(4000)))));
        assert_eq!(sim.state(), MachineState::Faulted);

        // an untaken jump never checks its target
        let mut sim = machine(&[jmp(2, 4000), hlt()]);
        sim.run().unwrap();
        assert_eq!(sim.state(), MachineState::Halted);
    }

    #[test]
    fn test_loop_with_index_register() {
        // ENT1 5; loop: DEC1 1; J1P loop; HLT
        let mut sim = machine(&[
            Instruction::new(49, 5, 0, 2),
            Instruction::new(49, 1, 0, 1),
            Instruction::new(41, 1, 0, 2),
            hlt(),
        ]);
        assert_eq!(sim.run().unwrap(), 1 + 5 * 2 + 1);
        assert_eq!(sim.registers().get(RegisterId::I1), Word::zero());
        assert_eq!(sim.registers().j(), Word::positive(3));
    }
}

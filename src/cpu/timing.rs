//! Instruction timing.
//!
//! Execution time is counted in MIX time units `u`. Most opcodes take a
//! fixed number of units; MOVE depends on how many words it moves and the
//! I/O instructions add the interlock time of the device they address.
//! Figures follow Knuth's instruction summary.

/// Cost rule for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    /// A fixed number of units.
    Fixed(u64),
    /// `base + per_word * F` (MOVE).
    PerWord { base: u64, per_word: u64 },
    /// `base + T`, T being the device interlock time (IN, OUT, IOC).
    Interlock { base: u64 },
}

impl Cost {
    /// Units charged for an instruction with the given F byte and, for I/O,
    /// the device interlock time.
    pub const fn units(self, field: u8, interlock: u64) -> u64 {
        match self {
            Cost::Fixed(units) => units,
            Cost::PerWord { base, per_word } => base + per_word * field as u64,
            Cost::Interlock { base } => base + interlock,
        }
    }
}

/// Cost of every opcode, indexed by opcode.
pub static COSTS: [Cost; 64] = build_costs();

const fn build_costs() -> [Cost; 64] {
    let mut costs = [Cost::Fixed(1); 64];

    costs[1] = Cost::Fixed(2); // ADD
    costs[2] = Cost::Fixed(2); // SUB
    costs[3] = Cost::Fixed(10); // MUL
    costs[4] = Cost::Fixed(12); // DIV
    costs[5] = Cost::Fixed(10); // NUM, CHAR, HLT
    costs[6] = Cost::Fixed(2); // shifts
    costs[7] = Cost::PerWord { base: 1, per_word: 2 }; // MOVE

    // LD, LDN, ST, STJ, STZ
    let mut op = 8;
    while op <= 33 {
        costs[op] = Cost::Fixed(2);
        op += 1;
    }

    costs[35] = Cost::Interlock { base: 1 }; // IOC
    costs[36] = Cost::Interlock { base: 1 }; // IN
    costs[37] = Cost::Interlock { base: 1 }; // OUT

    // CMP
    let mut op = 56;
    while op <= 63 {
        costs[op] = Cost::Fixed(2);
        op += 1;
    }

    costs
}

/// Units charged for one executed instruction.
pub fn instruction_units(opcode: u8, field: u8, interlock: u64) -> u64 {
    COSTS
        .get(opcode as usize)
        .map(|cost| cost.units(field, interlock))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_costs() {
        assert_eq!(instruction_units(0, 0, 0), 1);
        assert_eq!(instruction_units(1, 5, 0), 2);
        assert_eq!(instruction_units(3, 5, 0), 10);
        assert_eq!(instruction_units(4, 5, 0), 12);
        assert_eq!(instruction_units(8, 5, 0), 2);
        assert_eq!(instruction_units(33, 5, 0), 2);
        assert_eq!(instruction_units(39, 0, 0), 1);
        assert_eq!(instruction_units(48, 2, 0), 1);
        assert_eq!(instruction_units(63, 5, 0), 2);
    }

    #[test]
    fn test_operand_dependent_costs() {
        assert_eq!(instruction_units(7, 0, 0), 1);
        assert_eq!(instruction_units(7, 10, 0), 21);
        assert_eq!(instruction_units(36, 16, 40), 41);
        assert_eq!(instruction_units(34, 16, 40), 1);
    }
}

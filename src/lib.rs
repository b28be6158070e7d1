//! # MIX Simulator
//!
//! A functional simulator of Knuth's MIX computer from *The Art of Computer
//! Programming*.
//!
//! The machine has 4000 signed five-byte words of memory, nine registers,
//! and 21 block-oriented I/O units. The byte radix is configurable between
//! 64 and 100, so both the binary and decimal flavours of MIX can be run.
//!
//! ```
//! use mix::{Instruction, MachineState, Simulator, Word};
//!
//! let mut sim = Simulator::new(64).unwrap();
//! let radix = sim.radix();
//! sim.load_block(0, &[
//!     Instruction::new(8, 10, 0, 5).encode(radix).unwrap(), // LDA 10
//!     Instruction::new(5, 0, 0, 2).encode(radix).unwrap(),  // HLT
//! ]).unwrap();
//! sim.load_block(10, &[Word::from_i64(-42)]).unwrap();
//!
//! sim.run().unwrap();
//! assert_eq!(sim.state(), MachineState::Halted);
//! assert_eq!(sim.registers().a().to_i64(), -42);
//! ```

pub mod word;
pub mod cpu;
pub mod io;

// Re-export commonly used types
pub use word::{ByteRadix, ConfigError, FieldSpec, Sign, Word};
pub use cpu::{
    CpuError, EncodeError, Instruction, MachineConfig, MachineSnapshot, MachineState, Memory,
    Registers, Simulator,
};
pub use io::{BlockDevice, DeviceBank, DeviceError, DeviceKind, IoDevice};

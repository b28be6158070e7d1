//! CPU emulation for the MIX computer.
//!
//! This module implements Knuth's MIX architecture:
//! - 4000 words of memory
//! - registers A, X, I1..I6 and J, the overflow toggle and the comparison
//!   indicator
//! - the full instruction set, dispatched through one shared table
//! - instruction timing in MIX time units

pub mod memory;
pub mod registers;
pub mod decode;
pub mod dispatch;
pub mod timing;
pub mod disasm;
pub mod execute;

mod arith;
mod jump;
mod shift;
mod io_ops;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::{Comparison, RegisterError, RegisterId, RegisterKind, Registers};
pub use decode::{DecodeError, EncodeError, Instruction};
pub use dispatch::{JumpCondition, Operation, RegisterTest, ShiftKind, TransferOp};
pub use execute::{CpuError, Executed, MachineConfig, MachineSnapshot, MachineState, Simulator};

//! CPU execution engine for MIX.
//!
//! Implements the fetch-decode-execute cycle, the loader hooks and the
//! load/store family. Arithmetic, jumps, shifts and I/O live in their own
//! files as further `impl Simulator` blocks.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{event, Level};

use crate::cpu::decode::{self, DecodeError, Instruction};
use crate::cpu::dispatch::{self, Operation};
use crate::cpu::disasm;
use crate::cpu::memory::{Memory, MemoryError};
use crate::cpu::registers::{RegisterError, RegisterId, Registers};
use crate::cpu::timing;
use crate::io::{AttachError, DeviceBank, DeviceError, DeviceKind, IoDevice};
use crate::word::{ByteRadix, ConfigError, FieldSpec, Word};

/// Machine execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Fetching and executing instructions.
    Running,
    /// Stopped by HLT; `resume` continues with the next instruction.
    Halted,
    /// Stopped by a fatal error; only `reset` leaves this state.
    Faulted,
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MachineState::Running => "running",
            MachineState::Halted => "halted",
            MachineState::Faulted => "faulted",
        })
    }
}

/// Construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Values per byte, 64 to 100.
    pub radix: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self { radix: ByteRadix::BINARY.base() }
    }
}

/// What one call to [`Simulator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executed {
    /// Where the instruction was fetched from.
    pub address: u16,
    pub instruction: Instruction,
    pub operation: Operation,
    /// Time units charged.
    pub units: u64,
}

/// A copy of the machine's visible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub radix: ByteRadix,
    pub registers: Registers,
    pub memory: Memory,
    pub state: MachineState,
    pub clock: u64,
    pub cycles: u64,
    /// Attached units and their kinds.
    pub devices: Vec<(u8, DeviceKind)>,
}

/// The MIX machine.
#[derive(Debug)]
pub struct Simulator {
    pub(super) regs: Registers,
    pub(super) mem: Memory,
    pub(super) state: MachineState,
    /// Elapsed time in units `u`.
    clock: u64,
    /// Instructions executed.
    cycles: u64,
    pub(super) devices: DeviceBank,
    last: Option<Instruction>,
}

impl Simulator {
    /// Create a machine with the given byte radix.
    pub fn new(radix: u32) -> Result<Self, ConfigError> {
        Self::with_config(MachineConfig { radix })
    }

    pub fn with_config(config: MachineConfig) -> Result<Self, ConfigError> {
        let radix = ByteRadix::new(config.radix)?;
        event!(Level::DEBUG, "new machine, radix {}", radix.base());
        Ok(Self {
            regs: Registers::new(radix),
            mem: Memory::new(),
            state: MachineState::Running,
            clock: 0,
            cycles: 0,
            devices: DeviceBank::new(),
            last: None,
        })
    }

    /// Clear registers, memory, toggles and the clock. Attached devices
    /// are kept.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = MachineState::Running;
        self.clock = 0;
        self.cycles = 0;
        self.last = None;
    }

    #[inline]
    pub fn radix(&self) -> ByteRadix {
        self.regs.radix()
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Mutable register access for hosts preparing a run.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            radix: self.radix(),
            registers: self.regs.clone(),
            memory: self.mem.clone(),
            state: self.state,
            clock: self.clock,
            cycles: self.cycles,
            devices: self
                .devices
                .units()
                .filter_map(|unit| self.devices.get(unit).map(|d| (unit, d.kind())))
                .collect(),
        }
    }

    // ==================== Devices ====================

    /// Attach a device, returning the one it replaces.
    pub fn attach(
        &mut self,
        unit: u8,
        device: Box<dyn IoDevice>,
    ) -> Result<Option<Box<dyn IoDevice>>, CpuError> {
        Ok(self.devices.attach(unit, device)?)
    }

    pub fn detach(&mut self, unit: u8) -> Option<Box<dyn IoDevice>> {
        self.devices.detach(unit)
    }

    pub fn device(&self, unit: u8) -> Option<&dyn IoDevice> {
        self.devices.get(unit)
    }

    pub fn device_mut(&mut self, unit: u8) -> Option<&mut (dyn IoDevice + 'static)> {
        self.devices.get_mut(unit)
    }

    // ==================== Loading ====================

    /// Copy words into memory. Every word must fit the machine's radix.
    pub fn load_block(&mut self, addr: i64, words: &[Word]) -> Result<(), CpuError> {
        let radix = self.radix();
        if let Some(bad) = words.iter().find(|w| !radix.fits(**w)) {
            return Err(CpuError::ValueOutOfRange(*bad));
        }
        self.mem.load_block(addr, words)?;
        Ok(())
    }

    /// Set the address of the next instruction.
    pub fn set_entry_point(&mut self, addr: i64) -> Result<(), CpuError> {
        self.regs.pc = Memory::index(addr)? as u16;
        Ok(())
    }

    /// Read one block from a unit into location 0 and start there.
    pub fn boot(&mut self, unit: u8) -> Result<(), CpuError> {
        Memory::check_range(0, self.unit_mut(unit)?.block_size())?;
        let block = self.take_block(unit)?;
        self.mem.load_block(0, &block)?;

        self.regs.set_jump(0);
        self.regs.overflow = false;
        self.regs.pc = 0;
        self.state = MachineState::Running;
        event!(Level::DEBUG, "booted {} words from unit {}", block.len(), unit);
        Ok(())
    }

    // ==================== Running ====================

    /// Continue after HLT. A faulted machine stays faulted.
    pub fn resume(&mut self) -> Result<(), CpuError> {
        match self.state {
            MachineState::Faulted => Err(CpuError::NotRunning(self.state)),
            _ => {
                self.state = MachineState::Running;
                Ok(())
            }
        }
    }

    /// Execute a single instruction.
    ///
    /// Any error leaves the machine `Faulted`.
    pub fn step(&mut self) -> Result<Executed, CpuError> {
        if self.state != MachineState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        let address = self.regs.pc;
        self.cycle().map_err(|err| {
            self.state = MachineState::Faulted;
            event!(Level::WARN, "fault at {:04}: {}", address, err);
            err
        })
    }

    fn cycle(&mut self) -> Result<Executed, CpuError> {
        let radix = self.radix();

        // Fetch
        let address = self.regs.pc;
        let raw = self.mem.read(address as i64)?;
        self.regs.advance_pc();

        // Decode
        let instr = decode::decode(raw, radix)?;
        let op = dispatch::resolve(instr.opcode, instr.field)?;
        event!(Level::TRACE, "{:04}: {}", address, disasm::format_instruction(&instr, op));

        // Execute
        let interlock = self.execute(&instr, op)?;

        let units = timing::instruction_units(instr.opcode, instr.field, interlock);
        self.clock += units;
        self.cycles += 1;
        self.last = Some(instr);

        Ok(Executed { address, instruction: instr, operation: op, units })
    }

    /// Run until the machine stops. Returns the number of instructions
    /// executed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start = self.cycles;

        while self.state == MachineState::Running {
            self.step()?;
        }

        Ok(self.cycles - start)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == MachineState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start)
    }

    /// Execute a resolved operation. Returns the interlock time of the unit
    /// addressed, if any.
    fn execute(&mut self, instr: &Instruction, op: Operation) -> Result<u64, CpuError> {
        match op {
            Operation::Nop => {}
            Operation::Halt => {
                self.state = MachineState::Halted;
                event!(Level::DEBUG, "halted at {:04}", self.regs.pc.saturating_sub(1));
            }

            Operation::Add => self.op_add(instr, false)?,
            Operation::Sub => self.op_add(instr, true)?,
            Operation::Mul => self.op_mul(instr)?,
            Operation::Div => self.op_div(instr)?,
            Operation::Transfer(kind, r) => self.op_transfer(instr, kind, r)?,
            Operation::Move => self.op_move(instr)?,

            Operation::Num => self.op_num(),
            Operation::Char => self.op_char(),
            Operation::Shift(kind) => self.op_shift(instr, kind)?,

            Operation::Load(r) => self.op_load(instr, r, false)?,
            Operation::LoadNegative(r) => self.op_load(instr, r, true)?,
            Operation::Store(r) => {
                let value = self.regs.get(r);
                self.op_store(instr, value)?
            }
            Operation::StoreZero => self.op_store(instr, Word::zero())?,

            Operation::Compare(r) => self.op_compare(instr, r)?,
            Operation::Jump(cond) => self.op_jump(instr, cond)?,

            Operation::JumpBusy => self.op_jump_busy(instr, true)?,
            Operation::JumpReady => self.op_jump_busy(instr, false)?,
            Operation::Input => return self.op_input(instr),
            Operation::Output => return self.op_output(instr),
            Operation::IoControl => return self.op_io_control(instr),
        }
        Ok(0)
    }

    // ==================== Operand helpers ====================

    /// Effective address `M`: the signed address plus the selected index
    /// register. Fails when `|M|` does not fit two bytes.
    pub(super) fn address(&self, instr: &Instruction) -> Result<i64, CpuError> {
        let m = self
            .regs
            .effective_address(instr.address_value(), instr.index_register());
        if m.unsigned_abs() >= self.radix().capacity(2) {
            return Err(CpuError::AddressOverflow(m));
        }
        Ok(m)
    }

    /// The F byte as an `(L:R)` field.
    pub(super) fn field(instr: &Instruction) -> Result<FieldSpec, CpuError> {
        FieldSpec::decode(instr.field).ok_or(CpuError::InvalidField(instr.field))
    }

    /// `CONTENTS(M)` restricted to the instruction's field.
    pub(super) fn operand(&self, instr: &Instruction) -> Result<Word, CpuError> {
        let spec = Self::field(instr)?;
        let m = self.address(instr)?;
        let word = self.mem.read(m)?;
        Ok(self.radix().slice(word, spec))
    }

    /// Write A, X or an index register. A value too wide for an index
    /// register is an `IndexOverflow`.
    pub(super) fn set_register(&mut self, id: RegisterId, value: Word) -> Result<(), CpuError> {
        self.regs.set(id, value).map_err(|err| match err {
            RegisterError::Overflow { register, magnitude } => CpuError::IndexOverflow {
                register,
                value: value.sign().to_i64() * magnitude as i64,
            },
        })
    }

    // ==================== Load / store ====================

    fn op_load(&mut self, instr: &Instruction, r: RegisterId, negate: bool) -> Result<(), CpuError> {
        let value = self.operand(instr)?;
        let value = if negate { value.negated() } else { value };
        self.set_register(r, value)
    }

    fn op_store(&mut self, instr: &Instruction, value: Word) -> Result<(), CpuError> {
        let spec = Self::field(instr)?;
        let m = self.address(instr)?;
        let dest = self.mem.read(m)?;
        let result = self.radix().splice(dest, value, spec);
        self.mem.write(m, result)?;
        Ok(())
    }
}

/// Errors that stop the machine.
#[derive(Debug, Error)]
pub enum CpuError {
    #[error("machine is {0}")]
    NotRunning(MachineState),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid field specification {0}")]
    InvalidField(u8),

    #[error("effective address {0} does not fit two bytes")]
    AddressOverflow(i64),

    #[error("value {value} does not fit in {register}")]
    IndexOverflow { register: RegisterId, value: i64 },

    #[error("negative shift count {0}")]
    NegativeShift(i64),

    #[error("no device attached to unit {0}")]
    NoDevice(u8),

    #[error("unit {unit}: {source}")]
    Device {
        unit: u8,
        #[source]
        source: DeviceError,
    },

    #[error(transparent)]
    Attach(#[from] AttachError),

    #[error("word {0} does not fit the byte radix")]
    ValueOutOfRange(Word),
}

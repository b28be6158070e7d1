//! I/O instructions: IN, OUT, IOC, JBUS and JRED.
//!
//! The F byte names the unit. Transfers happen at once; the unit's
//! interlock time is returned so the caller can charge it.

use crate::cpu::decode::Instruction;
use crate::cpu::execute::{CpuError, Simulator};
use crate::cpu::memory::Memory;
use crate::io::IoDevice;
use crate::word::Word;

impl Simulator {
    pub(super) fn unit_mut(&mut self, unit: u8) -> Result<&mut (dyn IoDevice + 'static), CpuError> {
        self.devices.get_mut(unit).ok_or(CpuError::NoDevice(unit))
    }

    /// Read the next block from a unit for IN or a boot.
    ///
    /// The medium only moves once every word is known to fit the machine's
    /// radix, so a rejected block can be read again.
    pub(super) fn take_block(&mut self, unit: u8) -> Result<Vec<Word>, CpuError> {
        let radix = self.radix();
        let rx = self.regs.x().magnitude();
        let device = self.unit_mut(unit)?;

        let block = device
            .peek_block(rx)
            .map_err(|source| CpuError::Device { unit, source })?;
        if let Some(bad) = block.iter().find(|w| !radix.fits(**w)) {
            return Err(CpuError::ValueOutOfRange(*bad));
        }
        device
            .advance(rx)
            .map_err(|source| CpuError::Device { unit, source })?;
        Ok(block)
    }

    /// IN: read one block into memory starting at M.
    pub(super) fn op_input(&mut self, instr: &Instruction) -> Result<u64, CpuError> {
        let unit = instr.field;
        let m = self.address(instr)?;

        let device = self.unit_mut(unit)?;
        let interlock = device.interlock_time();
        Memory::check_range(m, device.block_size())?;

        let block = self.take_block(unit)?;
        self.mem.load_block(m, &block)?;
        Ok(interlock)
    }

    /// OUT: write one block from memory starting at M.
    pub(super) fn op_output(&mut self, instr: &Instruction) -> Result<u64, CpuError> {
        let unit = instr.field;
        let m = self.address(instr)?;
        let rx = self.regs.x().magnitude();

        let device = self.devices.get_mut(unit).ok_or(CpuError::NoDevice(unit))?;
        let block = self.mem.read_block(m, device.block_size())?;
        device
            .write_block(&block, rx)
            .map_err(|source| CpuError::Device { unit, source })?;
        Ok(device.interlock_time())
    }

    /// IOC: pass M to the unit as a control command.
    pub(super) fn op_io_control(&mut self, instr: &Instruction) -> Result<u64, CpuError> {
        let unit = instr.field;
        let m = self.address(instr)?;
        let rx = self.regs.x().magnitude();

        let device = self.unit_mut(unit)?;
        device
            .control(m, rx)
            .map_err(|source| CpuError::Device { unit, source })?;
        Ok(device.interlock_time())
    }

    /// JBUS (`busy == true`) and JRED (`busy == false`).
    pub(super) fn op_jump_busy(&mut self, instr: &Instruction, busy: bool) -> Result<(), CpuError> {
        let unit = instr.field;
        let m = self.address(instr)?;
        if self.unit_mut(unit)?.is_busy() == busy {
            self.jump_to(m, true)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::decode::Instruction;
    use crate::cpu::execute::tests::{hlt, machine};
    use crate::cpu::execute::{CpuError, MachineState};
    use crate::cpu::memory::MemoryError;
    use crate::io::{BlockDevice, DeviceError, DeviceKind};
    use crate::word::{Sign, Word};

    fn io(opcode: u8, address: i64, unit: u8) -> Instruction {
        Instruction::new(opcode, address, 0, unit)
    }

    #[test]
    fn test_card_in_and_printer_out() {
        let mut sim = machine(&[
            io(36, 100, 16), // IN 100(16)
            io(37, 100, 18), // OUT 100(18)
            io(35, 0, 18),   // IOC 0(18)
            hlt(),
        ]);
        let radix = sim.radix();
        let reader = BlockDevice::with_text(DeviceKind::CardReader, "HELLO WORLD", radix).unwrap();
        sim.attach(16, Box::new(reader)).unwrap();
        sim.attach(18, Box::new(BlockDevice::new(DeviceKind::LinePrinter))).unwrap();
        sim.run().unwrap();

        let printer = sim.device(18).unwrap();
        assert_eq!(printer.text(radix).unwrap(), "HELLO WORLD");
        assert_eq!(printer.blocks()[0].len(), 24);
        // IN 1+40, OUT 1+30, IOC 1+30, HLT 10
        assert_eq!(sim.clock(), 41 + 31 + 31 + 10);
    }

    #[test]
    fn test_character_output_forces_positive() {
        let mut sim = machine(&[io(37, 100, 17), hlt()]); // OUT 100(17)
        sim.attach(17, Box::new(BlockDevice::new(DeviceKind::CardPunch))).unwrap();
        sim.load_block(100, &[Word::from_i64(-5)]).unwrap();
        sim.run().unwrap();

        let card = &sim.device(17).unwrap().blocks()[0];
        assert_eq!(card[0], Word::new(Sign::Pos, 5));
    }

    #[test]
    fn test_tape_round_trip_keeps_signs() {
        let mut sim = machine(&[
            io(37, 100, 2), // OUT 100(2)
            io(35, 0, 2),   // IOC 0(2)
            io(36, 300, 2), // IN 300(2)
            hlt(),
        ]);
        sim.attach(2, Box::new(BlockDevice::new(DeviceKind::Tape))).unwrap();
        sim.load_block(100, &[Word::from_i64(-42), Word::from_i64(7)]).unwrap();
        sim.run().unwrap();

        assert_eq!(sim.memory().read(300).unwrap(), Word::from_i64(-42));
        assert_eq!(sim.memory().read(301).unwrap(), Word::from_i64(7));
        assert_eq!(sim.memory().read(399).unwrap(), Word::zero());
    }

    #[test]
    fn test_disk_uses_rx_as_block() {
        let mut sim = machine(&[
            Instruction::new(55, 3, 0, 2), // ENTX 3
            io(37, 100, 9),                // OUT 100(9)
            Instruction::new(55, 0, 0, 2), // ENTX 0
            io(36, 200, 9),                // IN 200(9)
            hlt(),
        ]);
        sim.attach(9, Box::new(BlockDevice::new(DeviceKind::Disk))).unwrap();
        sim.load_block(100, &[Word::from_i64(11)]).unwrap();
        sim.run().unwrap();

        let disk = sim.device(9).unwrap();
        assert_eq!(disk.blocks().len(), 4);
        assert_eq!(disk.blocks()[3][0], Word::from_i64(11));
        // block 0 was never written
        assert_eq!(sim.memory().read(200).unwrap(), Word::zero());
    }

    #[test]
    fn test_block_must_fit_in_memory() {
        let mut sim = machine(&[io(36, 3990, 16)]);
        sim.attach(16, Box::new(BlockDevice::with_text(DeviceKind::CardReader, "X", sim.radix()).unwrap()))
            .unwrap();
        assert!(matches!(sim.step(), Err(CpuError::Memory(MemoryError::OutOfBounds(4005)))));
        // the card was not consumed
        assert_eq!(sim.device(16).unwrap().blocks().len(), 1);
    }

    #[test]
    fn test_too_wide_block_leaves_tape_in_place() {
        let mut sim = machine(&[io(36, 100, 2)]); // IN 100(2)
        let mut block = vec![Word::zero(); 100];
        block[0] = Word::positive(64u64.pow(5));
        block[1] = Word::from_i64(-9);
        let tape = BlockDevice::with_blocks(DeviceKind::Tape, vec![block]).unwrap();
        sim.attach(2, Box::new(tape)).unwrap();

        assert!(matches!(sim.step(), Err(CpuError::ValueOutOfRange(_))));
        assert_eq!(sim.state(), MachineState::Faulted);
        assert_eq!(sim.memory().read(101).unwrap(), Word::zero());

        // the block is still under the head
        let tape = sim.device_mut(2).unwrap();
        assert_eq!(tape.read_block(0).unwrap()[1], Word::from_i64(-9));
    }

    #[test]
    fn test_missing_device_and_device_errors() {
        let mut sim = machine(&[io(36, 100, 5)]);
        assert!(matches!(sim.step(), Err(CpuError::NoDevice(5))));

        let mut sim = machine(&[io(36, 100, 18)]);
        sim.attach(18, Box::new(BlockDevice::new(DeviceKind::LinePrinter))).unwrap();
        assert!(matches!(
            sim.step(),
            Err(CpuError::Device { unit: 18, source: DeviceError::NotInput(DeviceKind::LinePrinter) })
        ));
        assert_eq!(sim.state(), MachineState::Faulted);

        let mut sim = machine(&[io(36, 100, 16)]);
        sim.attach(16, Box::new(BlockDevice::new(DeviceKind::CardReader))).unwrap();
        assert!(matches!(
            sim.step(),
            Err(CpuError::Device { unit: 16, source: DeviceError::EndOfMedium(_) })
        ));
    }

    #[test]
    fn test_jbus_and_jred() {
        let program = [io(34, 10, 18), io(38, 20, 18)]; // JBUS 10(18); JRED 20(18)

        let mut sim = machine(&program);
        sim.attach(18, Box::new(BlockDevice::new(DeviceKind::LinePrinter))).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.registers().pc, 1);
        sim.step().unwrap();
        assert_eq!(sim.registers().pc, 20);
        assert_eq!(sim.registers().j(), Word::positive(2));

        let mut sim = machine(&program);
        sim.attach(18, Box::new(BlockDevice::new(DeviceKind::LinePrinter))).unwrap();
        sim.device_mut(18).unwrap().set_busy(true);
        sim.step().unwrap();
        assert_eq!(sim.registers().pc, 10);
        assert_eq!(sim.registers().j(), Word::positive(1));
        assert_eq!(sim.clock(), 1);
    }
}

//! I/O devices.
//!
//! Every MIX unit moves data in fixed-size blocks. Tapes and disks move
//! full signed words; the card, printer, typewriter and paper tape units
//! move character codes, so words they transfer are always positive.
//!
//! Devices complete instantly. The cost of waiting for a unit is charged to
//! the clock as the unit's interlock time; the busy flag exists so that a
//! host can model a unit that is temporarily unavailable.

use std::fmt;
use std::ops::RangeInclusive;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{event, Level};

use crate::io::charset::{self, CharsetError};
use crate::word::{ByteRadix, Sign, Word};

/// Blocks on one disk unit; rX must address one of them.
pub const DISK_BLOCKS: u64 = 4096;

/// The kinds of unit a MIX machine can have attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Tape,
    Disk,
    CardReader,
    CardPunch,
    LinePrinter,
    Typewriter,
    PaperTape,
}

impl DeviceKind {
    /// Words per block.
    pub const fn block_size(self) -> usize {
        match self {
            DeviceKind::Tape | DeviceKind::Disk => 100,
            DeviceKind::CardReader | DeviceKind::CardPunch => 16,
            DeviceKind::LinePrinter => 24,
            DeviceKind::Typewriter | DeviceKind::PaperTape => 14,
        }
    }

    /// True for units that transfer character codes rather than signed words.
    pub const fn is_character(self) -> bool {
        !matches!(self, DeviceKind::Tape | DeviceKind::Disk)
    }

    /// Extra time units charged to IN, OUT and IOC on this kind of unit.
    pub const fn interlock_time(self) -> u64 {
        match self {
            DeviceKind::Tape => 50,
            DeviceKind::Disk => 20,
            DeviceKind::CardReader | DeviceKind::CardPunch => 40,
            DeviceKind::LinePrinter => 30,
            DeviceKind::Typewriter => 60,
            DeviceKind::PaperTape => 20,
        }
    }

    pub const fn can_input(self) -> bool {
        !matches!(self, DeviceKind::CardPunch | DeviceKind::LinePrinter)
    }

    pub const fn can_output(self) -> bool {
        !matches!(self, DeviceKind::CardReader)
    }

    /// Unit numbers this kind may be attached to.
    pub fn units(self) -> RangeInclusive<u8> {
        match self {
            DeviceKind::Tape => 0..=7,
            DeviceKind::Disk => 8..=15,
            DeviceKind::CardReader => 16..=16,
            DeviceKind::CardPunch => 17..=17,
            DeviceKind::LinePrinter => 18..=18,
            DeviceKind::Typewriter => 19..=19,
            DeviceKind::PaperTape => 20..=20,
        }
    }

    /// The kind of unit conventionally found at a unit number.
    pub fn for_unit(unit: u8) -> Option<Self> {
        match unit {
            0..=7 => Some(DeviceKind::Tape),
            8..=15 => Some(DeviceKind::Disk),
            16 => Some(DeviceKind::CardReader),
            17 => Some(DeviceKind::CardPunch),
            18 => Some(DeviceKind::LinePrinter),
            19 => Some(DeviceKind::Typewriter),
            20 => Some(DeviceKind::PaperTape),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceKind::Tape => "tape unit",
            DeviceKind::Disk => "disk unit",
            DeviceKind::CardReader => "card reader",
            DeviceKind::CardPunch => "card punch",
            DeviceKind::LinePrinter => "line printer",
            DeviceKind::Typewriter => "typewriter terminal",
            DeviceKind::PaperTape => "paper tape",
        })
    }
}

/// A unit the simulator can transfer blocks to and from.
///
/// `rx` is the magnitude of register X at the time of the instruction;
/// disks use it as the block number, other units ignore it.
pub trait IoDevice: fmt::Debug + Send {
    fn kind(&self) -> DeviceKind;

    fn block_size(&self) -> usize {
        self.kind().block_size()
    }

    fn interlock_time(&self) -> u64 {
        self.kind().interlock_time()
    }

    /// Polled by JBUS and JRED.
    fn is_busy(&self) -> bool;

    fn set_busy(&mut self, busy: bool);

    /// The block the next IN would produce, without moving the medium.
    fn peek_block(&self, rx: u64) -> Result<Vec<Word>, DeviceError>;

    /// Move the medium past the block `peek_block` returned.
    fn advance(&mut self, rx: u64) -> Result<(), DeviceError>;

    /// Produce the next block for IN.
    fn read_block(&mut self, rx: u64) -> Result<Vec<Word>, DeviceError> {
        let block = self.peek_block(rx)?;
        self.advance(rx)?;
        Ok(block)
    }

    /// Accept a block from OUT.
    fn write_block(&mut self, block: &[Word], rx: u64) -> Result<(), DeviceError>;

    /// Carry out IOC with the given effective address.
    fn control(&mut self, m: i64, rx: u64) -> Result<(), DeviceError>;

    /// The medium's contents, one entry per block.
    fn blocks(&self) -> &[Vec<Word>];

    /// Render the medium as text, one line per block, trailing blanks removed.
    fn text(&self, radix: ByteRadix) -> Result<String, CharsetError> {
        let lines = self
            .blocks()
            .iter()
            .map(|block| charset::decode_text(block, radix).map(|s| s.trim_end().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}

/// A unit whose medium is a list of blocks and a head position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    kind: DeviceKind,
    blocks: Vec<Vec<Word>>,
    position: usize,
    busy: bool,
    page_ejects: usize,
}

impl BlockDevice {
    /// An empty unit of the given kind.
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
            position: 0,
            busy: false,
            page_ejects: 0,
        }
    }

    /// A unit preloaded with blocks, each exactly one block long.
    pub fn with_blocks(kind: DeviceKind, blocks: Vec<Vec<Word>>) -> Result<Self, DeviceError> {
        for block in &blocks {
            check_block_size(kind, block.len())?;
        }
        let mut device = Self::new(kind);
        device.blocks = blocks;
        Ok(device)
    }

    /// A character unit preloaded with text, one line per block.
    ///
    /// Lines are padded with blanks; a line longer than a block is an error.
    pub fn with_text(kind: DeviceKind, text: &str, radix: ByteRadix) -> Result<Self, DeviceError> {
        let block_size = kind.block_size();
        let mut blocks = Vec::new();
        for line in text.lines() {
            let mut block = charset::encode_text(line, radix)?;
            if block.len() > block_size {
                return Err(DeviceError::BlockSize { expected: block_size, got: block.len() });
            }
            block.resize(block_size, Word::zero());
            blocks.push(block);
        }
        Self::with_blocks(kind, blocks)
    }

    /// Index of the block the next sequential transfer uses.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of page ejects sent to a line printer.
    pub fn page_ejects(&self) -> usize {
        self.page_ejects
    }

    fn normalize(&self, block: &[Word]) -> Vec<Word> {
        if self.kind.is_character() {
            block.iter().map(|w| w.with_sign(Sign::Pos)).collect()
        } else {
            block.to_vec()
        }
    }
}

fn disk_block(rx: u64) -> Result<usize, DeviceError> {
    if rx < DISK_BLOCKS {
        Ok(rx as usize)
    } else {
        Err(DeviceError::NoSuchBlock(rx))
    }
}

fn check_block_size(kind: DeviceKind, got: usize) -> Result<(), DeviceError> {
    if got == kind.block_size() {
        Ok(())
    } else {
        Err(DeviceError::BlockSize { expected: kind.block_size(), got })
    }
}

impl IoDevice for BlockDevice {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn peek_block(&self, rx: u64) -> Result<Vec<Word>, DeviceError> {
        if !self.kind.can_input() {
            return Err(DeviceError::NotInput(self.kind));
        }

        let block = match self.kind {
            DeviceKind::Disk => self
                .blocks
                .get(disk_block(rx)?)
                .cloned()
                .unwrap_or_else(|| vec![Word::zero(); self.kind.block_size()]),
            _ => self
                .blocks
                .get(self.position)
                .cloned()
                .ok_or(DeviceError::EndOfMedium(self.kind))?,
        };

        Ok(self.normalize(&block))
    }

    fn advance(&mut self, rx: u64) -> Result<(), DeviceError> {
        self.position = match self.kind {
            DeviceKind::Disk => disk_block(rx)? + 1,
            _ => self.position + 1,
        };
        Ok(())
    }

    fn write_block(&mut self, block: &[Word], rx: u64) -> Result<(), DeviceError> {
        if !self.kind.can_output() {
            return Err(DeviceError::NotOutput(self.kind));
        }
        check_block_size(self.kind, block.len())?;

        let index = match self.kind {
            DeviceKind::Disk => disk_block(rx)?,
            _ => self.position,
        };
        let block = self.normalize(block);
        if index < self.blocks.len() {
            self.blocks[index] = block;
        } else {
            self.blocks.resize(index, vec![Word::zero(); self.kind.block_size()]);
            self.blocks.push(block);
        }
        self.position = index + 1;
        Ok(())
    }

    fn control(&mut self, m: i64, rx: u64) -> Result<(), DeviceError> {
        match (self.kind, m) {
            (DeviceKind::Tape, 0) | (DeviceKind::PaperTape, 0) => {
                self.position = 0;
            }
            (DeviceKind::Tape, skip) => {
                let target = (self.position as i64 + skip).clamp(0, self.blocks.len() as i64);
                self.position = target as usize;
            }
            (DeviceKind::Disk, 0) => {
                self.position = disk_block(rx)?;
            }
            (DeviceKind::LinePrinter, 0) => {
                self.page_ejects += 1;
            }
            (kind, command) => {
                return Err(DeviceError::UnsupportedCommand { kind, command });
            }
        }
        event!(Level::TRACE, "{} control {} -> position {}", self.kind, m, self.position);
        Ok(())
    }

    fn blocks(&self) -> &[Vec<Word>] {
        &self.blocks
    }
}

/// Errors raised by a unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("{0}: end of medium")]
    EndOfMedium(DeviceKind),

    #[error("{0} cannot be used for input")]
    NotInput(DeviceKind),

    #[error("{0} cannot be used for output")]
    NotOutput(DeviceKind),

    #[error("{kind} does not support control command {command}")]
    UnsupportedCommand { kind: DeviceKind, command: i64 },

    #[error("disk has no block {0}")]
    NoSuchBlock(u64),

    #[error("block of {got} words, expected {expected}")]
    BlockSize { expected: usize, got: usize },

    #[error(transparent)]
    Charset(#[from] CharsetError),
}

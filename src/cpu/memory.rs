//! MIX memory subsystem.
//!
//! The machine has 4000 words of storage, addressed 0 to 3999. Addresses
//! outside that range are an error; there is no wraparound.

use crate::word::Word;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of memory cells in a MIX machine.
pub const MEMORY_SIZE: usize = 4000;

/// MIX memory: 4000 signed-magnitude words.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<Word>,
}

impl Memory {
    /// Create a new memory with all cells set to `+0`.
    pub fn new() -> Self {
        Self {
            cells: vec![Word::zero(); MEMORY_SIZE],
        }
    }

    /// Read a cell.
    #[inline]
    pub fn read(&self, addr: i64) -> Result<Word, MemoryError> {
        let index = Self::index(addr)?;
        Ok(self.cells[index])
    }

    /// Write a cell.
    #[inline]
    pub fn write(&mut self, addr: i64, value: Word) -> Result<(), MemoryError> {
        let index = Self::index(addr)?;
        self.cells[index] = value;
        Ok(())
    }

    /// Check that an address names a cell and convert it to an index.
    pub fn index(addr: i64) -> Result<usize, MemoryError> {
        if (0..MEMORY_SIZE as i64).contains(&addr) {
            Ok(addr as usize)
        } else {
            Err(MemoryError::OutOfBounds(addr))
        }
    }

    /// Check that `len` consecutive cells starting at `start` all exist.
    pub fn check_range(start: i64, len: usize) -> Result<(), MemoryError> {
        Self::index(start)?;
        if len > 0 {
            Self::index(start + len as i64 - 1)?;
        }
        Ok(())
    }

    /// Clear all memory to `+0`.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Word::zero();
        }
    }

    /// Copy a block of words into memory starting at the given address.
    pub fn load_block(&mut self, start: i64, words: &[Word]) -> Result<(), MemoryError> {
        let index = Self::index(start)?;
        if index + words.len() > MEMORY_SIZE {
            return Err(MemoryError::BlockTooLarge {
                size: words.len(),
                available: MEMORY_SIZE - index,
            });
        }
        self.cells[index..index + words.len()].copy_from_slice(words);
        Ok(())
    }

    /// Copy `len` words out of memory starting at `start`.
    pub fn read_block(&self, start: i64, len: usize) -> Result<Vec<Word>, MemoryError> {
        Self::check_range(start, len)?;
        let index = start as usize;
        Ok(self.cells[index..index + len].to_vec())
    }

    /// Dump memory contents (for debugging).
    pub fn dump(&self, start: usize, count: usize) -> Vec<(usize, Word)> {
        let end = (start + count).min(MEMORY_SIZE);
        (start.min(end)..end)
            .map(|i| (i, self.cells[i]))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self.cells.iter().filter(|cell| **cell != Word::zero()).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Address is outside valid memory range.
    #[error("memory address {0} out of range (0 to 3999)")]
    OutOfBounds(i64),
    /// Block is too large to fit in memory at the requested address.
    #[error("block of {size} words exceeds available space {available}")]
    BlockTooLarge { size: usize, available: usize },
}

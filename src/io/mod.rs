//! Peripheral units.
//!
//! MIX numbers its units 0 to 20:
//!
//! | Units  | Device              | Block size |
//! | ------ | ------------------- | ---------- |
//! | 0-7    | magnetic tape       | 100 words  |
//! | 8-15   | disk or drum        | 100 words  |
//! | 16     | card reader         | 16 words   |
//! | 17     | card punch          | 16 words   |
//! | 18     | line printer        | 24 words   |
//! | 19     | typewriter terminal | 14 words   |
//! | 20     | paper tape          | 14 words   |

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{event, Level};

pub mod charset;
pub mod device;

pub use charset::CharsetError;
pub use device::{BlockDevice, DeviceError, DeviceKind, IoDevice, DISK_BLOCKS};

/// Highest unit number.
pub const MAX_UNIT: u8 = 20;

/// The devices attached to one machine, by unit number.
#[derive(Debug, Default)]
pub struct DeviceBank {
    units: BTreeMap<u8, Box<dyn IoDevice>>,
}

impl DeviceBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a device, returning whatever was attached there before.
    pub fn attach(
        &mut self,
        unit: u8,
        device: Box<dyn IoDevice>,
    ) -> Result<Option<Box<dyn IoDevice>>, AttachError> {
        let kind = device.kind();
        if unit > MAX_UNIT {
            return Err(AttachError::InvalidUnit(unit));
        }
        if !kind.units().contains(&unit) {
            return Err(AttachError::WrongUnit { unit, kind });
        }
        event!(Level::DEBUG, "attaching {} as unit {}", kind, unit);
        Ok(self.units.insert(unit, device))
    }

    /// Detach and return the device on a unit.
    pub fn detach(&mut self, unit: u8) -> Option<Box<dyn IoDevice>> {
        let device = self.units.remove(&unit);
        if let Some(device) = &device {
            event!(Level::DEBUG, "detached {} from unit {}", device.kind(), unit);
        }
        device
    }

    pub fn get(&self, unit: u8) -> Option<&dyn IoDevice> {
        self.units.get(&unit).map(|d| d.as_ref())
    }

    pub fn get_mut(&mut self, unit: u8) -> Option<&mut (dyn IoDevice + 'static)> {
        self.units.get_mut(&unit).map(|d| d.as_mut())
    }

    /// Attached unit numbers, ascending.
    pub fn units(&self) -> impl Iterator<Item = u8> + '_ {
        self.units.keys().copied()
    }
}

/// Errors from attaching a device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("unit number {0} out of range (0 to {MAX_UNIT})")]
    InvalidUnit(u8),

    #[error("unit {unit} cannot hold a {kind}")]
    WrongUnit { unit: u8, kind: DeviceKind },
}

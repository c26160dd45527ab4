//! Mock register transport for testing
//!
//! Backs the TCU register block with a sparse map and mimics the hardware
//! behavior the driver depends on: writes to the enable set/clear registers
//! land as bits in the enable status register, so enabled state reads back
//! the way it does on silicon. Every access is logged for sequencing
//! assertions, and the transport can be switched into a failing mode to
//! exercise the `RegisterAccessFailed` path.

use crate::platform::{error::PwmError, traits::RegmapInterface, Result};
use crate::tcu;

use std::collections::BTreeMap;
use std::vec::Vec;

/// One logged register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegOp {
    /// `read(offset)`
    Read(u32),
    /// `write(offset, value)`
    Write(u32, u32),
    /// `update_bits(offset, mask, value)`
    Update(u32, u32, u32),
}

/// Mock register transport
#[derive(Debug, Default)]
pub struct MockRegmap {
    regs: BTreeMap<u32, u32>,
    log: Vec<RegOp>,
    failing: bool,
}

impl MockRegmap {
    /// Create a mock transport with all registers reading as zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a register, without logging a read
    pub fn get(&self, offset: u32) -> u32 {
        *self.regs.get(&offset).unwrap_or(&0)
    }

    /// Preload a register value
    pub fn set(&mut self, offset: u32, value: u32) {
        self.regs.insert(offset, value);
    }

    /// Make every subsequent access fail with `RegisterAccessFailed`
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Accesses performed so far, in order
    pub fn log(&self) -> &[RegOp] {
        &self.log
    }

    /// Forget the access log (register contents are kept)
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Snapshot of all register contents
    pub fn registers(&self) -> BTreeMap<u32, u32> {
        self.regs.clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(PwmError::RegisterAccessFailed)
        } else {
            Ok(())
        }
    }
}

impl RegmapInterface for MockRegmap {
    fn read(&mut self, offset: u32) -> Result<u32> {
        self.check()?;
        self.log.push(RegOp::Read(offset));
        Ok(self.get(offset))
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<()> {
        self.check()?;
        self.log.push(RegOp::Write(offset, value));
        match offset {
            // The set/clear pair strobes bits into the status register
            tcu::REG_TESR => {
                let ter = self.get(tcu::REG_TER);
                self.regs.insert(tcu::REG_TER, ter | value);
            }
            tcu::REG_TECR => {
                let ter = self.get(tcu::REG_TER);
                self.regs.insert(tcu::REG_TER, ter & !value);
            }
            _ => {
                self.regs.insert(offset, value);
            }
        }
        Ok(())
    }

    fn update_bits(&mut self, offset: u32, mask: u32, value: u32) -> Result<()> {
        self.check()?;
        self.log.push(RegOp::Update(offset, mask, value));
        let current = self.get(offset);
        self.regs.insert(offset, (current & !mask) | (value & mask));
        Ok(())
    }
}

//! Register transport trait
//!
//! The TCU register block is shared between the PWM, timer and watchdog
//! consumers, so the driver never touches memory-mapped registers directly.
//! It goes through this transport, which the platform implements on top of
//! whatever access mechanism the SoC requires.

use crate::platform::Result;

/// Register transport interface
///
/// Offsets are byte offsets into the TCU register block. Implementations must
/// make `update_bits` an atomic read-modify-write with respect to the other
/// TCU consumers; the driver relies on that for the shared enable/start/stop
/// registers.
///
/// # Errors
///
/// All operations return `PwmError::RegisterAccessFailed` if the transport
/// fails. Memory-mapped implementations are infallible in practice; the
/// fallible signatures exist for transports with a real failure mode.
pub trait RegmapInterface {
    /// Read a 32-bit register
    fn read(&mut self, offset: u32) -> Result<u32>;

    /// Write a 32-bit register
    fn write(&mut self, offset: u32, value: u32) -> Result<()>;

    /// Read-modify-write the bits selected by `mask` to `value`
    fn update_bits(&mut self, offset: u32, mask: u32, value: u32) -> Result<()>;
}

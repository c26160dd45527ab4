//! PWM chip driver
//!
//! Exposes the TCU's output-compare channels as numbered PWM devices. The
//! generic PWM framework above this module drives each channel through the
//! [`PwmOps`] contract: request, configure, enable/disable, set polarity,
//! free.

pub mod chip;
pub mod soc;

pub use chip::{TcuPwmChip, MAX_CHANNELS};
pub use soc::SocInfo;

use crate::platform::Result;

/// PWM output polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum Polarity {
    /// Active level is logic high
    Normal,
    /// Active level is logic low
    Inverted,
}

/// Per-channel operation contract implemented by the chip driver
///
/// The caller is responsible for sequencing: a channel must be requested
/// before it is configured, enabled or freed, and calls into one channel must
/// not overlap. Operations on different channels are independent except for
/// the shared enable/start/stop registers, which the register transport
/// updates atomically.
pub trait PwmOps {
    /// Claim a channel and bind its clock
    ///
    /// # Errors
    ///
    /// Returns `PwmError::ResourceBusy` if another TCU consumer owns the
    /// channel, `ClockNotFound`/`ClockEnableFailed` if the channel clock
    /// cannot be bound. Channel ownership is rolled back on every failure
    /// path.
    fn request(&mut self, channel: u8) -> Result<()>;

    /// Quiesce a channel's clock and return it to the shared pool
    fn free(&mut self, channel: u8);

    /// Program period and duty, both in nanoseconds
    ///
    /// Retunes the channel clock so the period fits the 16-bit counter, then
    /// rewrites the channel registers. A channel that is enabled when this is
    /// called is briefly disabled during the rewrite and re-enabled after.
    ///
    /// # Errors
    ///
    /// Returns `PwmError::PeriodTooLong` if no reachable clock rate makes the
    /// period fit, `InvalidConfiguration` for a zero period or an unrequested
    /// channel.
    fn configure(&mut self, channel: u8, duty_ns: u64, period_ns: u64) -> Result<()>;

    /// Ungate the PWM output and start the channel counter. Idempotent.
    fn enable(&mut self, channel: u8) -> Result<()>;

    /// Gate the PWM output and stop the channel counter
    fn disable(&mut self, channel: u8) -> Result<()>;

    /// Select which logic level is the active one
    fn set_polarity(&mut self, channel: u8, polarity: Polarity) -> Result<()>;
}

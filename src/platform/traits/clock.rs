//! Clock tree traits
//!
//! Each TCU channel has a dedicated clock named `timer<N>` in the SoC clock
//! tree. The driver looks the clock up when a channel is requested, keeps the
//! handle for the lifetime of the request, and retunes its rate while solving
//! period/duty timings.

use crate::platform::Result;

/// A clock handle bound to one TCU channel
///
/// Rates are in Hz. Handles are reference counted by the platform; the driver
/// balances every `enable` with exactly one `disable`.
pub trait ClockInterface {
    /// Current clock rate in Hz
    fn rate(&self) -> u64;

    /// Nearest rate the clock can actually run at, given a target rate
    ///
    /// Does not change the hardware. The returned rate may be above or below
    /// `target` depending on the divider ladder the clock supports.
    fn round_rate(&self, target: u64) -> u64;

    /// Change the clock rate
    ///
    /// # Errors
    ///
    /// Returns `PwmError::InvalidConfiguration` if the rate is not supported.
    fn set_rate(&mut self, rate: u64) -> Result<()>;

    /// Prepare and enable the clock
    ///
    /// # Errors
    ///
    /// Returns `PwmError::ClockEnableFailed` if the clock could not be
    /// ungated.
    fn enable(&mut self) -> Result<()>;

    /// Disable and unprepare the clock
    fn disable(&mut self);
}

/// Clock tree lookup service
pub trait ClockTree {
    /// Clock handle type
    type Clock: ClockInterface;

    /// Look up a clock by name (e.g. `timer3`)
    ///
    /// # Errors
    ///
    /// Returns `PwmError::ClockNotFound` if no clock with that name exists.
    fn lookup(&mut self, name: &str) -> Result<Self::Clock>;
}

//! Timer channel arbiter trait
//!
//! TCU channels are shared between PWM outputs, system timers and the
//! watchdog. A single arbiter per TCU instance decides which consumer owns
//! which channel; the PWM driver acquires a channel before touching any of
//! its registers and releases it when the channel is freed.

use crate::platform::Result;

/// Exclusive-ownership arbiter for TCU channels
pub trait ChannelArbiter {
    /// Claim exclusive ownership of a channel
    ///
    /// # Errors
    ///
    /// Returns `PwmError::ResourceBusy` if another consumer already owns the
    /// channel.
    fn acquire(&mut self, channel: u8) -> Result<()>;

    /// Return a channel to the shared pool
    ///
    /// The caller must have quiesced the channel first; the arbiter may hand
    /// the index to a different consumer immediately.
    fn release(&mut self, channel: u8);
}

//! Platform error types
//!
//! This module defines the error types surfaced by the PWM driver and its
//! platform collaborators.

use core::fmt;

/// Result type for platform and driver operations
pub type Result<T> = core::result::Result<T, PwmError>;

/// PWM driver errors
///
/// All platform implementations map their HAL-specific failures to these
/// variants before they cross the trait boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum PwmError {
    /// The timer channel is already owned by another TCU consumer
    ResourceBusy,
    /// No clock with the requested name exists in the clock tree
    ClockNotFound,
    /// The channel clock could not be enabled
    ClockEnableFailed,
    /// No reachable clock rate makes the period fit the 16-bit counter
    PeriodTooLong,
    /// The register transport reported a failure
    RegisterAccessFailed,
    /// Invalid configuration (zero-channel model, bad channel index,
    /// zero-length period)
    InvalidConfiguration,
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PwmError::ResourceBusy => write!(f, "timer channel already in use"),
            PwmError::ClockNotFound => write!(f, "channel clock not found"),
            PwmError::ClockEnableFailed => write!(f, "channel clock enable failed"),
            PwmError::PeriodTooLong => write!(f, "period does not fit the 16-bit counter"),
            PwmError::RegisterAccessFailed => write!(f, "register access failed"),
            PwmError::InvalidConfiguration => write!(f, "invalid configuration"),
        }
    }
}

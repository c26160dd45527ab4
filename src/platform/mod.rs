//! Platform abstraction layer
//!
//! This module defines the collaborator interfaces the PWM driver depends on:
//! the TCU register transport, the clock tree, and the shared timer-channel
//! arbiter. Hardware-specific code lives behind these traits so the driver
//! itself stays platform independent and host testable.

pub mod error;
pub mod traits;

// Mock implementations (host tests only)
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PwmError, Result};
pub use traits::{ChannelArbiter, ClockInterface, ClockTree, RegmapInterface};

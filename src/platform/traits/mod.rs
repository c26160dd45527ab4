//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide
//! for the PWM driver to reach its hardware collaborators.

pub mod channel;
pub mod clock;
pub mod regmap;

// Re-export trait interfaces
pub use channel::ChannelArbiter;
pub use clock::{ClockInterface, ClockTree};
pub use regmap::RegmapInterface;

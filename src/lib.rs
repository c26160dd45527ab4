#![cfg_attr(not(test), no_std)]

//! tcu-pwm - PWM chip driver for Ingenic TCU timer/counter units
//!
//! This library exposes the PWM output channels of a TCU hardware block as
//! generic, numbered PWM devices. All hardware access goes through the
//! platform abstraction traits, so the driver logic runs unmodified against
//! a real register transport or against the mock layer used by the tests.

// The mock layer is host-only and uses std containers
#[cfg(all(feature = "mock", not(test)))]
extern crate std;

// Platform abstraction layer (register transport, clock tree, channel arbiter)
pub mod platform;

// TCU register map shared by the timer/counter consumers of the block
pub mod tcu;

// The PWM chip driver itself
pub mod pwm;

// Logging macros (defmt on embedded builds, println! under host tests)
pub mod logging;

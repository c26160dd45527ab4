//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the platform traits so the
//! driver can be exercised deterministically without TCU hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled (host builds only)
//!
//! # Example
//!
//! ```ignore
//! use tcu_pwm::platform::mock::{MockArbiter, MockClockTree, MockRegmap};
//! use tcu_pwm::pwm::{PwmOps, TcuPwmChip};
//!
//! let mut chip = TcuPwmChip::new(
//!     &tcu_pwm::pwm::soc::JZ4740,
//!     MockRegmap::new(),
//!     MockClockTree::new(12_000_000),
//!     MockArbiter::new(),
//! )?;
//! chip.request(0)?;
//! ```

#![cfg(any(test, feature = "mock"))]

mod channel;
mod clock;
mod regmap;

pub use channel::MockArbiter;
pub use clock::{MockClock, MockClockTree};
pub use regmap::{MockRegmap, RegOp};

use std::string::String;
use std::sync::{Arc, Mutex};
use std::vec::Vec;

/// Events recorded by the mocks, in call order
///
/// The clock tree and arbiter mocks can share one trace, which lets tests
/// assert cross-collaborator ordering (e.g. that a channel's clock is
/// quiesced before its slot goes back to the arbiter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A clock was prepared and enabled
    ClockEnabled(String),
    /// A clock was disabled and unprepared
    ClockDisabled(String),
    /// A clock rate was committed
    RateSet(String, u64),
    /// A timer channel was claimed from the arbiter
    ChannelAcquired(u8),
    /// A timer channel was returned to the arbiter
    ChannelReleased(u8),
}

/// Shared event trace handle
pub type Trace = Arc<Mutex<Vec<TraceEvent>>>;

/// Create an empty trace
pub fn new_trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

/// Record an event on a trace
pub(crate) fn record(trace: &Trace, event: TraceEvent) {
    trace.lock().unwrap().push(event);
}

/// Snapshot a trace's events
pub fn trace_events(trace: &Trace) -> Vec<TraceEvent> {
    trace.lock().unwrap().clone()
}

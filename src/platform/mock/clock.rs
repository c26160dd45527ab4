//! Mock clock tree for testing
//!
//! Models a clock tree where every looked-up clock starts at a configurable
//! base rate and supports the base rate divided by powers of two, down to a
//! floor rate. That is the shape of the TCU prescaler ladder and is what the
//! period solver's halving search runs against.

use crate::platform::mock::{record, Trace, TraceEvent};
use crate::platform::{
    error::PwmError,
    traits::{ClockInterface, ClockTree},
    Result,
};

use std::string::{String, ToString};
use std::vec::Vec;

/// Mock clock handle
#[derive(Debug)]
pub struct MockClock {
    name: String,
    rate: u64,
    base_rate: u64,
    floor_rate: u64,
    fail_enable: bool,
    trace: Trace,
}

impl ClockInterface for MockClock {
    fn rate(&self) -> u64 {
        self.rate
    }

    fn round_rate(&self, target: u64) -> u64 {
        // Largest base/2^k at or below the target, clamped to the floor
        let mut rate = self.base_rate;
        while rate > target && rate / 2 >= self.floor_rate {
            rate /= 2;
        }
        rate
    }

    fn set_rate(&mut self, rate: u64) -> Result<()> {
        self.rate = rate;
        record(&self.trace, TraceEvent::RateSet(self.name.clone(), rate));
        Ok(())
    }

    fn enable(&mut self) -> Result<()> {
        if self.fail_enable {
            return Err(PwmError::ClockEnableFailed);
        }
        record(&self.trace, TraceEvent::ClockEnabled(self.name.clone()));
        Ok(())
    }

    fn disable(&mut self) {
        record(&self.trace, TraceEvent::ClockDisabled(self.name.clone()));
    }
}

/// Mock clock tree
#[derive(Debug)]
pub struct MockClockTree {
    base_rate: u64,
    floor_rate: u64,
    missing: Vec<String>,
    fail_enable: bool,
    trace: Trace,
}

impl MockClockTree {
    /// Create a tree whose clocks all run at `base_rate`, divisible down to 1 Hz
    pub fn new(base_rate: u64) -> Self {
        Self {
            base_rate,
            floor_rate: 1,
            missing: Vec::new(),
            fail_enable: false,
            trace: super::new_trace(),
        }
    }

    /// Set the lowest rate the clocks can be divided down to
    pub fn set_floor_rate(&mut self, floor_rate: u64) {
        self.floor_rate = floor_rate;
    }

    /// Make lookups for `name` fail with `ClockNotFound`
    pub fn remove_clock(&mut self, name: &str) {
        self.missing.push(name.to_string());
    }

    /// Make `enable` fail on every clock handed out from now on
    pub fn set_enable_failure(&mut self, fail: bool) {
        self.fail_enable = fail;
    }

    /// The trace this tree records clock events on
    pub fn trace(&self) -> Trace {
        self.trace.clone()
    }

    /// Record events on a trace shared with other mocks
    pub fn share_trace(&mut self, trace: &Trace) {
        self.trace = trace.clone();
    }
}

impl ClockTree for MockClockTree {
    type Clock = MockClock;

    fn lookup(&mut self, name: &str) -> Result<MockClock> {
        if self.missing.iter().any(|m| m == name) {
            return Err(PwmError::ClockNotFound);
        }
        Ok(MockClock {
            name: name.to_string(),
            rate: self.base_rate,
            base_rate: self.base_rate,
            floor_rate: self.floor_rate,
            fail_enable: self.fail_enable,
            trace: self.trace.clone(),
        })
    }
}

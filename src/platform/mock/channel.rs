//! Mock timer-channel arbiter for testing
//!
//! Tracks channel ownership in a bitmask, the way the shared TCU arbiter
//! tracks which consumer holds which channel.

use crate::platform::mock::{record, Trace, TraceEvent};
use crate::platform::{error::PwmError, traits::ChannelArbiter, Result};

/// Mock channel arbiter
#[derive(Debug)]
pub struct MockArbiter {
    owned: u32,
    trace: Trace,
}

impl MockArbiter {
    /// Create an arbiter with every channel free
    pub fn new() -> Self {
        Self {
            owned: 0,
            trace: super::new_trace(),
        }
    }

    /// Whether a channel is currently owned
    pub fn is_owned(&self, channel: u8) -> bool {
        self.owned & (1 << channel) != 0
    }

    /// The trace this arbiter records ownership events on
    pub fn trace(&self) -> Trace {
        self.trace.clone()
    }

    /// Record events on a trace shared with other mocks
    pub fn share_trace(&mut self, trace: &Trace) {
        self.trace = trace.clone();
    }
}

impl Default for MockArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelArbiter for MockArbiter {
    fn acquire(&mut self, channel: u8) -> Result<()> {
        let bit = 1u32 << channel;
        if self.owned & bit != 0 {
            return Err(PwmError::ResourceBusy);
        }
        self.owned |= bit;
        record(&self.trace, TraceEvent::ChannelAcquired(channel));
        Ok(())
    }

    fn release(&mut self, channel: u8) {
        self.owned &= !(1u32 << channel);
        record(&self.trace, TraceEvent::ChannelReleased(channel));
    }
}

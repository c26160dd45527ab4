//! TCU register map
//!
//! Byte offsets and bit definitions for the timer/counter unit register
//! block, as used by the PWM driver. The same block also carries the system
//! timer and watchdog registers; only the registers this driver touches are
//! listed here.

/// Timer enable status register (one bit per channel, read-only view)
pub const REG_TER: u32 = 0x10;
/// Timer enable set register (write `1 << channel` to start a counter)
pub const REG_TESR: u32 = 0x14;
/// Timer enable clear register (write `1 << channel` to stop a counter)
pub const REG_TECR: u32 = 0x18;

const REG_TDFR0: u32 = 0x40;
const REG_TDHR0: u32 = 0x44;
const REG_TCNT0: u32 = 0x48;
const REG_TCSR0: u32 = 0x4c;

/// Byte distance between consecutive channels' register groups
const CHANNEL_STRIDE: u32 = 0x10;

/// TCSR: shut down the PWM output abruptly rather than ramping it
pub const TCSR_PWM_SD: u32 = 1 << 9;
/// TCSR: initial output level is high (inverted polarity)
pub const TCSR_PWM_INITL_HIGH: u32 = 1 << 8;
/// TCSR: PWM pin output enable
pub const TCSR_PWM_EN: u32 = 1 << 7;

/// Data full register (period, in ticks) for a channel
pub const fn tdfr(channel: u8) -> u32 {
    REG_TDFR0 + channel as u32 * CHANNEL_STRIDE
}

/// Data half register (duty comparison point, in ticks) for a channel
pub const fn tdhr(channel: u8) -> u32 {
    REG_TDHR0 + channel as u32 * CHANNEL_STRIDE
}

/// Counter register for a channel
pub const fn tcnt(channel: u8) -> u32 {
    REG_TCNT0 + channel as u32 * CHANNEL_STRIDE
}

/// Control/status register for a channel
pub const fn tcsr(channel: u8) -> u32 {
    REG_TCSR0 + channel as u32 * CHANNEL_STRIDE
}

/// Bit position of a channel in the shared enable/start/stop registers
pub const fn channel_bit(channel: u8) -> u32 {
    1 << channel
}

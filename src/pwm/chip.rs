//! TCU PWM chip instance
//!
//! One `TcuPwmChip` is created per discovered TCU block. It owns the
//! register transport, a clock-tree handle, the channel arbiter, and one
//! clock slot per channel. A slot holds `Some(clock)` exactly while its
//! channel is requested.

use core::fmt::Write as _;

use heapless::String;

use crate::platform::{
    ChannelArbiter, ClockInterface, ClockTree, PwmError, RegmapInterface, Result,
};
use crate::pwm::{soc::SocInfo, Polarity, PwmOps};
use crate::tcu;
use crate::{log_debug, log_error, log_warn};

/// Largest channel count across all supported models
pub const MAX_CHANNELS: usize = 8;

/// The channel counters are 16 bits wide
const MAX_PERIOD_TICKS: u64 = 0xffff;

const NSEC_PER_SEC: u64 = 1_000_000_000;

/// Period in clock ticks at the given rate, truncating
fn ticks_at(rate: u64, period_ns: u64) -> u64 {
    ((rate as u128 * period_ns as u128) / NSEC_PER_SEC as u128) as u64
}

/// PWM chip driver for one TCU instance
pub struct TcuPwmChip<R, C, A>
where
    C: ClockTree,
{
    map: R,
    clock_tree: C,
    channels: A,
    clks: heapless::Vec<Option<C::Clock>, MAX_CHANNELS>,
}

impl<R, C, A> TcuPwmChip<R, C, A>
where
    R: RegmapInterface,
    C: ClockTree,
    A: ChannelArbiter,
{
    /// Create a chip instance for the given SoC model
    ///
    /// The channel count is fixed here from the model metadata and never
    /// changes afterwards.
    ///
    /// # Errors
    ///
    /// Returns `PwmError::InvalidConfiguration` if the model reports zero
    /// channels or more than [`MAX_CHANNELS`].
    pub fn new(soc_info: &SocInfo, map: R, clock_tree: C, channels: A) -> Result<Self> {
        let num_pwms = soc_info.num_pwms as usize;
        if num_pwms == 0 || num_pwms > MAX_CHANNELS {
            log_error!(
                "pwm: model {} reports unusable channel count {}",
                soc_info.compatible,
                soc_info.num_pwms
            );
            return Err(PwmError::InvalidConfiguration);
        }

        Ok(Self {
            map,
            clock_tree,
            channels,
            clks: (0..num_pwms).map(|_| None).collect(),
        })
    }

    /// Number of channels this chip exposes
    pub fn num_channels(&self) -> u8 {
        self.clks.len() as u8
    }

    /// Access the underlying register transport
    pub fn regmap(&self) -> &R {
        &self.map
    }

    /// Mutable access to the underlying register transport
    pub fn regmap_mut(&mut self) -> &mut R {
        &mut self.map
    }

    fn check_channel(&self, channel: u8) -> Result<()> {
        if (channel as usize) < self.clks.len() {
            Ok(())
        } else {
            Err(PwmError::InvalidConfiguration)
        }
    }

    fn clock_mut(&mut self, channel: u8) -> Result<&mut C::Clock> {
        self.clks
            .get_mut(channel as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(PwmError::InvalidConfiguration)
    }

    /// Find a clock rate at which the period fits the counter, commit it,
    /// and derive the two register values.
    ///
    /// The rate search halves the current rate until the period expressed in
    /// ticks is at most `MAX_PERIOD_TICKS`, asking the clock for the nearest
    /// supported rate at each step. The duty register value counts down from
    /// the period: it holds the tick at which the output flips to its
    /// inactive level.
    fn solve(&mut self, channel: u8, duty_ns: u64, period_ns: u64) -> Result<(u64, u16, u16)> {
        let clk = self.clock_mut(channel)?;

        let mut rate = clk.rate();
        let period = loop {
            let ticks = ticks_at(rate, period_ns);
            if ticks <= MAX_PERIOD_TICKS {
                break ticks;
            }

            let new_rate = clk.round_rate(rate / 2);
            if new_rate >= rate {
                // Divider floor reached and the period still does not fit
                return Err(PwmError::PeriodTooLong);
            }
            rate = new_rate;
        };

        // The new rate stays in effect even if a later step fails
        clk.set_rate(rate)?;

        let on_ticks = (period as u128 * duty_ns as u128 / period_ns as u128) as u64;
        let duty = match period.checked_sub(on_ticks) {
            Some(duty) if duty < period => duty,
            // Some hardware revisions wrap ambiguously when the flip point
            // coincides with the period; keep one tick of separation.
            _ => period.saturating_sub(1),
        };

        Ok((rate, period as u16, duty as u16))
    }

    /// Rewrite a channel's counter, duty and period registers
    ///
    /// The output must be quiesced while the registers change; the channel's
    /// prior enabled state is restored afterwards. Not atomic: a transport
    /// failure mid-sequence leaves the channel partially reprogrammed.
    fn reprogram(&mut self, channel: u8, period_ticks: u16, duty_ticks: u16) -> Result<()> {
        let ter = self.map.read(tcu::REG_TER)?;
        let was_enabled = ter & tcu::channel_bit(channel) != 0;
        if was_enabled {
            self.disable(channel)?;
        }

        // Stop abruptly rather than ramping down while registers change
        self.map
            .update_bits(tcu::tcsr(channel), tcu::TCSR_PWM_SD, tcu::TCSR_PWM_SD)?;

        // Reset the counter, then program duty before period
        self.map.write(tcu::tcnt(channel), 0)?;
        self.map.write(tcu::tdhr(channel), duty_ticks as u32)?;
        self.map.write(tcu::tdfr(channel), period_ticks as u32)?;

        if was_enabled {
            self.enable(channel)?;
        }

        Ok(())
    }
}

impl<R, C, A> PwmOps for TcuPwmChip<R, C, A>
where
    R: RegmapInterface,
    C: ClockTree,
    A: ChannelArbiter,
{
    fn request(&mut self, channel: u8) -> Result<()> {
        self.check_channel(channel)?;
        self.channels.acquire(channel)?;

        let mut clk_name: String<12> = String::new();
        let _ = write!(clk_name, "timer{}", channel);

        let mut clk = match self.clock_tree.lookup(&clk_name) {
            Ok(clk) => clk,
            Err(err) => {
                self.channels.release(channel);
                return Err(err);
            }
        };

        if let Err(err) = clk.enable() {
            self.channels.release(channel);
            return Err(err);
        }

        log_debug!("pwm: channel {} bound to {}", channel, clk_name.as_str());
        self.clks[channel as usize] = Some(clk);
        Ok(())
    }

    fn free(&mut self, channel: u8) {
        let Some(slot) = self.clks.get_mut(channel as usize) else {
            return;
        };

        // The clock must be fully quiesced before the channel goes back to
        // the pool; the arbiter may hand the index to the watchdog or a
        // system timer immediately.
        if let Some(mut clk) = slot.take() {
            clk.disable();
            self.channels.release(channel);
            log_debug!("pwm: channel {} freed", channel);
        }
    }

    fn configure(&mut self, channel: u8, duty_ns: u64, period_ns: u64) -> Result<()> {
        if period_ns == 0 {
            log_warn!("pwm: zero period refused on channel {}", channel);
            return Err(PwmError::InvalidConfiguration);
        }

        let (rate, period_ticks, duty_ticks) = self.solve(channel, duty_ns, period_ns)?;
        log_debug!(
            "pwm: channel {} at {} Hz: period {} ticks, duty {} ticks",
            channel,
            rate,
            period_ticks,
            duty_ticks
        );

        self.reprogram(channel, period_ticks, duty_ticks)
    }

    fn enable(&mut self, channel: u8) -> Result<()> {
        self.check_channel(channel)?;

        // Enable the PWM output, then start the counter
        self.map
            .update_bits(tcu::tcsr(channel), tcu::TCSR_PWM_EN, tcu::TCSR_PWM_EN)?;
        self.map.write(tcu::REG_TESR, tcu::channel_bit(channel))
    }

    fn disable(&mut self, channel: u8) -> Result<()> {
        self.check_channel(channel)?;

        // The output-enable bit must be cleared before the counter stops:
        // in TCU2 mode (channels 1 and 2 on later generations) the reverse
        // order glitches the output, in TCU1 mode the order does not matter.
        self.map
            .update_bits(tcu::tcsr(channel), tcu::TCSR_PWM_EN, 0)?;
        self.map.write(tcu::REG_TECR, tcu::channel_bit(channel))
    }

    fn set_polarity(&mut self, channel: u8, polarity: Polarity) -> Result<()> {
        self.check_channel(channel)?;

        let value = match polarity {
            Polarity::Normal => 0,
            Polarity::Inverted => tcu::TCSR_PWM_INITL_HIGH,
        };
        self.map
            .update_bits(tcu::tcsr(channel), tcu::TCSR_PWM_INITL_HIGH, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{
        new_trace, trace_events, MockArbiter, MockClockTree, MockRegmap, RegOp, TraceEvent,
    };
    use crate::pwm::soc;

    fn make_chip(rate: u64) -> TcuPwmChip<MockRegmap, MockClockTree, MockArbiter> {
        TcuPwmChip::new(
            &soc::JZ4740,
            MockRegmap::new(),
            MockClockTree::new(rate),
            MockArbiter::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_zero_channels() {
        let bad = SocInfo {
            compatible: "ingenic,broken-pwm",
            num_pwms: 0,
        };
        let result = TcuPwmChip::new(
            &bad,
            MockRegmap::new(),
            MockClockTree::new(12_000_000),
            MockArbiter::new(),
        );
        assert_eq!(result.err(), Some(PwmError::InvalidConfiguration));
    }

    #[test]
    fn test_channel_count_from_model() {
        let chip = TcuPwmChip::new(
            &soc::JZ4725B,
            MockRegmap::new(),
            MockClockTree::new(12_000_000),
            MockArbiter::new(),
        )
        .unwrap();
        assert_eq!(chip.num_channels(), 6);
    }

    #[test]
    fn test_request_out_of_range() {
        let mut chip = TcuPwmChip::new(
            &soc::JZ4725B,
            MockRegmap::new(),
            MockClockTree::new(12_000_000),
            MockArbiter::new(),
        )
        .unwrap();
        assert_eq!(chip.request(6), Err(PwmError::InvalidConfiguration));
        chip.request(5).unwrap();
    }

    #[test]
    fn test_request_exclusive() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();
        assert_eq!(chip.request(0), Err(PwmError::ResourceBusy));

        // A different channel is still available
        chip.request(1).unwrap();
    }

    #[test]
    fn test_request_rollback_on_missing_clock() {
        let trace = new_trace();
        let mut tree = MockClockTree::new(12_000_000);
        tree.share_trace(&trace);
        tree.remove_clock("timer0");
        let mut arbiter = MockArbiter::new();
        arbiter.share_trace(&trace);

        let mut chip = TcuPwmChip::new(&soc::JZ4740, MockRegmap::new(), tree, arbiter).unwrap();
        assert_eq!(chip.request(0), Err(PwmError::ClockNotFound));

        // Ownership went back to the arbiter before the error returned
        assert_eq!(
            trace_events(&trace),
            vec![
                TraceEvent::ChannelAcquired(0),
                TraceEvent::ChannelReleased(0),
            ]
        );
    }

    #[test]
    fn test_request_rollback_on_clock_enable_failure() {
        let trace = new_trace();
        let mut tree = MockClockTree::new(12_000_000);
        tree.share_trace(&trace);
        tree.set_enable_failure(true);
        let mut arbiter = MockArbiter::new();
        arbiter.share_trace(&trace);

        let mut chip = TcuPwmChip::new(&soc::JZ4740, MockRegmap::new(), tree, arbiter).unwrap();
        assert_eq!(chip.request(2), Err(PwmError::ClockEnableFailed));
        assert_eq!(
            trace_events(&trace),
            vec![
                TraceEvent::ChannelAcquired(2),
                TraceEvent::ChannelReleased(2),
            ]
        );
    }

    #[test]
    fn test_free_quiesces_clock_before_release() {
        let trace = new_trace();
        let mut tree = MockClockTree::new(12_000_000);
        tree.share_trace(&trace);
        let mut arbiter = MockArbiter::new();
        arbiter.share_trace(&trace);

        let mut chip = TcuPwmChip::new(&soc::JZ4740, MockRegmap::new(), tree, arbiter).unwrap();
        chip.request(3).unwrap();
        chip.free(3);

        assert_eq!(
            trace_events(&trace),
            vec![
                TraceEvent::ChannelAcquired(3),
                TraceEvent::ClockEnabled("timer3".to_string()),
                TraceEvent::ClockDisabled("timer3".to_string()),
                TraceEvent::ChannelReleased(3),
            ]
        );
    }

    #[test]
    fn test_free_makes_channel_requestable_again() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();
        chip.free(0);
        chip.request(0).unwrap();
    }

    #[test]
    fn test_free_unrequested_channel_is_noop() {
        let trace = new_trace();
        let mut arbiter = MockArbiter::new();
        arbiter.share_trace(&trace);
        let mut chip = TcuPwmChip::new(
            &soc::JZ4740,
            MockRegmap::new(),
            MockClockTree::new(12_000_000),
            arbiter,
        )
        .unwrap();

        chip.free(4);
        assert!(trace_events(&trace).is_empty());
    }

    #[test]
    fn test_configure_12mhz_1ms_50pct() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();
        chip.configure(0, 500_000, 1_000_000).unwrap();

        assert_eq!(chip.regmap().get(tcu::tdfr(0)), 12_000);
        assert_eq!(chip.regmap().get(tcu::tdhr(0)), 6_000);
    }

    #[test]
    fn test_configure_halves_rate_until_period_fits() {
        let trace = new_trace();
        let mut tree = MockClockTree::new(48_000_000);
        tree.share_trace(&trace);

        let mut chip =
            TcuPwmChip::new(&soc::JZ4740, MockRegmap::new(), tree, MockArbiter::new()).unwrap();
        chip.request(0).unwrap();

        // 10 ms at 48 MHz is 480000 ticks; three halvings get it under 0xffff
        chip.configure(0, 5_000_000, 10_000_000).unwrap();
        assert_eq!(chip.regmap().get(tcu::tdfr(0)), 60_000);
        assert_eq!(chip.regmap().get(tcu::tdhr(0)), 30_000);

        let events = trace_events(&trace);
        assert!(events.contains(&TraceEvent::RateSet("timer0".to_string(), 6_000_000)));
    }

    #[test]
    fn test_configure_period_too_long() {
        let trace = new_trace();
        let mut tree = MockClockTree::new(12_000_000);
        tree.share_trace(&trace);
        // The clock cannot be divided below its base rate
        tree.set_floor_rate(12_000_000);

        let mut chip =
            TcuPwmChip::new(&soc::JZ4740, MockRegmap::new(), tree, MockArbiter::new()).unwrap();
        chip.request(0).unwrap();

        assert_eq!(
            chip.configure(0, 1_000_000, 1_000_000_000),
            Err(PwmError::PeriodTooLong)
        );

        // No rate was committed and no register was touched
        let events = trace_events(&trace);
        assert!(!events
            .iter()
            .any(|e| matches!(e, TraceEvent::RateSet(_, _))));
        assert_eq!(chip.regmap().get(tcu::tdfr(0)), 0);
    }

    #[test]
    fn test_solver_bounds() {
        let cases = [
            (1u64, 1_000u64),
            (250_000, 1_000_000),
            (999_999, 1_000_000),
            (1, 5_000_000),
            (2_500_000, 5_000_000),
        ];
        for (duty_ns, period_ns) in cases {
            let mut chip = make_chip(48_000_000);
            chip.request(0).unwrap();
            chip.configure(0, duty_ns, period_ns).unwrap();

            let period = chip.regmap().get(tcu::tdfr(0));
            let duty = chip.regmap().get(tcu::tdhr(0));
            assert!(period <= 0xffff, "period {} for {} ns", period, period_ns);
            assert!(
                duty < period,
                "duty {} not below period {} for ({}, {})",
                duty,
                period,
                duty_ns,
                period_ns
            );
        }
    }

    #[test]
    fn test_duty_flip_point_clamped_below_period() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();

        // Zero duty would put the flip point exactly at the period, which
        // wraps ambiguously; it must land one tick below instead.
        chip.configure(0, 0, 1_000_000).unwrap();
        assert_eq!(chip.regmap().get(tcu::tdfr(0)), 12_000);
        assert_eq!(chip.regmap().get(tcu::tdhr(0)), 11_999);
    }

    #[test]
    fn test_duty_beyond_period_clamped() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();

        chip.configure(0, 2_000_000, 1_000_000).unwrap();
        assert_eq!(chip.regmap().get(tcu::tdhr(0)), 11_999);
    }

    #[test]
    fn test_full_duty_flips_at_zero() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();

        chip.configure(0, 1_000_000, 1_000_000).unwrap();
        assert_eq!(chip.regmap().get(tcu::tdhr(0)), 0);
    }

    #[test]
    fn test_configure_zero_period_rejected() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();
        assert_eq!(
            chip.configure(0, 0, 0),
            Err(PwmError::InvalidConfiguration)
        );
    }

    #[test]
    fn test_configure_unrequested_channel_rejected() {
        let mut chip = make_chip(12_000_000);
        assert_eq!(
            chip.configure(0, 500_000, 1_000_000),
            Err(PwmError::InvalidConfiguration)
        );
    }

    #[test]
    fn test_enable_sets_output_before_counter() {
        let mut chip = make_chip(12_000_000);
        chip.request(1).unwrap();
        chip.regmap_mut().clear_log();

        chip.enable(1).unwrap();
        assert_eq!(
            chip.regmap().log(),
            &[
                RegOp::Update(tcu::tcsr(1), tcu::TCSR_PWM_EN, tcu::TCSR_PWM_EN),
                RegOp::Write(tcu::REG_TESR, 0b10),
            ]
        );
        assert_eq!(chip.regmap().get(tcu::REG_TER) & 0b10, 0b10);
    }

    #[test]
    fn test_disable_clears_output_before_counter() {
        let mut chip = make_chip(12_000_000);
        chip.request(1).unwrap();
        chip.enable(1).unwrap();
        chip.regmap_mut().clear_log();

        chip.disable(1).unwrap();
        assert_eq!(
            chip.regmap().log(),
            &[
                RegOp::Update(tcu::tcsr(1), tcu::TCSR_PWM_EN, 0),
                RegOp::Write(tcu::REG_TECR, 0b10),
            ]
        );
        assert_eq!(chip.regmap().get(tcu::REG_TER) & 0b10, 0);
    }

    #[test]
    fn test_enable_idempotent() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();

        chip.enable(0).unwrap();
        let once = chip.regmap().registers();

        chip.enable(0).unwrap();
        assert_eq!(chip.regmap().registers(), once);
    }

    #[test]
    fn test_reprogram_sequence_on_disabled_channel() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();
        chip.regmap_mut().clear_log();

        chip.configure(0, 500_000, 1_000_000).unwrap();
        assert_eq!(
            chip.regmap().log(),
            &[
                RegOp::Read(tcu::REG_TER),
                RegOp::Update(tcu::tcsr(0), tcu::TCSR_PWM_SD, tcu::TCSR_PWM_SD),
                RegOp::Write(tcu::tcnt(0), 0),
                RegOp::Write(tcu::tdhr(0), 6_000),
                RegOp::Write(tcu::tdfr(0), 12_000),
            ]
        );
    }

    #[test]
    fn test_reprogram_preserves_enabled_state() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();
        chip.configure(0, 500_000, 1_000_000).unwrap();
        chip.enable(0).unwrap();

        chip.configure(0, 250_000, 1_000_000).unwrap();
        assert_eq!(chip.regmap().get(tcu::REG_TER) & 0b1, 0b1);
        assert_eq!(chip.regmap().get(tcu::tdhr(0)), 9_000);
    }

    #[test]
    fn test_reprogram_preserves_disabled_state() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();
        chip.configure(0, 500_000, 1_000_000).unwrap();

        assert_eq!(chip.regmap().get(tcu::REG_TER) & 0b1, 0);
    }

    #[test]
    fn test_reprogram_quiesces_enabled_channel() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();
        chip.enable(0).unwrap();
        chip.regmap_mut().clear_log();

        chip.configure(0, 500_000, 1_000_000).unwrap();
        assert_eq!(
            chip.regmap().log(),
            &[
                RegOp::Read(tcu::REG_TER),
                // Quiesce
                RegOp::Update(tcu::tcsr(0), tcu::TCSR_PWM_EN, 0),
                RegOp::Write(tcu::REG_TECR, 0b1),
                // Rewrite
                RegOp::Update(tcu::tcsr(0), tcu::TCSR_PWM_SD, tcu::TCSR_PWM_SD),
                RegOp::Write(tcu::tcnt(0), 0),
                RegOp::Write(tcu::tdhr(0), 6_000),
                RegOp::Write(tcu::tdfr(0), 12_000),
                // Restore
                RegOp::Update(tcu::tcsr(0), tcu::TCSR_PWM_EN, tcu::TCSR_PWM_EN),
                RegOp::Write(tcu::REG_TESR, 0b1),
            ]
        );
    }

    #[test]
    fn test_set_polarity_readback() {
        let mut chip = make_chip(12_000_000);
        chip.request(2).unwrap();

        chip.set_polarity(2, Polarity::Inverted).unwrap();
        assert_eq!(
            chip.regmap().get(tcu::tcsr(2)) & tcu::TCSR_PWM_INITL_HIGH,
            tcu::TCSR_PWM_INITL_HIGH
        );

        chip.set_polarity(2, Polarity::Normal).unwrap();
        assert_eq!(chip.regmap().get(tcu::tcsr(2)) & tcu::TCSR_PWM_INITL_HIGH, 0);
    }

    #[test]
    fn test_register_failure_surfaces() {
        let mut chip = make_chip(12_000_000);
        chip.request(0).unwrap();

        chip.regmap_mut().set_failing(true);
        assert_eq!(chip.enable(0), Err(PwmError::RegisterAccessFailed));
        assert_eq!(
            chip.configure(0, 500_000, 1_000_000),
            Err(PwmError::RegisterAccessFailed)
        );
    }
}

//! Runtime timing configuration for the LED engine.

use crate::pulse::{DEFAULT_UNIT_MILLIS, PulseTiming};
use crate::time::TimeDuration;

/// PWM resolution in bits. Duty values span `0..=255`.
pub const PWM_RESOLUTION_BITS: u8 = 8;

/// Timing and PWM settings for [`LedChannelEngine`](crate::LedChannelEngine).
///
/// The defaults are a 5 ms polling cadence, a 1 Hz blink (500 ms per half
/// period), a 1 s hold after each pulse pattern, a 150 ms Morse unit and a
/// 5 kHz PWM carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig<D: TimeDuration> {
    /// Interval at which the engine task re-arms itself.
    pub poll_interval: D,

    /// Time between blink toggles.
    pub blink_half_period: D,

    /// Forced-off hold after a pulse pattern completes.
    pub post_pulse_hold: D,

    /// Morse base unit (dot length).
    pub pulse_unit: D,

    /// PWM carrier frequency passed to the hardware on attach.
    pub pwm_frequency_hz: u32,
}

impl<D: TimeDuration> EngineConfig<D> {
    /// Sets the polling cadence.
    pub fn with_poll_interval(mut self, interval: D) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the blink half period.
    pub fn with_blink_half_period(mut self, half_period: D) -> Self {
        self.blink_half_period = half_period;
        self
    }

    /// Sets the hold after a pulse pattern.
    pub fn with_post_pulse_hold(mut self, hold: D) -> Self {
        self.post_pulse_hold = hold;
        self
    }

    /// Sets the Morse base unit.
    pub fn with_pulse_unit(mut self, unit: D) -> Self {
        self.pulse_unit = unit;
        self
    }

    /// Sets the PWM carrier frequency.
    pub fn with_pwm_frequency(mut self, hz: u32) -> Self {
        self.pwm_frequency_hz = hz;
        self
    }

    /// Returns the pulse timing derived from the configured unit.
    pub fn pulse_timing(&self) -> PulseTiming<D> {
        PulseTiming::from_unit(self.pulse_unit)
    }
}

impl<D: TimeDuration> Default for EngineConfig<D> {
    fn default() -> Self {
        Self {
            poll_interval: D::from_millis(5),
            blink_half_period: D::from_millis(500),
            post_pulse_hold: D::from_millis(1000),
            pulse_unit: D::from_millis(DEFAULT_UNIT_MILLIS),
            pwm_frequency_hz: 5000,
        }
    }
}

//! Per-channel LED state machine.
//!
//! Defines the [`PwmOutput`] hardware trait and the crate-internal
//! [`Channel`], which holds one LED slot's binding, brightness and mode and
//! advances its blink and pulse timing when the engine ticks.

use crate::config::EngineConfig;
use crate::pulse::PulseSequence;
use crate::time::{TimeDuration, TimeInstant, deadline};
use crate::types::{Brightness, PinId};

/// Trait for abstracting PWM output hardware.
///
/// Implement this for your platform's PWM peripheral (LEDC, timers, PIO, ...)
/// so the engine can drive the bound pins. Handle any hardware errors
/// internally - these methods cannot fail.
pub trait PwmOutput {
    /// Connects `pin` to a PWM generator.
    fn attach(&mut self, pin: PinId, frequency_hz: u32, resolution_bits: u8);

    /// Disconnects `pin` from its PWM generator.
    fn detach(&mut self, pin: PinId);

    /// Sets the duty cycle of `pin` (`0..=255` at 8-bit resolution).
    fn write(&mut self, pin: PinId, duty: u8);
}

/// Which illumination mode a channel is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeKind {
    /// Steady output at the configured brightness.
    Idle,
    /// Square wave toggling every blink half period.
    Blink,
    /// Playing back a pulse pattern.
    Pulse,
}

/// Snapshot of a bound channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStatus {
    /// Pin owned by the channel.
    pub pin: PinId,
    /// Whether the channel should emit light.
    pub active: bool,
    /// Configured brightness.
    pub brightness: Brightness,
    /// Current mode.
    pub mode: ModeKind,
    /// Last on/off level written by a blink or pulse transition.
    pub level: bool,
    /// True while the forced-off hold after a pulse pattern is running.
    pub post_gap: bool,
    /// `(cursor, length)` of the pattern being played, in `Pulse` mode.
    pub pulse_progress: Option<(usize, usize)>,
}

/// Playback state of a pulse pattern.
#[derive(Debug, Clone)]
pub(crate) struct PulsePlayback<D: TimeDuration, const N: usize> {
    sequence: PulseSequence<D, N>,
    /// Index of the next symbol; never exceeds `sequence.len()`.
    cursor: usize,
}

#[derive(Debug, Clone)]
pub(crate) enum Mode<D: TimeDuration, const N: usize> {
    Idle { post_gap: bool },
    Blink,
    Pulse(PulsePlayback<D, N>),
}

impl<D: TimeDuration, const N: usize> Mode<D, N> {
    fn kind(&self) -> ModeKind {
        match self {
            Mode::Idle { .. } => ModeKind::Idle,
            Mode::Blink => ModeKind::Blink,
            Mode::Pulse(_) => ModeKind::Pulse,
        }
    }
}

/// What a tick did to a channel, reported back to the engine for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    BlinkToggled { level: bool },
    PulseStep { cursor: usize },
    PulseComplete,
    HoldExpired,
}

/// One logical LED slot.
///
/// A channel without a pin is unbound and never writes to the PWM output.
pub(crate) struct Channel<I: TimeInstant, const N: usize> {
    pin: Option<PinId>,
    active: bool,
    brightness: Brightness,
    mode: Mode<I::Duration, N>,
    /// `None` means due immediately.
    next_due: Option<I>,
    level: bool,
}

impl<I: TimeInstant, const N: usize> Channel<I, N> {
    /// Creates an unbound channel.
    pub(crate) fn new() -> Self {
        Self {
            pin: None,
            active: false,
            brightness: Brightness::FULL,
            mode: Mode::Idle { post_gap: false },
            next_due: None,
            level: false,
        }
    }

    pub(crate) fn pin(&self) -> Option<PinId> {
        self.pin
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.pin.is_some()
    }

    /// Takes ownership of an already claimed `pin` and attaches it at zero duty.
    pub(crate) fn bind<P: PwmOutput>(&mut self, pin: PinId, pwm: &mut P, frequency_hz: u32) {
        *self = Self::new();
        self.pin = Some(pin);

        pwm.attach(pin, frequency_hz, crate::config::PWM_RESOLUTION_BITS);
        pwm.write(pin, 0);
    }

    /// Detaches the pin and resets the channel, returning the released pin.
    pub(crate) fn unbind<P: PwmOutput>(&mut self, pwm: &mut P) -> Option<PinId> {
        let pin = self.pin.take()?;
        pwm.detach(pin);
        *self = Self::new();
        Some(pin)
    }

    pub(crate) fn set_active<P: PwmOutput>(&mut self, on: bool, now: I, pwm: &mut P) {
        self.active = on;
        if on {
            self.write(pwm, self.brightness.duty());
            self.next_due = Some(now);
        } else {
            self.write(pwm, 0);
        }
    }

    pub(crate) fn set_blink<P: PwmOutput>(&mut self, enabled: bool, pwm: &mut P) {
        if enabled {
            self.mode = Mode::Blink;
        } else {
            self.mode = Mode::Idle { post_gap: false };
            if self.active {
                self.write(pwm, self.brightness.duty());
            }
        }
    }

    pub(crate) fn set_brightness<P: PwmOutput>(&mut self, brightness: Brightness, pwm: &mut P) {
        self.brightness = brightness;
        if self.active && matches!(self.mode, Mode::Idle { .. }) {
            self.write(pwm, brightness.duty());
        }
    }

    /// Switches to pulse playback of an already encoded sequence.
    pub(crate) fn start_pulse(&mut self, sequence: PulseSequence<I::Duration, N>, now: I) {
        self.mode = Mode::Pulse(PulsePlayback {
            sequence,
            cursor: 0,
        });
        if self.active {
            self.next_due = Some(now);
        }
    }

    /// Advances the mode state machine if the channel is bound, active and due.
    pub(crate) fn advance<P: PwmOutput>(
        &mut self,
        now: I,
        config: &EngineConfig<I::Duration>,
        pwm: &mut P,
    ) -> Option<Transition> {
        let pin = self.pin?;
        if !self.active || self.next_due.is_some_and(|due| due > now) {
            return None;
        }

        let duty = self.brightness.duty();
        match &mut self.mode {
            Mode::Idle { post_gap: false } => None,
            Mode::Idle { post_gap } => {
                *post_gap = false;
                self.level = true;
                pwm.write(pin, duty);
                Some(Transition::HoldExpired)
            }
            Mode::Blink => {
                self.level = !self.level;
                pwm.write(pin, if self.level { duty } else { 0 });
                self.next_due = Some(deadline(now, config.blink_half_period));
                Some(Transition::BlinkToggled { level: self.level })
            }
            Mode::Pulse(playback) => {
                if let Some(symbol) = playback.sequence.get(playback.cursor).copied() {
                    playback.cursor += 1;
                    self.level = symbol.emit;
                    pwm.write(pin, if symbol.emit { duty } else { 0 });
                    self.next_due = Some(deadline(now, symbol.duration));
                }

                if playback.cursor < playback.sequence.len() {
                    return Some(Transition::PulseStep {
                        cursor: playback.cursor,
                    });
                }

                self.mode = Mode::Idle { post_gap: true };
                self.level = false;
                pwm.write(pin, 0);
                self.next_due = Some(deadline(now, config.post_pulse_hold));
                Some(Transition::PulseComplete)
            }
        }
    }

    pub(crate) fn status(&self) -> Option<ChannelStatus> {
        let pin = self.pin?;
        Some(ChannelStatus {
            pin,
            active: self.active,
            brightness: self.brightness,
            mode: self.mode.kind(),
            level: self.level,
            post_gap: matches!(self.mode, Mode::Idle { post_gap: true }),
            pulse_progress: match &self.mode {
                Mode::Pulse(playback) => Some((playback.cursor, playback.sequence.len())),
                _ => None,
            },
        })
    }

    fn write<P: PwmOutput>(&self, pwm: &mut P, duty: u8) {
        if let Some(pin) = self.pin {
            pwm.write(pin, duty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::PulseSymbol;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Millis(u64);

    impl TimeDuration for Millis {
        const ZERO: Self = Millis(0);

        fn as_millis(&self) -> u64 {
            self.0
        }

        fn from_millis(millis: u64) -> Self {
            Millis(millis)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct At(u64);

    impl TimeInstant for At {
        type Duration = Millis;

        fn duration_since(&self, earlier: Self) -> Millis {
            Millis(self.0 - earlier.0)
        }

        fn checked_add(self, duration: Millis) -> Option<Self> {
            self.0.checked_add(duration.0).map(At)
        }
    }

    // Mock PWM that only remembers the last duty and counts writes
    #[derive(Default)]
    struct LastDuty {
        duty: Option<u8>,
        writes: usize,
    }

    impl PwmOutput for LastDuty {
        fn attach(&mut self, _pin: PinId, _frequency_hz: u32, _resolution_bits: u8) {}

        fn detach(&mut self, _pin: PinId) {}

        fn write(&mut self, _pin: PinId, duty: u8) {
            self.duty = Some(duty);
            self.writes += 1;
        }
    }

    fn active_channel(pwm: &mut LastDuty) -> Channel<At, 8> {
        let mut channel = Channel::new();
        channel.bind(PinId(0), pwm, 5000);
        channel.set_active(true, At(0), pwm);
        channel
    }

    #[test]
    fn unbound_channel_never_writes() {
        let mut pwm = LastDuty::default();
        let mut channel = Channel::<At, 8>::new();
        let config = EngineConfig::default();

        channel.set_active(true, At(0), &mut pwm);
        channel.set_blink(false, &mut pwm);
        channel.set_brightness(Brightness::FULL, &mut pwm);
        for now in 0..2000 {
            assert_eq!(channel.advance(At(now), &config, &mut pwm), None);
        }
        assert_eq!(pwm.writes, 0);
        assert!(channel.status().is_none());
    }

    #[test]
    fn empty_sequence_completes_on_first_tick() {
        let mut pwm = LastDuty::default();
        let mut channel = active_channel(&mut pwm);
        let config = EngineConfig::default();

        channel.start_pulse(PulseSequence::new(), At(0));
        assert_eq!(
            channel.advance(At(0), &config, &mut pwm),
            Some(Transition::PulseComplete)
        );
        assert_eq!(pwm.duty, Some(0));
        assert!(channel.status().unwrap().post_gap);
    }

    #[test]
    fn cursor_stops_at_sequence_length() {
        let mut pwm = LastDuty::default();
        let mut channel = active_channel(&mut pwm);
        let config = EngineConfig::default();

        let mut sequence = PulseSequence::new();
        sequence.push(PulseSymbol::on(Millis(10))).unwrap();
        sequence.push(PulseSymbol::off(Millis(10))).unwrap();
        channel.start_pulse(sequence, At(0));

        assert_eq!(
            channel.advance(At(0), &config, &mut pwm),
            Some(Transition::PulseStep { cursor: 1 })
        );
        assert_eq!(channel.status().unwrap().pulse_progress, Some((1, 2)));
        assert_eq!(
            channel.advance(At(10), &config, &mut pwm),
            Some(Transition::PulseComplete)
        );
        assert_eq!(channel.status().unwrap().pulse_progress, None);
        assert_eq!(channel.status().unwrap().mode, ModeKind::Idle);
    }

    #[test]
    fn blink_after_post_gap_clears_hold() {
        let mut pwm = LastDuty::default();
        let mut channel = active_channel(&mut pwm);
        let config = EngineConfig::default();

        channel.start_pulse(PulseSequence::new(), At(0));
        channel.advance(At(0), &config, &mut pwm);
        assert!(channel.status().unwrap().post_gap);

        channel.set_blink(true, &mut pwm);
        let status = channel.status().unwrap();
        assert!(!status.post_gap);
        assert_eq!(status.mode, ModeKind::Blink);
    }
}

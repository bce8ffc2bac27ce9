//! Multi-channel LED engine.
//!
//! [`LedChannelEngine`] owns a fixed set of channel slots, the [`PinArbiter`]
//! that hands out their pins, and the PWM hardware. Operations validate their
//! input completely before touching any state, so a rejected call leaves the
//! engine exactly as it was.
//!
//! Timed behaviour (blink toggles, pulse playback, the hold after a pattern)
//! only advances in [`LedChannelEngine::tick`], which the host normally reaches
//! through a [`Scheduler`] running the engine's [`ChannelTickTask`].

use crate::arbiter::{ClaimError, PinArbiter};
use crate::channel::{Channel, ChannelStatus, PwmOutput, Transition};
use crate::command::{ChannelAction, ChannelCommand};
use crate::config::EngineConfig;
use crate::pulse::{self, EncodeError, MAX_PULSE_SYMBOLS};
use crate::scheduler::{Scheduler, SchedulerError, Task, TaskControl, TaskHandle};
use crate::time::{TimeInstant, TimeSource, deadline};
use crate::types::{Brightness, ChannelId, PinId};

/// Default number of channel slots.
pub const DEFAULT_CHANNELS: usize = 4;

/// Default number of managed pins.
pub const DEFAULT_PINS: usize = 40;

/// Errors returned by engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// The channel ID exceeds the engine's channel count.
    ChannelOutOfRange {
        /// The requested channel.
        channel: ChannelId,
        /// Number of channel slots.
        capacity: usize,
    },

    /// The pin number exceeds the number of managed pins.
    PinOutOfRange {
        /// The requested pin.
        pin: PinId,
        /// Number of managed pins.
        capacity: usize,
    },

    /// The channel already owns a pin.
    AlreadyBound(ChannelId),

    /// The channel does not own a pin.
    NotBound(ChannelId),

    /// The pin is owned by another channel.
    PinUnavailable(PinId),

    /// The pulse text cannot be encoded.
    UnsupportedPattern(EncodeError),
}

impl core::fmt::Display for ControlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControlError::ChannelOutOfRange { channel, capacity } => {
                write!(f, "{} exceeds channel count of {}", channel, capacity)
            }
            ControlError::PinOutOfRange { pin, capacity } => {
                write!(f, "{} exceeds pin count of {}", pin, capacity)
            }
            ControlError::AlreadyBound(channel) => write!(f, "{} is already bound", channel),
            ControlError::NotBound(channel) => write!(f, "{} is not bound", channel),
            ControlError::PinUnavailable(pin) => write!(f, "{} is in use", pin),
            ControlError::UnsupportedPattern(err) => write!(f, "unsupported pattern: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ControlError {}

impl From<ClaimError> for ControlError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::OutOfRange { pin, capacity } => {
                ControlError::PinOutOfRange { pin, capacity }
            }
            ClaimError::AlreadyClaimed(pin) => ControlError::PinUnavailable(pin),
        }
    }
}

impl From<EncodeError> for ControlError {
    fn from(err: EncodeError) -> Self {
        ControlError::UnsupportedPattern(err)
    }
}

/// Drives up to `CHANNELS` LEDs on `PINS` PWM-capable pins.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `P` - PWM hardware implementation
/// * `T` - Time source implementation type
/// * `CHANNELS` - Number of channel slots
/// * `PINS` - Number of pins managed by the arbiter
pub struct LedChannelEngine<
    't,
    I: TimeInstant,
    P: PwmOutput,
    T: TimeSource<I>,
    const CHANNELS: usize = DEFAULT_CHANNELS,
    const PINS: usize = DEFAULT_PINS,
> {
    channels: [Channel<I, MAX_PULSE_SYMBOLS>; CHANNELS],
    arbiter: PinArbiter<PINS>,
    pwm: P,
    time_source: &'t T,
    config: EngineConfig<I::Duration>,
}

impl<'t, I, P, T, const CHANNELS: usize, const PINS: usize>
    LedChannelEngine<'t, I, P, T, CHANNELS, PINS>
where
    I: TimeInstant,
    P: PwmOutput,
    T: TimeSource<I>,
{
    /// Creates an engine with every channel unbound and the default timing.
    pub fn new(pwm: P, time_source: &'t T) -> Self {
        Self::with_config(pwm, time_source, EngineConfig::default())
    }

    /// Creates an engine with every channel unbound and custom timing.
    pub fn with_config(pwm: P, time_source: &'t T, config: EngineConfig<I::Duration>) -> Self {
        Self {
            channels: core::array::from_fn(|_| Channel::new()),
            arbiter: PinArbiter::new(),
            pwm,
            time_source,
            config,
        }
    }

    /// Registers and enables this engine's tick task, due immediately.
    ///
    /// # Errors
    /// Returns `RegistryFull` if the scheduler has no free slot.
    pub fn register_task<const MAX_TASKS: usize>(
        &self,
        scheduler: &mut Scheduler<I, Self, ChannelTickTask, MAX_TASKS>,
    ) -> Result<TaskHandle, SchedulerError> {
        let handle = scheduler.register(ChannelTickTask)?;
        scheduler.enable(handle, true);
        scheduler.set_next(handle, self.time_source.now());
        Ok(handle)
    }

    /// Binds `channel` to `pin`.
    ///
    /// The pin is attached to the PWM output at zero duty; the channel starts
    /// inactive in `Idle` mode at full brightness.
    ///
    /// # Errors
    /// * `ChannelOutOfRange` - `channel` is not below `CHANNELS`
    /// * `AlreadyBound` - the channel already owns a pin
    /// * `PinOutOfRange` / `PinUnavailable` - the pin cannot be claimed
    pub fn bind(&mut self, channel: ChannelId, pin: PinId) -> Result<(), ControlError> {
        let slot = self
            .channels
            .get_mut(channel.0)
            .ok_or(ControlError::ChannelOutOfRange {
                channel,
                capacity: CHANNELS,
            })?;

        if slot.is_bound() {
            return Err(ControlError::AlreadyBound(channel));
        }

        self.arbiter
            .claim(pin)
            .inspect_err(|err| warn!("bind {} to {} rejected: {}", channel.0, pin.0, err))?;

        slot.bind(pin, &mut self.pwm, self.config.pwm_frequency_hz);
        debug!("channel {} bound to pin {}", channel.0, pin.0);
        Ok(())
    }

    /// Releases `channel`'s pin and resets the channel.
    ///
    /// Does nothing if the channel is unbound or out of range.
    pub fn unbind(&mut self, channel: ChannelId) {
        let Some(slot) = self.channels.get_mut(channel.0) else {
            return;
        };

        if let Some(pin) = slot.unbind(&mut self.pwm) {
            self.arbiter.release(pin);
            debug!("channel {} released pin {}", channel.0, pin.0);
        }
    }

    /// Returns true if `channel` owns a pin.
    pub fn is_bound(&self, channel: ChannelId) -> bool {
        self.channels
            .get(channel.0)
            .is_some_and(|slot| slot.is_bound())
    }

    /// Turns a channel's output on or off.
    ///
    /// Turning off writes zero duty regardless of mode. Turning on writes the
    /// configured brightness and makes the channel due immediately, so blink
    /// and pulse timing restart cleanly.
    ///
    /// # Errors
    /// `ChannelOutOfRange` or `NotBound`.
    pub fn set_state(&mut self, channel: ChannelId, on: bool) -> Result<(), ControlError> {
        let now = self.time_source.now();
        let (slot, pwm) = self.bound_channel(channel)?;
        slot.set_active(on, now, pwm);
        Ok(())
    }

    /// Switches between `Idle` and `Blink`.
    ///
    /// Disabling blink on an active channel restores steady output.
    ///
    /// # Errors
    /// `ChannelOutOfRange` or `NotBound`.
    pub fn set_blink(&mut self, channel: ChannelId, enabled: bool) -> Result<(), ControlError> {
        let (slot, pwm) = self.bound_channel(channel)?;
        slot.set_blink(enabled, pwm);
        Ok(())
    }

    /// Sets brightness in percent, clamped to `0..=100`.
    ///
    /// Written to the pin right away only for an active `Idle` channel;
    /// blink and pulse pick it up on their next transition.
    ///
    /// # Errors
    /// `ChannelOutOfRange` or `NotBound`.
    pub fn set_brightness(&mut self, channel: ChannelId, percent: u8) -> Result<(), ControlError> {
        let (slot, pwm) = self.bound_channel(channel)?;
        slot.set_brightness(Brightness::from_percent(percent), pwm);
        Ok(())
    }

    /// Starts playing `text` as a Morse pulse pattern.
    ///
    /// The whole text is encoded before the channel is touched; on failure
    /// the channel keeps its previous mode and output.
    ///
    /// # Errors
    /// * `ChannelOutOfRange` or `NotBound`
    /// * `UnsupportedPattern` - `text` has a character outside `a`-`z`/space
    ///   or needs more than [`MAX_PULSE_SYMBOLS`] symbols
    pub fn start_pulse(&mut self, channel: ChannelId, text: &str) -> Result<(), ControlError> {
        let now = self.time_source.now();
        let timing = self.config.pulse_timing();
        let (slot, _) = self.bound_channel(channel)?;

        let sequence = pulse::encode_with_timing(text, &timing)
            .inspect_err(|err| warn!("pulse on channel {} rejected: {}", channel.0, err))?;

        debug!(
            "channel {}: pulse pattern of {} symbols",
            channel.0,
            sequence.len()
        );
        slot.start_pulse(sequence, now);
        Ok(())
    }

    /// Dispatches a command to the matching operation.
    ///
    /// # Errors
    /// Whatever the dispatched operation returns.
    pub fn handle_command(&mut self, command: ChannelCommand<'_>) -> Result<(), ControlError> {
        let channel = command.channel;
        match command.action {
            ChannelAction::Bind(pin) => self.bind(channel, pin),
            ChannelAction::Unbind => {
                self.unbind(channel);
                Ok(())
            }
            ChannelAction::SetState(on) => self.set_state(channel, on),
            ChannelAction::SetBlink(enabled) => self.set_blink(channel, enabled),
            ChannelAction::SetBrightness(percent) => self.set_brightness(channel, percent),
            ChannelAction::StartPulse(text) => self.start_pulse(channel, text),
        }
    }

    /// Advances every bound, active channel in index order.
    pub fn tick(&mut self, now: I) {
        for (index, slot) in self.channels.iter_mut().enumerate() {
            match slot.advance(now, &self.config, &mut self.pwm) {
                Some(Transition::BlinkToggled { level }) => {
                    trace!("channel {}: blink level {}", index, level);
                }
                Some(Transition::PulseStep { cursor }) => {
                    trace!("channel {}: pulse symbol {}", index, cursor);
                }
                Some(Transition::PulseComplete) => {
                    debug!("channel {}: pulse pattern complete", index);
                }
                Some(Transition::HoldExpired) => {
                    debug!("channel {}: post-pulse hold over", index);
                }
                None => {}
            }
        }
    }

    /// Returns a snapshot of a bound channel, or `None` if it is unbound or
    /// out of range.
    pub fn channel_status(&self, channel: ChannelId) -> Option<ChannelStatus> {
        self.channels.get(channel.0).and_then(Channel::status)
    }

    /// Returns the pin owned by `channel`.
    pub fn pin_of(&self, channel: ChannelId) -> Option<PinId> {
        self.channels.get(channel.0).and_then(Channel::pin)
    }

    /// Returns the number of bound channels.
    pub fn bound_count(&self) -> usize {
        self.channels.iter().filter(|slot| slot.is_bound()).count()
    }

    /// Returns the number of channel slots.
    pub const fn capacity(&self) -> usize {
        CHANNELS
    }

    /// Returns the pin arbiter.
    pub fn arbiter(&self) -> &PinArbiter<PINS> {
        &self.arbiter
    }

    /// Returns the PWM hardware.
    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Returns the PWM hardware mutably.
    pub fn pwm_mut(&mut self) -> &mut P {
        &mut self.pwm
    }

    /// Returns the timing configuration.
    pub fn config(&self) -> &EngineConfig<I::Duration> {
        &self.config
    }

    /// Returns the time source.
    pub fn time_source(&self) -> &'t T {
        self.time_source
    }

    fn bound_channel(
        &mut self,
        channel: ChannelId,
    ) -> Result<(&mut Channel<I, MAX_PULSE_SYMBOLS>, &mut P), ControlError> {
        let slot = self
            .channels
            .get_mut(channel.0)
            .ok_or(ControlError::ChannelOutOfRange {
                channel,
                capacity: CHANNELS,
            })?;

        if !slot.is_bound() {
            return Err(ControlError::NotBound(channel));
        }

        Ok((slot, &mut self.pwm))
    }
}

/// Scheduler task that ticks a [`LedChannelEngine`] and re-arms itself every
/// poll interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelTickTask;

impl<'t, I, P, T, const CHANNELS: usize, const PINS: usize>
    Task<I, LedChannelEngine<'t, I, P, T, CHANNELS, PINS>> for ChannelTickTask
where
    I: TimeInstant,
    P: PwmOutput,
    T: TimeSource<I>,
{
    fn run(
        &mut self,
        now: I,
        engine: &mut LedChannelEngine<'t, I, P, T, CHANNELS, PINS>,
        control: &mut TaskControl<'_, I>,
    ) {
        engine.tick(now);
        control.set_next(deadline(now, engine.config.poll_interval));
    }
}

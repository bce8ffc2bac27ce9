//! Top-level owning context.
//!
//! [`Controller`] is built once at startup and owns both the [`Scheduler`] and
//! the [`LedChannelEngine`]. The host loop calls [`Controller::poll`] (or
//! [`Controller::tick`] with its own timestamp) as often as it can; the command
//! layer reaches the channels through [`Controller::engine_mut`].

use crate::channel::PwmOutput;
use crate::config::EngineConfig;
use crate::engine::{ChannelTickTask, DEFAULT_CHANNELS, DEFAULT_PINS, LedChannelEngine};
use crate::scheduler::{Scheduler, SchedulerError, TaskHandle};
use crate::time::{TimeInstant, TimeSource};

/// Number of tasks the controller's scheduler holds: the engine's tick task.
pub const CONTROLLER_TASKS: usize = 1;

/// Scheduler type driving a controller's engine.
pub type EngineScheduler<'t, I, P, T, const CHANNELS: usize, const PINS: usize> = Scheduler<
    I,
    LedChannelEngine<'t, I, P, T, CHANNELS, PINS>,
    ChannelTickTask,
    CONTROLLER_TASKS,
>;

/// Owns the scheduler and the LED engine for the lifetime of the program.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `P` - PWM hardware implementation
/// * `T` - Time source implementation type
/// * `CHANNELS` - Number of channel slots
/// * `PINS` - Number of pins managed by the arbiter
pub struct Controller<
    't,
    I: TimeInstant,
    P: PwmOutput,
    T: TimeSource<I>,
    const CHANNELS: usize = DEFAULT_CHANNELS,
    const PINS: usize = DEFAULT_PINS,
> {
    scheduler: EngineScheduler<'t, I, P, T, CHANNELS, PINS>,
    engine: LedChannelEngine<'t, I, P, T, CHANNELS, PINS>,
    tick_task: TaskHandle,
}

impl<'t, I, P, T, const CHANNELS: usize, const PINS: usize> Controller<'t, I, P, T, CHANNELS, PINS>
where
    I: TimeInstant,
    P: PwmOutput,
    T: TimeSource<I>,
{
    /// Creates a controller with the default timing.
    ///
    /// # Errors
    /// Returns `RegistryFull` if the engine task cannot be registered.
    pub fn new(pwm: P, time_source: &'t T) -> Result<Self, SchedulerError> {
        Self::with_config(pwm, time_source, EngineConfig::default())
    }

    /// Creates a controller with custom timing.
    ///
    /// # Errors
    /// Returns `RegistryFull` if the engine task cannot be registered.
    pub fn with_config(
        pwm: P,
        time_source: &'t T,
        config: EngineConfig<I::Duration>,
    ) -> Result<Self, SchedulerError> {
        let engine = LedChannelEngine::with_config(pwm, time_source, config);
        let mut scheduler: EngineScheduler<'t, I, P, T, CHANNELS, PINS> = Scheduler::new();
        let tick_task = engine.register_task(&mut scheduler)?;

        Ok(Self {
            scheduler,
            engine,
            tick_task,
        })
    }

    /// Runs every due task at `now`.
    pub fn tick(&mut self, now: I) {
        self.scheduler.tick(now, &mut self.engine);
    }

    /// Runs every due task at the time source's current instant.
    pub fn poll(&mut self) {
        let now = self.engine.time_source().now();
        self.tick(now);
    }

    /// Returns how long the host may sleep before the next tick is useful.
    pub fn time_until_next(&self, now: I) -> Option<I::Duration> {
        self.scheduler.time_until_next(now)
    }

    /// Pauses or resumes all timed channel behaviour.
    ///
    /// While paused, explicit setters still write to the pins.
    pub fn set_ticking(&mut self, enabled: bool) {
        self.scheduler.enable(self.tick_task, enabled);
    }

    /// Returns the engine.
    pub fn engine(&self) -> &LedChannelEngine<'t, I, P, T, CHANNELS, PINS> {
        &self.engine
    }

    /// Returns the engine mutably.
    pub fn engine_mut(&mut self) -> &mut LedChannelEngine<'t, I, P, T, CHANNELS, PINS> {
        &mut self.engine
    }

    /// Returns the scheduler.
    pub fn scheduler(&self) -> &EngineScheduler<'t, I, P, T, CHANNELS, PINS> {
        &self.scheduler
    }

    /// Returns the handle of the engine's tick task.
    pub fn tick_task(&self) -> TaskHandle {
        self.tick_task
    }
}

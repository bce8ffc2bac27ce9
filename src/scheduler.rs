//! Cooperative polling scheduler.
//!
//! Provides [`Scheduler`], a fixed-capacity registry of [`Task`]s that are run
//! from a single host loop through [`Scheduler::tick`]. Nothing runs between
//! ticks: there are no timers, threads or interrupts involved.
//!
//! The scheduler never reschedules a task on its own. A task that does not
//! move its due time forward through [`TaskControl::set_next`] stays due and
//! runs again on every following tick.

use crate::time::{TimeDuration, TimeInstant};
use core::marker::PhantomData;
use heapless::Vec;

/// Default task registry capacity.
pub const DEFAULT_MAX_TASKS: usize = 8;

/// Stable handle to a registered task.
///
/// Handles are only meaningful for the scheduler that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle(usize);

impl TaskHandle {
    /// Returns the registry slot index behind this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors that can occur during scheduler operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// Every registry slot is taken.
    RegistryFull {
        /// Capacity of the registry.
        capacity: usize,
    },
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedulerError::RegistryFull { capacity } => {
                write!(f, "task registry is full ({} tasks)", capacity)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchedulerError {}

/// A unit of work driven by the scheduler.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `C` - Context handed to every task on each tick (e.g. the LED engine)
pub trait Task<I: TimeInstant, C: ?Sized> {
    /// Runs the task at `now`.
    ///
    /// `control` gives access to this task's own schedule. Call
    /// [`TaskControl::set_next`] to push the due time forward; otherwise the
    /// task runs again on the next tick.
    fn run(&mut self, now: I, context: &mut C, control: &mut TaskControl<'_, I>);
}

/// Enable flag and due time of one task.
#[derive(Debug, Clone, Copy)]
struct TaskTiming<I> {
    enabled: bool,
    /// `None` until first set, meaning due immediately.
    next_due: Option<I>,
}

impl<I: TimeInstant> TaskTiming<I> {
    fn is_due(&self, now: I) -> bool {
        self.enabled && self.next_due.is_none_or(|due| due <= now)
    }
}

/// Access to the running task's schedule, passed to [`Task::run`].
pub struct TaskControl<'a, I> {
    timing: &'a mut TaskTiming<I>,
}

impl<I: TimeInstant> TaskControl<'_, I> {
    /// Sets the next instant at which the task becomes due.
    pub fn set_next(&mut self, at: I) {
        self.timing.next_due = Some(at);
    }

    /// Enables or disables the running task.
    pub fn enable(&mut self, enabled: bool) {
        self.timing.enabled = enabled;
    }

    /// Returns the due time the task was run for, if one was set.
    pub fn next_due(&self) -> Option<I> {
        self.timing.next_due
    }
}

struct TaskSlot<I, T> {
    task: T,
    timing: TaskTiming<I>,
}

/// Fixed-capacity registry of tasks run by a cooperative polling loop.
///
/// Registration is append-only; a handle stays valid for the scheduler's
/// lifetime. Newly registered tasks start disabled and due immediately.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `C` - Context passed to each task when it runs
/// * `T` - Task implementation type
/// * `MAX_TASKS` - Maximum number of registered tasks
pub struct Scheduler<I, C: ?Sized, T, const MAX_TASKS: usize = DEFAULT_MAX_TASKS> {
    slots: Vec<TaskSlot<I, T>, MAX_TASKS>,
    _context: PhantomData<fn(&mut C)>,
}

impl<I, C, T, const MAX_TASKS: usize> Scheduler<I, C, T, MAX_TASKS>
where
    I: TimeInstant,
    C: ?Sized,
    T: Task<I, C>,
{
    /// Creates an empty scheduler.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            _context: PhantomData,
        }
    }

    /// Registers a task and returns its handle.
    ///
    /// The task starts disabled; call [`enable`](Self::enable) to let it run.
    ///
    /// # Errors
    /// Returns `RegistryFull` when all `MAX_TASKS` slots are taken.
    pub fn register(&mut self, task: T) -> Result<TaskHandle, SchedulerError> {
        let handle = TaskHandle(self.slots.len());
        self.slots
            .push(TaskSlot {
                task,
                timing: TaskTiming {
                    enabled: false,
                    next_due: None,
                },
            })
            .map_err(|_| SchedulerError::RegistryFull {
                capacity: MAX_TASKS,
            })?;

        debug!("scheduler: registered task {}", handle.0);
        Ok(handle)
    }

    /// Enables or disables a task. Unknown handles are ignored.
    pub fn enable(&mut self, handle: TaskHandle, enabled: bool) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            slot.timing.enabled = enabled;
        }
    }

    /// Sets when a task is next due. Unknown handles are ignored.
    pub fn set_next(&mut self, handle: TaskHandle, at: I) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            slot.timing.next_due = Some(at);
        }
    }

    /// Runs every enabled task whose due time is at or before `now`.
    ///
    /// Tasks run in registration order. Each task is checked once per tick,
    /// so a task that re-arms itself for an instant `<= now` still runs only
    /// once.
    pub fn tick(&mut self, now: I, context: &mut C) {
        for slot in self.slots.iter_mut() {
            if !slot.timing.is_due(now) {
                continue;
            }

            let TaskSlot { task, timing } = slot;
            task.run(now, context, &mut TaskControl { timing });
        }
    }

    /// Returns how long the host may wait before the next task becomes due.
    ///
    /// # Returns
    /// * `Some(Duration::ZERO)` - At least one enabled task is already due
    /// * `Some(duration)` - Time until the earliest enabled task is due
    /// * `None` - No task is enabled
    pub fn time_until_next(&self, now: I) -> Option<I::Duration> {
        let mut earliest: Option<I::Duration> = None;

        for slot in self.slots.iter().filter(|slot| slot.timing.enabled) {
            let wait = match slot.timing.next_due {
                Some(due) if due > now => due.duration_since(now),
                _ => return Some(I::Duration::ZERO),
            };

            earliest = match earliest {
                Some(current) if current.as_millis() <= wait.as_millis() => Some(current),
                _ => Some(wait),
            };
        }

        earliest
    }

    /// Returns whether a task is enabled, or `None` for an unknown handle.
    pub fn is_enabled(&self, handle: TaskHandle) -> Option<bool> {
        self.slots.get(handle.0).map(|slot| slot.timing.enabled)
    }

    /// Returns a task's due time. `None` for unknown handles or tasks that
    /// have never been scheduled.
    pub fn next_due(&self, handle: TaskHandle) -> Option<I> {
        self.slots.get(handle.0).and_then(|slot| slot.timing.next_due)
    }

    /// Returns a reference to a registered task.
    pub fn task(&self, handle: TaskHandle) -> Option<&T> {
        self.slots.get(handle.0).map(|slot| &slot.task)
    }

    /// Returns a mutable reference to a registered task.
    pub fn task_mut(&mut self, handle: TaskHandle) -> Option<&mut T> {
        self.slots.get_mut(handle.0).map(|slot| &mut slot.task)
    }

    /// Returns the number of registered tasks.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns true if no further task can be registered.
    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }
}

impl<I, C, T, const MAX_TASKS: usize> Default for Scheduler<I, C, T, MAX_TASKS>
where
    I: TimeInstant,
    C: ?Sized,
    T: Task<I, C>,
{
    fn default() -> Self {
        Self::new()
    }
}

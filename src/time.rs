//! Time abstraction traits for platform-agnostic timing.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;
}

/// Trait abstraction for monotonic instant types.
///
/// Instants must be totally ordered; the scheduler and channels compare them
/// against their due times.
pub trait TimeInstant: Copy + Ord {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;

    /// Adds duration to instant, returns None on overflow.
    fn checked_add(self, duration: Self::Duration) -> Option<Self>;
}

/// Returns `now + delay`, saturating at `now` if the instant type overflows.
#[inline]
pub(crate) fn deadline<I: TimeInstant>(now: I, delay: I::Duration) -> I {
    now.checked_add(delay).unwrap_or(now)
}

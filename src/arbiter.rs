//! Exclusive ownership tracking for physical output lines.

use crate::types::PinId;

/// Errors returned when a pin cannot be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClaimError {
    /// The pin number is outside `0..PINS`.
    OutOfRange {
        /// The requested pin.
        pin: PinId,
        /// Number of pins the arbiter manages.
        capacity: usize,
    },

    /// The pin is already owned.
    AlreadyClaimed(PinId),
}

impl core::fmt::Display for ClaimError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClaimError::OutOfRange { pin, capacity } => {
                write!(f, "{} is outside the {} managed pins", pin, capacity)
            }
            ClaimError::AlreadyClaimed(pin) => write!(f, "{} is already claimed", pin),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ClaimError {}

/// Tracks which of `PINS` output lines are currently owned.
///
/// The arbiter is the single source of truth for pin ownership. All operations
/// are O(1) and total: invalid input is either rejected (`claim`) or ignored
/// (`release`). Out-of-range pins are reported as claimed so they can never be
/// mistaken for free lines.
#[derive(Debug, Clone)]
pub struct PinArbiter<const PINS: usize> {
    claimed: [bool; PINS],
}

impl<const PINS: usize> PinArbiter<PINS> {
    /// Creates an arbiter with every pin free.
    pub const fn new() -> Self {
        Self {
            claimed: [false; PINS],
        }
    }

    /// Claims `pin` for exclusive use.
    ///
    /// # Errors
    /// * `OutOfRange` - `pin` is not below `PINS`
    /// * `AlreadyClaimed` - another owner holds the pin
    pub fn claim(&mut self, pin: PinId) -> Result<(), ClaimError> {
        let slot = self.claimed.get_mut(pin.0).ok_or(ClaimError::OutOfRange {
            pin,
            capacity: PINS,
        })?;

        if *slot {
            return Err(ClaimError::AlreadyClaimed(pin));
        }

        *slot = true;
        Ok(())
    }

    /// Marks `pin` as free. Releasing a free or out-of-range pin does nothing.
    pub fn release(&mut self, pin: PinId) {
        if let Some(slot) = self.claimed.get_mut(pin.0) {
            *slot = false;
        }
    }

    /// Returns true if `pin` is owned. Out-of-range pins report `true`.
    pub fn is_claimed(&self, pin: PinId) -> bool {
        self.claimed.get(pin.0).copied().unwrap_or(true)
    }

    /// Returns the number of pins currently owned.
    pub fn claimed_count(&self) -> usize {
        self.claimed.iter().filter(|&&claimed| claimed).count()
    }

    /// Returns the number of pins this arbiter manages.
    pub const fn capacity(&self) -> usize {
        PINS
    }
}

impl<const PINS: usize> Default for PinArbiter<PINS> {
    fn default() -> Self {
        Self::new()
    }
}

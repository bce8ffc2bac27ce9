//! Identifier and value types shared across the crate.

/// Identifier of a logical LED channel slot.
///
/// A thin wrapper around `usize` so channel indices cannot be confused with
/// pin numbers. Validity is checked by the engine on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub usize);

impl From<usize> for ChannelId {
    fn from(id: usize) -> Self {
        ChannelId(id)
    }
}

impl From<ChannelId> for usize {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

impl core::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "channel {}", self.0)
    }
}

/// Identifier of a physical output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(pub usize);

impl From<usize> for PinId {
    fn from(pin: usize) -> Self {
        PinId(pin)
    }
}

impl From<PinId> for usize {
    fn from(pin: PinId) -> Self {
        pin.0
    }
}

impl core::fmt::Display for PinId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "pin {}", self.0)
    }
}

/// Highest PWM duty value at the fixed 8-bit resolution.
pub const MAX_DUTY: u8 = u8::MAX;

/// Channel brightness in percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness(u8);

impl Brightness {
    /// Full brightness, the default for a freshly bound channel.
    pub const FULL: Self = Brightness(100);

    /// Zero brightness.
    pub const OFF: Self = Brightness(0);

    /// Creates a brightness from a percentage, clamping anything above 100.
    #[inline]
    pub const fn from_percent(percent: u8) -> Self {
        if percent > 100 {
            Brightness(100)
        } else {
            Brightness(percent)
        }
    }

    /// Returns the brightness in percent.
    #[inline]
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Maps the percentage linearly onto the PWM duty range `0..=255`.
    #[inline]
    pub const fn duty(self) -> u8 {
        // 100 * 255 fits comfortably in u16
        ((self.0 as u16 * MAX_DUTY as u16) / 100) as u8
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Brightness::FULL
    }
}

impl From<u8> for Brightness {
    fn from(percent: u8) -> Self {
        Brightness::from_percent(percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_endpoints() {
        assert_eq!(Brightness::OFF.duty(), 0);
        assert_eq!(Brightness::FULL.duty(), 255);
        assert_eq!(Brightness::from_percent(50).duty(), 127);
    }

    #[test]
    fn percent_above_range_is_clamped() {
        assert_eq!(Brightness::from_percent(101).percent(), 100);
        assert_eq!(Brightness::from_percent(u8::MAX).duty(), 255);
    }

    #[test]
    fn duty_is_monotonic_in_percent() {
        let mut previous = 0;
        for percent in 0..=u8::MAX {
            let duty = Brightness::from_percent(percent).duty();
            assert!(duty >= previous);
            previous = duty;
        }
    }
}

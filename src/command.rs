//! Command-based control for the LED engine.

use crate::types::{ChannelId, PinId};

/// Actions for controlling a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelAction<'a> {
    /// Bind to a pin.
    Bind(PinId),
    /// Release the pin.
    Unbind,
    /// Turn output on or off.
    SetState(bool),
    /// Enable or disable blinking.
    SetBlink(bool),
    /// Set brightness in percent.
    SetBrightness(u8),
    /// Play text as a Morse pulse pattern.
    StartPulse(&'a str),
}

/// Command targeting a specific channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCommand<'a> {
    pub channel: ChannelId,
    pub action: ChannelAction<'a>,
}

impl<'a> ChannelCommand<'a> {
    /// Creates command.
    pub fn new(channel: impl Into<ChannelId>, action: ChannelAction<'a>) -> Self {
        Self {
            channel: channel.into(),
            action,
        }
    }
}

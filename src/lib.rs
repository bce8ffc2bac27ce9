#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PinArbiter`**: Tracks exclusive ownership of physical output pins
//! - **`Scheduler`**: Fixed registry of `Task`s run from a cooperative polling loop
//! - **`Task`**: Trait for work driven by the scheduler; tasks re-arm themselves
//! - **`encode`**: Turns lowercase text into a Morse `PulseSequence`
//! - **`LedChannelEngine`**: Binds channels to pins and drives steady, blink and pulse modes
//! - **`ChannelTickTask`**: The engine's scheduler task
//! - **`Controller`**: Owning context that bundles the scheduler and the engine
//! - **`PwmOutput`**: Trait to implement for your PWM hardware
//! - **`TimeSource`**: Trait to implement for your timing system
//! - **`ChannelAction`**: Commands that can be sent to control channels
//!
//! Brightness is given in percent (`0..=100`) and mapped linearly onto an
//! 8-bit PWM duty (`0..=255`) before it reaches [`PwmOutput::write`].

#[macro_use]
mod fmt;

pub mod time;
pub mod types;
pub mod arbiter;
pub mod scheduler;
pub mod pulse;
pub mod config;
pub mod channel;
pub mod engine;
pub mod command;
pub mod controller;

pub use arbiter::{ClaimError, PinArbiter};
pub use channel::{ChannelStatus, ModeKind, PwmOutput};
pub use command::{ChannelAction, ChannelCommand};
pub use config::{EngineConfig, PWM_RESOLUTION_BITS};
pub use controller::Controller;
pub use engine::{ChannelTickTask, ControlError, LedChannelEngine};
pub use pulse::{EncodeError, PulseSequence, PulseSymbol, PulseTiming, encode, encode_with_unit};
pub use scheduler::{Scheduler, SchedulerError, Task, TaskControl, TaskHandle};
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use types::{Brightness, ChannelId, PinId};

//! Shared test infrastructure for led-channel-engine integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use led_channel_engine::{PinId, PwmOutput, TimeDuration, TimeInstant, TimeSource};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }

    fn checked_add(self, duration: Self::Duration) -> Option<Self> {
        self.0.checked_add(duration.0).map(TestInstant)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: core::cell::Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: core::cell::Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }

    pub fn set_time(&self, time: TestInstant) {
        self.current_time.set(time);
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock PWM
// ============================================================================

/// One call made on the PWM hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmEvent {
    Attach {
        pin: PinId,
        frequency_hz: u32,
        resolution_bits: u8,
    },
    Detach(PinId),
    Write {
        pin: PinId,
        duty: u8,
    },
}

/// Mock PWM that records every call
pub struct MockPwm {
    events: Vec<PwmEvent>,
}

impl MockPwm {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[PwmEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Duty values written to `pin`, in order
    pub fn writes_to(&self, pin: PinId) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                PwmEvent::Write { pin: p, duty } if p == pin => Some(duty),
                _ => None,
            })
            .collect()
    }

    /// Last duty written to `pin`, if any
    pub fn last_duty(&self, pin: PinId) -> Option<u8> {
        self.writes_to(pin).last().copied()
    }

    pub fn is_attached(&self, pin: PinId) -> bool {
        let mut attached = false;
        for event in &self.events {
            match *event {
                PwmEvent::Attach { pin: p, .. } if p == pin => attached = true,
                PwmEvent::Detach(p) if p == pin => attached = false,
                _ => {}
            }
        }
        attached
    }
}

impl PwmOutput for MockPwm {
    fn attach(&mut self, pin: PinId, frequency_hz: u32, resolution_bits: u8) {
        self.events.push(PwmEvent::Attach {
            pin,
            frequency_hz,
            resolution_bits,
        });
    }

    fn detach(&mut self, pin: PinId) {
        self.events.push(PwmEvent::Detach(pin));
    }

    fn write(&mut self, pin: PinId, duty: u8) {
        self.events.push(PwmEvent::Write { pin, duty });
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Engine type used throughout the integration tests: 4 channels, 8 pins
pub type TestEngine<'t> =
    led_channel_engine::LedChannelEngine<'t, TestInstant, MockPwm, MockTimeSource, 4, 8>;

/// Controller type used throughout the integration tests: 4 channels, 8 pins
pub type TestController<'t> =
    led_channel_engine::Controller<'t, TestInstant, MockPwm, MockTimeSource, 4, 8>;

/// Ticks the engine every `step` ms from the current time up to and including
/// `until`, advancing the time source along the way.
pub fn run_engine_until(engine: &mut TestEngine<'_>, timer: &MockTimeSource, until: u64, step: u64) {
    while timer.now().0 <= until {
        engine.tick(timer.now());
        timer.advance(step);
    }
}

/// Polls the controller every `step` ms up to and including `until`.
pub fn run_controller_until(
    controller: &mut TestController<'_>,
    timer: &MockTimeSource,
    until: u64,
    step: u64,
) {
    while timer.now().0 <= until {
        controller.poll();
        timer.advance(step);
    }
}

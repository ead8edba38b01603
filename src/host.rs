//! Collaborator interfaces the windows drive
//!
//! Windows never own the navigation stack, transport, persistent store,
//! vibration motor or timer wheel. Every handler receives a `Host` that
//! bundles them, which keeps the controllers testable against a mock.

use std::time::Duration;

use crate::comm::RequestGateway;
use crate::feedback::Pulse;
use crate::windows::WindowKind;

/// Identifies one spinner session within a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u32);

/// Handle returned by `Timers::schedule`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// What a one-shot timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Begin animating the spinner for a click
    SpinnerStart { session: SessionId },
    /// Select held long enough to swap pages
    HoldComplete { generation: u32 },
}

/// One-shot timer wheel
pub trait Timers {
    fn schedule(&mut self, after: Duration, event: TimerEvent) -> TimerHandle;
    /// Cancelling a fired or unknown handle does nothing
    fn cancel(&mut self, handle: TimerHandle);
}

/// Window stack owned by the host framework
pub trait Navigator {
    fn push(&mut self, window: WindowKind);
    /// Remove `window` from the stack; no-op if absent
    fn pop(&mut self, window: WindowKind);
    fn pop_all(&mut self);
    fn is_topmost(&self, window: WindowKind) -> bool;
}

/// Vibration motor and backlight
pub trait Haptics {
    fn pulse(&mut self, pulse: Pulse);
    fn backlight(&mut self);
}

/// Persisted "last pressed button" marker
pub trait ResumeStore {
    fn load_last_button(&self) -> Option<u8>;
    fn save_last_button(&mut self, button: u8);
    fn clear_last_button(&mut self);
}

/// Everything a window handler may touch outside itself
pub trait Host: Navigator + RequestGateway + Haptics + ResumeStore + Timers {}

impl<T> Host for T where T: Navigator + RequestGateway + Haptics + ResumeStore + Timers {}

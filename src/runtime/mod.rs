//! Desktop implementations of the host collaborators

mod persist;
mod stack;
mod timers;

pub use persist::{AnyResumeStore, FileResumeStore, MemoryResumeStore};
pub use stack::WindowStack;
pub use timers::TimerQueue;

use std::time::Duration;
use tracing::debug;

use crate::comm::{ActionRequest, RequestGateway};
use crate::feedback::Pulse;
use crate::host::{Haptics, Navigator, ResumeStore, TimerEvent, TimerHandle, Timers};
use crate::windows::WindowKind;

/// No motor on a desktop; pulses go to the log
#[derive(Debug, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn pulse(&mut self, pulse: Pulse) {
        debug!("Vibe: {:?}", pulse);
    }

    fn backlight(&mut self) {
        debug!("Backlight on");
    }
}

/// The host handed to window controllers by the event loop
pub struct DeckHost<G> {
    pub stack: WindowStack,
    pub timers: TimerQueue,
    pub gateway: G,
    pub store: AnyResumeStore,
    pub haptics: LogHaptics,
}

impl<G: RequestGateway> DeckHost<G> {
    pub fn new(gateway: G, store: AnyResumeStore) -> Self {
        Self {
            stack: WindowStack::new(),
            timers: TimerQueue::new(),
            gateway,
            store,
            haptics: LogHaptics,
        }
    }
}

impl<G> Navigator for DeckHost<G> {
    fn push(&mut self, window: WindowKind) {
        self.stack.push(window);
    }

    fn pop(&mut self, window: WindowKind) {
        self.stack.pop(window);
    }

    fn pop_all(&mut self) {
        self.stack.pop_all();
    }

    fn is_topmost(&self, window: WindowKind) -> bool {
        self.stack.is_topmost(window)
    }
}

impl<G: RequestGateway> RequestGateway for DeckHost<G> {
    fn request_action(&mut self, request: ActionRequest) {
        self.gateway.request_action(request);
    }

    fn request_icon(&mut self, key: &str, index: u8) {
        self.gateway.request_icon(key, index);
    }

    fn request_tile_set(&mut self) {
        self.gateway.request_tile_set();
    }
}

impl<G> Haptics for DeckHost<G> {
    fn pulse(&mut self, pulse: Pulse) {
        self.haptics.pulse(pulse);
    }

    fn backlight(&mut self) {
        self.haptics.backlight();
    }
}

impl<G> ResumeStore for DeckHost<G> {
    fn load_last_button(&self) -> Option<u8> {
        self.store.load_last_button()
    }

    fn save_last_button(&mut self, button: u8) {
        self.store.save_last_button(button);
    }

    fn clear_last_button(&mut self) {
        self.store.clear_last_button();
    }
}

impl<G> Timers for DeckHost<G> {
    fn schedule(&mut self, after: Duration, event: TimerEvent) -> TimerHandle {
        self.timers.schedule(after, event)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }
}

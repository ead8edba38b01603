//! One-shot timer queue driven by the event loop

use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::host::{TimerEvent, TimerHandle, Timers};

#[derive(Default)]
pub struct TimerQueue {
    next_handle: u64,
    pending: BTreeMap<TimerHandle, (Instant, TimerEvent)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, deadline: Instant, event: TimerEvent) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.insert(handle, (deadline, event));
        handle
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn due(&mut self, now: Instant) -> Vec<TimerEvent> {
        let mut fired: Vec<_> = self
            .pending
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .map(|(handle, (deadline, event))| (*deadline, *handle, *event))
            .collect();
        fired.sort_by_key(|(deadline, handle, _)| (*deadline, *handle));

        for (_, handle, _) in &fired {
            self.pending.remove(handle);
        }
        fired.into_iter().map(|(_, _, event)| event).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(deadline, _)| *deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Timers for TimerQueue {
    fn schedule(&mut self, after: Duration, event: TimerEvent) -> TimerHandle {
        self.schedule_at(Instant::now() + after, event)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if self.pending.remove(&handle).is_none() {
            debug!("Timer {:?} already fired or cancelled", handle);
        }
    }
}

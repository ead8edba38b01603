use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{ButtonId, InputEvent};

/// Buttons that report long presses (fire when the threshold is reached, not on release)
const LONG_PRESS_BUTTONS: &[ButtonId] = &[ButtonId::Select];

/// Buttons whose clicks are counted together
const MULTI_CLICK_BUTTONS: &[ButtonId] = &[ButtonId::Back];

/// Highest click count reported; reaching it fires without waiting for the timeout
const MAX_CLICKS: u8 = 2;

/// Raw edges from the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    Down(ButtonId),
    Up(ButtonId),
    Motion,
}

/// Turns button down/up edges into clicks, long presses and multi-clicks
pub struct ClickRecognizer {
    long_press: Duration,
    multi_click_timeout: Duration,
    press_times: HashMap<ButtonId, Instant>,
    long_press_fired: HashSet<ButtonId>,
    pending_clicks: HashMap<ButtonId, (u8, Instant)>,
}

impl ClickRecognizer {
    pub fn new(long_press: Duration, multi_click_timeout: Duration) -> Self {
        Self {
            long_press,
            multi_click_timeout,
            press_times: HashMap::new(),
            long_press_fired: HashSet::new(),
            pending_clicks: HashMap::new(),
        }
    }

    /// Feed one raw edge and return the events it completes
    pub fn handle(&mut self, input: RawInput, now: Instant) -> Vec<InputEvent> {
        match input {
            RawInput::Down(button) => {
                self.press_times.insert(button, now);
                Vec::new()
            }
            RawInput::Up(button) => self.handle_up(button, now),
            RawInput::Motion => vec![InputEvent::Tap],
        }
    }

    fn handle_up(&mut self, button: ButtonId, now: Instant) -> Vec<InputEvent> {
        let pressed_at = self.press_times.remove(&button);

        if self.long_press_fired.remove(&button) {
            debug!("{} released (long press already fired)", button.name());
            return vec![InputEvent::LongPressRelease(button)];
        }

        let Some(pressed_at) = pressed_at else {
            // Release without a matching press (e.g. window opened mid-press)
            return Vec::new();
        };

        // Held past the threshold but never polled in between
        if LONG_PRESS_BUTTONS.contains(&button)
            && now.duration_since(pressed_at) >= self.long_press
        {
            debug!("{} released after a long press nobody polled", button.name());
            return vec![
                InputEvent::LongPressStart(button),
                InputEvent::LongPressRelease(button),
            ];
        }

        if MULTI_CLICK_BUTTONS.contains(&button) {
            let count = self
                .pending_clicks
                .get(&button)
                .map(|(count, _)| count + 1)
                .unwrap_or(1);
            if count >= MAX_CLICKS {
                self.pending_clicks.remove(&button);
                return vec![InputEvent::MultiClick { button, count }];
            }
            self.pending_clicks.insert(button, (count, now));
            return Vec::new();
        }

        vec![InputEvent::Click(button)]
    }

    /// Fire long presses that crossed the threshold and multi-clicks whose window closed.
    /// Call this periodically from the main loop
    pub fn poll(&mut self, now: Instant) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for &button in LONG_PRESS_BUTTONS {
            if self.long_press_fired.contains(&button) {
                continue;
            }
            if let Some(pressed_at) = self.press_times.get(&button) {
                if now.duration_since(*pressed_at) >= self.long_press {
                    self.long_press_fired.insert(button);
                    events.push(InputEvent::LongPressStart(button));
                }
            }
        }

        let timeout = self.multi_click_timeout;
        let expired: Vec<ButtonId> = self
            .pending_clicks
            .iter()
            .filter(|(_, (_, last))| now.duration_since(*last) >= timeout)
            .map(|(button, _)| *button)
            .collect();
        for button in expired {
            if let Some((count, _)) = self.pending_clicks.remove(&button) {
                events.push(InputEvent::MultiClick { button, count });
            }
        }

        events
    }

    /// Earliest instant at which `poll` can produce an event
    pub fn next_deadline(&self) -> Option<Instant> {
        let long_press = LONG_PRESS_BUTTONS
            .iter()
            .filter(|b| !self.long_press_fired.contains(b))
            .filter_map(|b| self.press_times.get(b))
            .map(|t| *t + self.long_press);
        let clicks = self
            .pending_clicks
            .values()
            .map(|(_, last)| *last + self.multi_click_timeout);
        long_press.chain(clicks).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> ClickRecognizer {
        ClickRecognizer::new(Duration::from_millis(250), Duration::from_millis(150))
    }

    #[test]
    fn test_short_press_is_click() {
        let mut r = recognizer();
        let t0 = Instant::now();
        assert!(r.handle(RawInput::Down(ButtonId::Up), t0).is_empty());
        let events = r.handle(RawInput::Up(ButtonId::Up), t0 + Duration::from_millis(40));
        assert_eq!(events, vec![InputEvent::Click(ButtonId::Up)]);
    }

    #[test]
    fn test_select_hold_fires_long_press_then_release() {
        let mut r = recognizer();
        let t0 = Instant::now();
        r.handle(RawInput::Down(ButtonId::Select), t0);

        assert!(r.poll(t0 + Duration::from_millis(100)).is_empty());
        assert_eq!(
            r.next_deadline(),
            Some(t0 + Duration::from_millis(250))
        );
        assert_eq!(
            r.poll(t0 + Duration::from_millis(260)),
            vec![InputEvent::LongPressStart(ButtonId::Select)]
        );
        // Fires once per press
        assert!(r.poll(t0 + Duration::from_millis(400)).is_empty());

        let events = r.handle(RawInput::Up(ButtonId::Select), t0 + Duration::from_millis(500));
        assert_eq!(events, vec![InputEvent::LongPressRelease(ButtonId::Select)]);
    }

    #[test]
    fn test_unpolled_select_hold_is_not_a_click() {
        let mut r = recognizer();
        let t0 = Instant::now();
        r.handle(RawInput::Down(ButtonId::Select), t0);
        let events = r.handle(RawInput::Up(ButtonId::Select), t0 + Duration::from_secs(1));
        assert_eq!(
            events,
            vec![
                InputEvent::LongPressStart(ButtonId::Select),
                InputEvent::LongPressRelease(ButtonId::Select),
            ]
        );
        assert!(r.next_deadline().is_none());
    }

    #[test]
    fn test_single_back_click_fires_after_timeout() {
        let mut r = recognizer();
        let t0 = Instant::now();
        r.handle(RawInput::Down(ButtonId::Back), t0);
        assert!(r.handle(RawInput::Up(ButtonId::Back), t0).is_empty());
        assert!(r.poll(t0 + Duration::from_millis(100)).is_empty());
        assert_eq!(
            r.poll(t0 + Duration::from_millis(150)),
            vec![InputEvent::MultiClick {
                button: ButtonId::Back,
                count: 1
            }]
        );
    }

    #[test]
    fn test_double_back_click_fires_immediately() {
        let mut r = recognizer();
        let t0 = Instant::now();
        r.handle(RawInput::Down(ButtonId::Back), t0);
        r.handle(RawInput::Up(ButtonId::Back), t0);
        r.handle(RawInput::Down(ButtonId::Back), t0 + Duration::from_millis(60));
        let events = r.handle(RawInput::Up(ButtonId::Back), t0 + Duration::from_millis(80));
        assert_eq!(
            events,
            vec![InputEvent::MultiClick {
                button: ButtonId::Back,
                count: 2
            }]
        );
        assert!(r.next_deadline().is_none());
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut r = recognizer();
        assert!(r.handle(RawInput::Up(ButtonId::Down), Instant::now()).is_empty());
    }

    #[test]
    fn test_motion_is_tap() {
        let mut r = recognizer();
        assert_eq!(r.handle(RawInput::Motion, Instant::now()), vec![InputEvent::Tap]);
    }
}

//! Action window: three buttons fire remote requests with spinner feedback
//!
//! Holding select swaps to the tile's secondary set. Per opening:
//!
//!   Closed ──open──▶ Open { toggle, spinner: None | Some(target), holding }
//!     ▲                 │
//!     └─────close───────┘
//!
//! A new click always replaces the running spinner (last click wins).

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::animation::{SpinnerAnimator, SpinnerFrames, SpinnerTick};
use crate::comm::{ActionReply, ActionRequest, Outcome, RequestToken};
use crate::config::TimingConfig;
use crate::feedback::{ColorAction, ColorScheme, Pulse};
use crate::host::{Host, SessionId, TimerEvent, TimerHandle};
use crate::input::{ButtonId, InputEvent, ACTION_BUTTONS};
use crate::render::overflow_glyph;
use crate::slots::{slot_icon_key, slot_index, slot_text, ToggleState};
use crate::tiles::{BorrowedTile, IconImage};
use crate::view::{SlotIcon, WindowView};

use super::WindowKind;

const SELECT_ROW: usize = 1;

/// Delays used by the action window
#[derive(Debug, Clone, Copy)]
pub struct ActionTiming {
    /// Click → spinner start
    pub spinner_delay: Duration,
    /// Overflow glyph → page swap
    pub hold_swap: Duration,
}

impl From<&TimingConfig> for ActionTiming {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            spinner_delay: timing.spinner_delay(),
            hold_swap: timing.hold_swap(),
        }
    }
}

/// The in-flight feedback for one click
struct SpinnerSession {
    id: SessionId,
    target: ButtonId,
    /// Pending start timer; `None` once the animation is running
    timer: Option<TimerHandle>,
}

/// Everything that exists only while the window is open
struct OpenWindow {
    tile: BorrowedTile,
    index: u8,
    generation: u32,
    toggle: ToggleState,
    view: WindowView,
    overflow: IconImage,
    animator: SpinnerAnimator,
    spinner: Option<SpinnerSession>,
    hold_timer: Option<TimerHandle>,
    /// Select is held and the overflow glyph is showing
    holding: bool,
    requests_sent: u32,
    last_request: Option<RequestToken>,
}

pub struct ActionWindowController {
    frames: Arc<SpinnerFrames>,
    timing: ActionTiming,
    color_display: bool,
    generation: u32,
    next_session: u32,
    window: Option<OpenWindow>,
}

impl ActionWindowController {
    pub fn new(frames: Arc<SpinnerFrames>, timing: ActionTiming, color_display: bool) -> Self {
        Self {
            frames,
            timing,
            color_display,
            generation: 0,
            next_session: 0,
            window: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }

    pub fn view(&self) -> Option<&WindowView> {
        self.window.as_ref().map(|w| &w.view)
    }

    pub fn view_mut(&mut self) -> Option<&mut WindowView> {
        self.window.as_mut().map(|w| &mut w.view)
    }

    pub fn toggle(&self) -> Option<ToggleState> {
        self.window.as_ref().map(|w| w.toggle)
    }

    /// Button the current spinner session targets
    pub fn spinner_target(&self) -> Option<ButtonId> {
        self.window.as_ref()?.spinner.as_ref().map(|s| s.target)
    }

    pub fn is_animating(&self) -> bool {
        self.window
            .as_ref()
            .is_some_and(|w| w.animator.is_active())
    }

    pub fn overflow_icon(&self) -> Option<&IconImage> {
        self.window.as_ref().map(|w| &w.overflow)
    }

    pub fn spinner_frame(&self, frame: usize) -> Option<&Arc<image::RgbaImage>> {
        self.window.as_ref()?.animator.frame_image(frame)
    }

    /// When the next spinner frame is due
    pub fn animation_deadline(&self) -> Option<Instant> {
        self.window.as_ref()?.animator.next_deadline()
    }

    /// Open the window on a tile. Returns false if it is already open.
    pub fn open<H: Host>(&mut self, host: &mut H, tile: BorrowedTile, index: u8) -> bool {
        if self.window.is_some() {
            debug!("Action window already open, ignoring open for index {}", index);
            return false;
        }

        self.generation = self.generation.wrapping_add(1);
        info!("Opening action window for tile {} (index {})", tile.id, index);

        let colors = ColorScheme::for_toggle(&tile, ToggleState::Primary);
        let mut window = OpenWindow {
            tile,
            index,
            generation: self.generation,
            toggle: ToggleState::Primary,
            view: WindowView::new(colors),
            overflow: Arc::new(overflow_glyph()),
            animator: SpinnerAnimator::new(Arc::clone(&self.frames)),
            spinner: None,
            hold_timer: None,
            holding: false,
            requests_sent: 0,
            last_request: None,
        };
        window.reset_elements(true);
        self.window = Some(window);

        host.push(WindowKind::Action);
        true
    }

    /// Tear the window down. Safe to call when closed.
    pub fn close<H: Host>(&mut self, host: &mut H) {
        let Some(mut window) = self.window.take() else {
            return;
        };

        if let Some(session) = window.spinner.take() {
            if let Some(timer) = session.timer {
                host.cancel(timer);
            }
        }
        window.animator.stop();
        if let Some(timer) = window.hold_timer.take() {
            host.cancel(timer);
        }
        host.clear_last_button();
        host.pop(WindowKind::Action);

        info!("Closed action window for tile {}", window.tile.id);
    }

    /// Redraw the three icons after the icon catalog changed.
    /// Skipped unless this window is on top of the stack.
    pub fn refresh_icons<H: Host>(&mut self, host: &mut H) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        if !host.is_topmost(WindowKind::Action) {
            debug!("Action window not on top, deferring icon refresh");
            return;
        }
        for button in ACTION_BUTTONS {
            window.set_tile_icon(button);
        }
    }

    /// Route a recognized input event
    pub fn on_input<H: Host>(&mut self, host: &mut H, event: InputEvent) {
        match event {
            InputEvent::Click(ButtonId::Back) => self.on_back(host, 1),
            InputEvent::Click(button) => self.on_short_click(host, button),
            InputEvent::LongPressStart(button) => self.on_long_press_start(host, button),
            InputEvent::LongPressRelease(button) => self.on_long_press_release(host, button),
            InputEvent::MultiClick {
                button: ButtonId::Back,
                count,
            } => self.on_back(host, count),
            InputEvent::MultiClick { .. } | InputEvent::Tap => {}
        }
    }

    pub fn on_short_click<H: Host>(&mut self, host: &mut H, button: ButtonId) {
        let session = self.alloc_session();
        let color_display = self.color_display;
        let spinner_delay = self.timing.spinner_delay;
        let Some(window) = self.window.as_mut() else {
            return;
        };

        let slot = slot_index(button, window.toggle);
        if slot_text(&window.tile, button, window.toggle).is_empty() {
            debug!("Slot {} is empty, resetting", slot);
            window.set_color(host, ColorAction::ResetOnly, color_display);
            return;
        }

        window.begin_spinner(host, session, button, spinner_delay);
        window.set_color(host, ColorAction::VibrateInit, color_display);
        window.view.inset(Some(button));
        host.save_last_button(button.code());

        window.requests_sent = window.requests_sent.wrapping_add(1);
        let token = RequestToken {
            generation: window.generation,
            sequence: window.requests_sent,
        };
        window.last_request = Some(token);

        info!(
            "{} clicked: requesting tile {} slot {}",
            button.name(),
            window.tile.id,
            slot
        );
        host.request_action(ActionRequest {
            window: WindowKind::Action,
            window_index: window.index,
            tile_id: window.tile.id,
            slot,
            token: Some(token),
        });
    }

    /// Apply a request's outcome to whatever is on screen now
    pub fn on_request_outcome<H: Host>(&mut self, host: &mut H, outcome: Outcome) {
        let color_display = self.color_display;
        let Some(window) = self.window.as_mut() else {
            debug!("Action window closed, dropping {:?} outcome", outcome);
            return;
        };
        info!("Request outcome: {:?}", outcome);
        window.set_color(host, outcome.into(), color_display);
    }

    /// Apply a reply, dropping it if it belongs to an earlier click or opening
    pub fn on_action_reply<H: Host>(&mut self, host: &mut H, reply: ActionReply) {
        let Some(window) = self.window.as_ref() else {
            debug!("Action window closed, dropping reply");
            return;
        };
        if let Some(token) = reply.token {
            if window.last_request != Some(token) {
                debug!("Dropping stale reply {:?}", token);
                return;
            }
        }
        self.on_request_outcome(host, reply.outcome);
    }

    pub fn on_long_press_start<H: Host>(&mut self, host: &mut H, button: ButtonId) {
        if button != ButtonId::Select {
            return;
        }
        let hold_swap = self.timing.hold_swap;
        let Some(window) = self.window.as_mut() else {
            return;
        };

        window.holding = true;
        window.view.set_icon(SELECT_ROW, SlotIcon::Overflow);
        if let Some(timer) = window.hold_timer.take() {
            host.cancel(timer);
        }
        window.hold_timer = Some(host.schedule(
            hold_swap,
            TimerEvent::HoldComplete {
                generation: window.generation,
            },
        ));
    }

    /// Select released after a long press: restore its icon.
    /// A swap still pending is abandoned (press was too short).
    pub fn on_long_press_release<H: Host>(&mut self, host: &mut H, button: ButtonId) {
        if button != ButtonId::Select {
            return;
        }
        let Some(window) = self.window.as_mut() else {
            return;
        };

        window.holding = false;
        if let Some(timer) = window.hold_timer.take() {
            host.cancel(timer);
            debug!("Select released before swap");
        }
        window.set_tile_icon(ButtonId::Select);
    }

    /// Swap between the primary and secondary sets
    pub fn on_hold_complete<H: Host>(&mut self, host: &mut H) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        window.hold_timer = None;
        window.cancel_spinner(host);
        host.clear_last_button();
        host.pulse(Pulse::Short);

        window.toggle = window.toggle.flipped();
        window.reset_elements(false);
        info!("Swapped to {:?} set", window.toggle);
    }

    pub fn on_back<H: Host>(&mut self, host: &mut H, clicks: u8) {
        if clicks > 1 {
            info!("Double back: leaving app");
            host.pop_all();
        } else {
            host.pop(WindowKind::Action);
        }
    }

    /// Handle a fired timer
    pub fn on_timer<H: Host>(&mut self, host: &mut H, event: TimerEvent, now: Instant) {
        match event {
            TimerEvent::SpinnerStart { session } => {
                if let Some(window) = self.window.as_mut() {
                    window.start_spinner(session, now);
                }
            }
            TimerEvent::HoldComplete { generation } => {
                let current = self
                    .window
                    .as_ref()
                    .is_some_and(|w| w.generation == generation && w.hold_timer.is_some());
                if current {
                    self.on_hold_complete(host);
                } else {
                    debug!("Stale hold timer");
                }
            }
        }
    }

    /// Deliver any spinner frame that is due
    pub fn poll_animation(&mut self, now: Instant) {
        let tick = match self.window.as_mut() {
            Some(window) => window.animator.tick(now),
            None => None,
        };
        if let Some(tick) = tick {
            self.on_animation_frame(tick);
        }
    }

    /// Show a spinner frame if it belongs to the live session
    pub fn on_animation_frame(&mut self, tick: SpinnerTick) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        let live = window
            .spinner
            .as_ref()
            .is_some_and(|s| s.id == tick.session && s.timer.is_none());
        if !live || window.animator.session() != Some(tick.session) {
            debug!("Dropping frame from stale spinner session");
            return;
        }
        match tick.target.row() {
            // Overflow glyph stays up while select is held
            Some(SELECT_ROW) if window.holding => {}
            Some(row) => window.view.set_icon(row, SlotIcon::Spinner(tick.frame)),
            None => {}
        }
    }

    fn alloc_session(&mut self) -> SessionId {
        self.next_session = self.next_session.wrapping_add(1);
        SessionId(self.next_session)
    }
}

impl OpenWindow {
    /// Rewrite labels, icons, colors and insets for the current toggle.
    /// `select_icon` is false while the overflow glyph must stay up.
    fn reset_elements(&mut self, select_icon: bool) {
        for button in ACTION_BUTTONS {
            let Some(row) = button.row() else { continue };
            self.view
                .set_label(row, slot_text(&self.tile, button, self.toggle));
            if button != ButtonId::Select || select_icon {
                self.set_tile_icon(button);
            }
        }
        self.view.inset(None);
        self.view
            .apply_colors(ColorScheme::for_toggle(&self.tile, self.toggle));
    }

    fn set_tile_icon(&mut self, button: ButtonId) {
        if let Some(row) = button.row() {
            let key = slot_icon_key(&self.tile, button, self.toggle).to_string();
            self.view.set_icon(row, SlotIcon::Tile(key));
        }
    }

    /// Put every icon back to its tile image (select keeps the overflow glyph while held)
    fn reset_icons(&mut self) {
        self.set_tile_icon(ButtonId::Up);
        if self.holding {
            self.view.set_icon(SELECT_ROW, SlotIcon::Overflow);
        } else {
            self.set_tile_icon(ButtonId::Select);
        }
        self.set_tile_icon(ButtonId::Down);
    }

    /// End the spinner session: cancel its start timer, stop frames, restore icons
    fn cancel_spinner<H: Host>(&mut self, host: &mut H) {
        if let Some(session) = self.spinner.take() {
            if let Some(timer) = session.timer {
                host.cancel(timer);
            }
        }
        self.animator.stop();
        self.reset_icons();
    }

    /// Replace any running session with one targeting `button`
    fn begin_spinner<H: Host>(
        &mut self,
        host: &mut H,
        session: SessionId,
        button: ButtonId,
        delay: Duration,
    ) {
        if self.spinner.is_some() {
            debug!("Superseding running spinner");
            self.cancel_spinner(host);
        }
        let timer = host.schedule(delay, TimerEvent::SpinnerStart { session });
        self.spinner = Some(SpinnerSession {
            id: session,
            target: button,
            timer: Some(timer),
        });
    }

    fn start_spinner(&mut self, session: SessionId, now: Instant) {
        let target = match self.spinner.as_mut() {
            Some(s) if s.id == session && s.timer.is_some() => {
                s.timer = None;
                s.target
            }
            _ => {
                debug!("Stale spinner timer");
                return;
            }
        };
        self.reset_icons();
        self.animator.start(session, target, now);
    }

    fn set_color<H: Host>(&mut self, host: &mut H, action: ColorAction, color_display: bool) {
        host.backlight();

        let colors = match action {
            ColorAction::Good | ColorAction::Bad | ColorAction::Error => {
                self.cancel_spinner(host);
                host.pulse(Pulse::Long);
                let outcome = match action {
                    ColorAction::Good => Outcome::Good,
                    ColorAction::Bad => Outcome::Bad,
                    _ => Outcome::Error,
                };
                ColorScheme::for_outcome(outcome)
            }
            ColorAction::VibrateInit => self.vibrate(host),
            ColorAction::VibrateResponse => {
                self.cancel_spinner(host);
                self.vibrate(host)
            }
            ColorAction::ResetOnly => {
                self.cancel_spinner(host);
                host.clear_last_button();
                ColorScheme::for_toggle(&self.tile, self.toggle)
            }
        };

        if color_display {
            self.view.apply_colors(colors);
        }
    }

    fn vibrate<H: Host>(&mut self, host: &mut H) -> ColorScheme {
        host.pulse(Pulse::Short);
        ColorScheme::for_toggle(&self.tile, self.toggle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{BAD, ERROR, GOOD};
    use crate::host::testing::MockHost;
    use crate::tiles::testing::sample_tile;
    use crate::tiles::{Tile, TileSet};

    fn controller() -> ActionWindowController {
        let frames = Arc::new(SpinnerFrames::generated(Duration::from_millis(50)));
        ActionWindowController::new(
            frames,
            ActionTiming {
                spinner_delay: Duration::from_millis(200),
                hold_swap: Duration::from_millis(100),
            },
            true,
        )
    }

    fn borrowed(tile: Tile) -> BorrowedTile {
        TileSet::new(vec![tile]).borrow(0).unwrap()
    }

    fn opened(tile: Tile) -> (ActionWindowController, MockHost) {
        let mut c = controller();
        let mut host = MockHost::new();
        assert!(c.open(&mut host, borrowed(tile), 0));
        (c, host)
    }

    fn icon_keys(c: &ActionWindowController) -> Vec<SlotIcon> {
        c.view().unwrap().icons.to_vec()
    }

    fn tile_icon(key: &str) -> SlotIcon {
        SlotIcon::Tile(key.to_string())
    }

    /// Fire the pending spinner start timer and deliver the first frame
    fn start_animation(c: &mut ActionWindowController, host: &mut MockHost, now: Instant) {
        let event = host.fire_last().unwrap();
        assert!(matches!(event, TimerEvent::SpinnerStart { .. }));
        c.on_timer(host, event, now);
        c.poll_animation(now);
    }

    #[test]
    fn test_open_renders_primary_set() {
        let (c, host) = opened(sample_tile());
        let view = c.view().unwrap();
        let labels: Vec<_> = view.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(labels, vec!["A", "C", "E"]);
        assert_eq!(
            icon_keys(&c),
            vec![tile_icon("i0"), tile_icon("i2"), tile_icon("i4")]
        );
        assert_eq!(view.background(), sample_tile().color);
        assert_eq!(c.toggle(), Some(ToggleState::Primary));
        assert_eq!(host.stack, vec![WindowKind::Action]);
    }

    #[test]
    fn test_second_open_is_noop() {
        let (mut c, mut host) = opened(sample_tile());
        assert!(!c.open(&mut host, borrowed(sample_tile()), 1));
        assert_eq!(host.pushes.len(), 1);
        assert!(host.pending_timers().is_empty());
    }

    #[test]
    fn test_click_issues_request_and_schedules_spinner() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_short_click(&mut host, ButtonId::Down);

        assert_eq!(host.requests.len(), 1);
        let request = &host.requests[0];
        assert_eq!((request.tile_id, request.slot), (7, 4));
        assert_eq!(request.window, WindowKind::Action);
        assert_eq!(c.spinner_target(), Some(ButtonId::Down));
        assert_eq!(host.pulses, vec![Pulse::Short]);
        assert_eq!(host.marker, Some(ButtonId::Down.code()));
        assert_eq!(c.view().unwrap().inset_row(), Some(2));

        let timers = host.pending_timers();
        assert_eq!(timers.len(), 1);
        assert!(matches!(timers[0].1, TimerEvent::SpinnerStart { .. }));
        assert_eq!(host.scheduled[0].1, Duration::from_millis(200));
    }

    #[test]
    fn test_empty_secondary_slot_is_inert() {
        let mut tile = sample_tile();
        tile.texts[3] = String::new();
        let (mut c, mut host) = opened(tile);
        c.on_hold_complete(&mut host);
        host.pulses.clear();

        c.on_short_click(&mut host, ButtonId::Select);

        assert!(host.requests.is_empty());
        assert!(c.spinner_target().is_none());
        assert!(host.pending_timers().is_empty());
        // ResetOnly: no vibration, toggle colors
        assert!(host.pulses.is_empty());
        assert_eq!(c.view().unwrap().background(), sample_tile().highlight);
    }

    #[test]
    fn test_secondary_slot_request_is_tagged_with_tile_and_slot() {
        let mut tile = sample_tile();
        tile.texts[3] = "X".to_string();
        let (mut c, mut host) = opened(tile);
        c.on_hold_complete(&mut host);

        c.on_short_click(&mut host, ButtonId::Select);

        assert_eq!(host.requests.len(), 1);
        assert_eq!((host.requests[0].tile_id, host.requests[0].slot), (7, 3));
        assert_eq!(c.spinner_target(), Some(ButtonId::Select));
    }

    #[test]
    fn test_spinner_frames_land_on_target() {
        let (mut c, mut host) = opened(sample_tile());
        let t0 = Instant::now();
        c.on_short_click(&mut host, ButtonId::Up);
        start_animation(&mut c, &mut host, t0);

        assert!(c.is_animating());
        assert_eq!(icon_keys(&c)[0], SlotIcon::Spinner(0));
        c.poll_animation(t0 + Duration::from_millis(50));
        assert_eq!(icon_keys(&c)[0], SlotIcon::Spinner(1));
    }

    #[test]
    fn test_new_click_supersedes_spinner() {
        let (mut c, mut host) = opened(sample_tile());
        let t0 = Instant::now();
        c.on_short_click(&mut host, ButtonId::Up);
        start_animation(&mut c, &mut host, t0);
        let stale = SpinnerTick {
            session: c.window.as_ref().unwrap().spinner.as_ref().unwrap().id,
            target: ButtonId::Up,
            frame: 3,
        };

        c.on_short_click(&mut host, ButtonId::Down);

        assert_eq!(c.spinner_target(), Some(ButtonId::Down));
        assert!(!c.is_animating());
        assert_eq!(icon_keys(&c)[0], tile_icon("i0"));
        // Late frame from the first session changes nothing
        c.on_animation_frame(stale);
        assert_eq!(
            icon_keys(&c),
            vec![tile_icon("i0"), tile_icon("i2"), tile_icon("i4")]
        );
        assert_eq!(host.requests.len(), 2);
    }

    #[test]
    fn test_superseded_start_timer_is_cancelled() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_short_click(&mut host, ButtonId::Up);
        let (first, first_event) = host.pending_timers()[0];
        c.on_short_click(&mut host, ButtonId::Select);

        assert!(host.cancelled.contains(&first));
        assert_eq!(host.pending_timers().len(), 1);

        // Even if the old timer fired anyway, it starts nothing
        c.on_timer(&mut host, first_event, Instant::now());
        assert!(!c.is_animating());
    }

    #[test]
    fn test_outcome_stops_spinner_and_recolors() {
        for (outcome, color) in [(Outcome::Good, GOOD), (Outcome::Bad, BAD), (Outcome::Error, ERROR)] {
            let (mut c, mut host) = opened(sample_tile());
            let t0 = Instant::now();
            c.on_short_click(&mut host, ButtonId::Select);
            start_animation(&mut c, &mut host, t0);

            c.on_request_outcome(&mut host, outcome);

            assert!(!c.is_animating());
            assert!(c.spinner_target().is_none());
            assert_eq!(icon_keys(&c)[1], tile_icon("i2"));
            assert_eq!(c.view().unwrap().background(), color);
            assert_eq!(host.pulses.last(), Some(&Pulse::Long));
        }
    }

    #[test]
    fn test_outcome_before_spinner_start_cancels_timer() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_short_click(&mut host, ButtonId::Up);
        c.on_request_outcome(&mut host, Outcome::Good);
        assert!(host.pending_timers().is_empty());
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_short_click(&mut host, ButtonId::Up);
        let first = host.requests[0].token;
        c.on_short_click(&mut host, ButtonId::Down);
        let second = host.requests[1].token;
        host.pulses.clear();

        c.on_action_reply(
            &mut host,
            ActionReply {
                window: WindowKind::Action,
                outcome: Outcome::Bad,
                token: first,
            },
        );
        assert_eq!(c.spinner_target(), Some(ButtonId::Down));
        assert!(host.pulses.is_empty());

        c.on_action_reply(
            &mut host,
            ActionReply {
                window: WindowKind::Action,
                outcome: Outcome::Good,
                token: second,
            },
        );
        assert!(c.spinner_target().is_none());
        assert_eq!(c.view().unwrap().background(), GOOD);
    }

    #[test]
    fn test_hold_swaps_all_slots_once() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_long_press_start(&mut host, ButtonId::Select);
        assert_eq!(icon_keys(&c)[1], SlotIcon::Overflow);

        let event = host.fire_last().unwrap();
        assert!(matches!(event, TimerEvent::HoldComplete { .. }));
        c.on_timer(&mut host, event, Instant::now());

        assert_eq!(c.toggle(), Some(ToggleState::Secondary));
        let view = c.view().unwrap();
        let labels: Vec<_> = view.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(labels, vec!["B", "D", "F"]);
        // Select keeps the overflow glyph until release
        assert_eq!(
            icon_keys(&c),
            vec![tile_icon("i1"), SlotIcon::Overflow, tile_icon("i5")]
        );
        assert_eq!(view.background(), sample_tile().highlight);
        assert_eq!(host.pulses, vec![Pulse::Short]);

        // Replaying the fired timer does not flip back
        c.on_timer(&mut host, event, Instant::now());
        assert_eq!(c.toggle(), Some(ToggleState::Secondary));

        c.on_long_press_release(&mut host, ButtonId::Select);
        assert_eq!(icon_keys(&c)[1], tile_icon("i3"));
    }

    #[test]
    fn test_short_hold_release_does_not_swap() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_long_press_start(&mut host, ButtonId::Select);
        c.on_long_press_release(&mut host, ButtonId::Select);

        assert!(host.pending_timers().is_empty());
        assert_eq!(c.toggle(), Some(ToggleState::Primary));
        assert_eq!(icon_keys(&c)[1], tile_icon("i2"));
    }

    #[test]
    fn test_swap_cancels_spinner_and_clears_marker() {
        let (mut c, mut host) = opened(sample_tile());
        let t0 = Instant::now();
        c.on_short_click(&mut host, ButtonId::Up);
        start_animation(&mut c, &mut host, t0);
        assert!(host.marker.is_some());

        c.on_long_press_start(&mut host, ButtonId::Select);
        c.on_hold_complete(&mut host);

        assert!(!c.is_animating());
        assert!(host.marker.is_none());
        assert_eq!(c.view().unwrap().inset_row(), None);
        assert_eq!(icon_keys(&c)[0], tile_icon("i1"));
    }

    #[test]
    fn test_outcome_while_holding_keeps_overflow_glyph() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_short_click(&mut host, ButtonId::Up);
        c.on_long_press_start(&mut host, ButtonId::Select);
        c.on_request_outcome(&mut host, Outcome::Good);
        assert_eq!(icon_keys(&c)[1], SlotIcon::Overflow);
    }

    #[test]
    fn test_spinner_on_select_keeps_overflow_while_held() {
        let (mut c, mut host) = opened(sample_tile());
        let t0 = Instant::now();
        c.on_short_click(&mut host, ButtonId::Select);
        start_animation(&mut c, &mut host, t0);
        assert_eq!(icon_keys(&c)[1], SlotIcon::Spinner(0));

        c.on_long_press_start(&mut host, ButtonId::Select);
        c.poll_animation(t0 + Duration::from_millis(50));
        assert_eq!(icon_keys(&c)[1], SlotIcon::Overflow);
        assert!(c.is_animating());
    }

    #[test]
    fn test_back_pops_one_or_all() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_input(
            &mut host,
            InputEvent::MultiClick {
                button: ButtonId::Back,
                count: 1,
            },
        );
        assert_eq!(host.popped, vec![WindowKind::Action]);
        assert_eq!(host.pop_all_calls, 0);

        let (mut c, mut host) = opened(sample_tile());
        c.on_back(&mut host, 2);
        assert_eq!(host.pop_all_calls, 1);
    }

    #[test]
    fn test_close_during_spinner_stops_everything() {
        let (mut c, mut host) = opened(sample_tile());
        let t0 = Instant::now();
        c.on_short_click(&mut host, ButtonId::Up);
        let (timer, event) = host.pending_timers()[0];

        c.close(&mut host);

        assert!(host.cancelled.contains(&timer));
        assert!(host.marker.is_none());
        assert!(host.stack.is_empty());
        assert!(!c.is_open());

        // The original deadline passes: nothing to mutate, nothing animates
        c.on_timer(&mut host, event, t0 + Duration::from_millis(250));
        c.poll_animation(t0 + Duration::from_millis(300));
        assert!(c.view().is_none());

        // Late outcome after close is dropped
        host.pulses.clear();
        c.on_request_outcome(&mut host, Outcome::Good);
        assert!(host.pulses.is_empty());
    }

    #[test]
    fn test_close_twice_is_safe() {
        let (mut c, mut host) = opened(sample_tile());
        c.close(&mut host);
        c.close(&mut host);
        assert_eq!(host.popped, vec![WindowKind::Action]);
    }

    #[test]
    fn test_reopen_resets_toggle() {
        let (mut c, mut host) = opened(sample_tile());
        c.on_hold_complete(&mut host);
        c.close(&mut host);
        assert!(c.open(&mut host, borrowed(sample_tile()), 0));
        assert_eq!(c.toggle(), Some(ToggleState::Primary));
    }

    #[test]
    fn test_refresh_icons_only_when_topmost() {
        let (mut c, mut host) = opened(sample_tile());
        c.view_mut().unwrap().set_icon(0, SlotIcon::Placeholder);

        host.stack.push(WindowKind::Paging);
        c.refresh_icons(&mut host);
        assert_eq!(icon_keys(&c)[0], SlotIcon::Placeholder);

        host.stack.pop();
        c.refresh_icons(&mut host);
        assert_eq!(icon_keys(&c)[0], tile_icon("i0"));
    }

    #[test]
    fn test_vibrate_response_stops_spinner_and_keeps_marker() {
        let (mut c, mut host) = opened(sample_tile());
        let t0 = Instant::now();
        c.on_short_click(&mut host, ButtonId::Down);
        start_animation(&mut c, &mut host, t0);
        host.pulses.clear();

        let window = c.window.as_mut().unwrap();
        window.set_color(&mut host, ColorAction::VibrateResponse, true);

        assert!(!c.is_animating());
        assert_eq!(icon_keys(&c)[2], tile_icon("i4"));
        assert_eq!(host.pulses, vec![Pulse::Short]);
        assert_eq!(host.marker, Some(ButtonId::Down.code()));
    }

    #[test]
    fn test_monochrome_skips_recolor_but_stops_spinner() {
        let frames = Arc::new(SpinnerFrames::generated(Duration::from_millis(50)));
        let mut c = ActionWindowController::new(
            frames,
            ActionTiming {
                spinner_delay: Duration::from_millis(200),
                hold_swap: Duration::from_millis(100),
            },
            false,
        );
        let mut host = MockHost::new();
        c.open(&mut host, borrowed(sample_tile()), 0);
        c.on_short_click(&mut host, ButtonId::Up);
        c.on_request_outcome(&mut host, Outcome::Bad);

        assert!(c.spinner_target().is_none());
        assert_eq!(c.view().unwrap().background(), sample_tile().color);
        assert!(host.backlight_calls >= 2);
    }
}

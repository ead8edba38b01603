//! Paging window: each click fires immediately, a wrist tap flips pages.
//!
//! The window owns its own copy of the tile and remembers the last pressed
//! button across reopenings through the resume store.

use tracing::{debug, info};

use crate::comm::{ActionReply, ActionRequest, Outcome};
use crate::feedback::ColorScheme;
use crate::host::Host;
use crate::input::{ButtonId, InputEvent, ACTION_BUTTONS};
use crate::slots::{base_index, slot_icon_key, slot_text, ToggleState};
use crate::tiles::OwnedTile;
use crate::view::{SlotIcon, WindowView};

use super::WindowKind;

struct PagingWindow {
    tile: OwnedTile,
    index: u8,
    toggle: ToggleState,
    view: WindowView,
}

pub struct PagingController {
    color_display: bool,
    window: Option<PagingWindow>,
}

impl PagingController {
    pub fn new(color_display: bool) -> Self {
        Self {
            color_display,
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

    pub fn open<H: Host>(&mut self, host: &mut H, tile: OwnedTile, index: u8) -> bool {
        if self.window.is_some() {
            debug!("Paging window already open, ignoring open for index {}", index);
            return false;
        }
        info!("Opening paging window for tile {} (index {})", tile.id, index);

        let mut window = PagingWindow {
            view: WindowView::new(ColorScheme::for_toggle(&tile, ToggleState::Primary)),
            tile,
            index,
            toggle: ToggleState::Primary,
        };
        window.redraw();

        let resumed = host.load_last_button().and_then(ButtonId::from_code);
        if let Some(button) = resumed {
            debug!("Resuming with {} inset", button.name());
            window.view.inset(Some(button));
        }

        self.window = Some(window);
        host.push(WindowKind::Paging);
        true
    }

    /// Drop the owned tile and leave the stack. Safe to call when closed.
    pub fn close<H: Host>(&mut self, host: &mut H) {
        let Some(window) = self.window.take() else {
            return;
        };
        host.clear_last_button();
        host.pop(WindowKind::Paging);
        let tile = window.tile.into_inner();
        debug!("Released paging copy of tile {}", tile.id);
    }

    pub fn on_input<H: Host>(&mut self, host: &mut H, event: InputEvent) {
        match event {
            // Any number of back clicks leaves only this window
            InputEvent::Click(ButtonId::Back)
            | InputEvent::MultiClick {
                button: ButtonId::Back,
                ..
            } => self.on_back(host),
            InputEvent::Click(button) => self.on_click(host, button),
            InputEvent::Tap => self.on_motion(host),
            InputEvent::LongPressStart(_)
            | InputEvent::LongPressRelease(_)
            | InputEvent::MultiClick { .. } => {}
        }
    }

    pub fn on_click<H: Host>(&mut self, host: &mut H, button: ButtonId) {
        let color_display = self.color_display;
        let Some(window) = self.window.as_mut() else {
            return;
        };

        if color_display {
            window
                .view
                .apply_colors(ColorScheme::new(window.tile.color, window.tile.highlight));
        }
        window.view.inset(Some(button));
        host.save_last_button(button.code());

        let slot = base_index(button) + window.toggle.offset();
        info!(
            "{} clicked: requesting tile {} slot {}",
            button.name(),
            window.tile.id,
            slot
        );
        host.request_action(ActionRequest {
            window: WindowKind::Paging,
            window_index: window.index,
            tile_id: window.tile.id,
            slot,
            token: None,
        });
    }

    /// Wrist tap: swap to the other page
    pub fn on_motion<H: Host>(&mut self, host: &mut H) {
        let color_display = self.color_display;
        let Some(window) = self.window.as_mut() else {
            return;
        };

        window.toggle = window.toggle.flipped();
        if color_display {
            window
                .view
                .apply_colors(ColorScheme::for_toggle(&window.tile, window.toggle));
        }
        window.view.inset(None);
        host.clear_last_button();
        window.redraw();
        debug!("Paging window flipped to {:?}", window.toggle);
    }

    pub fn on_request_outcome(&mut self, outcome: Outcome) {
        let color_display = self.color_display;
        let Some(window) = self.window.as_mut() else {
            debug!("Paging window closed, dropping {:?} outcome", outcome);
            return;
        };
        if color_display {
            window.view.apply_colors(ColorScheme::for_outcome(outcome));
        }
    }

    pub fn on_action_reply(&mut self, reply: ActionReply) {
        self.on_request_outcome(reply.outcome);
    }

    pub fn on_back<H: Host>(&mut self, host: &mut H) {
        host.pop(WindowKind::Paging);
    }
}

impl PagingWindow {
    fn redraw(&mut self) {
        for button in ACTION_BUTTONS {
            let Some(row) = button.row() else { continue };
            self.view
                .set_label(row, slot_text(&self.tile, button, self.toggle));
            let key = slot_icon_key(&self.tile, button, self.toggle).to_string();
            self.view.set_icon(row, SlotIcon::Tile(key));
        }
    }
}

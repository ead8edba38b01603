//! Button → tile slot resolution shared by both windows

use tracing::debug;

use crate::input::ButtonId;
use crate::tiles::Tile;

/// Which of the two content sets is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    #[default]
    Primary,
    Secondary,
}

impl ToggleState {
    pub fn offset(self) -> u8 {
        match self {
            ToggleState::Primary => 0,
            ToggleState::Secondary => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ToggleState::Primary => ToggleState::Secondary,
            ToggleState::Secondary => ToggleState::Primary,
        }
    }

    pub fn is_secondary(self) -> bool {
        self == ToggleState::Secondary
    }
}

/// First slot of the primary set for a button.
/// Buttons without content (back) resolve to slot 0.
pub fn base_index(button: ButtonId) -> u8 {
    match button {
        ButtonId::Up => 0,
        ButtonId::Select => 2,
        ButtonId::Down => 4,
        ButtonId::Back => {
            debug!("No slot for {} button, using slot 0", button.name());
            0
        }
    }
}

pub fn slot_index(button: ButtonId, toggle: ToggleState) -> u8 {
    base_index(button) + toggle.offset()
}

pub fn slot_text(tile: &Tile, button: ButtonId, toggle: ToggleState) -> &str {
    &tile.texts[slot_index(button, toggle) as usize]
}

pub fn slot_icon_key(tile: &Tile, button: ButtonId, toggle: ToggleState) -> &str {
    &tile.icon_keys[slot_index(button, toggle) as usize]
}

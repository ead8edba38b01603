//! Color and vibration feedback applied to the windows

use image::Rgb;

use crate::comm::Outcome;
use crate::slots::ToggleState;
use crate::tiles::{Color, Tile};

/// Color constants
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GOOD: Rgb<u8> = Rgb([0, 170, 0]);
pub const GOOD_HIGHLIGHT: Rgb<u8> = Rgb([85, 170, 85]);
pub const BAD: Rgb<u8> = Rgb([255, 0, 85]);
pub const BAD_HIGHLIGHT: Rgb<u8> = Rgb([255, 85, 85]);
pub const ERROR: Rgb<u8> = Rgb([255, 170, 0]);
pub const ERROR_HIGHLIGHT: Rgb<u8> = Rgb([255, 170, 85]);

/// What just happened, as far as window colors are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorAction {
    /// Request succeeded
    Good,
    /// Request was rejected by the remote end
    Bad,
    /// Request failed to complete
    Error,
    /// Click accepted, request going out
    VibrateInit,
    /// Stop the spinner, then behave like `VibrateInit`
    VibrateResponse,
    /// Stop the spinner and return to the tile's own colors
    ResetOnly,
}

impl From<Outcome> for ColorAction {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Good => ColorAction::Good,
            Outcome::Bad => ColorAction::Bad,
            Outcome::Error => ColorAction::Error,
        }
    }
}

/// Strength of a haptic pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    Short,
    Long,
}

/// Background, action bar and label colors for a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub background: Color,
    pub highlight: Color,
    pub text: Color,
}

impl ColorScheme {
    pub fn new(background: Color, highlight: Color) -> Self {
        Self {
            background,
            highlight,
            text: legible_over(background),
        }
    }

    /// Fixed palette for a request outcome
    pub fn for_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Good => Self::new(GOOD, GOOD_HIGHLIGHT),
            Outcome::Bad => Self::new(BAD, BAD_HIGHLIGHT),
            Outcome::Error => Self::new(ERROR, ERROR_HIGHLIGHT),
        }
    }

    /// The tile's own colors; the secondary set swaps background and bar
    pub fn for_toggle(tile: &Tile, toggle: ToggleState) -> Self {
        match toggle {
            ToggleState::Primary => Self::new(tile.color, tile.highlight),
            ToggleState::Secondary => Self::new(tile.highlight, tile.color),
        }
    }
}

/// Black or white, whichever reads better over `background`
pub fn legible_over(background: Color) -> Color {
    let [r, g, b] = background.0;
    let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
    if luma > 140 {
        BLACK
    } else {
        WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::testing::sample_tile;

    #[test]
    fn test_legible_over() {
        assert_eq!(legible_over(BLACK), WHITE);
        assert_eq!(legible_over(WHITE), BLACK);
        assert_eq!(legible_over(Rgb([0, 0, 170])), WHITE);
        assert_eq!(legible_over(ERROR), BLACK);
    }

    #[test]
    fn test_toggle_swaps_tile_colors() {
        let tile = sample_tile();
        let primary = ColorScheme::for_toggle(&tile, ToggleState::Primary);
        let secondary = ColorScheme::for_toggle(&tile, ToggleState::Secondary);
        assert_eq!(primary.background, tile.color);
        assert_eq!(primary.highlight, tile.highlight);
        assert_eq!(secondary.background, tile.highlight);
        assert_eq!(secondary.highlight, tile.color);
    }

    #[test]
    fn test_outcome_palette() {
        assert_eq!(ColorScheme::for_outcome(Outcome::Good).background, GOOD);
        assert_eq!(ColorScheme::for_outcome(Outcome::Bad).highlight, BAD_HIGHLIGHT);
        assert_eq!(ColorAction::from(Outcome::Error), ColorAction::Error);
    }
}

//! Retained view state for a three-button window
//!
//! Windows mutate this; the host's renderer draws it. Geometry is reduced to
//! the one thing the controllers decide: which label row is inset.

use crate::feedback::ColorScheme;
use crate::input::ButtonId;
use crate::tiles::Color;

/// Number of label/icon rows
pub const ROWS: usize = 3;

/// What the action bar shows next to one button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotIcon {
    /// Shown until a tile icon is assigned
    Placeholder,
    /// Tile icon by key, resolved through the icon catalog
    Tile(String),
    /// Overflow glyph shown while select is held
    Overflow,
    /// Spinner animation frame
    Spinner(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelView {
    pub text: String,
    pub color: Color,
    /// Shifted left to mark the last pressed button
    pub inset: bool,
}

#[derive(Debug, Clone)]
pub struct WindowView {
    pub colors: ColorScheme,
    pub labels: [LabelView; ROWS],
    pub icons: [SlotIcon; ROWS],
    dirty: bool,
}

impl WindowView {
    pub fn new(colors: ColorScheme) -> Self {
        let label = LabelView {
            text: String::new(),
            color: colors.text,
            inset: false,
        };
        Self {
            colors,
            labels: [label.clone(), label.clone(), label],
            icons: [SlotIcon::Placeholder, SlotIcon::Placeholder, SlotIcon::Placeholder],
            dirty: true,
        }
    }

    pub fn set_label(&mut self, row: usize, text: &str) {
        if self.labels[row].text != text {
            self.labels[row].text = text.to_string();
            self.dirty = true;
        }
    }

    pub fn set_icon(&mut self, row: usize, icon: SlotIcon) {
        if self.icons[row] != icon {
            self.icons[row] = icon;
            self.dirty = true;
        }
    }

    /// Recolor background, action bar and every label
    pub fn apply_colors(&mut self, colors: ColorScheme) {
        self.colors = colors;
        for label in &mut self.labels {
            label.color = colors.text;
        }
        self.dirty = true;
    }

    /// Inset the label for `button`, restoring every other row
    pub fn inset(&mut self, button: Option<ButtonId>) {
        let row = button.and_then(ButtonId::row);
        for (i, label) in self.labels.iter_mut().enumerate() {
            let inset = Some(i) == row;
            if label.inset != inset {
                label.inset = inset;
                self.dirty = true;
            }
        }
    }

    pub fn inset_row(&self) -> Option<usize> {
        self.labels.iter().position(|l| l.inset)
    }

    pub fn background(&self) -> Color {
        self.colors.background
    }

    pub fn bar_color(&self) -> Color {
        self.colors.highlight
    }

    /// Report and clear the redraw flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

//! Snapshot rendering of a window view
//!
//! Produces a rough picture of the screen: background, label blocks, and the
//! action bar with its three icons. Text is drawn as a bar whose width follows
//! the label length.

use anyhow::Result;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

use crate::animation::SpinnerFrames;
use crate::tiles::icons::ICON_SIZE;
use crate::tiles::{Color, IconCatalog};
use crate::view::{SlotIcon, WindowView, ROWS};

pub const SCREEN_WIDTH: u32 = 144;
pub const SCREEN_HEIGHT: u32 = 168;
const BAR_WIDTH: u32 = 30;
const LABEL_MARGIN: u32 = 6;
const LABEL_HEIGHT: u32 = 10;
const GLYPH_WIDTH: u32 = 7;
/// How far an inset label shifts left
const INSET: u32 = 4;

/// Three dots telling the user the select button has more behind it
pub fn overflow_glyph() -> RgbaImage {
    let mid = ICON_SIZE as f32 / 2.0;
    let centers = [mid - 8.0, mid, mid + 8.0];
    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        let hit = centers
            .iter()
            .any(|cx| (px - cx).powi(2) + (py - mid).powi(2) <= 6.25);
        if hit {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Draw `view` as it would appear on screen
pub fn render_window(
    view: &WindowView,
    icons: &IconCatalog,
    spinner: &SpinnerFrames,
    overflow: Option<&RgbaImage>,
) -> RgbImage {
    let mut img = RgbImage::from_pixel(SCREEN_WIDTH, SCREEN_HEIGHT, view.background());

    let bar_x = SCREEN_WIDTH - BAR_WIDTH;
    fill_rect(&mut img, bar_x, 0, BAR_WIDTH, SCREEN_HEIGHT, view.bar_color());

    let row_height = SCREEN_HEIGHT / ROWS as u32;
    for row in 0..ROWS {
        let center_y = row_height * row as u32 + row_height / 2;

        let label = &view.labels[row];
        if !label.text.is_empty() {
            let max_width = bar_x - 2 * LABEL_MARGIN;
            let width = (label.text.chars().count() as u32 * GLYPH_WIDTH).min(max_width);
            // Labels are right-aligned against the bar
            let mut x = bar_x - LABEL_MARGIN - width;
            if label.inset {
                x = x.saturating_sub(INSET);
            }
            fill_rect(
                &mut img,
                x,
                center_y - LABEL_HEIGHT / 2,
                width,
                LABEL_HEIGHT,
                label.color,
            );
        }

        let icon = match &view.icons[row] {
            SlotIcon::Placeholder => None,
            SlotIcon::Tile(key) => icons.get(key).map(|i| &**i),
            SlotIcon::Overflow => overflow,
            SlotIcon::Spinner(frame) => spinner.get(*frame).map(|f| &*f.image),
        };
        if let Some(icon) = icon {
            let x = bar_x + (BAR_WIDTH - ICON_SIZE) / 2;
            blend_icon(&mut img, icon, x, center_y - ICON_SIZE / 2);
        }
    }

    img
}

/// Write a rendered snapshot as PNG
pub fn save_snapshot(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    Ok(())
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Color) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

/// Alpha-blend an icon onto the canvas
fn blend_icon(img: &mut RgbImage, icon: &RgbaImage, x: u32, y: u32) {
    for (ix, iy, pixel) in icon.enumerate_pixels() {
        let (px, py) = (x + ix, y + iy);
        if px >= img.width() || py >= img.height() {
            continue;
        }
        let alpha = pixel[3] as f32 / 255.0;
        if alpha == 0.0 {
            continue;
        }
        let under = *img.get_pixel(px, py);
        let mix = |c: usize| (pixel[c] as f32 * alpha + under[c] as f32 * (1.0 - alpha)) as u8;
        img.put_pixel(px, py, Rgb([mix(0), mix(1), mix(2)]));
    }
}

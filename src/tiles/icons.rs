//! Icon lookup for tile slots

use image::{imageops::FilterType, RgbaImage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Icons are drawn in a square this size on the action bar
pub const ICON_SIZE: u32 = 28;

/// Decoded icon, shared between the catalog and any snapshot renders
pub type IconImage = Arc<RgbaImage>;

/// Key → icon lookup filled by `icon_ready` notifications
#[derive(Default)]
pub struct IconCatalog {
    icons: HashMap<String, IconImage>,
}

impl IconCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decoded icon
    pub fn insert(&mut self, index: u8, key: &str, image: IconImage) {
        debug!("Icon {} ready at index {}", key, index);
        self.icons.insert(key.to_string(), image);
    }

    pub fn get(&self, key: &str) -> Option<&IconImage> {
        self.icons.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.icons.contains_key(key)
    }

    /// Drop every icon (called when a new tile set arrives)
    pub fn clear(&mut self) {
        self.icons.clear();
    }
}

/// Decode icon bytes and resize to the action bar icon size
pub fn decode_icon(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    if img.width() == ICON_SIZE && img.height() == ICON_SIZE {
        return Ok(img);
    }
    Ok(image::imageops::resize(
        &img,
        ICON_SIZE,
        ICON_SIZE,
        FilterType::Triangle,
    ))
}

//! Tile configuration types for serialization/deserialization
//!
//! These types are read from the local tile file and from the bridge's
//! `tiles` message, and converted into runtime `Tile`s.

use anyhow::Result;
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use super::{Tile, SLOT_COUNT};

const FALLBACK_COLOR: Rgb<u8> = Rgb([80, 85, 95]);
const FALLBACK_HIGHLIGHT: Rgb<u8> = Rgb([110, 115, 125]);

/// Tile entry as written in config / wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    pub id: u8,
    /// Background color (hex string like "#00AA00")
    pub color: String,
    /// Action bar color (hex string)
    pub highlight: String,
    /// Icon keys in slot order; missing slots are blank
    #[serde(default)]
    pub icons: Vec<String>,
    /// Label texts in slot order; missing slots are blank
    #[serde(default)]
    pub texts: Vec<String>,
}

impl TileConfig {
    /// Convert to runtime Tile
    pub fn to_tile(&self) -> Tile {
        let color = parse_hex_color(&self.color).unwrap_or_else(|| {
            warn!("Tile {}: invalid color '{}'", self.id, self.color);
            FALLBACK_COLOR
        });
        let highlight = parse_hex_color(&self.highlight).unwrap_or_else(|| {
            warn!("Tile {}: invalid highlight '{}'", self.id, self.highlight);
            FALLBACK_HIGHLIGHT
        });

        Tile {
            id: self.id,
            color,
            highlight,
            icon_keys: slots(self.id, "icons", &self.icons),
            texts: slots(self.id, "texts", &self.texts),
        }
    }

    /// Create from runtime Tile
    pub fn from_tile(tile: &Tile) -> Self {
        Self {
            id: tile.id,
            color: rgb_to_hex(tile.color),
            highlight: rgb_to_hex(tile.highlight),
            icons: tile.icon_keys.to_vec(),
            texts: tile.texts.to_vec(),
        }
    }
}

fn slots(id: u8, field: &str, values: &[String]) -> [String; SLOT_COUNT] {
    if values.len() > SLOT_COUNT {
        warn!(
            "Tile {}: {} has {} entries, keeping the first {}",
            id,
            field,
            values.len(),
            SLOT_COUNT
        );
    }
    std::array::from_fn(|i| values.get(i).cloned().unwrap_or_default())
}

/// Top-level layout of a tile file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileFile {
    #[serde(default)]
    pub tiles: Vec<TileConfig>,
}

impl TileFile {
    /// Load a JSON tile file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: TileFile = serde_json::from_str(&contents)?;
        Ok(file)
    }

    pub fn to_tiles(&self) -> Vec<Tile> {
        self.tiles.iter().map(TileConfig::to_tile).collect()
    }
}

/// Parse a hex color string to Rgb
pub fn parse_hex_color(hex: &str) -> Option<Rgb<u8>> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Rgb([r, g, b]))
}

/// Convert Rgb to hex string
pub fn rgb_to_hex(color: Rgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

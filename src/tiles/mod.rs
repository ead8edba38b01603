//! Tile content: per-slot labels, icon keys and colors
//!
//! Slot layout (6 slots):
//!   - 0, 2, 4: primary set   (up / select / down)
//!   - 1, 3, 5: secondary set (up / select / down)

pub mod icons;
pub mod store;

use image::Rgb;
use std::ops::Deref;
use std::sync::Arc;

pub use icons::{IconCatalog, IconImage};
pub use store::{parse_hex_color, rgb_to_hex, TileConfig, TileFile};

/// Number of content slots in a tile
pub const SLOT_COUNT: usize = 6;

pub type Color = Rgb<u8>;

/// Content record for one interactive window
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: u8,
    pub color: Color,
    pub highlight: Color,
    pub icon_keys: [String; SLOT_COUNT],
    pub texts: [String; SLOT_COUNT],
}

impl Tile {
    /// Every icon key the tile references, without blanks or repeats
    pub fn distinct_icon_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for key in self.icon_keys.iter().map(String::as_str) {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Shared handle on a tile owned by the tile set.
/// Windows holding one never drop the underlying content.
#[derive(Debug, Clone)]
pub struct BorrowedTile(Arc<Tile>);

impl BorrowedTile {
    pub fn new(tile: Arc<Tile>) -> Self {
        Self(tile)
    }
}

impl Deref for BorrowedTile {
    type Target = Tile;

    fn deref(&self) -> &Tile {
        &self.0
    }
}

/// Tile moved into a window; released when the window closes
#[derive(Debug)]
pub struct OwnedTile(Box<Tile>);

impl OwnedTile {
    pub fn new(tile: Tile) -> Self {
        Self(Box::new(tile))
    }

    pub fn into_inner(self) -> Tile {
        *self.0
    }
}

impl Deref for OwnedTile {
    type Target = Tile;

    fn deref(&self) -> &Tile {
        &self.0
    }
}

/// The tile list currently known to the app
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    tiles: Vec<Arc<Tile>>,
}

impl TileSet {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self {
            tiles: tiles.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Borrow the tile at a menu index for the action window
    pub fn borrow(&self, index: usize) -> Option<BorrowedTile> {
        self.tiles.get(index).cloned().map(BorrowedTile::new)
    }

    /// Copy the tile at a menu index for a window that takes ownership
    pub fn copy_owned(&self, index: usize) -> Option<OwnedTile> {
        self.tiles
            .get(index)
            .map(|tile| OwnedTile::new(Tile::clone(tile)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().map(|t| t.as_ref())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Tile with primary texts A/C/E and secondary B/D/F
    pub fn sample_tile() -> Tile {
        Tile {
            id: 7,
            color: Rgb([0, 170, 0]),
            highlight: Rgb([170, 255, 170]),
            icon_keys: ["i0", "i1", "i2", "i3", "i4", "i5"].map(String::from),
            texts: ["A", "B", "C", "D", "E", "F"].map(String::from),
        }
    }
}

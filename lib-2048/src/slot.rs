use core_arcade::Point;

use crate::tile::{Tile, TileId};

/// A board cell. Holds two tiles only between a step finishing and the
/// merge that follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    row: usize,
    col: usize,
    tiles: Vec<Tile>,
}

impl Slot {
    pub(crate) fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            tiles: Vec::with_capacity(2),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Top-left corner in slot units.
    pub fn origin(&self) -> Point {
        Point::new(self.col as f32, self.row as f32)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn has_one_tile(&self) -> bool {
        self.tiles.len() == 1
    }

    pub fn unique_tile(&self) -> Option<&Tile> {
        self.has_one_tile().then(|| &self.tiles[0])
    }

    pub(crate) fn unique_tile_mut(&mut self) -> Option<&mut Tile> {
        match self.tiles.as_mut_slice() {
            [tile] => Some(tile),
            _ => None,
        }
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.iter().any(|tile| tile.id() == id)
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|tile| tile.id() == id)
    }

    pub(crate) fn add_tile(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    pub(crate) fn take_tile(&mut self, id: TileId) -> Option<Tile> {
        let index = self.tiles.iter().position(|tile| tile.id() == id)?;
        Some(self.tiles.remove(index))
    }

    pub fn has_two_equal_tiles(&self) -> bool {
        matches!(self.tiles.as_slice(), [a, b] if a.value() == b.value())
    }

    /// Replaces two equal tiles with one of double value, flagged as merged.
    /// Returns the new value.
    pub(crate) fn merge_tiles(&mut self, id: TileId) -> Option<u32> {
        if !self.has_two_equal_tiles() {
            return None;
        }

        let value = self.tiles[0].value().checked_mul(2)?;
        self.tiles.clear();

        let mut tile = Tile::new(id, value, true);
        tile.merge_animation();
        self.add_tile(tile);

        Some(value)
    }
}

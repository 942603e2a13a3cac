use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::params::TrackParams;

/// One track tile's displacement from its lattice position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct Tile {
    /// Offset across the track. Positive is `right`.
    pub lateral: f32,
    /// Vertical offset.
    pub height: f32,
}

/// The built lattice: `rows x cols` slots in row-major order, `None` where a
/// tile was removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct GridState {
    pub rows: u32,
    pub cols: u32,
    /// Rows at the start of the track protected from holes and jump gaps.
    pub margin_start: u32,
    /// Rows at the end of the track protected from holes and jump gaps.
    pub margin_end: u32,
    tiles: Vec<Option<Tile>>,
}

impl GridState {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            margin_start: 0,
            margin_end: 0,
            tiles: vec![Some(Tile::default()); rows as usize * cols as usize],
        }
    }

    #[inline]
    pub fn in_bounds(&self, row: u32, col: u32) -> bool {
        row < self.rows && col < self.cols
    }

    #[inline]
    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Tile at 0-based `(row, col)`, if it exists.
    pub fn get(&self, row: u32, col: u32) -> Option<&Tile> {
        if !self.in_bounds(row, col) {
            return None;
        }
        self.tiles[self.index(row, col)].as_ref()
    }

    pub fn get_mut(&mut self, row: u32, col: u32) -> Option<&mut Tile> {
        if !self.in_bounds(row, col) {
            return None;
        }
        let idx = self.index(row, col);
        self.tiles[idx].as_mut()
    }

    /// Remove the tile at `(row, col)`. Returns whether a tile was there.
    pub fn remove(&mut self, row: u32, col: u32) -> bool {
        if !self.in_bounds(row, col) {
            return false;
        }
        let idx = self.index(row, col);
        self.tiles[idx].take().is_some()
    }

    /// Remove every tile of `row`, returning how many existed.
    pub fn remove_row(&mut self, row: u32) -> u64 {
        (0..self.cols).filter(|&col| self.remove(row, col)).count() as u64
    }

    /// Whether `row` lies inside a safe margin.
    pub fn is_protected(&self, row: u32) -> bool {
        row < self.margin_start || row >= self.rows.saturating_sub(self.margin_end)
    }

    pub fn tile_count(&self) -> u64 {
        self.tiles.iter().filter(|t| t.is_some()).count() as u64
    }

    pub fn row_tile_count(&self, row: u32) -> u64 {
        (0..self.cols).filter(|&col| self.get(row, col).is_some()).count() as u64
    }

    /// Raw row-major slots.
    pub fn slots(&self) -> &[Option<Tile>] {
        &self.tiles
    }

    /// Existing tiles as `(row, col, tile)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &Tile)> + '_ {
        let cols = self.cols.max(1) as usize;
        self.tiles.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref()
                .map(|tile| ((i / cols) as u32, (i % cols) as u32, tile))
        })
    }

    /// Mutable access to every existing tile of `row`.
    pub fn row_tiles_mut(&mut self, row: u32) -> impl Iterator<Item = &mut Tile> + '_ {
        let (start, end) = if row < self.rows {
            let start = self.index(row, 0);
            (start, start + self.cols as usize)
        } else {
            (0, 0)
        };
        self.tiles[start..end].iter_mut().flatten()
    }

    /// World-space centre of a tile: x across the track, y up, z along it.
    pub fn world_position(&self, row: u32, col: u32, params: &TrackParams) -> Option<Vec3> {
        let tile = self.get(row, col)?;
        let centre = (self.cols as f32 - 1.0) * 0.5;
        Some(Vec3::new(
            (col as f32 - centre) * params.tile_width + tile.lateral,
            tile.height,
            row as f32 * params.row_pitch,
        ))
    }
}

/// The track grid resource. `None` until the first `buildAbs` executes.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct TrackGrid {
    state: Option<GridState>,
}

impl TrackGrid {
    pub fn from_state(state: GridState) -> Self {
        Self { state: Some(state) }
    }

    pub fn state(&self) -> Option<&GridState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GridState> {
        self.state.as_mut()
    }

    pub fn replace(&mut self, state: GridState) {
        self.state = Some(state);
    }

    pub fn clear(&mut self) {
        self.state = None;
    }

    pub fn is_built(&self) -> bool {
        self.state.is_some()
    }

    pub fn dims(&self) -> Option<(u32, u32)> {
        self.state.as_ref().map(|s| (s.rows, s.cols))
    }

    pub fn tile_count(&self) -> u64 {
        self.state.as_ref().map_or(0, GridState::tile_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_full() {
        let g = GridState::new(4, 3);
        assert_eq!(g.tile_count(), 12);
        assert_eq!(g.get(3, 2), Some(&Tile::default()));
        assert_eq!(g.get(4, 0), None);
        assert_eq!(g.get(0, 3), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut g = GridState::new(2, 2);
        assert!(g.remove(1, 1));
        assert!(!g.remove(1, 1));
        assert!(!g.remove(5, 5));
        assert_eq!(g.tile_count(), 3);
        assert_eq!(g.remove_row(1), 1);
        assert_eq!(g.row_tile_count(1), 0);
    }

    #[test]
    fn margins_protect_both_ends() {
        let mut g = GridState::new(10, 1);
        g.margin_start = 2;
        g.margin_end = 3;
        let protected: Vec<u32> = (0..10).filter(|&r| g.is_protected(r)).collect();
        assert_eq!(protected, vec![0, 1, 7, 8, 9]);
    }

    #[test]
    fn oversized_margin_protects_everything() {
        let mut g = GridState::new(4, 1);
        g.margin_end = 10;
        assert!((0..4).all(|r| g.is_protected(r)));
    }

    #[test]
    fn iter_reports_coordinates_row_major() {
        let mut g = GridState::new(2, 2);
        g.remove(0, 1);
        let coords: Vec<(u32, u32)> = g.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (1, 1)]);
    }

    #[test]
    fn row_tiles_mut_skips_holes() {
        let mut g = GridState::new(2, 3);
        g.remove(1, 1);
        for tile in g.row_tiles_mut(1) {
            tile.height = 2.0;
        }
        assert_eq!(g.get(1, 0).map(|t| t.height), Some(2.0));
        assert_eq!(g.get(1, 2).map(|t| t.height), Some(2.0));
        assert_eq!(g.get(0, 0).map(|t| t.height), Some(0.0));
        assert_eq!(g.row_tiles_mut(9).count(), 0);
    }

    #[test]
    fn world_position_centres_columns() {
        let params = TrackParams::default();
        let mut g = GridState::new(3, 3);
        if let Some(tile) = g.get_mut(2, 0) {
            tile.lateral = 1.5;
            tile.height = 0.5;
        }
        let p = g.world_position(2, 0, &params).unwrap();
        assert_eq!(p, Vec3::new(-params.tile_width + 1.5, 0.5, 2.0 * params.row_pitch));
        assert_eq!(g.world_position(1, 1, &params).unwrap().x, 0.0);
    }

    #[test]
    fn track_grid_starts_empty() {
        let grid = TrackGrid::default();
        assert!(!grid.is_built());
        assert_eq!(grid.tile_count(), 0);
        assert_eq!(grid.dims(), None);
    }
}

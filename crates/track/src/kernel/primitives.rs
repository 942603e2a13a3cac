//! Grid primitives behind the [`TileKernel`] capability trait.
//!
//! Rows are 0-based. Tile columns passed to [`TileKernel::delete_tiles`] are
//! 1-based, matching plan text. Every method except `build` is a no-op on an
//! unbuilt grid.

use std::f64::consts::PI;

use rand::Rng;

use super::grid::{GridState, TrackGrid};
use super::results::ExecErrorKind;
use crate::config::{DEGREE_LIMIT, SBEND_RATIO_MAX, SBEND_RATIO_MIN};
use crate::params::TrackParams;
use crate::plan::Direction;

/// Mutation capabilities the executor needs from a grid.
pub trait TileKernel {
    fn is_built(&self) -> bool;

    /// Replace the grid with a fresh `rows x cols` lattice.
    fn build(&mut self, rows: u32, cols: u32, params: &TrackParams) -> Result<u64, ExecErrorKind>;

    fn delete_rows(&mut self, a: u32, b: u32) -> u64;

    fn delete_tiles(&mut self, cols: &[u32], row: u32) -> u64;

    fn random_holes<R: Rng + ?Sized>(&mut self, pct: f64, rng: &mut R)
        -> Result<u64, ExecErrorKind>;

    fn insert_jump_gaps(&mut self, n: u32) -> u64;

    fn curve_rows(
        &mut self,
        a: u32,
        b: u32,
        dir: Direction,
        deg: f64,
        params: &TrackParams,
    ) -> Result<u64, ExecErrorKind>;

    fn s_bend(
        &mut self,
        a: u32,
        b: u32,
        deg: f64,
        gain: f64,
        ratio: f64,
        params: &TrackParams,
    ) -> Result<u64, ExecErrorKind>;

    fn slopes_random_auto<R: Rng + ?Sized>(
        &mut self,
        min_deg: f64,
        max_deg: f64,
        seg_len: u32,
        rng: &mut R,
        params: &TrackParams,
    ) -> Result<u64, ExecErrorKind>;

    fn set_margin_start(&mut self, n: u32) -> u64;

    fn set_margin_end(&mut self, n: u32) -> u64;

    fn smooth_columns(&mut self, passes: u32) -> Result<u64, ExecErrorKind>;
}

fn invalid(msg: impl Into<String>) -> ExecErrorKind {
    ExecErrorKind::InvalidArgument(msg.into())
}

fn check_degrees(name: &str, deg: f64) -> Result<(), ExecErrorKind> {
    if deg.abs() < DEGREE_LIMIT {
        Ok(())
    } else {
        Err(invalid(format!(
            "{name} must lie strictly between -{DEGREE_LIMIT} and {DEGREE_LIMIT} degrees, got {deg}"
        )))
    }
}

/// Interpolation parameter of `row` inside `[lo, hi]`; a single-row range
/// counts as fully applied.
fn span_t(row: u32, lo: u32, hi: u32) -> f64 {
    if hi == lo {
        1.0
    } else {
        (row - lo) as f64 / (hi - lo) as f64
    }
}

/// Rows `[min(a,b), max(a,b)]` clipped to the grid.
fn clipped_rows(state: &GridState, a: u32, b: u32) -> Option<(u32, u32, u32)> {
    let (lo, hi) = (a.min(b), a.max(b));
    if state.rows == 0 || lo >= state.rows {
        return None;
    }
    Some((lo, hi, hi.min(state.rows - 1)))
}

/// Add `offset(t)` to the lateral offset of every tile in the row range.
fn shift_rows(state: &mut GridState, a: u32, b: u32, offset: impl Fn(f64) -> f64) -> u64 {
    let Some((lo, hi, end)) = clipped_rows(state, a, b) else {
        return 0;
    };
    let mut touched = 0;
    for row in lo..=end {
        let delta = offset(span_t(row, lo, hi)) as f32;
        for tile in state.row_tiles_mut(row) {
            tile.lateral += delta;
            touched += 1;
        }
    }
    touched
}

impl TileKernel for TrackGrid {
    fn is_built(&self) -> bool {
        TrackGrid::is_built(self)
    }

    fn build(&mut self, rows: u32, cols: u32, params: &TrackParams) -> Result<u64, ExecErrorKind> {
        if rows == 0 || cols == 0 {
            return Err(invalid(format!(
                "grid must have at least one row and column, got {rows}x{cols}"
            )));
        }
        let tiles = rows as u64 * cols as u64;
        if tiles > params.max_tiles {
            return Err(invalid(format!(
                "{rows}x{cols} = {tiles} tiles exceeds the limit of {}",
                params.max_tiles
            )));
        }
        self.replace(GridState::new(rows, cols));
        Ok(tiles)
    }

    fn delete_rows(&mut self, a: u32, b: u32) -> u64 {
        let Some(state) = self.state_mut() else {
            return 0;
        };
        let Some((lo, _, end)) = clipped_rows(state, a, b) else {
            return 0;
        };
        (lo..=end).map(|row| state.remove_row(row)).sum()
    }

    fn delete_tiles(&mut self, cols: &[u32], row: u32) -> u64 {
        let Some(state) = self.state_mut() else {
            return 0;
        };
        cols.iter()
            .filter(|&&col| col >= 1 && state.remove(row, col - 1))
            .count() as u64
    }

    fn random_holes<R: Rng + ?Sized>(
        &mut self,
        pct: f64,
        rng: &mut R,
    ) -> Result<u64, ExecErrorKind> {
        if !(0.0..=100.0).contains(&pct) {
            return Err(invalid(format!("pct must lie in [0, 100], got {pct}")));
        }
        let Some(state) = self.state_mut() else {
            return Ok(0);
        };
        let threshold = pct / 100.0;
        let mut removed = 0;
        for row in 0..state.rows {
            if state.is_protected(row) {
                continue;
            }
            for col in 0..state.cols {
                if state.get(row, col).is_none() {
                    continue;
                }
                let u: f64 = rng.gen();
                if u < threshold && state.remove(row, col) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    fn insert_jump_gaps(&mut self, n: u32) -> u64 {
        let Some(state) = self.state_mut() else {
            return 0;
        };
        if n == 0 || state.rows == 0 {
            return 0;
        }
        let rows = state.rows as f64;
        let slots = n as f64 + 1.0;
        let targets: Vec<u32> = if n >= state.rows {
            // Spacing below one row: every row from the first gap onward is hit.
            let first = (rows / slots).round() as u32;
            (first..state.rows).collect()
        } else {
            (1..=n)
                .map(|i| (i as f64 * rows / slots).round() as u32)
                .collect()
        };
        let mut removed = 0;
        for row in targets {
            if row < state.rows && !state.is_protected(row) {
                removed += state.remove_row(row);
            }
        }
        removed
    }

    fn curve_rows(
        &mut self,
        a: u32,
        b: u32,
        dir: Direction,
        deg: f64,
        params: &TrackParams,
    ) -> Result<u64, ExecErrorKind> {
        check_degrees("deg", deg)?;
        let Some(state) = self.state_mut() else {
            return Ok(0);
        };
        let amplitude = dir.sign() * deg.to_radians().tan() * params.lateral_scale as f64;
        Ok(shift_rows(state, a, b, |t| {
            amplitude * t * t * (3.0 - 2.0 * t)
        }))
    }

    fn s_bend(
        &mut self,
        a: u32,
        b: u32,
        deg: f64,
        gain: f64,
        ratio: f64,
        params: &TrackParams,
    ) -> Result<u64, ExecErrorKind> {
        check_degrees("deg", deg)?;
        let Some(state) = self.state_mut() else {
            return Ok(0);
        };
        let amplitude = deg.to_radians().tan() * params.lateral_scale as f64 * gain;
        let ratio = ratio.clamp(SBEND_RATIO_MIN, SBEND_RATIO_MAX);
        Ok(shift_rows(state, a, b, |t| {
            if t < ratio {
                amplitude * (PI * t / ratio).sin()
            } else {
                -amplitude * (PI * (t - ratio) / (1.0 - ratio)).sin()
            }
        }))
    }

    fn slopes_random_auto<R: Rng + ?Sized>(
        &mut self,
        min_deg: f64,
        max_deg: f64,
        seg_len: u32,
        rng: &mut R,
        params: &TrackParams,
    ) -> Result<u64, ExecErrorKind> {
        if seg_len == 0 {
            return Err(invalid("segLen must be at least 1"));
        }
        check_degrees("minDeg", min_deg)?;
        check_degrees("maxDeg", max_deg)?;
        let Some(state) = self.state_mut() else {
            return Ok(0);
        };
        let pitch = params.row_pitch as f64;
        let mut accumulated = 0.0f64;
        let mut slope = 0.0f64;
        let mut touched = 0;
        for row in 0..state.rows {
            if row % seg_len == 0 {
                let u: f64 = rng.gen();
                slope = (min_deg + (max_deg - min_deg) * u).to_radians().tan();
            }
            if row > 0 {
                accumulated += slope * pitch;
            }
            let lift = accumulated as f32;
            for tile in state.row_tiles_mut(row) {
                tile.height += lift;
                touched += 1;
            }
        }
        Ok(touched)
    }

    fn set_margin_start(&mut self, n: u32) -> u64 {
        let Some(state) = self.state_mut() else {
            return 0;
        };
        state.margin_start = n;
        n.min(state.rows) as u64
    }

    fn set_margin_end(&mut self, n: u32) -> u64 {
        let Some(state) = self.state_mut() else {
            return 0;
        };
        state.margin_end = n;
        n.min(state.rows) as u64
    }

    fn smooth_columns(&mut self, passes: u32) -> Result<u64, ExecErrorKind> {
        if passes == 0 {
            return Err(invalid("passes must be at least 1"));
        }
        let Some(state) = self.state_mut() else {
            return Ok(0);
        };
        let mut touched = 0;
        for col in 0..state.cols {
            let rows: Vec<u32> = (0..state.rows)
                .filter(|&row| state.get(row, col).is_some())
                .collect();
            let mut heights: Vec<f32> = rows
                .iter()
                .filter_map(|&row| state.get(row, col).map(|t| t.height))
                .collect();
            for _ in 0..passes {
                heights = smooth_once(&heights);
            }
            for (&row, &h) in rows.iter().zip(&heights) {
                if let Some(tile) = state.get_mut(row, col) {
                    tile.height = h;
                }
            }
            touched += rows.len() as u64;
        }
        Ok(touched)
    }
}

/// One `[1/4, 1/2, 1/4]` pass; the ends reuse their own value for the
/// missing neighbour.
fn smooth_once(values: &[f32]) -> Vec<f32> {
    let last = values.len().saturating_sub(1);
    (0..values.len())
        .map(|i| {
            let prev = values[i.saturating_sub(1)];
            let next = values[(i + 1).min(last)];
            0.25 * prev + 0.5 * values[i] + 0.25 * next
        })
        .collect()
}

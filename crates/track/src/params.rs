//! Data-driven track geometry parameters.
//!
//! The kernel formulas read their scale factors from [`TrackParams`] rather
//! than from module constants, so a host can tune them (or load them from a
//! JSON file) without recompiling. Defaults match [`crate::config`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_COLS, DEFAULT_ROWS, LATERAL_SCALE, MAX_TILES, ROW_PITCH, TILE_WIDTH,
};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Lateral offset produced by `tan(angle) == 1`.
    pub lateral_scale: f32,
    /// Row spacing used when converting slope angles to heights.
    pub row_pitch: f32,
    /// Width of one tile across the track.
    pub tile_width: f32,
    /// Grid used when a rebuild does not name one.
    pub default_rows: u32,
    pub default_cols: u32,
    /// Upper bound on `rows * cols`.
    pub max_tiles: u64,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            lateral_scale: LATERAL_SCALE,
            row_pitch: ROW_PITCH,
            tile_width: TILE_WIDTH,
            default_rows: DEFAULT_ROWS,
            default_cols: DEFAULT_COLS,
            max_tiles: MAX_TILES,
        }
    }
}

impl TrackParams {
    /// Parse parameters from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("TrackParams JSON error: {e}"))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

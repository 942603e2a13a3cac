//! Deterministic digest of a track grid.
//!
//! Two executions of the same plan on the same parameters must produce the
//! same digest; replay and the integration tests compare grids through it.

use xxhash_rust::xxh32::xxh32;

use crate::kernel::TrackGrid;

const DIGEST_SEED: u32 = 0x7472_6b31;

/// xxh32 over the grid dimensions, margins and every slot (float bit patterns,
/// holes marked explicitly). An unbuilt grid hashes the empty byte string.
pub fn grid_digest(grid: &TrackGrid) -> u32 {
    let Some(state) = grid.state() else {
        return xxh32(&[], DIGEST_SEED);
    };
    let mut bytes = Vec::with_capacity(16 + state.slots().len() * 9);
    bytes.extend_from_slice(&state.rows.to_le_bytes());
    bytes.extend_from_slice(&state.cols.to_le_bytes());
    bytes.extend_from_slice(&state.margin_start.to_le_bytes());
    bytes.extend_from_slice(&state.margin_end.to_le_bytes());
    for slot in state.slots() {
        match slot {
            Some(tile) => {
                bytes.push(1);
                bytes.extend_from_slice(&tile.lateral.to_bits().to_le_bytes());
                bytes.extend_from_slice(&tile.height.to_bits().to_le_bytes());
            }
            None => bytes.push(0),
        }
    }
    xxh32(&bytes, DIGEST_SEED)
}

/// Grid synthesized when a rebuild names no dimensions, or when an amended
/// plan would otherwise be empty.
pub const DEFAULT_ROWS: u32 = 100;
pub const DEFAULT_COLS: u32 = 3;

/// Seed used when a plan carries no `seed` op.
pub const DEFAULT_SEED: u64 = 42;

/// Lateral world units per unit of `tan(angle)` for curves and bends.
pub const LATERAL_SCALE: f32 = 4.0;
/// Distance between consecutive rows along the track, in world units.
pub const ROW_PITCH: f32 = 4.0;
/// Width of one tile across the track, in world units.
pub const TILE_WIDTH: f32 = 4.0;

/// Upper bound on `rows * cols` accepted by `buildAbs`.
pub const MAX_TILES: u64 = 4_000_000;

/// Exclusive bound on the magnitude of curve and slope angles, in degrees.
pub const DEGREE_LIMIT: f64 = 90.0;

/// Clamp range for the first-lobe share of an S-bend.
pub const SBEND_RATIO_MIN: f64 = 0.05;
pub const SBEND_RATIO_MAX: f64 = 0.95;

/// Capacity of the [`crate::pipeline::EditResultLog`] ring buffer.
pub const EDIT_LOG_CAPACITY: usize = 64;

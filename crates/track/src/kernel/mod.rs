//! Execution kernel: the track grid, its deterministic RNG and the
//! primitives that mutate it.

pub mod executor;
pub mod grid;
pub mod primitives;
pub mod results;
pub mod rng;

pub use executor::{execute_plan, plan_seed};
pub use grid::{GridState, Tile, TrackGrid};
pub use primitives::TileKernel;
pub use results::{ExecErrorKind, ExecutionOpError, OpReport};
pub use rng::TrackRng;

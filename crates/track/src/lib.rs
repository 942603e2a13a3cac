//! Natural-language track editing.
//!
//! Designer text is normalized, matched against a data-driven rule
//! repository, merged into the persisted plan, expanded into primitives and
//! executed against a tile grid. [`pipeline::TrackEditPipeline`] runs one
//! request end to end; [`TrackEditPlugin`] drives it from a Bevy app.

pub mod amend;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod expand;
pub mod kernel;
pub mod normalize;
pub mod params;
pub mod pipeline;
pub mod plan;
pub mod rules;
pub mod seeding;
pub mod state_hash;
pub mod store;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use kernel::{GridState, Tile, TrackGrid, TrackRng};
pub use params::TrackParams;
pub use pipeline::{
    EditOutcome, EditQueue, EditRequest, EditResult, EditResultLog, EditSource, PipelineConfig,
    PipelineError, TrackEditPipeline, TrackEditPlugin,
};
pub use plan::{ParseMode, Plan, TrackOp};
pub use rules::RuleRepository;
pub use store::{MemoryPlanStore, PlanStore, StoreError};

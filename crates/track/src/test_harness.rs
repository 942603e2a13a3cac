//! # TestTrack: headless integration test harness
//!
//! Provides a fluent builder that wraps `bevy::app::App` + `TrackEditPlugin`
//! so edit requests can be pushed through the queue and the resulting grid
//! inspected without a window or renderer.

use bevy::app::App;
use bevy::prelude::*;

use crate::config::DEFAULT_SEED;
use crate::kernel::{GridState, TrackGrid};
use crate::params::TrackParams;
use crate::pipeline::{
    ActivePlanStore, ActiveRules, ActiveSeedLog, EditOutcome, EditQueue, EditRequest, EditResult,
    EditResultLog, PipelineConfig, TrackEditPlugin,
};
use crate::plan::ParseMode;
use crate::seeding::{FixedSeed, MemorySeedLog};
use crate::state_hash::grid_digest;
use crate::store::MemoryPlanStore;

/// A headless Bevy App wrapping `TrackEditPlugin` for integration testing.
///
/// Seeds synthesized during a test come from a fixed source, so every run of
/// a test sees the same grid.
pub struct TestTrack {
    app: App,
}

impl Default for TestTrack {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTrack {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty session: built-in rules, no persisted plan, no grid.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);

        // Insert BEFORE the plugin so init_resource keeps these.
        app.insert_resource(ActiveSeedLog {
            log: Box::new(MemorySeedLog::default()),
            source: Box::new(FixedSeed(DEFAULT_SEED)),
        });
        app.add_plugins(TrackEditPlugin);
        app.update();

        Self { app }
    }

    /// Start from an already persisted plan.
    pub fn with_plan(mut self, text: &str) -> Self {
        self.app
            .insert_resource(ActivePlanStore(Box::new(MemoryPlanStore::with_text(text))));
        self
    }

    pub fn with_rules_json(mut self, json: &str) -> Self {
        self.app.insert_resource(ActiveRules::from_json_str(json));
        self
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.app.insert_resource(PipelineConfig { parse_mode });
        self
    }

    pub fn with_params(mut self, params: TrackParams) -> Self {
        self.app.insert_resource(params);
        self
    }

    /// Seed returned for every synthesized `seed` op.
    pub fn with_seed_source(mut self, seed: u64) -> Self {
        self.app.world_mut().resource_mut::<ActiveSeedLog>().source = Box::new(FixedSeed(seed));
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Queue one designer request and run a single update.
    pub fn edit(&mut self, text: &str) -> EditResult {
        self.app
            .world_mut()
            .resource_mut::<EditQueue>()
            .push_request(EditRequest::designer(text));
        self.app.update();
        self.last_result()
    }

    /// Queue several requests and apply them in one update.
    pub fn edit_all(&mut self, texts: &[&str]) {
        {
            let mut queue = self.app.world_mut().resource_mut::<EditQueue>();
            for text in texts {
                queue.push_request(EditRequest::designer(*text));
            }
        }
        self.app.update();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn grid(&self) -> &TrackGrid {
        self.resource::<TrackGrid>()
    }

    pub fn state(&self) -> &GridState {
        self.grid()
            .state()
            .unwrap_or_else(|| panic!("no grid has been built"))
    }

    pub fn digest(&self) -> u32 {
        grid_digest(self.grid())
    }

    /// The persisted plan text, empty when nothing was saved.
    pub fn plan_text(&self) -> String {
        self.resource::<ActivePlanStore>()
            .0
            .load()
            .unwrap_or_else(|e| panic!("plan store failed: {e}"))
            .unwrap_or_default()
    }

    pub fn last_result(&self) -> EditResult {
        self.resource::<EditResultLog>()
            .last()
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| panic!("no edit has been applied"))
    }

    pub fn last_outcome(&self) -> EditOutcome {
        match self.last_result() {
            EditResult::Applied(outcome) => *outcome,
            EditResult::Failed { stage, message } => {
                panic!("last edit failed at {stage}: {message}")
            }
        }
    }

    pub fn tile_count(&self) -> u64 {
        self.grid().tile_count()
    }

    /// Rows that still hold at least one tile.
    pub fn rows_with_tiles(&self) -> Vec<u32> {
        let state = self.state();
        (0..state.rows)
            .filter(|&row| state.row_tile_count(row) > 0)
            .collect()
    }

    pub fn seed_log_len(&self) -> usize {
        self.resource::<ActiveSeedLog>()
            .log
            .entries()
            .map(|entries| entries.len())
            .unwrap_or_else(|e| panic!("seed log failed: {e}"))
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_tile_count(&self, expected: u64) {
        let actual = self.tile_count();
        assert_eq!(actual, expected, "expected {expected} tiles, found {actual}");
    }

    pub fn assert_dims(&self, rows: u32, cols: u32) {
        assert_eq!(self.grid().dims(), Some((rows, cols)));
    }

    pub fn assert_tile(&self, row: u32, col: u32) {
        assert!(
            self.state().get(row, col).is_some(),
            "expected a tile at row {row}, col {col}"
        );
    }

    pub fn assert_hole(&self, row: u32, col: u32) {
        assert!(
            self.state().get(row, col).is_none(),
            "expected a hole at row {row}, col {col}"
        );
    }

    pub fn assert_row_empty(&self, row: u32) {
        assert_eq!(
            self.state().row_tile_count(row),
            0,
            "expected row {row} to be empty"
        );
    }

    pub fn assert_plan_text(&self, expected: &str) {
        assert_eq!(self.plan_text(), expected);
    }

    pub fn assert_last_failed_at(&self, expected_stage: &str) {
        match self.last_result() {
            EditResult::Failed { stage, .. } => assert_eq!(stage, expected_stage),
            EditResult::Applied(_) => panic!("expected the last edit to fail at {expected_stage}"),
        }
    }
}

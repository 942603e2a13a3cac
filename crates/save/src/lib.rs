//! File-backed persistence for the track edit pipeline: the plan file, the
//! seed log, the rule repository file and compressed grid snapshots.

mod atomic_write;
pub mod plan_files;
pub mod rules_file;
pub mod snapshot;

use std::path::PathBuf;

use bevy::prelude::*;

use track::pipeline::{
    apply_queued_edits, ActivePlanStore, ActiveSeedLog, EditResultLog,
};
use track::seeding::SystemClockSeed;
use track::TrackGrid;

pub use atomic_write::atomic_write;
pub use plan_files::{FilePlanStore, FileSeedLog};
pub use rules_file::{active_rules_from_file, read_rules};
pub use snapshot::{read_snapshot, write_snapshot, GridSnapshot};

/// Where the session's files live.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SavePaths {
    pub plan: PathBuf,
    pub seed_log: PathBuf,
    /// Rule repository JSON; the built-in rules are used when unset.
    pub rules: Option<PathBuf>,
    /// Snapshot written after every batch of applied edits.
    pub snapshot: Option<PathBuf>,
}

impl Default for SavePaths {
    fn default() -> Self {
        Self {
            plan: PathBuf::from("track.plan"),
            seed_log: PathBuf::from("track.seeds.jsonl"),
            rules: None,
            snapshot: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Swaps the in-memory stores of `TrackEditPlugin` for files. Add it after
/// `TrackEditPlugin`.
#[derive(Default)]
pub struct SavePlugin {
    pub paths: SavePaths,
}

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        let paths = self.paths.clone();

        app.insert_resource(ActivePlanStore(Box::new(FilePlanStore::new(&paths.plan))));
        app.insert_resource(ActiveSeedLog {
            log: Box::new(FileSeedLog::new(&paths.seed_log)),
            source: Box::new(SystemClockSeed),
        });
        if let Some(rules) = &paths.rules {
            app.insert_resource(active_rules_from_file(rules));
        }

        app.insert_resource(paths).add_systems(
            Update,
            snapshot_after_edits
                .after(apply_queued_edits)
                .run_if(resource_changed::<EditResultLog>),
        );
    }
}

/// Writes a [`GridSnapshot`] of the current grid when a snapshot path is set.
fn snapshot_after_edits(
    paths: Res<SavePaths>,
    grid: Res<TrackGrid>,
    store: Res<ActivePlanStore>,
) {
    let Some(path) = &paths.snapshot else {
        return;
    };
    let plan_text = match store.0.load() {
        Ok(text) => text.unwrap_or_default(),
        Err(e) => {
            warn!("snapshot skipped, plan unreadable: {e}");
            return;
        }
    };
    match write_snapshot(path, &GridSnapshot::capture(&grid, &plan_text)) {
        Ok(()) => info!("wrote grid snapshot to {}", path.display()),
        Err(e) => warn!("failed to write grid snapshot {}: {e}", path.display()),
    }
}

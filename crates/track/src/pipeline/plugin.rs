//! Plugin that wires up the edit pipeline: the grid, the session state the
//! pipeline borrows, the request queue and the result log.

use bevy::prelude::*;

use super::{
    EditQueue, EditResult, EditResultLog, PipelineConfig, PipelineError, TrackEditPipeline,
};
use crate::kernel::{TrackGrid, TrackRng};
use crate::params::TrackParams;
use crate::rules::{RuleLoadError, RuleRepository};
use crate::seeding::{MemorySeedLog, SeedLog, SeedSource, SystemClockSeed};
use crate::store::{MemoryPlanStore, PlanStore};

/// The rule repository of the session, or the reason it failed to load.
///
/// Requests applied while the repository is broken fail at the `rules`
/// stage; nothing else is touched.
#[derive(Resource, Debug, Clone)]
pub struct ActiveRules {
    loaded: Result<RuleRepository, RuleLoadError>,
}

impl Default for ActiveRules {
    fn default() -> Self {
        Self {
            loaded: RuleRepository::builtin(),
        }
    }
}

impl ActiveRules {
    pub fn from_json_str(json: &str) -> Self {
        Self {
            loaded: RuleRepository::from_json_str(json),
        }
    }

    pub fn from_repository(repository: RuleRepository) -> Self {
        Self {
            loaded: Ok(repository),
        }
    }

    pub fn from_error(error: RuleLoadError) -> Self {
        Self { loaded: Err(error) }
    }

    pub fn repository(&self) -> Result<&RuleRepository, &RuleLoadError> {
        self.loaded.as_ref()
    }

    /// Replace the repository with a freshly parsed document.
    pub fn reload(&mut self, json: &str) {
        self.loaded = RuleRepository::from_json_str(json);
        match &self.loaded {
            Ok(repo) => info!("reloaded rule repository: {} rule(s)", repo.len()),
            Err(e) => warn!("rule repository reload failed: {e}"),
        }
    }
}

/// The persisted plan the pipeline amends.
#[derive(Resource)]
pub struct ActivePlanStore(pub Box<dyn PlanStore>);

impl Default for ActivePlanStore {
    fn default() -> Self {
        Self(Box::new(MemoryPlanStore::default()))
    }
}

/// Where synthesized seeds come from and where they are recorded.
#[derive(Resource)]
pub struct ActiveSeedLog {
    pub log: Box<dyn SeedLog>,
    pub source: Box<dyn SeedSource>,
}

impl Default for ActiveSeedLog {
    fn default() -> Self {
        Self {
            log: Box::new(MemorySeedLog::default()),
            source: Box::new(SystemClockSeed),
        }
    }
}

/// Registers the pipeline resources and the queue-draining system.
pub struct TrackEditPlugin;

impl Plugin for TrackEditPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrackGrid>()
            .init_resource::<TrackRng>()
            .init_resource::<TrackParams>()
            .init_resource::<PipelineConfig>()
            .init_resource::<ActiveRules>()
            .init_resource::<ActivePlanStore>()
            .init_resource::<ActiveSeedLog>()
            .init_resource::<EditQueue>()
            .init_resource::<EditResultLog>();

        app.add_systems(Update, apply_queued_edits);
    }
}

/// Drains the [`EditQueue`] and runs every request through the pipeline in
/// order, recording each result in the [`EditResultLog`].
#[allow(clippy::too_many_arguments)]
pub fn apply_queued_edits(
    mut queue: ResMut<EditQueue>,
    mut results: ResMut<EditResultLog>,
    mut grid: ResMut<TrackGrid>,
    mut rng: ResMut<TrackRng>,
    mut store: ResMut<ActivePlanStore>,
    mut seeding: ResMut<ActiveSeedLog>,
    rules: Res<ActiveRules>,
    params: Res<TrackParams>,
    config: Res<PipelineConfig>,
) {
    if queue.is_empty() {
        return;
    }
    let requests = queue.drain();

    let repository = match rules.repository() {
        Ok(repository) => repository,
        Err(e) => {
            for request in requests {
                results.push(request, failure(&PipelineError::Rules(e.clone())));
            }
            return;
        }
    };

    let ActiveSeedLog { log, source } = &mut *seeding;
    let mut pipeline = TrackEditPipeline::new(repository, &params, *config, source.as_mut());

    for request in requests {
        let result = match pipeline.run(
            &request,
            store.0.as_mut(),
            log.as_mut(),
            &mut grid,
            &mut rng,
        ) {
            Ok(outcome) => {
                info!(
                    "edit applied: {} op(s), digest {:08x}",
                    outcome.reports.len(),
                    outcome.digest
                );
                EditResult::Applied(Box::new(outcome))
            }
            Err(e) => {
                warn!("edit failed at {}: {e}", e.stage());
                failure(&e)
            }
        };
        results.push(request, result);
    }
}

fn failure(error: &PipelineError) -> EditResult {
    EditResult::Failed {
        stage: error.stage().to_string(),
        message: error.to_string(),
    }
}

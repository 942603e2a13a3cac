//! The edit pipeline facade.
//!
//! One request runs normalize, compile, load, amend, auto-seed, save, expand
//! and execute, in that order. The plan is written only once every stage
//! before it has succeeded, so a failed request never replaces the persisted
//! plan with a partial one.
//!
//! The persisted plan keeps its macros. `rejoin` narrows the gap left by the
//! preceding `ySplit`, which only expansion of the whole plan can see, so
//! expansion happens again on every request and on replay.

pub mod error;
pub mod plugin;
pub mod queue;
pub mod result_log;

pub use error::PipelineError;
pub use plugin::{
    apply_queued_edits, ActivePlanStore, ActiveRules, ActiveSeedLog, TrackEditPlugin,
};
pub use queue::{EditQueue, EditRequest, EditSource};
pub use result_log::{EditResult, EditResultLog};

use bevy::log::{info, warn};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::amend::{amend, AmendSummary};
use crate::compiler::compile;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::expand::expand;
use crate::kernel::{execute_plan, OpReport, TrackGrid, TrackRng};
use crate::normalize::normalize;
use crate::params::TrackParams;
use crate::plan::{ParseMode, Plan};
use crate::rules::RuleRepository;
use crate::seeding::{auto_seed, SeedLog, SeedSource};
use crate::state_hash::grid_digest;
use crate::store::PlanStore;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How the persisted plan is parsed before amendment.
    pub parse_mode: ParseMode,
}

/// Everything one successful edit produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditOutcome {
    /// The plan as saved.
    pub plan: Plan,
    /// `plan` with its macros expanded, as executed.
    pub executed: Plan,
    pub diagnostics: Diagnostics,
    pub summary: AmendSummary,
    pub reports: Vec<OpReport>,
    /// [`grid_digest`] of the grid after execution.
    pub digest: u32,
}

/// Result of re-executing the persisted plan without editing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub plan: Plan,
    pub executed: Plan,
    pub diagnostics: Diagnostics,
    pub reports: Vec<OpReport>,
    pub digest: u32,
}

/// Borrowed session state shared by every request: the loaded rules, the
/// geometry parameters, the parse policy and the seed source used when a
/// plan needs a synthesized seed.
pub struct TrackEditPipeline<'a> {
    rules: &'a RuleRepository,
    params: &'a TrackParams,
    config: PipelineConfig,
    seeds: &'a mut dyn SeedSource,
}

impl<'a> TrackEditPipeline<'a> {
    pub fn new(
        rules: &'a RuleRepository,
        params: &'a TrackParams,
        config: PipelineConfig,
        seeds: &'a mut dyn SeedSource,
    ) -> Self {
        Self {
            rules,
            params,
            config,
            seeds,
        }
    }

    /// Run one edit request end to end.
    ///
    /// An execution failure is reported after the plan has been saved: the
    /// plan is valid text, only one of its ops could not be applied.
    pub fn run(
        &mut self,
        request: &EditRequest,
        store: &mut dyn PlanStore,
        seed_log: &mut dyn SeedLog,
        grid: &mut TrackGrid,
        rng: &mut TrackRng,
    ) -> Result<EditOutcome, PipelineError> {
        let normalized = normalize(&request.text);
        let compiled = compile(&normalized, self.rules);
        let mut diagnostics = compiled.diagnostics;

        let previous = self.load_previous(store, &mut diagnostics)?;

        let amendment = amend(
            &previous,
            &compiled.ops,
            compiled.creation_intent,
            (self.params.default_rows, self.params.default_cols),
        );
        for dropped in &amendment.summary.dropped {
            diagnostics.info(
                DiagnosticKind::Amendment,
                format!("dropped `{}`: {}", dropped.line, dropped.reason),
            );
        }
        if amendment.summary.synthesized_create {
            diagnostics.info(
                DiagnosticKind::Amendment,
                format!(
                    "synthesized buildAbs({},{})",
                    self.params.default_rows, self.params.default_cols
                ),
            );
        }

        let seeded = auto_seed(amendment.plan, &mut *self.seeds, &mut diagnostics);
        let plan = seeded.plan;

        store.save(&plan.to_text())?;
        info!(
            "saved plan with {} op(s) ({}) from {:?} request",
            plan.len(),
            amendment.summary,
            request.source
        );
        if let Some(entry) = seeded.entry {
            // The seed is in the saved plan; only the log entry is lost.
            if let Err(e) = seed_log.append(&entry) {
                diagnostics.error(
                    DiagnosticKind::Seeding,
                    format!("seed({}) not recorded in the seed log: {e}", entry.seed),
                );
            }
        }

        let executed = expand(&plan, self.params.default_cols, &mut diagnostics);
        let reports = execute_plan(&executed, grid, rng, self.params).map_err(|e| {
            warn!("{e}");
            PipelineError::Execution(e)
        })?;

        Ok(EditOutcome {
            digest: grid_digest(grid),
            plan,
            executed,
            diagnostics,
            summary: amendment.summary,
            reports,
        })
    }

    /// Execute the persisted plan as it stands. Nothing is written.
    pub fn replay(
        &self,
        store: &dyn PlanStore,
        grid: &mut TrackGrid,
        rng: &mut TrackRng,
    ) -> Result<ReplayOutcome, PipelineError> {
        let mut diagnostics = Diagnostics::default();
        let plan = self.load_previous(store, &mut diagnostics)?;
        let executed = expand(&plan, self.params.default_cols, &mut diagnostics);
        let reports = execute_plan(&executed, grid, rng, self.params)?;
        Ok(ReplayOutcome {
            digest: grid_digest(grid),
            plan,
            executed,
            diagnostics,
            reports,
        })
    }

    fn load_previous(
        &self,
        store: &dyn PlanStore,
        diagnostics: &mut Diagnostics,
    ) -> Result<Plan, PipelineError> {
        match store.load()? {
            Some(text) => Ok(Plan::parse(&text, self.config.parse_mode, diagnostics)?),
            None => Ok(Plan::default()),
        }
    }
}

//! Auto-seeding: plans that draw random numbers always carry an explicit
//! `seed` so that replaying them reproduces the same grid.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::plan::{Plan, TrackOp};
use crate::store::StoreError;

/// Largest seed a plan line can carry.
pub const MAX_SEED: u64 = i64::MAX as u64;

/// Where synthesized seeds come from.
pub trait SeedSource: Send + Sync {
    fn next_seed(&mut self) -> u64;

    /// Seconds since the Unix epoch, recorded in the seed log.
    fn timestamp(&self) -> u64 {
        unix_now()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Seeds from the wall clock's nanoseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClockSeed;

impl SeedSource for SystemClockSeed {
    fn next_seed(&mut self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

/// Always yields the same seed and a zero timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSeed(pub u64);

impl SeedSource for FixedSeed {
    fn next_seed(&mut self) -> u64 {
        self.0
    }

    fn timestamp(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedLogEntry {
    pub timestamp: u64,
    pub seed: u64,
    pub reason: String,
}

/// Append-only record of every synthesized seed.
pub trait SeedLog: Send + Sync {
    fn append(&mut self, entry: &SeedLogEntry) -> Result<(), StoreError>;
    fn entries(&self) -> Result<Vec<SeedLogEntry>, StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySeedLog {
    entries: Vec<SeedLogEntry>,
}

impl SeedLog for MemorySeedLog {
    fn append(&mut self, entry: &SeedLogEntry) -> Result<(), StoreError> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<SeedLogEntry>, StoreError> {
        Ok(self.entries.clone())
    }
}

/// A plan after auto-seeding, with the log entry to record once the plan has
/// been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SeededPlan {
    pub plan: Plan,
    pub entry: Option<SeedLogEntry>,
}

/// Prepend `seed(n)` to a plan that uses randomness but names no seed. Other
/// plans are returned unchanged and without an entry.
pub fn auto_seed(
    plan: Plan,
    source: &mut dyn SeedSource,
    diagnostics: &mut Diagnostics,
) -> SeededPlan {
    if !plan.contains_random() || plan.has_seed() {
        return SeededPlan { plan, entry: None };
    }

    let seed = source.next_seed() & MAX_SEED;
    let random_ops: Vec<&str> = plan
        .ops
        .iter()
        .filter(|op| op.is_random())
        .map(TrackOp::name)
        .collect();
    let entry = SeedLogEntry {
        timestamp: source.timestamp(),
        seed,
        reason: format!("plan uses {} without a seed", random_ops.join(", ")),
    };
    diagnostics.info(DiagnosticKind::Seeding, format!("synthesized seed({seed})"));

    let mut ops = Vec::with_capacity(plan.len() + 1);
    ops.push(TrackOp::Seed { value: seed });
    ops.extend(plan.ops);
    SeededPlan {
        plan: Plan::new(ops),
        entry: Some(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_plan() -> Plan {
        Plan::new(vec![
            TrackOp::BuildAbs { rows: 10, cols: 3 },
            TrackOp::RandomHoles { pct: 10.0 },
        ])
    }

    #[test]
    fn random_plan_without_seed_gets_one() {
        let mut diags = Diagnostics::default();
        let seeded = auto_seed(random_plan(), &mut FixedSeed(77), &mut diags);
        assert_eq!(seeded.plan.ops[0], TrackOp::Seed { value: 77 });
        assert_eq!(seeded.plan.len(), 3);

        let entry = seeded.entry.unwrap();
        assert_eq!(entry.seed, 77);
        assert_eq!(entry.timestamp, 0);
        assert!(entry.reason.contains("randomHoles"));
        assert_eq!(diags.of_kind(DiagnosticKind::Seeding).count(), 1);
    }

    #[test]
    fn seeded_plan_is_untouched() {
        let mut plan = random_plan();
        plan.ops.push(TrackOp::Seed { value: 5 });
        let mut diags = Diagnostics::default();
        let out = auto_seed(plan.clone(), &mut FixedSeed(1), &mut diags);
        assert_eq!(out.plan, plan);
        assert!(out.entry.is_none());
    }

    #[test]
    fn deterministic_plan_is_untouched() {
        let plan = Plan::new(vec![TrackOp::BuildAbs { rows: 10, cols: 3 }]);
        let mut diags = Diagnostics::default();
        let out = auto_seed(plan.clone(), &mut FixedSeed(1), &mut diags);
        assert_eq!(out.plan, plan);
        assert!(out.entry.is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn synthesized_seed_fits_a_plan_line() {
        let mut diags = Diagnostics::default();
        let plan = auto_seed(random_plan(), &mut FixedSeed(u64::MAX), &mut diags).plan;
        let TrackOp::Seed { value } = plan.ops[0] else {
            panic!("expected a seed op first");
        };
        assert_eq!(value, MAX_SEED);
        let line = plan.ops[0].to_string();
        assert_eq!(crate::plan::parse_line(&line).unwrap(), plan.ops[0]);
    }
}

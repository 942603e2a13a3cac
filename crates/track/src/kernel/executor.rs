use bevy::log::{debug, info};

use super::primitives::TileKernel;
use super::results::{ExecErrorKind, ExecutionOpError, OpReport};
use super::rng::TrackRng;
use crate::config::DEFAULT_SEED;
use crate::params::TrackParams;
use crate::plan::{OpKind, Plan, TrackOp};

/// Seed the random stream for `plan`: its first `seed` op, else the default.
pub fn plan_seed(plan: &Plan) -> u64 {
    plan.ops
        .iter()
        .find_map(|op| match op {
            TrackOp::Seed { value } => Some(*value),
            _ => None,
        })
        .unwrap_or(DEFAULT_SEED)
}

/// Apply the primitives of an expanded plan in order.
///
/// The RNG is reseeded once up front. Execution stops at the first failing
/// op; mutations made before it stay in place and their reports travel with
/// the error.
pub fn execute_plan<K: TileKernel>(
    plan: &Plan,
    kernel: &mut K,
    rng: &mut TrackRng,
    params: &TrackParams,
) -> Result<Vec<OpReport>, ExecutionOpError> {
    let seed = plan_seed(plan);
    rng.reseed(seed);
    debug!("executing {} op(s) with seed {seed}", plan.len());

    let mut reports = Vec::with_capacity(plan.len());
    let mut seeded = false;

    for (index, op) in plan.ops.iter().enumerate() {
        match apply_op(op, kernel, rng, params, &mut seeded) {
            Ok((affected, note)) => reports.push(OpReport {
                index,
                op: op.to_string(),
                affected,
                note,
            }),
            Err(kind) => {
                return Err(ExecutionOpError {
                    index,
                    op: op.to_string(),
                    kind,
                    completed: reports,
                })
            }
        }
    }

    info!(
        "executed {} op(s), {} tile(s) affected",
        reports.len(),
        reports.iter().map(|r| r.affected).sum::<u64>()
    );
    Ok(reports)
}

fn apply_op<K: TileKernel>(
    op: &TrackOp,
    kernel: &mut K,
    rng: &mut TrackRng,
    params: &TrackParams,
    seeded: &mut bool,
) -> Result<(u64, Option<String>), ExecErrorKind> {
    match op.kind() {
        OpKind::Macro => return Err(ExecErrorKind::UnexpandedMacro),
        OpKind::Fill => return Err(ExecErrorKind::FillDirective),
        OpKind::Seed => {
            let note = if *seeded {
                "ignored: stream already seeded by an earlier seed op"
            } else {
                "random stream seeded"
            };
            *seeded = true;
            return Ok((0, Some(note.to_string())));
        }
        OpKind::Create | OpKind::Primitive => {}
    }

    if !matches!(op, TrackOp::BuildAbs { .. }) && !kernel.is_built() {
        return Ok((0, Some("no grid built yet".to_string())));
    }

    let affected = match op {
        TrackOp::BuildAbs { rows, cols } => kernel.build(*rows, *cols, params)?,
        TrackOp::DeleteRows { a, b } => kernel.delete_rows(*a, *b),
        TrackOp::DeleteTiles { cols, row } => kernel.delete_tiles(cols, *row),
        TrackOp::RandomHoles { pct } => kernel.random_holes(*pct, &mut rng.0)?,
        TrackOp::InsertJumpGaps { n } => kernel.insert_jump_gaps(*n),
        TrackOp::CurveRows { a, b, dir, deg } => kernel.curve_rows(*a, *b, *dir, *deg, params)?,
        TrackOp::SBend {
            a,
            b,
            deg,
            gain,
            ratio,
        } => kernel.s_bend(*a, *b, *deg, *gain, *ratio, params)?,
        TrackOp::SlopesRandomAuto {
            min_deg,
            max_deg,
            seg_len,
        } => kernel.slopes_random_auto(*min_deg, *max_deg, *seg_len, &mut rng.0, params)?,
        TrackOp::SafeMarginStart { n } => kernel.set_margin_start(*n),
        TrackOp::SafeMarginEnd { n } => kernel.set_margin_end(*n),
        TrackOp::SmoothColumns { passes } => kernel.smooth_columns(*passes)?,
        TrackOp::Seed { .. }
        | TrackOp::YSplit { .. }
        | TrackOp::Rejoin { .. }
        | TrackOp::SmoothHeights { .. }
        | TrackOp::FillAll
        | TrackOp::FillRows { .. }
        | TrackOp::FillTiles { .. } => 0,
    };
    Ok((affected, None))
}

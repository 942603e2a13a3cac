//! Rewrites composite ops (`ySplit`, `rejoin`, `smoothHeights`) into kernel
//! primitives.
//!
//! Expansion looks only at the plan itself: the track width comes from the
//! most recent `buildAbs` before each macro, never from a live grid.

use bevy::log::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::plan::{Plan, TrackOp};

/// Layout known at a given point of the plan.
#[derive(Debug, Clone, Copy)]
struct Declared {
    rows: Option<u32>,
    width: Option<u32>,
    /// Gap width left open by the last fork, consumed by `rejoin`.
    current_gap: f64,
}

/// Expand every macro in `plan`. Non-macro ops pass through unchanged, so
/// expanding an already expanded plan returns it as is.
pub fn expand(plan: &Plan, default_width: u32, diagnostics: &mut Diagnostics) -> Plan {
    let mut state = Declared {
        rows: None,
        width: None,
        current_gap: 0.0,
    };
    let mut out = Vec::with_capacity(plan.len());

    for op in &plan.ops {
        match op {
            TrackOp::BuildAbs { rows, cols } => {
                state = Declared {
                    rows: Some(*rows),
                    width: Some(*cols),
                    current_gap: 0.0,
                };
                out.push(op.clone());
            }
            TrackOp::YSplit {
                a,
                b,
                gap_start,
                gap_end,
            } => {
                let width = width_for(op, &state, default_width, diagnostics);
                let before = out.len();
                let last = for_each_row(*a, *b, state.rows, |row, t| {
                    let w = (gap_start + (gap_end - gap_start) * t)
                        .round()
                        .clamp(1.0, width as f64) as u32;
                    out.push(centered_gap(w, width, row));
                    w as f64
                });
                if let Some(w) = last {
                    state.current_gap = w;
                }
                debug!("expanded {op} into {} deleteTiles", out.len() - before);
            }
            TrackOp::Rejoin { a, b, target } => {
                let width = width_for(op, &state, default_width, diagnostics);
                let from = state.current_gap;
                let to = target.clamp(0.0, width as f64);
                for_each_row(*a, *b, state.rows, |row, t| {
                    let w = (from + (to - from) * t).round().clamp(0.0, width as f64) as u32;
                    if w > 0 {
                        out.push(centered_gap(w, width, row));
                    }
                    w as f64
                });
                state.current_gap = to;
            }
            TrackOp::SmoothHeights { passes } => {
                out.push(TrackOp::SmoothColumns { passes: *passes });
            }
            other => out.push(other.clone()),
        }
    }

    Plan::new(out)
}

fn width_for(op: &TrackOp, state: &Declared, default_width: u32, diags: &mut Diagnostics) -> u32 {
    match state.width {
        Some(w) => w.max(1),
        None => {
            diags.warn(
                DiagnosticKind::Expansion,
                format!("{op}: no preceding buildAbs, assuming width {default_width}"),
            );
            default_width.max(1)
        }
    }
}

/// Visit rows `min(a,b)..=max(a,b)` with their interpolation parameter.
/// Rows at or beyond a declared row count are skipped.
fn for_each_row(
    a: u32,
    b: u32,
    declared_rows: Option<u32>,
    mut visit: impl FnMut(u32, f64) -> f64,
) -> Option<f64> {
    let (lo, hi) = (a.min(b), a.max(b));
    let span = (hi - lo) as f64;
    let end = match declared_rows {
        Some(0) => return None,
        Some(rows) => hi.min(rows - 1),
        None => hi,
    };
    let mut last = None;
    for row in lo..=end {
        let t = if hi == lo {
            1.0
        } else {
            (row - lo) as f64 / span
        };
        last = Some(visit(row, t));
    }
    last
}

/// `deleteTiles` for a gap of `w` columns centred in a track `width` wide.
/// When `width - w` is odd the gap sits one column closer to column 1.
fn centered_gap(w: u32, width: u32, row: u32) -> TrackOp {
    let start = (width - w) / 2 + 1;
    let end = (start + w - 1).min(width);
    TrackOp::DeleteTiles {
        cols: (start..=end).collect(),
        row,
    }
}

//! Merging a compiled request into the previously persisted plan.
//!
//! A request with a creation intent replaces the plan; any other request is
//! appended to the surviving previous lines after fill directives have
//! removed the deletions they override.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plan::{OpKind, Plan, TrackOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmendMode {
    Rebuild,
    Amend,
}

/// A previous plan line that did not survive amendment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedLine {
    pub line: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendSummary {
    pub mode: AmendMode,
    /// Previous lines carried into the new plan.
    pub kept: usize,
    /// Fresh ops appended (fill directives excluded).
    pub added: usize,
    /// Fill directives consumed.
    pub fills: usize,
    pub dropped: Vec<DroppedLine>,
    /// `buildAbs` inserted because the plan would otherwise lack one.
    pub synthesized_create: bool,
}

impl fmt::Display for AmendSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            AmendMode::Rebuild => "rebuild",
            AmendMode::Amend => "amend",
        };
        write!(
            f,
            "{mode}: kept {}, added {}, dropped {}",
            self.kept,
            self.added,
            self.dropped.len()
        )?;
        if self.fills > 0 {
            write!(f, ", {} fill directive(s)", self.fills)?;
        }
        if self.synthesized_create {
            f.write_str(", default grid synthesized")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Amendment {
    pub plan: Plan,
    pub summary: AmendSummary,
}

/// Merge `fresh` ops into `previous`.
///
/// `default_grid` is the `(rows, cols)` of the `buildAbs` synthesized when a
/// rebuild names no grid or the merged plan would be empty.
pub fn amend(
    previous: &Plan,
    fresh: &[TrackOp],
    creation_intent: bool,
    default_grid: (u32, u32),
) -> Amendment {
    let default_create = TrackOp::BuildAbs {
        rows: default_grid.0,
        cols: default_grid.1,
    };
    let (fills, mut additions): (Vec<&TrackOp>, Vec<&TrackOp>) =
        fresh.iter().partition(|op| op.kind() == OpKind::Fill);

    let mut summary = AmendSummary {
        mode: if creation_intent {
            AmendMode::Rebuild
        } else {
            AmendMode::Amend
        },
        kept: 0,
        added: additions.len(),
        fills: fills.len(),
        dropped: Vec::new(),
        synthesized_create: false,
    };

    let mut ops: Vec<TrackOp> = if creation_intent {
        summary.dropped = previous
            .ops
            .iter()
            .map(|op| DroppedLine {
                line: op.to_string(),
                reason: "rebuild discards the previous plan".to_string(),
            })
            .collect();

        match additions.iter().position(|op| op.kind() == OpKind::Create) {
            Some(idx) => {
                let create = additions.remove(idx);
                additions.insert(0, create);
            }
            None => {
                additions.insert(0, &default_create);
                summary.synthesized_create = true;
            }
        }
        additions.into_iter().cloned().collect()
    } else {
        let fresh_seed = additions
            .iter()
            .any(|op| matches!(op, TrackOp::Seed { .. }));
        let mut merged = Vec::with_capacity(previous.len() + additions.len());
        for op in &previous.ops {
            match drop_reason(op, &fills, fresh_seed) {
                Some(reason) => summary.dropped.push(DroppedLine {
                    line: op.to_string(),
                    reason,
                }),
                None => merged.push(op.clone()),
            }
        }
        summary.kept = merged.len();
        merged.extend(additions.into_iter().cloned());
        merged
    };

    if ops.is_empty() {
        ops.push(default_create);
        summary.synthesized_create = true;
    }

    Amendment {
        plan: Plan::new(ops),
        summary,
    }
}

fn drop_reason(previous: &TrackOp, fills: &[&TrackOp], fresh_seed: bool) -> Option<String> {
    if previous.kind() == OpKind::Fill {
        return Some("fill directives are not persisted".to_string());
    }
    if fresh_seed && matches!(previous, TrackOp::Seed { .. }) {
        return Some("superseded by a new seed".to_string());
    }
    fills
        .iter()
        .find(|fill| overrides(fill, previous))
        .map(|fill| format!("overridden by {fill}"))
}

/// Whether the fill directive `fill` cancels the previous line `previous`.
fn overrides(fill: &TrackOp, previous: &TrackOp) -> bool {
    match fill {
        TrackOp::FillAll => {
            previous.deleted_row_span().is_some()
                || matches!(
                    previous,
                    TrackOp::RandomHoles { .. } | TrackOp::InsertJumpGaps { .. }
                )
        }
        TrackOp::FillRows { a, b } => {
            let (lo, hi) = ((*a).min(*b), (*a).max(*b));
            previous
                .deleted_row_span()
                .is_some_and(|(p_lo, p_hi)| p_lo <= hi && lo <= p_hi)
        }
        TrackOp::FillTiles { cols, row } => match previous {
            TrackOp::DeleteRows { a, b } => (*a).min(*b) <= *row && *row <= (*a).max(*b),
            TrackOp::DeleteTiles {
                cols: deleted,
                row: deleted_row,
            } => deleted_row == row && deleted.iter().any(|c| cols.contains(c)),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Direction;

    const DEFAULT: (u32, u32) = (100, 3);

    fn plan(ops: Vec<TrackOp>) -> Plan {
        Plan::new(ops)
    }

    fn build(rows: u32) -> TrackOp {
        TrackOp::BuildAbs { rows, cols: 3 }
    }

    // -----------------------------------------------------------------------
    // Amend mode
    // -----------------------------------------------------------------------

    #[test]
    fn amend_appends_fresh_ops() {
        let previous = plan(vec![build(20)]);
        let out = amend(&previous, &[TrackOp::DeleteRows { a: 5, b: 8 }], false, DEFAULT);
        assert_eq!(
            out.plan.ops,
            vec![build(20), TrackOp::DeleteRows { a: 5, b: 8 }]
        );
        assert_eq!(out.summary.mode, AmendMode::Amend);
        assert_eq!(out.summary.kept, 1);
        assert_eq!(out.summary.added, 1);
        assert!(out.summary.dropped.is_empty());
    }

    #[test]
    fn amending_an_empty_plan_keeps_fresh_ops_only() {
        let out = amend(&Plan::default(), &[TrackOp::InsertJumpGaps { n: 2 }], false, DEFAULT);
        assert_eq!(out.plan.ops, vec![TrackOp::InsertJumpGaps { n: 2 }]);
        assert!(!out.summary.synthesized_create);
    }

    #[test]
    fn empty_merge_synthesizes_default_grid() {
        let out = amend(&Plan::default(), &[], false, DEFAULT);
        assert_eq!(out.plan.ops, vec![build(100)]);
        assert!(out.summary.synthesized_create);
    }

    #[test]
    fn fill_rows_drops_overlapping_deletions() {
        let previous = plan(vec![
            build(40),
            TrackOp::DeleteRows { a: 5, b: 8 },
            TrackOp::DeleteRows { a: 20, b: 22 },
            TrackOp::DeleteTiles {
                cols: vec![1],
                row: 7,
            },
            TrackOp::YSplit {
                a: 8,
                b: 12,
                gap_start: 1.0,
                gap_end: 2.0,
            },
            TrackOp::Rejoin {
                a: 13,
                b: 15,
                target: 0.0,
            },
        ]);
        let out = amend(&previous, &[TrackOp::FillRows { a: 6, b: 9 }], false, DEFAULT);
        assert_eq!(
            out.plan.ops,
            vec![
                build(40),
                TrackOp::DeleteRows { a: 20, b: 22 },
                TrackOp::Rejoin {
                    a: 13,
                    b: 15,
                    target: 0.0
                },
            ]
        );
        assert_eq!(out.summary.dropped.len(), 3);
        assert!(out.summary.dropped[0].reason.contains("fillRows(6,9)"));
        assert_eq!(out.summary.fills, 1);
    }

    #[test]
    fn fill_tiles_drops_covering_rows_and_shared_columns() {
        let previous = plan(vec![
            build(40),
            TrackOp::DeleteRows { a: 3, b: 5 },
            TrackOp::DeleteTiles {
                cols: vec![1, 2],
                row: 4,
            },
            TrackOp::DeleteTiles {
                cols: vec![3],
                row: 4,
            },
            TrackOp::DeleteTiles {
                cols: vec![2],
                row: 9,
            },
        ]);
        let fill = TrackOp::FillTiles {
            cols: vec![2],
            row: 4,
        };
        let out = amend(&previous, &[fill], false, DEFAULT);
        assert_eq!(
            out.plan.ops,
            vec![
                build(40),
                TrackOp::DeleteTiles {
                    cols: vec![3],
                    row: 4
                },
                TrackOp::DeleteTiles {
                    cols: vec![2],
                    row: 9
                },
            ]
        );
        assert_eq!(out.summary.dropped.len(), 2);
    }

    #[test]
    fn fill_all_also_drops_global_holes_and_gaps() {
        let previous = plan(vec![
            build(40),
            TrackOp::RandomHoles { pct: 10.0 },
            TrackOp::InsertJumpGaps { n: 2 },
            TrackOp::DeleteRows { a: 1, b: 1 },
            TrackOp::CurveRows {
                a: 1,
                b: 9,
                dir: Direction::Left,
                deg: 10.0,
            },
            TrackOp::SafeMarginStart { n: 3 },
        ]);
        let out = amend(&previous, &[TrackOp::FillAll], false, DEFAULT);
        assert_eq!(
            out.plan.ops,
            vec![
                build(40),
                TrackOp::CurveRows {
                    a: 1,
                    b: 9,
                    dir: Direction::Left,
                    deg: 10.0
                },
                TrackOp::SafeMarginStart { n: 3 },
            ]
        );
        assert_eq!(out.summary.dropped.len(), 3);
    }

    #[test]
    fn fill_directives_are_never_emitted() {
        let out = amend(
            &plan(vec![build(10)]),
            &[
                TrackOp::FillAll,
                TrackOp::FillRows { a: 1, b: 2 },
                TrackOp::DeleteRows { a: 4, b: 4 },
            ],
            false,
            DEFAULT,
        );
        assert!(out.plan.ops.iter().all(|op| op.kind() != OpKind::Fill));
        assert_eq!(out.summary.added, 1);
    }

    #[test]
    fn fill_does_not_cancel_deletions_in_the_same_request() {
        let out = amend(
            &plan(vec![build(10)]),
            &[TrackOp::DeleteRows { a: 2, b: 3 }, TrackOp::FillAll],
            false,
            DEFAULT,
        );
        assert_eq!(
            out.plan.ops,
            vec![build(10), TrackOp::DeleteRows { a: 2, b: 3 }]
        );
    }

    #[test]
    fn fresh_seed_supersedes_previous_seeds() {
        let previous = plan(vec![TrackOp::Seed { value: 1 }, build(10)]);
        let out = amend(&previous, &[TrackOp::Seed { value: 2 }], false, DEFAULT);
        assert_eq!(out.plan.ops, vec![build(10), TrackOp::Seed { value: 2 }]);
        assert!(out.summary.dropped[0].reason.contains("seed"));
    }

    #[test]
    fn persisted_fill_lines_are_dropped() {
        let previous = plan(vec![build(10), TrackOp::FillAll]);
        let out = amend(&previous, &[], false, DEFAULT);
        assert_eq!(out.plan.ops, vec![build(10)]);
        assert_eq!(out.summary.dropped.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Rebuild mode
    // -----------------------------------------------------------------------

    #[test]
    fn rebuild_discards_previous_plan() {
        let previous = plan(vec![build(20), TrackOp::DeleteRows { a: 1, b: 2 }]);
        let out = amend(&previous, &[build(40)], true, DEFAULT);
        assert_eq!(out.plan.ops, vec![build(40)]);
        assert_eq!(out.summary.mode, AmendMode::Rebuild);
        assert_eq!(out.summary.dropped.len(), 2);
        assert_eq!(out.summary.kept, 0);
    }

    #[test]
    fn rebuild_without_create_synthesizes_default() {
        let out = amend(
            &Plan::default(),
            &[TrackOp::InsertJumpGaps { n: 1 }],
            true,
            DEFAULT,
        );
        assert_eq!(
            out.plan.ops,
            vec![build(100), TrackOp::InsertJumpGaps { n: 1 }]
        );
        assert!(out.summary.synthesized_create);
    }

    #[test]
    fn rebuild_hoists_first_create_to_front() {
        let out = amend(
            &Plan::default(),
            &[
                TrackOp::Seed { value: 5 },
                build(30),
                TrackOp::RandomHoles { pct: 5.0 },
            ],
            true,
            (50, 4),
        );
        assert_eq!(
            out.plan.ops,
            vec![
                build(30),
                TrackOp::Seed { value: 5 },
                TrackOp::RandomHoles { pct: 5.0 }
            ]
        );
        assert!(!out.summary.synthesized_create);
    }

    #[test]
    fn summary_display_is_compact() {
        let out = amend(&Plan::default(), &[], true, DEFAULT);
        assert_eq!(
            out.summary.to_string(),
            "rebuild: kept 0, added 0, dropped 0, default grid synthesized"
        );
    }
}

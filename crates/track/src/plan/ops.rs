use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::{bind, schema_for, ArgValue, BindError, BoundArgs, OpCall, ParamDefault};

/// Lateral direction for curves. `Right` is the positive lateral axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// How an op is treated by the later pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Replaces the grid (`buildAbs`).
    Create,
    /// Executed directly by the kernel.
    Primitive,
    /// Seeds the execution's random stream.
    Seed,
    /// Rewritten into primitives by the macro expander.
    Macro,
    /// Steers the amender, never persisted.
    Fill,
}

/// One canonical operation: a single line of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackOp {
    BuildAbs {
        rows: u32,
        cols: u32,
    },
    DeleteRows {
        a: u32,
        b: u32,
    },
    DeleteTiles {
        cols: Vec<u32>,
        row: u32,
    },
    RandomHoles {
        pct: f64,
    },
    InsertJumpGaps {
        n: u32,
    },
    CurveRows {
        a: u32,
        b: u32,
        dir: Direction,
        deg: f64,
    },
    SBend {
        a: u32,
        b: u32,
        deg: f64,
        gain: f64,
        ratio: f64,
    },
    SlopesRandomAuto {
        min_deg: f64,
        max_deg: f64,
        seg_len: u32,
    },
    SafeMarginStart {
        n: u32,
    },
    SafeMarginEnd {
        n: u32,
    },
    SmoothColumns {
        passes: u32,
    },
    Seed {
        value: u64,
    },
    YSplit {
        a: u32,
        b: u32,
        gap_start: f64,
        gap_end: f64,
    },
    Rejoin {
        a: u32,
        b: u32,
        target: f64,
    },
    SmoothHeights {
        passes: u32,
    },
    FillAll,
    FillRows {
        a: u32,
        b: u32,
    },
    FillTiles {
        cols: Vec<u32>,
        row: u32,
    },
}

impl TrackOp {
    /// The op name used in plan text and rule templates.
    pub fn name(&self) -> &'static str {
        match self {
            TrackOp::BuildAbs { .. } => "buildAbs",
            TrackOp::DeleteRows { .. } => "deleteRows",
            TrackOp::DeleteTiles { .. } => "deleteTiles",
            TrackOp::RandomHoles { .. } => "randomHoles",
            TrackOp::InsertJumpGaps { .. } => "insertJumpGaps",
            TrackOp::CurveRows { .. } => "curveRows",
            TrackOp::SBend { .. } => "sBend",
            TrackOp::SlopesRandomAuto { .. } => "slopesRandomAuto",
            TrackOp::SafeMarginStart { .. } => "safeMarginStart",
            TrackOp::SafeMarginEnd { .. } => "safeMarginEnd",
            TrackOp::SmoothColumns { .. } => "smoothColumns",
            TrackOp::Seed { .. } => "seed",
            TrackOp::YSplit { .. } => "ySplit",
            TrackOp::Rejoin { .. } => "rejoin",
            TrackOp::SmoothHeights { .. } => "smoothHeights",
            TrackOp::FillAll => "fillAll",
            TrackOp::FillRows { .. } => "fillRows",
            TrackOp::FillTiles { .. } => "fillTiles",
        }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            TrackOp::BuildAbs { .. } => OpKind::Create,
            TrackOp::Seed { .. } => OpKind::Seed,
            TrackOp::YSplit { .. } | TrackOp::Rejoin { .. } | TrackOp::SmoothHeights { .. } => {
                OpKind::Macro
            }
            TrackOp::FillAll | TrackOp::FillRows { .. } | TrackOp::FillTiles { .. } => OpKind::Fill,
            _ => OpKind::Primitive,
        }
    }

    /// Whether executing this op consumes the random stream.
    pub fn is_random(&self) -> bool {
        matches!(
            self,
            TrackOp::RandomHoles { .. } | TrackOp::SlopesRandomAuto { .. }
        )
    }

    /// Build a typed op from a loosely typed call.
    pub fn from_call(call: &OpCall) -> Result<Self, BindError> {
        let (schema, args) = bind(call)?;
        Self::from_bound(schema.name, &args)
            .ok_or_else(|| BindError::UnknownOp(call.name.clone()))
    }

    fn from_bound(name: &str, args: &BoundArgs) -> Option<Self> {
        let op = match name {
            "buildAbs" => TrackOp::BuildAbs {
                rows: args.count("rows"),
                cols: args.count("cols"),
            },
            "deleteRows" => TrackOp::DeleteRows {
                a: args.count("a"),
                b: args.count("b"),
            },
            "deleteTiles" => TrackOp::DeleteTiles {
                cols: args.list("cols"),
                row: args.count("row"),
            },
            "randomHoles" => TrackOp::RandomHoles {
                pct: args.float("pct"),
            },
            "insertJumpGaps" => TrackOp::InsertJumpGaps { n: args.count("n") },
            "curveRows" => TrackOp::CurveRows {
                a: args.count("a"),
                b: args.count("b"),
                dir: if args.text("dir") == "left" {
                    Direction::Left
                } else {
                    Direction::Right
                },
                deg: args.float("deg"),
            },
            "sBend" => TrackOp::SBend {
                a: args.count("a"),
                b: args.count("b"),
                deg: args.float("deg"),
                gain: args.float("gain"),
                ratio: args.float("ratio"),
            },
            "slopesRandomAuto" => TrackOp::SlopesRandomAuto {
                min_deg: args.float("minDeg"),
                max_deg: args.float("maxDeg"),
                seg_len: args.count("segLen"),
            },
            "safeMarginStart" => TrackOp::SafeMarginStart { n: args.count("n") },
            "safeMarginEnd" => TrackOp::SafeMarginEnd { n: args.count("n") },
            "smoothColumns" => TrackOp::SmoothColumns {
                passes: args.count("passes"),
            },
            "seed" => TrackOp::Seed {
                value: args.seed("value"),
            },
            "ySplit" => TrackOp::YSplit {
                a: args.count("a"),
                b: args.count("b"),
                gap_start: args.float("gapStart"),
                gap_end: args.float("gapEnd"),
            },
            "rejoin" => TrackOp::Rejoin {
                a: args.count("a"),
                b: args.count("b"),
                target: args.float("target"),
            },
            "smoothHeights" => TrackOp::SmoothHeights {
                passes: args.count("passes"),
            },
            "fillAll" => TrackOp::FillAll,
            "fillRows" => TrackOp::FillRows {
                a: args.count("a"),
                b: args.count("b"),
            },
            "fillTiles" => TrackOp::FillTiles {
                cols: args.list("cols"),
                row: args.count("row"),
            },
            _ => return None,
        };
        Some(op)
    }

    /// Arguments in schema order.
    fn args(&self) -> Vec<ArgValue> {
        let int = |v: u32| ArgValue::Int(v as i64);
        let list = |cols: &[u32]| ArgValue::IntList(cols.iter().map(|c| *c as i64).collect());
        match self {
            TrackOp::BuildAbs { rows, cols } => vec![int(*rows), int(*cols)],
            TrackOp::DeleteRows { a, b } | TrackOp::FillRows { a, b } => vec![int(*a), int(*b)],
            TrackOp::DeleteTiles { cols, row } | TrackOp::FillTiles { cols, row } => {
                vec![list(cols), int(*row)]
            }
            TrackOp::RandomHoles { pct } => vec![ArgValue::Float(*pct)],
            TrackOp::InsertJumpGaps { n }
            | TrackOp::SafeMarginStart { n }
            | TrackOp::SafeMarginEnd { n } => vec![int(*n)],
            TrackOp::CurveRows { a, b, dir, deg } => vec![
                int(*a),
                int(*b),
                ArgValue::Str(dir.as_str().to_string()),
                ArgValue::Float(*deg),
            ],
            TrackOp::SBend {
                a,
                b,
                deg,
                gain,
                ratio,
            } => vec![
                int(*a),
                int(*b),
                ArgValue::Float(*deg),
                ArgValue::Float(*gain),
                ArgValue::Float(*ratio),
            ],
            TrackOp::SlopesRandomAuto {
                min_deg,
                max_deg,
                seg_len,
            } => vec![
                ArgValue::Float(*min_deg),
                ArgValue::Float(*max_deg),
                int(*seg_len),
            ],
            TrackOp::SmoothColumns { passes } | TrackOp::SmoothHeights { passes } => {
                vec![int(*passes)]
            }
            TrackOp::Seed { value } => vec![ArgValue::Int(*value as i64)],
            TrackOp::YSplit {
                a,
                b,
                gap_start,
                gap_end,
            } => vec![
                int(*a),
                int(*b),
                ArgValue::Float(*gap_start),
                ArgValue::Float(*gap_end),
            ],
            TrackOp::Rejoin { a, b, target } => {
                vec![int(*a), int(*b), ArgValue::Float(*target)]
            }
            TrackOp::FillAll => Vec::new(),
        }
    }

    /// Rows `[lo, hi]` this op deletes, if it deletes whole rows or tiles
    /// within a row range.
    pub fn deleted_row_span(&self) -> Option<(u32, u32)> {
        match self {
            TrackOp::DeleteRows { a, b }
            | TrackOp::YSplit { a, b, .. }
            | TrackOp::Rejoin { a, b, .. } => Some((*a.min(b), *a.max(b))),
            TrackOp::DeleteTiles { row, .. } => Some((*row, *row)),
            _ => None,
        }
    }
}

/// Canonical plan-line form: `opName(arg1,arg2,key=value)`.
///
/// Positional parameters are always written; named parameters are omitted
/// when they equal their default.
impl fmt::Display for TrackOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(schema) = schema_for(self.name()) else {
            return write!(f, "{}()", self.name());
        };
        write!(f, "{}(", schema.name)?;
        let mut first = true;
        for (spec, value) in schema.params.iter().zip(self.args()) {
            if spec.named {
                let is_default = match (spec.default, &value) {
                    (Some(ParamDefault::Float(d)), ArgValue::Float(v)) => d == *v,
                    (Some(ParamDefault::Int(d)), ArgValue::Int(v)) => d == *v,
                    _ => false,
                };
                if is_default {
                    continue;
                }
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if spec.named {
                write!(f, "{}={}", spec.name, value)?;
            } else {
                write!(f, "{value}")?;
            }
        }
        f.write_str(")")
    }
}

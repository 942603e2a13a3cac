//! Parameter schemas for every op in the closed op set.
//!
//! Both the rule compiler and the plan text parser produce loosely typed
//! [`OpCall`]s; [`bind`] checks them against the op's schema, applies
//! defaults and coerces values, yielding [`BoundArgs`] that
//! [`super::TrackOp::from_bound`] turns into a typed op.

use std::collections::BTreeMap;
use std::fmt;

/// A loosely typed argument value as it appears in rule templates or plan text.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    IntList(Vec<i64>),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Bool(v) => write!(f, "{v}"),
            ArgValue::Str(s) => write!(f, "{s}"),
            ArgValue::IntList(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Non-negative integer (row index, count, column).
    Count,
    /// Seed value, `0..=i64::MAX`.
    Seed,
    Float,
    IntList,
    Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Int(i64),
    Float(f64),
    /// Defaults to the value bound to another parameter of the same op.
    SameAs(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: Option<ParamDefault>,
    /// Serialized as `key=value` rather than positionally.
    pub named: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct OpSchema {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
}

impl OpSchema {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

const fn req(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        default: None,
        named: false,
    }
}

const fn opt(name: &'static str, kind: ParamKind, default: ParamDefault) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        default: Some(default),
        named: false,
    }
}

const fn named(name: &'static str, kind: ParamKind, default: Option<ParamDefault>) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        default,
        named: true,
    }
}

use ParamKind::{Count, Direction, Float, IntList, Seed};

pub const SCHEMAS: &[OpSchema] = &[
    OpSchema {
        name: "buildAbs",
        params: &[
            req("rows", Count),
            opt("cols", Count, ParamDefault::Int(crate::config::DEFAULT_COLS as i64)),
        ],
    },
    OpSchema {
        name: "deleteRows",
        params: &[req("a", Count), opt("b", Count, ParamDefault::SameAs("a"))],
    },
    OpSchema {
        name: "deleteTiles",
        params: &[req("cols", IntList), named("row", Count, None)],
    },
    OpSchema {
        name: "randomHoles",
        params: &[req("pct", Float)],
    },
    OpSchema {
        name: "insertJumpGaps",
        params: &[req("n", Count)],
    },
    OpSchema {
        name: "curveRows",
        params: &[
            req("a", Count),
            req("b", Count),
            req("dir", Direction),
            req("deg", Float),
        ],
    },
    OpSchema {
        name: "sBend",
        params: &[
            req("a", Count),
            req("b", Count),
            req("deg", Float),
            named("gain", Float, Some(ParamDefault::Float(1.0))),
            named("ratio", Float, Some(ParamDefault::Float(0.5))),
        ],
    },
    OpSchema {
        name: "slopesRandomAuto",
        params: &[
            req("minDeg", Float),
            req("maxDeg", Float),
            opt("segLen", Count, ParamDefault::Int(10)),
        ],
    },
    OpSchema {
        name: "safeMarginStart",
        params: &[req("n", Count)],
    },
    OpSchema {
        name: "safeMarginEnd",
        params: &[req("n", Count)],
    },
    OpSchema {
        name: "smoothColumns",
        params: &[opt("passes", Count, ParamDefault::Int(1))],
    },
    OpSchema {
        name: "seed",
        params: &[req("value", Seed)],
    },
    OpSchema {
        name: "ySplit",
        params: &[
            req("a", Count),
            req("b", Count),
            named("gapStart", Float, Some(ParamDefault::Float(1.0))),
            named("gapEnd", Float, Some(ParamDefault::Float(2.0))),
        ],
    },
    OpSchema {
        name: "rejoin",
        params: &[
            req("a", Count),
            req("b", Count),
            named("target", Float, Some(ParamDefault::Float(0.0))),
        ],
    },
    OpSchema {
        name: "smoothHeights",
        params: &[opt("passes", Count, ParamDefault::Int(1))],
    },
    OpSchema {
        name: "fillAll",
        params: &[],
    },
    OpSchema {
        name: "fillRows",
        params: &[req("a", Count), opt("b", Count, ParamDefault::SameAs("a"))],
    },
    OpSchema {
        name: "fillTiles",
        params: &[req("cols", IntList), named("row", Count, None)],
    },
];

/// Look up the schema for an op name (exact, case-sensitive).
pub fn schema_for(name: &str) -> Option<&'static OpSchema> {
    SCHEMAS.iter().find(|s| s.name == name)
}

/// An op invocation before type checking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpCall {
    pub name: String,
    pub positional: Vec<ArgValue>,
    pub named: Vec<(String, ArgValue)>,
}

impl OpCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Arguments after binding: every schema parameter has a coerced value.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    values: BTreeMap<&'static str, ArgValue>,
}

impl BoundArgs {
    pub fn count(&self, name: &str) -> u32 {
        match self.values.get(name) {
            Some(ArgValue::Int(v)) => *v as u32,
            _ => 0,
        }
    }

    pub fn seed(&self, name: &str) -> u64 {
        match self.values.get(name) {
            Some(ArgValue::Int(v)) => *v as u64,
            _ => 0,
        }
    }

    pub fn float(&self, name: &str) -> f64 {
        match self.values.get(name) {
            Some(ArgValue::Float(v)) => *v,
            _ => 0.0,
        }
    }

    pub fn list(&self, name: &str) -> Vec<u32> {
        match self.values.get(name) {
            Some(ArgValue::IntList(items)) => items.iter().map(|v| *v as u32).collect(),
            _ => Vec::new(),
        }
    }

    pub fn text(&self, name: &str) -> &str {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => s.as_str(),
            _ => "",
        }
    }
}

/// Why an [`OpCall`] could not be bound to its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    UnknownOp(String),
    TooManyArgs { op: String, max: usize },
    UnknownParam { op: String, param: String },
    DuplicateParam { op: String, param: String },
    MissingParam { op: String, param: &'static str },
    BadValue {
        op: String,
        param: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::UnknownOp(op) => write!(f, "unknown op `{op}`"),
            BindError::TooManyArgs { op, max } => {
                write!(f, "`{op}` takes at most {max} arguments")
            }
            BindError::UnknownParam { op, param } => {
                write!(f, "`{op}` has no parameter `{param}`")
            }
            BindError::DuplicateParam { op, param } => {
                write!(f, "`{op}` parameter `{param}` given twice")
            }
            BindError::MissingParam { op, param } => {
                write!(f, "`{op}` is missing required parameter `{param}`")
            }
            BindError::BadValue {
                op,
                param,
                value,
                expected,
            } => write!(f, "`{op}` parameter `{param}`: expected {expected}, got `{value}`"),
        }
    }
}

impl std::error::Error for BindError {}

/// Check `call` against its schema and produce fully populated arguments.
pub fn bind(call: &OpCall) -> Result<(&'static OpSchema, BoundArgs), BindError> {
    let schema = schema_for(&call.name).ok_or_else(|| BindError::UnknownOp(call.name.clone()))?;

    if call.positional.len() > schema.params.len() {
        return Err(BindError::TooManyArgs {
            op: call.name.clone(),
            max: schema.params.len(),
        });
    }

    let mut raw: BTreeMap<&'static str, &ArgValue> = BTreeMap::new();
    for (spec, value) in schema.params.iter().zip(&call.positional) {
        raw.insert(spec.name, value);
    }
    for (key, value) in &call.named {
        let spec = schema.param(key).ok_or_else(|| BindError::UnknownParam {
            op: call.name.clone(),
            param: key.clone(),
        })?;
        if raw.insert(spec.name, value).is_some() {
            return Err(BindError::DuplicateParam {
                op: call.name.clone(),
                param: key.clone(),
            });
        }
    }

    let mut values = BTreeMap::new();
    for spec in schema.params {
        if let Some(value) = raw.get(spec.name) {
            values.insert(spec.name, coerce(&call.name, spec, value)?);
        }
    }
    for spec in schema.params {
        if values.contains_key(spec.name) {
            continue;
        }
        let value = match spec.default {
            Some(ParamDefault::Int(v)) => ArgValue::Int(v),
            Some(ParamDefault::Float(v)) => ArgValue::Float(v),
            Some(ParamDefault::SameAs(other)) => match values.get(other) {
                Some(v) => v.clone(),
                None => {
                    return Err(BindError::MissingParam {
                        op: call.name.clone(),
                        param: other,
                    })
                }
            },
            None => {
                return Err(BindError::MissingParam {
                    op: call.name.clone(),
                    param: spec.name,
                })
            }
        };
        values.insert(spec.name, value);
    }

    Ok((schema, BoundArgs { values }))
}

fn coerce(op: &str, spec: &ParamSpec, value: &ArgValue) -> Result<ArgValue, BindError> {
    let bad = |expected: &'static str| BindError::BadValue {
        op: op.to_string(),
        param: spec.name,
        value: value.to_string(),
        expected,
    };

    match spec.kind {
        ParamKind::Count => {
            let v = as_integer(value).ok_or_else(|| bad("a non-negative integer"))?;
            if (0..=u32::MAX as i64).contains(&v) {
                Ok(ArgValue::Int(v))
            } else {
                Err(bad("a non-negative integer"))
            }
        }
        ParamKind::Seed => {
            let v = as_integer(value).ok_or_else(|| bad("a non-negative integer seed"))?;
            if v >= 0 {
                Ok(ArgValue::Int(v))
            } else {
                Err(bad("a non-negative integer seed"))
            }
        }
        ParamKind::Float => {
            let v = match value {
                ArgValue::Float(v) => *v,
                ArgValue::Int(v) => *v as f64,
                ArgValue::Str(s) => s.trim().parse::<f64>().map_err(|_| bad("a number"))?,
                _ => return Err(bad("a number")),
            };
            if v.is_finite() {
                Ok(ArgValue::Float(v))
            } else {
                Err(bad("a finite number"))
            }
        }
        ParamKind::IntList => {
            let items = match value {
                ArgValue::IntList(items) => items.clone(),
                ArgValue::Int(v) => vec![*v],
                _ => return Err(bad("a list of column numbers")),
            };
            if items.iter().all(|v| (0..=u32::MAX as i64).contains(v)) {
                Ok(ArgValue::IntList(items))
            } else {
                Err(bad("a list of non-negative integers"))
            }
        }
        ParamKind::Direction => match value {
            ArgValue::Str(s) if s.trim().eq_ignore_ascii_case("left") => {
                Ok(ArgValue::Str("left".to_string()))
            }
            ArgValue::Str(s) if s.trim().eq_ignore_ascii_case("right") => {
                Ok(ArgValue::Str("right".to_string()))
            }
            _ => Err(bad("`left` or `right`")),
        },
    }
}

fn as_integer(value: &ArgValue) -> Option<i64> {
    match value {
        ArgValue::Int(v) => Some(*v),
        ArgValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
        ArgValue::Str(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

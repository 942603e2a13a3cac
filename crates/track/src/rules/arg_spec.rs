//! Argument specs: a literal value or a `$N[:type]` capture reference.

use std::fmt;

use regex::Captures;
use serde_json::Value;

use crate::plan::ArgValue;

/// Largest range an `int_list` capture such as `1-500` may expand to.
const MAX_LIST_EXPANSION: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    String,
    Int,
    Float,
    Bool,
    IntList,
}

impl CastType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "string" | "str" => Some(CastType::String),
            "int" => Some(CastType::Int),
            "float" => Some(CastType::Float),
            "bool" => Some(CastType::Bool),
            "int_list" => Some(CastType::IntList),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CastType::String => "string",
            CastType::Int => "int",
            CastType::Float => "float",
            CastType::Bool => "bool",
            CastType::IntList => "int_list",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgSpec {
    Literal(ArgValue),
    Capture { index: usize, ty: CastType },
}

/// A capture that could not be cast to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastFailure {
    pub index: usize,
    pub ty: CastType,
    pub text: String,
}

impl fmt::Display for CastFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capture ${} = `{}` is not a valid {}",
            self.index,
            self.text,
            self.ty.as_str()
        )
    }
}

impl ArgSpec {
    /// Parse an argSpec from its JSON form.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) if s.starts_with('$') => Self::parse_capture(s),
            Value::String(s) => Ok(ArgSpec::Literal(ArgValue::Str(s.clone()))),
            Value::Bool(b) => Ok(ArgSpec::Literal(ArgValue::Bool(*b))),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(ArgSpec::Literal(ArgValue::Int(i))),
                None => n
                    .as_f64()
                    .map(|f| ArgSpec::Literal(ArgValue::Float(f)))
                    .ok_or_else(|| format!("unsupported number literal {n}")),
            },
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_i64()
                        .ok_or_else(|| format!("list literal item {item} is not an integer"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|list| ArgSpec::Literal(ArgValue::IntList(list))),
            other => Err(format!("unsupported argSpec {other}")),
        }
    }

    fn parse_capture(raw: &str) -> Result<Self, String> {
        let body = &raw[1..];
        let (index, ty) = match body.split_once(':') {
            Some((index, ty)) => (index, ty),
            None => (body, "string"),
        };
        let index = index
            .parse::<usize>()
            .map_err(|_| format!("`{raw}` is not a capture reference"))?;
        let ty = CastType::parse(ty).ok_or_else(|| format!("`{raw}`: unknown type `{ty}`"))?;
        Ok(ArgSpec::Capture { index, ty })
    }

    /// Highest capture group index this spec reads, if any.
    pub fn capture_index(&self) -> Option<usize> {
        match self {
            ArgSpec::Capture { index, .. } => Some(*index),
            ArgSpec::Literal(_) => None,
        }
    }

    /// Resolve against a regex match.
    ///
    /// Returns `Ok(None)` when the referenced group did not participate in the
    /// match, so the op falls back to the parameter's default.
    pub fn instantiate(&self, caps: &Captures<'_>) -> Result<Option<ArgValue>, CastFailure> {
        match self {
            ArgSpec::Literal(value) => Ok(Some(value.clone())),
            ArgSpec::Capture { index, ty } => match caps.get(*index) {
                None => Ok(None),
                Some(m) => cast(m.as_str(), *ty).map(Some).ok_or_else(|| CastFailure {
                    index: *index,
                    ty: *ty,
                    text: m.as_str().to_string(),
                }),
            },
        }
    }
}

/// Cast captured text to a typed value.
pub fn cast(text: &str, ty: CastType) -> Option<ArgValue> {
    let text = text.trim();
    match ty {
        CastType::String => Some(ArgValue::Str(text.to_string())),
        CastType::Int => parse_int(text).map(ArgValue::Int),
        CastType::Float => {
            let v = text.parse::<f64>().ok()?;
            v.is_finite().then_some(ArgValue::Float(v))
        }
        CastType::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(ArgValue::Bool(true)),
            "false" | "no" | "off" | "0" => Some(ArgValue::Bool(false)),
            _ => None,
        },
        CastType::IntList => parse_int_list(text).map(ArgValue::IntList),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `1, 2 and 4-6` → `[1, 2, 4, 5, 6]`.
fn parse_int_list(text: &str) -> Option<Vec<i64>> {
    let mut out = Vec::new();
    let spaced = text.replace(',', " ");
    for item in spaced.split_whitespace() {
        if item.eq_ignore_ascii_case("and") {
            continue;
        }
        match item.split_once('-') {
            Some((lo, hi)) if !lo.is_empty() => {
                let lo = parse_int(lo)?;
                let hi = parse_int(hi)?;
                let (lo, hi) = (lo.min(hi), lo.max(hi));
                if hi.checked_sub(lo).map_or(true, |span| span > MAX_LIST_EXPANSION) {
                    return None;
                }
                out.extend(lo..=hi);
            }
            _ => out.push(parse_int(item)?),
        }
    }
    (!out.is_empty()).then_some(out)
}

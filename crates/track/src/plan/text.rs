//! Plain-text plan persistence: one op per line, `#` and `//` comments.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ops::TrackOp;
use super::schema::{ArgValue, OpCall};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// How [`Plan::parse`] treats a line that does not parse to a known op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    /// Reject the whole plan at the first bad line.
    Strict,
    /// Skip bad lines, recording one warning each.
    #[default]
    Lenient,
}

/// A persisted line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanParseError {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
    pub reason: String,
}

impl fmt::Display for PlanParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plan line {}: {} (`{}`)",
            self.line, self.reason, self.text
        )
    }
}

impl std::error::Error for PlanParseError {}

/// An ordered sequence of canonical ops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub ops: Vec<TrackOp>,
}

impl Plan {
    pub fn new(ops: Vec<TrackOp>) -> Self {
        Self { ops }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Parse persisted plan text.
    ///
    /// Lenient parsing never fails; skipped lines are reported through
    /// `diagnostics`.
    pub fn parse(
        text: &str,
        mode: ParseMode,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, PlanParseError> {
        let mut ops = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            match parse_line(line) {
                Ok(op) => ops.push(op),
                Err(reason) => {
                    let err = PlanParseError {
                        line: idx + 1,
                        text: line.to_string(),
                        reason,
                    };
                    match mode {
                        ParseMode::Strict => return Err(err),
                        ParseMode::Lenient => {
                            diagnostics.warn(DiagnosticKind::PlanParse, err.to_string())
                        }
                    }
                }
            }
        }
        Ok(Self { ops })
    }

    /// Serialize to text, one op per line with a trailing newline.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for op in &self.ops {
            out.push_str(&op.to_string());
            out.push('\n');
        }
        out
    }

    pub fn contains_random(&self) -> bool {
        self.ops.iter().any(TrackOp::is_random)
    }

    pub fn has_seed(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, TrackOp::Seed { .. }))
    }
}

/// Parse one `opName(args)` line into a typed op.
pub fn parse_line(line: &str) -> Result<TrackOp, String> {
    let line = line.trim().trim_end_matches(';').trim_end();
    let open = line
        .find('(')
        .ok_or_else(|| "expected `opName(...)`".to_string())?;
    if !line.ends_with(')') {
        return Err("missing closing `)`".to_string());
    }
    let name = line[..open].trim();
    if !is_identifier(name) {
        return Err(format!("`{name}` is not an op name"));
    }
    let body = &line[open + 1..line.len() - 1];

    let mut call = OpCall::new(name);
    for piece in split_top_level(body)? {
        let piece = piece.trim();
        if piece.is_empty() {
            return Err("empty argument".to_string());
        }
        match split_named(piece) {
            Some((key, value)) => call.named.push((key.to_string(), parse_value(value)?)),
            None => {
                if !call.named.is_empty() {
                    return Err("positional argument after named argument".to_string());
                }
                call.positional.push(parse_value(piece)?);
            }
        }
    }
    TrackOp::from_call(&call).map_err(|e| e.to_string())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split on commas that are not inside `[...]`.
fn split_top_level(body: &str) -> Result<Vec<&str>, String> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err("unbalanced `]`".to_string());
                }
            }
            ',' if depth == 0 => {
                pieces.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced `[`".to_string());
    }
    pieces.push(&body[start..]);
    Ok(pieces)
}

fn split_named(piece: &str) -> Option<(&str, &str)> {
    if piece.starts_with('[') {
        return None;
    }
    let (key, value) = piece.split_once('=')?;
    let key = key.trim();
    is_identifier(key).then_some((key, value.trim()))
}

fn parse_value(raw: &str) -> Result<ArgValue, String> {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| format!("unterminated list `{raw}`"))?;
        if inner.trim().is_empty() {
            return Ok(ArgValue::IntList(Vec::new()));
        }
        return inner
            .split(',')
            .map(|item| {
                item.trim()
                    .parse::<i64>()
                    .map_err(|_| format!("`{}` is not an integer", item.trim()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ArgValue::IntList);
    }
    if raw.eq_ignore_ascii_case("true") {
        return Ok(ArgValue::Bool(true));
    }
    if raw.eq_ignore_ascii_case("false") {
        return Ok(ArgValue::Bool(false));
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(ArgValue::Int(v));
    }
    if raw.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        return raw
            .parse::<f64>()
            .map(ArgValue::Float)
            .map_err(|_| format!("`{raw}` is not a number"));
    }
    if is_identifier(raw) {
        return Ok(ArgValue::Str(raw.to_string()));
    }
    Err(format!("cannot parse argument `{raw}`"))
}

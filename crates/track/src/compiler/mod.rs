//! Intent compiler: matches normalized text against the rule repository and
//! produces the fresh ops of one edit request.

mod coverage;
mod matcher;

pub use matcher::MatchCastError;

use std::sync::LazyLock;

use bevy::log::debug;
use regex::Regex;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::plan::{OpKind, TrackOp};
use crate::rules::RuleRepository;

static CREATION_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:re)?build\b").unwrap_or_else(|e| panic!("creation pattern: {e}"))
});

/// The ops extracted from one request, in rule-list then match order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledRequest {
    pub ops: Vec<TrackOp>,
    /// The request asks for a fresh grid (`build`/`rebuild` or a create op).
    pub creation_intent: bool,
    pub diagnostics: Diagnostics,
}

/// Compile already-normalized text. Never fails: problems are reported
/// through [`CompiledRequest::diagnostics`].
pub fn compile(normalized: &str, rules: &RuleRepository) -> CompiledRequest {
    let text = rules.apply_synonyms(normalized);
    let mut diagnostics = Diagnostics::default();

    let matched = matcher::match_rules(&text, rules, &mut diagnostics);

    for token in coverage::unexplained_tokens(&text, &matched.spans) {
        diagnostics.warn(
            DiagnosticKind::UnrecognizedInput,
            format!("unrecognized input `{token}`"),
        );
    }

    let creation_intent = CREATION_WORD.is_match(&text)
        || matched.ops.iter().any(|op| op.kind() == OpKind::Create);

    debug!(
        "compiled {} op(s) from request (creation intent: {creation_intent})",
        matched.ops.len()
    );

    CompiledRequest {
        ops: matched.ops,
        creation_intent,
        diagnostics,
    }
}

#[cfg(test)]
mod tests;

use std::fmt;
use std::ops::Range;

use regex::Captures;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::plan::{OpCall, TrackOp};
use crate::rules::{OpTemplate, RuleRepository};

/// A rule whose captures could not be turned into valid ops. All of that
/// rule's ops are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCastError {
    pub rule: String,
    pub matched: String,
    pub reason: String,
}

impl fmt::Display for MatchCastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule `{}` dropped on `{}`: {}",
            self.rule, self.matched, self.reason
        )
    }
}

impl std::error::Error for MatchCastError {}

pub(super) struct Matched {
    pub ops: Vec<TrackOp>,
    /// Byte ranges of every non-empty match, including dropped rules.
    pub spans: Vec<Range<usize>>,
}

pub(super) fn match_rules(
    text: &str,
    rules: &RuleRepository,
    diagnostics: &mut Diagnostics,
) -> Matched {
    let mut ops = Vec::new();
    let mut spans = Vec::new();

    for rule in rules.rules() {
        let mut rule_ops = Vec::new();
        let mut failure: Option<MatchCastError> = None;

        for caps in rule.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if !whole.range().is_empty() {
                spans.push(whole.range());
            }
            if failure.is_some() {
                continue;
            }
            for template in &rule.templates {
                match instantiate(template, &caps) {
                    Ok(op) => rule_ops.push(op),
                    Err(reason) => {
                        failure = Some(MatchCastError {
                            rule: rule.name.clone(),
                            matched: whole.as_str().to_string(),
                            reason,
                        });
                        break;
                    }
                }
            }
        }

        match failure {
            Some(err) => diagnostics.warn(DiagnosticKind::MatchCast, err.to_string()),
            None => ops.extend(rule_ops),
        }
    }

    Matched { ops, spans }
}

fn instantiate(template: &OpTemplate, caps: &Captures<'_>) -> Result<TrackOp, String> {
    let mut call = OpCall::new(template.op);
    for (param, spec) in &template.args {
        if let Some(value) = spec.instantiate(caps).map_err(|e| e.to_string())? {
            call.named.push((param.clone(), value));
        }
    }
    TrackOp::from_call(&call).map_err(|e| e.to_string())
}

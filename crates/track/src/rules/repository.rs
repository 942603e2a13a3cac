//! Loading and validating the JSON rule repository.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::Value;

use super::arg_spec::ArgSpec;
use crate::plan::{schema_for, OpSchema};

/// Highest repository format version this build understands.
pub const SUPPORTED_RULES_VERSION: u32 = 1;

const BUILTIN_RULES: &str = include_str!("../../assets/track_rules.json");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A repository document that cannot be used for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleLoadError {
    /// The repository file could not be read.
    Unreadable { path: String, reason: String },
    /// The document is not valid JSON or does not have the expected shape.
    Json(String),
    UnsupportedVersion { found: u32, supported: u32 },
    Synonym { alias: String, reason: String },
    Rule { rule: String, reason: String },
}

impl fmt::Display for RuleLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleLoadError::Unreadable { path, reason } => {
                write!(f, "cannot read rule repository {path}: {reason}")
            }
            RuleLoadError::Json(msg) => write!(f, "rule repository JSON error: {msg}"),
            RuleLoadError::UnsupportedVersion { found, supported } => write!(
                f,
                "rule repository version {found} is newer than supported version {supported}"
            ),
            RuleLoadError::Synonym { alias, reason } => {
                write!(f, "synonym `{alias}`: {reason}")
            }
            RuleLoadError::Rule { rule, reason } => write!(f, "rule `{rule}`: {reason}"),
        }
    }
}

impl std::error::Error for RuleLoadError {}

// ---------------------------------------------------------------------------
// On-disk document
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RepositoryDoc {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    synonyms: BTreeMap<String, String>,
    #[serde(default)]
    intents: Vec<RuleDoc>,
    #[serde(default)]
    commands: Vec<RuleDoc>,
    #[serde(default)]
    macros: Vec<RuleDoc>,
}

fn default_version() -> u32 {
    1
}

#[derive(Deserialize)]
struct RuleDoc {
    name: String,
    regex: String,
    #[serde(default)]
    ops: Vec<PatchDoc>,
    #[serde(default)]
    kernel: Vec<KernelDoc>,
}

#[derive(Deserialize)]
struct PatchDoc {
    op: String,
    path: String,
    value: Value,
}

#[derive(Deserialize)]
struct KernelDoc {
    op: String,
    #[serde(default)]
    args: serde_json::Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Validated model
// ---------------------------------------------------------------------------

/// Which list of the repository a rule came from. Matching order follows
/// the declaration order of the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleList {
    Intents,
    Commands,
    Macros,
}

/// One op produced per match, with its arguments still to be resolved.
#[derive(Debug, Clone)]
pub struct OpTemplate {
    pub op: &'static str,
    pub args: Vec<(String, ArgSpec)>,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub list: RuleList,
    pub regex: Regex,
    pub templates: Vec<OpTemplate>,
}

#[derive(Debug, Clone)]
pub struct Synonym {
    pub alias: String,
    pub canonical: String,
    regex: Regex,
}

/// The validated, immutable rule set used by the intent compiler.
#[derive(Debug, Clone, Default)]
pub struct RuleRepository {
    version: u32,
    synonyms: Vec<Synonym>,
    rules: Vec<Rule>,
}

impl RuleRepository {
    /// Parse and validate a repository document.
    pub fn from_json_str(json: &str) -> Result<Self, RuleLoadError> {
        let doc: RepositoryDoc =
            serde_json::from_str(json).map_err(|e| RuleLoadError::Json(e.to_string()))?;

        if doc.version > SUPPORTED_RULES_VERSION {
            return Err(RuleLoadError::UnsupportedVersion {
                found: doc.version,
                supported: SUPPORTED_RULES_VERSION,
            });
        }

        let mut synonyms = doc
            .synonyms
            .into_iter()
            .map(|(alias, canonical)| build_synonym(alias, canonical))
            .collect::<Result<Vec<_>, _>>()?;
        synonyms.sort_by(|a, b| {
            b.alias
                .len()
                .cmp(&a.alias.len())
                .then_with(|| a.alias.cmp(&b.alias))
        });

        let mut rules = Vec::new();
        let mut seen = HashSet::new();
        for (list, docs) in [
            (RuleList::Intents, doc.intents),
            (RuleList::Commands, doc.commands),
            (RuleList::Macros, doc.macros),
        ] {
            for rule_doc in docs {
                if !seen.insert(rule_doc.name.clone()) {
                    return Err(RuleLoadError::Rule {
                        rule: rule_doc.name,
                        reason: "duplicate rule name".to_string(),
                    });
                }
                rules.push(build_rule(list, rule_doc)?);
            }
        }

        Ok(Self {
            version: doc.version,
            synonyms,
            rules,
        })
    }

    /// The repository embedded in the crate.
    pub fn builtin() -> Result<Self, RuleLoadError> {
        Self::from_json_str(BUILTIN_RULES)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Rules in matching order: intents, then commands, then macros.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whole-word, case-insensitive alias rewriting, longest alias first.
    pub fn apply_synonyms(&self, text: &str) -> String {
        let mut out = text.to_string();
        for syn in &self.synonyms {
            out = syn
                .regex
                .replace_all(&out, regex::NoExpand(&syn.canonical))
                .into_owned();
        }
        out
    }
}

fn build_synonym(alias: String, canonical: String) -> Result<Synonym, RuleLoadError> {
    if alias.trim().is_empty() {
        return Err(RuleLoadError::Synonym {
            alias,
            reason: "alias is empty".to_string(),
        });
    }
    let pattern = format!(r"\b{}\b", regex::escape(alias.trim()));
    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| RuleLoadError::Synonym {
            alias: alias.clone(),
            reason: e.to_string(),
        })?;
    Ok(Synonym {
        alias,
        canonical,
        regex,
    })
}

fn build_rule(list: RuleList, doc: RuleDoc) -> Result<Rule, RuleLoadError> {
    let fail = |reason: String| RuleLoadError::Rule {
        rule: doc.name.clone(),
        reason,
    };

    let regex = RegexBuilder::new(&doc.regex)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .map_err(|e| fail(format!("invalid regex: {e}")))?;
    let max_group = regex.captures_len() - 1;

    let mut templates: Vec<OpTemplate> = Vec::new();

    for patch in &doc.ops {
        if !matches!(patch.op.as_str(), "set" | "replace" | "add") {
            return Err(fail(format!("unsupported patch op `{}`", patch.op)));
        }
        let (op_name, param) = split_patch_path(&patch.path)
            .ok_or_else(|| fail(format!("patch path `{}` is not `/op/param`", patch.path)))?;
        let schema = lookup_schema(op_name).map_err(&fail)?;
        let spec = build_arg(schema, param, &patch.value, max_group).map_err(&fail)?;
        match templates.last_mut() {
            Some(last) if last.op == schema.name => last.args.push((param.to_string(), spec)),
            _ => templates.push(OpTemplate {
                op: schema.name,
                args: vec![(param.to_string(), spec)],
            }),
        }
    }

    for entry in &doc.kernel {
        let schema = lookup_schema(&entry.op).map_err(&fail)?;
        let args = entry
            .args
            .iter()
            .map(|(param, value)| {
                build_arg(schema, param, value, max_group).map(|spec| (param.clone(), spec))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(&fail)?;
        templates.push(OpTemplate {
            op: schema.name,
            args,
        });
    }

    if templates.is_empty() {
        return Err(fail("rule produces no ops".to_string()));
    }

    Ok(Rule {
        name: doc.name,
        list,
        regex,
        templates,
    })
}

fn split_patch_path(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix('/')?;
    let (op, param) = rest.split_once('/')?;
    (!op.is_empty() && !param.is_empty() && !param.contains('/')).then_some((op, param))
}

fn lookup_schema(op: &str) -> Result<&'static OpSchema, String> {
    schema_for(op).ok_or_else(|| format!("unknown op `{op}`"))
}

fn build_arg(
    schema: &OpSchema,
    param: &str,
    value: &Value,
    max_group: usize,
) -> Result<ArgSpec, String> {
    if schema.param(param).is_none() {
        return Err(format!("`{}` has no parameter `{param}`", schema.name));
    }
    let spec = ArgSpec::from_json(value).map_err(|e| format!("`{}.{param}`: {e}", schema.name))?;
    if let Some(index) = spec.capture_index() {
        if index > max_group {
            return Err(format!(
                "`{}.{param}` references capture ${index} but the regex has {max_group} group(s)",
                schema.name
            ));
        }
    }
    Ok(spec)
}

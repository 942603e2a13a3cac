//! Non-fatal findings collected while a request moves through the pipeline.
//!
//! Every stage that recovers from a problem (a rule whose capture fails to
//! cast, an unrecognized word, a skipped plan line) records a [`Diagnostic`]
//! here instead of dropping it silently. Each entry is also logged.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A rule's capture failed its argSpec cast; the rule's ops were dropped.
    MatchCast,
    /// Input text not explained by any rule.
    UnrecognizedInput,
    /// A persisted plan line was skipped.
    PlanParse,
    /// A previous plan line was dropped or an op synthesized during amendment.
    Amendment,
    /// A macro could not be expanded as written.
    Expansion,
    /// A seed was synthesized.
    Seeding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, kind: DiagnosticKind, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Info => debug!("{:?}: {}", kind, message),
            Severity::Warning => warn!("{:?}: {}", kind, message),
            Severity::Error => error!("{:?}: {}", kind, message),
        }
        self.entries.push(Diagnostic {
            kind,
            severity,
            message,
        });
    }

    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(kind, Severity::Info, message);
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(kind, Severity::Warning, message);
    }

    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(kind, Severity::Error, message);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

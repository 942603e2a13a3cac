use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one executed op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpReport {
    /// Position of the op in the executed plan.
    pub index: usize,
    /// Canonical plan line of the op.
    pub op: String,
    /// Tiles created, removed or displaced (rows protected for margins).
    pub affected: u64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecErrorKind {
    /// An argument is outside the range the primitive accepts.
    InvalidArgument(String),
    /// A macro reached the kernel without being expanded.
    UnexpandedMacro,
    /// A fill directive reached the kernel instead of being consumed by amendment.
    FillDirective,
}

impl fmt::Display for ExecErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecErrorKind::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            ExecErrorKind::UnexpandedMacro => f.write_str("macro was not expanded"),
            ExecErrorKind::FillDirective => f.write_str("fill directives are not executable"),
        }
    }
}

/// The op that aborted an execution. Ops before `index` remain applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOpError {
    pub index: usize,
    pub op: String,
    pub kind: ExecErrorKind,
    /// Reports of the ops that completed before the failure.
    pub completed: Vec<OpReport>,
}

impl fmt::Display for ExecutionOpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op #{} `{}` failed: {}", self.index, self.op, self.kind)
    }
}

impl std::error::Error for ExecutionOpError {}

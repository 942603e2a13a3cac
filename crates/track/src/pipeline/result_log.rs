//! Ring-buffer log of recently applied edit requests and their results.
//!
//! The [`EditResultLog`] resource keeps the last
//! [`EDIT_LOG_CAPACITY`](crate::config::EDIT_LOG_CAPACITY) request/result
//! pairs so front ends and tests can inspect what the queued edits did.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{EditOutcome, EditRequest};
use crate::config::EDIT_LOG_CAPACITY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditResult {
    Applied(Box<EditOutcome>),
    /// The stage that failed and its rendered error.
    Failed { stage: String, message: String },
}

impl EditResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditResult::Applied(_))
    }

    pub fn outcome(&self) -> Option<&EditOutcome> {
        match self {
            EditResult::Applied(outcome) => Some(outcome),
            EditResult::Failed { .. } => None,
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct EditResultLog {
    entries: Vec<(EditRequest, EditResult)>,
}

impl EditResultLog {
    /// Record a request and its result, evicting the oldest entry when full.
    pub fn push(&mut self, request: EditRequest, result: EditResult) {
        if self.entries.len() >= EDIT_LOG_CAPACITY {
            self.entries.remove(0);
        }
        self.entries.push((request, result));
    }

    /// The last `n` entries (or fewer if the log is shorter).
    pub fn last_n(&self, n: usize) -> &[(EditRequest, EditResult)] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&(EditRequest, EditResult)> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

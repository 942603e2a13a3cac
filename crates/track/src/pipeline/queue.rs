use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditSource {
    /// Typed by a designer (command line or an editor front end).
    Designer,
    /// Issued by a script or batch file.
    Script,
    /// Re-issued from a recorded session.
    Replay,
}

/// One natural-language edit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub source: EditSource,
    pub text: String,
}

impl EditRequest {
    pub fn new(source: EditSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }

    pub fn designer(text: impl Into<String>) -> Self {
        Self::new(EditSource::Designer, text)
    }
}

/// Requests waiting for the next `apply_queued_edits` run, oldest first.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditQueue {
    pending: Vec<EditRequest>,
}

impl EditQueue {
    pub fn push(&mut self, source: EditSource, text: impl Into<String>) {
        self.pending.push(EditRequest::new(source, text));
    }

    pub fn push_request(&mut self, request: EditRequest) {
        self.pending.push(request);
    }

    pub fn drain(&mut self) -> Vec<EditRequest> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

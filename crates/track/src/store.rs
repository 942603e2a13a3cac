// ---------------------------------------------------------------------------
// Plan persistence: the PlanStore seam and its error type
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised by plan stores, seed logs and grid snapshots.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Encoding a snapshot or log entry failed.
    Encode(String),
    /// Stored bytes could not be decoded.
    Decode(String),
    /// Stored payload does not match its recorded checksum.
    ChecksumMismatch { expected: u32, found: u32 },
    /// Stored data comes from a newer format than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            StoreError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            StoreError::ChecksumMismatch { expected, found } => write!(
                f,
                "Checksum mismatch: expected {expected:#010x}, found {found:#010x}"
            ),
            StoreError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: data is v{found}, but this build only supports up to v{expected_max}"
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<bitcode::Error> for StoreError {
    fn from(e: bitcode::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

/// The single persisted plan. `save` overwrites the whole document.
pub trait PlanStore: Send + Sync {
    /// The persisted plan text, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&mut self, text: &str) -> Result<(), StoreError>;
}

/// In-process plan store used by tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryPlanStore {
    text: Option<String>,
    saves: usize,
}

impl MemoryPlanStore {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            saves: 0,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl PlanStore for MemoryPlanStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.text.clone())
    }

    fn save(&mut self, text: &str) -> Result<(), StoreError> {
        self.text = Some(text.to_string());
        self.saves += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed PlanStore and SeedLog
// ---------------------------------------------------------------------------
//
// The plan file is plain text, one op per line, replaced wholesale on every
// save. The seed log is JSON lines, one `SeedLogEntry` per line, only ever
// appended to.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bevy::log::debug;

use track::seeding::{SeedLog, SeedLogEntry};
use track::store::{PlanStore, StoreError};

use crate::atomic_write::atomic_write;

/// The persisted plan as a text file.
#[derive(Debug, Clone)]
pub struct FilePlanStore {
    path: PathBuf,
}

impl FilePlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanStore for FilePlanStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, text: &str) -> Result<(), StoreError> {
        atomic_write(&self.path, text.as_bytes())?;
        debug!("wrote plan to {}", self.path.display());
        Ok(())
    }
}

/// Append-only seed log stored as JSON lines.
#[derive(Debug, Clone)]
pub struct FileSeedLog {
    path: PathBuf,
}

impl FileSeedLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeedLog for FileSeedLog {
    fn append(&mut self, entry: &SeedLogEntry) -> Result<(), StoreError> {
        let mut line =
            serde_json::to_string(entry).map_err(|e| StoreError::Encode(e.to_string()))?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<SeedLogEntry>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .map_err(|e| StoreError::Decode(format!("seed log entry {}: {e}", i + 1)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/trackedit_plan_files_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entry(seed: u64) -> SeedLogEntry {
        SeedLogEntry {
            timestamp: 1_700_000_000,
            seed,
            reason: "plan uses randomHoles without a seed".to_string(),
        }
    }

    #[test]
    fn test_missing_plan_file_loads_as_none() {
        let dir = test_dir("missing_plan");
        let store = FilePlanStore::new(dir.join("plan.txt"));
        assert!(store.load().unwrap().is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_plan_save_then_load() {
        let dir = test_dir("plan_roundtrip");
        let mut store = FilePlanStore::new(dir.join("plans/track.plan"));

        store.save("buildAbs(20,3)\ndeleteRows(5,8)\n").unwrap();
        store.save("buildAbs(40,3)\n").unwrap();

        assert_eq!(store.load().unwrap().as_deref(), Some("buildAbs(40,3)\n"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_plan_directory_path_is_an_io_error() {
        let dir = test_dir("plan_is_dir");
        let store = FilePlanStore::new(&dir);
        assert!(matches!(store.load(), Err(StoreError::Io(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_seed_log_appends_in_order() {
        let dir = test_dir("seed_log_append");
        let mut log = FileSeedLog::new(dir.join("seeds.jsonl"));
        assert!(log.entries().unwrap().is_empty());

        log.append(&entry(1)).unwrap();
        log.append(&entry(2)).unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries, vec![entry(1), entry(2)]);
        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_seed_log_line_is_a_decode_error() {
        let dir = test_dir("seed_log_corrupt");
        let path = dir.join("seeds.jsonl");
        fs::write(&path, "{\"timestamp\":1,\"seed\":2,\"reason\":\"x\"}\nnot json\n").unwrap();

        let err = FileSeedLog::new(&path).entries().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("entry 2"), "got: {msg}");
        let _ = fs::remove_dir_all(&dir);
    }
}

//! Whole-file replacement using the write-rename pattern.
//!
//! Data goes to `{path}.tmp`, is flushed with `sync_all()`, then renamed over
//! the final path. A crash mid-write leaves the previous plan or snapshot
//! untouched.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomically replace the contents of `path` with `data`, creating parent
/// directories as needed.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unique temp directory per test.
    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/trackedit_atomic_write_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_atomic_write_creates_file() {
        let dir = test_dir("creates_file");
        let path = dir.join("plan.txt");

        atomic_write(&path, b"buildAbs(40,3)\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"buildAbs(40,3)\n");
        assert!(!tmp_path(&path).exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_overwrites_existing() {
        let dir = test_dir("overwrites");
        let path = dir.join("plan.txt");

        atomic_write(&path, b"buildAbs(10,3)\n").unwrap();
        atomic_write(&path, b"buildAbs(20,3)\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"buildAbs(20,3)\n");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = test_dir("parent_dirs");
        let path = dir.join("nested/deep/plan.txt");

        atomic_write(&path, b"seed(1)\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"seed(1)\n");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_replaces_leftover_tmp() {
        let dir = test_dir("leftover_tmp");
        let path = dir.join("plan.txt");
        fs::write(&path, b"original").unwrap();
        fs::write(tmp_path(&path), b"partial garbage").unwrap();

        atomic_write(&path, b"new plan").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new plan");
        assert!(!tmp_path(&path).exists());

        let _ = fs::remove_dir_all(&dir);
    }
}

//! Recursive deletion of files and directory trees under the staging root.

use std::fs;
use std::path::Path;

use crate::error::{Result, SpindleError};

/// Delete `path`. Directories are erased depth-first, then removed once
/// empty; files are removed directly.
///
/// Fails on the first unremovable entry. Deletion is not atomic and a
/// partially deleted tree is left as-is; the call is safe to re-run.
pub fn erase(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| SpindleError::io_at(path, e))?;

    if metadata.is_dir() {
        erase_dir(path)
    } else {
        fs::remove_file(path).map_err(|e| SpindleError::io_at(path, e))
    }
}

fn erase_dir(dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| SpindleError::io_at(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| SpindleError::io_at(dir, e))?;
        let full_path = entry.path();
        let metadata = fs::metadata(&full_path).map_err(|e| SpindleError::io_at(&full_path, e))?;

        if metadata.is_dir() {
            erase_dir(&full_path)?;
        } else {
            fs::remove_file(&full_path).map_err(|e| SpindleError::io_at(&full_path, e))?;
        }
    }

    fs::remove_dir(dir).map_err(|e| SpindleError::io_at(dir, e))
}

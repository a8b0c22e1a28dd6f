//! Moves files and directory trees from the staging root into the library.
//!
//! Rename is tried first; when the two roots sit on different devices the
//! move falls back to copy, size verification, then source deletion. A
//! truncated copy never costs the source file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpindleError};

/// What a relocation call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocateOutcome {
    /// The item was moved (or, for a directory, its children were processed)
    Moved,
    /// File case: the target already existed and was left untouched
    SkippedExisting,
    /// The source vanished before or during the move; nothing to do
    SourceVanished,
}

/// Compute the library-side target for a staging path, preserving the path
/// suffix below the staging root.
pub fn library_target(source: &Path, staging_root: &Path, library_root: &Path) -> Result<PathBuf> {
    let suffix = source.strip_prefix(staging_root).map_err(|_| {
        SpindleError::invalid_path(format!(
            "{} is not under staging root {}",
            source.display(),
            staging_root.display()
        ))
    })?;
    Ok(library_root.join(suffix))
}

/// Relocate `source` to `target`.
///
/// Directory moves continue past failing children (per-child errors are
/// logged, never abort the batch) and remove the emptied source directory
/// best-effort. File moves skip an existing target, rename when possible and
/// fall back to copy+verify+delete across devices. A source that disappears
/// mid-move is treated as already migrated.
pub fn relocate(source: &Path, target: &Path) -> Result<RelocateOutcome> {
    let metadata = match fs::symlink_metadata(source) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Source path does not exist, skipping: {}", source.display());
            return Ok(RelocateOutcome::SourceVanished);
        }
        Err(e) => return Err(SpindleError::io_at(source, e)),
    };

    if metadata.is_dir() {
        relocate_dir(source, target)
    } else {
        relocate_file(source, target)
    }
}

fn relocate_dir(source: &Path, target: &Path) -> Result<RelocateOutcome> {
    fs::create_dir_all(target).map_err(|e| SpindleError::io_at(target, e))?;

    let entries = fs::read_dir(source).map_err(|e| SpindleError::io_at(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SpindleError::io_at(source, e))?;
        let child_source = entry.path();
        let child_target = target.join(entry.file_name());

        if let Err(e) = relocate(&child_source, &child_target) {
            // Keep going; the rest of the batch should still move
            log::error!("Error moving {}: {}", child_source.display(), e);
        }
    }

    // Remove the source directory only once it is empty; leave it in place
    // otherwise without raising
    match fs::read_dir(source) {
        Ok(mut remaining) => {
            if remaining.next().is_none() {
                if let Err(e) = fs::remove_dir(source) {
                    log::warn!(
                        "Could not remove source directory {}: {}",
                        source.display(),
                        e
                    );
                }
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Could not re-read {}: {}", source.display(), e),
    }

    Ok(RelocateOutcome::Moved)
}

fn relocate_file(source: &Path, target: &Path) -> Result<RelocateOutcome> {
    if target.exists() {
        log::info!(
            "File already exists at target path: {}, skipping",
            target.display()
        );
        return Ok(RelocateOutcome::SkippedExisting);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| SpindleError::io_at(parent, e))?;
    }

    match fs::rename(source, target) {
        Ok(()) => Ok(RelocateOutcome::Moved),
        Err(e) if is_cross_device(&e) => {
            copy_verify_delete(source, target)?;
            Ok(RelocateOutcome::Moved)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            // Raced with an external process; nothing left to move
            log::warn!("Source file disappeared during move: {}", source.display());
            Ok(RelocateOutcome::SourceVanished)
        }
        Err(e) => Err(SpindleError::io_at(source, e)),
    }
}

/// Cross-device fallback: copy the file, compare byte sizes, delete the
/// source only when they match exactly. A partial copy is cleaned up before
/// the error propagates.
fn copy_verify_delete(source: &Path, target: &Path) -> Result<()> {
    if let Err(e) = fs::copy(source, target) {
        // Do not leave a partial file behind
        if let Err(cleanup) = fs::remove_file(target) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                log::error!(
                    "Error cleaning up partial file {}: {}",
                    target.display(),
                    cleanup
                );
            }
        }
        return Err(SpindleError::io_at(source, e));
    }

    let source_size = fs::metadata(source)
        .map_err(|e| SpindleError::io_at(source, e))?
        .len();
    let target_size = fs::metadata(target)
        .map_err(|e| SpindleError::io_at(target, e))?
        .len();

    if source_size != target_size {
        return Err(SpindleError::SizeMismatch {
            source_path: source.to_path_buf(),
            target_path: target.to_path_buf(),
        });
    }

    if let Err(e) = fs::remove_file(source) {
        log::warn!("Could not remove source file {}: {}", source.display(), e);
    }

    Ok(())
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(windows)]
fn is_cross_device(err: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    err.raw_os_error() == Some(17)
}

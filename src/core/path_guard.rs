//! Path authorization for mutating filesystem operations.
//!
//! Every delete and promote request carries a caller-supplied path. Before
//! anything touches disk, the path is normalized and checked against the
//! authorized root so that `..` segments cannot escape it.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SpindleError};

/// Lexically normalize a path, resolving `.` and `..` segments without
/// touching the filesystem. A `..` that would climb above the first
/// component is kept so the prefix check below still rejects it.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Validate that `path` lies within `root`, returning the normalized path.
///
/// Fails with `InvalidPath` when the normalized path does not begin with the
/// root prefix. No disk access happens on either branch.
pub fn authorize(path: &Path, root: &Path) -> Result<PathBuf> {
    let normalized = normalize(path);
    let root = normalize(root);

    if !normalized.starts_with(&root) {
        return Err(SpindleError::invalid_path(format!(
            "{} is outside {}",
            path.display(),
            root.display()
        )));
    }

    Ok(normalized)
}

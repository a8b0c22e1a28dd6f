//! Recursive listing of a root directory into a typed file tree.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpindleError};

/// Placeholder files used to keep otherwise-empty directories in version
/// control. They are never listed and never count toward directory sizes.
const HOUSEKEEPING_FILES: &[&str] = &[".gitkeep", ".keep"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// One filesystem entry under a root, serialized for display.
#[derive(Debug, Serialize)]
pub struct FileTreeNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: PathBuf,
    #[serde(rename = "relativePath")]
    pub relative_path: PathBuf,
    pub name: String,
    /// File: on-disk size. Directory: recursive sum of file descendant sizes.
    pub size: u64,
    pub modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
}

impl FileTreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Recursively list `root`, pruning empty directories and skipping
/// housekeeping placeholder files.
///
/// Any readdir/stat failure aborts the whole listing with the offending path
/// attached; no partial tree is returned.
pub fn list(root: &Path) -> Result<Vec<FileTreeNode>> {
    list_dir(root, root)
}

fn list_dir(dir: &Path, root: &Path) -> Result<Vec<FileTreeNode>> {
    let entries = fs::read_dir(dir).map_err(|e| SpindleError::io_at(dir, e))?;
    let mut result = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| SpindleError::io_at(dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();

        if HOUSEKEEPING_FILES.contains(&name.as_str()) {
            continue;
        }

        let full_path = entry.path();
        let relative_path = full_path
            .strip_prefix(root)
            .unwrap_or(&full_path)
            .to_path_buf();
        let metadata = fs::metadata(&full_path).map_err(|e| SpindleError::io_at(&full_path, e))?;
        let modified: DateTime<Utc> = metadata
            .modified()
            .map_err(|e| SpindleError::io_at(&full_path, e))?
            .into();

        if metadata.is_dir() {
            let children = list_dir(&full_path, root)?;

            // A directory with no qualifying children is omitted entirely
            if children.is_empty() {
                continue;
            }

            // Each directory child already folded its own descendants in
            let size = children.iter().map(|child| child.size).sum();

            result.push(FileTreeNode {
                kind: NodeKind::Directory,
                path: full_path,
                relative_path,
                name,
                size,
                modified,
                children: Some(children),
            });
        } else {
            result.push(FileTreeNode {
                kind: NodeKind::File,
                path: full_path,
                relative_path,
                name,
                size: metadata.len(),
                modified,
                children: None,
            });
        }
    }

    // Directories first, then files, alphabetical within each group
    result.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });

    Ok(result)
}

//! Source tree enumeration honouring include / exclude globs.

use std::path::{Path, PathBuf};

use tether_core::PathFilter;
use walkdir::WalkDir;

use crate::error::SyncError;

/// Every file under `root` that passes `filter`, in a stable order.
///
/// A file root yields itself. Excluded directories are pruned without being
/// descended into; unreadable entries are skipped with a warning.
pub fn walk(root: &Path, filter: &PathFilter) -> Result<Vec<PathBuf>, SyncError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(SyncError::SourceNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let entries = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !filter.is_excluded(relative(entry.path(), root)));

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if filter.matches(relative(entry.path(), root)) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

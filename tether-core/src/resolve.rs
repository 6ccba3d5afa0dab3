//! Source path → destination path mapping.
//!
//! Local mode probes the roots on disk:
//!
//! | source root | destination root  | result                         |
//! |-------------|-------------------|--------------------------------|
//! | file        | existing file     | the destination file           |
//! | file        | existing dir      | `dst/basename(src)`            |
//! | dir         | existing file     | no mapping (silently skipped)  |
//! | dir         | existing dir      | `dst/relative(path, src)`      |
//! | anything else                   | [`ResolveError::NotFileNotDir`]|
//!
//! Remote mode never probes the remote side; the mapping is lexical and
//! always forward-slash joined.

use std::path::{Component, Path};

use crate::error::ResolveError;
use crate::types::{DestPath, Destination, SyncTarget};

/// Map `path` (under `target.src_root`) to its destination.
///
/// `Ok(None)` is the directory-onto-file case: there is nothing sensible to
/// write, and it is not worth an error line.
pub fn resolve(path: &Path, target: &SyncTarget) -> Result<Option<DestPath>, ResolveError> {
    match &target.destination {
        Destination::Local(dst_root) => resolve_local(path, &target.src_root, dst_root),
        Destination::Remote(endpoint) => {
            resolve_remote(path, &target.src_root, &endpoint.root).map(Some)
        }
    }
}

fn resolve_local(
    path: &Path,
    src_root: &Path,
    dst_root: &Path,
) -> Result<Option<DestPath>, ResolveError> {
    if src_root.is_file() {
        if dst_root.is_file() {
            return Ok(Some(DestPath::Local(dst_root.to_path_buf())));
        }
        if dst_root.is_dir() {
            let Some(name) = src_root.file_name() else {
                return Err(ResolveError::NotFileNotDir {
                    path: src_root.to_path_buf(),
                });
            };
            return Ok(Some(DestPath::Local(dst_root.join(name))));
        }
        return Err(ResolveError::NotFileNotDir {
            path: dst_root.to_path_buf(),
        });
    }

    if src_root.is_dir() {
        if dst_root.is_file() {
            return Ok(None);
        }
        if dst_root.is_dir() {
            let relative = relative_to(path, src_root)?;
            return Ok(Some(DestPath::Local(dst_root.join(relative))));
        }
        return Err(ResolveError::NotFileNotDir {
            path: dst_root.to_path_buf(),
        });
    }

    Err(ResolveError::NotFileNotDir {
        path: src_root.to_path_buf(),
    })
}

fn resolve_remote(path: &Path, src_root: &Path, remote_root: &str) -> Result<DestPath, ResolveError> {
    // A single-file source maps onto root/basename.
    let relative = if path == src_root {
        path.file_name().map(Path::new).unwrap_or(path)
    } else {
        relative_to(path, src_root)?
    };
    Ok(DestPath::Remote(remote_join(remote_root, relative)))
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> Result<&'a Path, ResolveError> {
    path.strip_prefix(root)
        .map_err(|_| ResolveError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
}

/// Join a local relative path onto a remote root with `/`, regardless of the
/// host separator.
pub fn remote_join(root: &str, relative: &Path) -> String {
    let mut joined = root.trim_end_matches('/').to_string();
    if joined.is_empty() && root.starts_with('/') {
        joined.push('/');
    }
    for component in relative.components() {
        if let Component::Normal(part) = component {
            if !joined.ends_with('/') {
                joined.push('/');
            }
            joined.push_str(&part.to_string_lossy());
        }
    }
    joined
}

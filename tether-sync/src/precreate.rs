//! Directory pre-creation order for a batch of destination files.
//!
//! Every ancestor of every destination file is collected once, then sorted
//! by separator count so a parent is always created before its children.
//! Paths are treated lexically; `/` and `\` both count as separators.

use std::collections::BTreeSet;

/// Ancestor directories of `dest_files`, shallowest first.
///
/// The filesystem root (`/`) and the empty parent of a bare file name are
/// never emitted. Within one depth the order is lexical.
pub fn plan<'a, I>(dest_files: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut dirs = BTreeSet::new();
    for file in dest_files {
        let mut current = parent(file);
        while let Some(dir) = current {
            if dir.is_empty() || is_root(dir) {
                break;
            }
            // Ancestors of a known directory are already in the set.
            if !dirs.insert(dir.to_string()) {
                break;
            }
            current = parent(dir);
        }
    }

    let mut ordered: Vec<String> = dirs.into_iter().collect();
    ordered.sort_by_key(|dir| depth(dir));
    ordered
}

/// Number of path separators in `path`.
pub fn depth(path: &str) -> usize {
    path.chars().filter(|c| is_sep(*c)).count()
}

/// Lexical parent, `dirname` style: `"/a/b" -> "/a"`, `"/a" -> "/"`,
/// `"a" -> ""`.
fn parent(path: &str) -> Option<&str> {
    if path.is_empty() || is_root(path) {
        return None;
    }
    let Some(idx) = path.rfind(is_sep) else {
        return Some("");
    };
    let head = &path[..=idx];
    let trimmed = head.trim_end_matches(is_sep);
    if trimmed.is_empty() {
        Some(&head[..1])
    } else {
        Some(trimmed)
    }
}

fn is_root(path: &str) -> bool {
    !path.is_empty() && path.chars().all(is_sep)
}

fn is_sep(c: char) -> bool {
    c == '/' || c == '\\'
}

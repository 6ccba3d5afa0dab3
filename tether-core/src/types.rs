//! Domain types shared by the sync engine and the watch loop.
//!
//! Local filesystem paths are always `PathBuf`; remote paths are plain
//! forward-slash `String`s because they never touch the local filesystem.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::filter::PathFilter;

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

/// How the remote side authenticates us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Password(String),
    KeyFile(PathBuf),
}

/// `user@host:root` plus the credential used to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub user: String,
    pub host: String,
    /// Remote root directory, forward-slash delimited.
    pub root: String,
    pub credential: Credential,
}

impl RemoteEndpoint {
    /// `user@host`, as passed to ssh.
    pub fn login(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

impl fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.root)
    }
}

/// Where synced files land. Selected once at startup from the destination
/// argument; see [`crate::address::parse_destination`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Local(PathBuf),
    Remote(RemoteEndpoint),
}

impl Destination {
    pub fn is_remote(&self) -> bool {
        matches!(self, Destination::Remote(_))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Local(path) => path.display().fmt(f),
            Destination::Remote(endpoint) => endpoint.fmt(f),
        }
    }
}

/// The configured source → destination pair. Built once from startup
/// configuration and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub src_root: PathBuf,
    pub destination: Destination,
    pub filter: PathFilter,
}

impl SyncTarget {
    pub fn new(src_root: PathBuf, destination: Destination, filter: PathFilter) -> Self {
        Self {
            src_root,
            destination,
            filter,
        }
    }

    /// Whether a changed path belongs to this target: it must live under the
    /// source root (or be the source file itself) and pass the glob filter.
    pub fn accepts(&self, path: &Path) -> bool {
        if path == self.src_root {
            return !path.is_dir();
        }
        match path.strip_prefix(&self.src_root) {
            Ok(relative) => self.filter.matches(relative),
            Err(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A destination file path, local or remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DestPath {
    Local(PathBuf),
    Remote(String),
}

impl fmt::Display for DestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestPath::Local(path) => path.display().fmt(f),
            DestPath::Remote(path) => f.write_str(path),
        }
    }
}

/// One unit of work: copy `src` to `dst`.
///
/// `dst == None` means the source path had no valid mapping. Such tasks are
/// terminal: they are reported once and never executed or retried.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncTask {
    pub src: PathBuf,
    pub dst: Option<DestPath>,
}

impl SyncTask {
    pub fn new(src: impl Into<PathBuf>, dst: Option<DestPath>) -> Self {
        Self {
            src: src.into(),
            dst,
        }
    }

    /// Scheduler key; repeated changes to the same source collapse onto it.
    pub fn key(&self) -> &Path {
        &self.src
    }

    pub fn is_resolved(&self) -> bool {
        self.dst.is_some()
    }
}

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// Kind of filesystem change reported by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Renamed,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "created"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Renamed => write!(f, "renamed"),
            ChangeKind::Removed => write!(f, "removed"),
        }
    }
}

/// A raw `(path, kind)` notification; consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

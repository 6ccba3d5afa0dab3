//! notify glue: turns raw filesystem notifications into [`ChangeEvent`]s on
//! a tokio channel.

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tether_core::{ChangeEvent, ChangeKind};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::WatchError;

/// Map a notify event kind onto the kinds the loop cares about.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

pub fn change_events(event: Event) -> Vec<ChangeEvent> {
    let Some(kind) = change_kind(&event.kind) else {
        return Vec::new();
    };
    event
        .paths
        .into_iter()
        .map(|path| ChangeEvent::new(path, kind))
        .collect()
}

/// What to hand to notify for a given source root. A file is watched
/// through its parent directory.
pub fn watch_root(src_root: &Path) -> (PathBuf, RecursiveMode) {
    if src_root.is_file() {
        let parent = match src_root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        (parent, RecursiveMode::NonRecursive)
    } else {
        (src_root.to_path_buf(), RecursiveMode::Recursive)
    }
}

/// Start watching `src_root`. Events flow into `tx` until the returned
/// watcher is dropped.
pub fn spawn(
    src_root: &Path,
    tx: UnboundedSender<ChangeEvent>,
) -> Result<RecommendedWatcher, WatchError> {
    let mut watcher = recommended_watcher(move |event: notify::Result<Event>| match event {
        Ok(event) => {
            for change in change_events(event) {
                let _ = tx.send(change);
            }
        }
        Err(err) => tracing::warn!(error = %err, "watcher event error"),
    })?;

    let (root, mode) = watch_root(src_root);
    watcher.watch(&root, mode)?;
    tracing::debug!(root = %root.display(), ?mode, "watching");
    Ok(watcher)
}

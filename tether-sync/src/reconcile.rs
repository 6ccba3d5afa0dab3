//! One-shot startup reconciliation.
//!
//! Local targets are compared file by file: a source file is pushed when its
//! destination is missing or not strictly newer. Remote targets are not
//! probed at all; every matched file is pushed as one batch.
//!
//! Either way the user confirms a count first, and the resulting tasks run
//! immediately through the executor, bypassing the debounce scheduler.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tether_core::{resolve, DestPath, Destination, ResolveError, SyncTarget, SyncTask};

use crate::confirm::{is_affirmative, Confirm};
use crate::error::{io_err, SyncError, TransferError};
use crate::executor::{BatchReport, Executor};
use crate::report::Reporter;
use crate::walk::walk;

/// What the reconciliation pass did.
#[derive(Debug, Default)]
pub struct ReconcileSummary {
    /// Files found in the source tree after filtering.
    pub candidates: usize,
    /// Tasks proposed to the user.
    pub selected: usize,
    /// Whether the user agreed to push them.
    pub confirmed: bool,
    pub report: BatchReport,
    /// Set when the executor gave up on the whole batch.
    pub batch_error: Option<TransferError>,
}

/// Compute the initial task set without touching the destination.
///
/// Unresolvable paths are reported and left out. A root that is neither a
/// file nor a directory is reported once and ends the plan, since no file
/// under it can resolve. A file whose mtimes cannot be compared is selected
/// anyway; the executor then skips or fails that one task on its own.
pub fn plan(target: &SyncTarget, reporter: &dyn Reporter) -> Result<(usize, Vec<SyncTask>), SyncError> {
    let files = walk(&target.src_root, &target.filter)?;
    let candidates = files.len();
    let mut tasks = Vec::new();

    for src in files {
        let dst = match resolve(&src, target) {
            Ok(Some(dst)) => dst,
            Ok(None) => continue,
            Err(err @ ResolveError::NotFileNotDir { .. }) => {
                reporter.error(&err.to_string());
                break;
            }
            Err(err) => {
                reporter.error(&err.to_string());
                continue;
            }
        };
        let selected = match (&target.destination, &dst) {
            (Destination::Local(_), DestPath::Local(dst_path)) => {
                needs_sync(&src, dst_path).unwrap_or_else(|err| {
                    tracing::debug!("cannot compare {} with {}: {err}", src.display(), dst_path.display());
                    true
                })
            }
            _ => true,
        };
        if selected {
            tasks.push(SyncTask::new(src, Some(dst)));
        }
    }
    Ok((candidates, tasks))
}

/// Whether `src` should be pushed over `dst`: the destination is missing, or
/// its mtime is less than or equal to the source's.
pub fn needs_sync(src: &Path, dst: &Path) -> Result<bool, SyncError> {
    let dst_modified = match fs::metadata(dst) {
        Ok(meta) => meta.modified().map_err(|e| io_err(dst, e))?,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(true),
        Err(err) => return Err(io_err(dst, err)),
    };
    let src_modified = fs::metadata(src)
        .and_then(|meta| meta.modified())
        .map_err(|e| io_err(src, e))?;
    Ok(dst_modified <= src_modified)
}

/// Plan, ask, push.
///
/// A local target with nothing to do returns without asking. A declined
/// prompt skips the push but is not an error.
pub fn run(
    target: &SyncTarget,
    executor: &mut dyn Executor,
    confirm: &mut dyn Confirm,
    reporter: &dyn Reporter,
) -> Result<ReconcileSummary, SyncError> {
    let (candidates, tasks) = plan(target, reporter)?;
    let mut summary = ReconcileSummary {
        candidates,
        selected: tasks.len(),
        ..ReconcileSummary::default()
    };

    if tasks.is_empty() && !target.destination.is_remote() {
        tracing::info!("{} is up to date", target.destination);
        return Ok(summary);
    }

    reporter.question(&format!(
        "Push {} files from {} to {} [Y/n]?",
        tasks.len(),
        target.src_root.display(),
        target.destination
    ));
    let answer = confirm
        .answer()
        .map_err(|e| io_err("<stdin>", e))?;
    if !is_affirmative(&answer) {
        tracing::info!("initial push declined");
        return Ok(summary);
    }
    summary.confirmed = true;

    match executor.execute_batch(&tasks) {
        Ok(report) => summary.report = report,
        Err(err) => summary.batch_error = Some(err),
    }
    Ok(summary)
}

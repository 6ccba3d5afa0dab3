//! The transfer capability shared by the local and remote strategies.

use std::fs;
use std::path::{Path, PathBuf};

use tether_core::SyncTask;

use crate::error::TransferError;

/// Successful result of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Copied,
    /// Nothing to do; still counts as success.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The source vanished before we got to it.
    SourceMissing,
    /// Directories are never transferred as entries.
    SourceIsDirectory,
}

/// Per-file tally of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub copied: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, TransferError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub(crate) fn record(&mut self, src: &Path, result: Result<TransferOutcome, TransferError>) {
        match result {
            Ok(TransferOutcome::Copied) => self.copied += 1,
            Ok(TransferOutcome::Skipped(_)) => self.skipped += 1,
            Err(err) => self.failed.push((src.to_path_buf(), err)),
        }
    }
}

/// Moves files to the destination. One implementation is picked at startup
/// from the destination address and used for the whole process lifetime.
pub trait Executor {
    /// Transfer a single task.
    ///
    /// A failed task has already been reported; the caller only decides
    /// whether to try again.
    fn execute(&mut self, task: &SyncTask) -> Result<TransferOutcome, TransferError>;

    /// Transfer many tasks. Per-file failures land in the report; only a
    /// failure that makes the rest of the batch impossible is returned as
    /// `Err`.
    ///
    /// The default runs [`Executor::execute`] sequentially.
    fn execute_batch(&mut self, tasks: &[SyncTask]) -> Result<BatchReport, TransferError> {
        let mut report = BatchReport::default();
        for task in tasks {
            let result = self.execute(task);
            report.record(&task.src, result);
        }
        Ok(report)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&mut self, task: &SyncTask) -> Result<TransferOutcome, TransferError> {
        (**self).execute(task)
    }

    fn execute_batch(&mut self, tasks: &[SyncTask]) -> Result<BatchReport, TransferError> {
        (**self).execute_batch(tasks)
    }
}

/// Shared precondition: a missing source or a directory source is a no-op.
pub(crate) fn check_source(src: &Path) -> Option<SkipReason> {
    match fs::metadata(src) {
        Ok(meta) if meta.is_dir() => Some(SkipReason::SourceIsDirectory),
        Ok(_) => None,
        Err(_) => Some(SkipReason::SourceMissing),
    }
}

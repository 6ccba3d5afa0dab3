//! Local filesystem copy.
//!
//! ## Fresh-copy protocol
//!
//! 1. Create the destination's parent directory (recursively; already
//!    present is fine).
//! 2. Remove any existing destination file.
//! 3. Copy bytes and permission bits from source to destination.
//!
//! The destination's mtime is *not* carried over: a freshly copied file is
//! newer than its source, so the next reconciliation skips it.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tether_core::{DestPath, SyncTask};

use crate::error::TransferError;
use crate::executor::{check_source, Executor, TransferOutcome};
use crate::report::Reporter;

pub struct LocalExecutor {
    reporter: Arc<dyn Reporter>,
}

impl LocalExecutor {
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self { reporter }
    }
}

impl Executor for LocalExecutor {
    fn execute(&mut self, task: &SyncTask) -> Result<TransferOutcome, TransferError> {
        let Some(DestPath::Local(dst)) = &task.dst else {
            let err = TransferError::UnresolvableDestination {
                src: task.src.clone(),
            };
            self.reporter.error(&err.to_string());
            return Err(err);
        };

        if let Some(reason) = check_source(&task.src) {
            tracing::debug!("nothing to do for {} ({reason:?})", task.src.display());
            return Ok(TransferOutcome::Skipped(reason));
        }

        match copy_fresh(&task.src, dst) {
            Ok(()) => {
                self.reporter.copied(
                    &task.src.display().to_string(),
                    &dst.display().to_string(),
                );
                Ok(TransferOutcome::Copied)
            }
            Err(err) => {
                self.reporter.error(&err.to_string());
                self.reporter
                    .info(&format!("Rescheduling {}", task.src.display()));
                Err(err)
            }
        }
    }
}

fn copy_fresh(src: &Path, dst: &Path) -> Result<(), TransferError> {
    // Step 1: parent directory.
    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(source) = fs::create_dir_all(parent) {
            if !parent.is_dir() {
                return Err(TransferError::DirectoryCreateFailed {
                    path: parent.to_path_buf(),
                    source,
                });
            }
        }
    }

    // Step 2: remove the previous copy.
    match fs::remove_file(dst) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(TransferError::DestinationRemoveFailed {
                path: dst.to_path_buf(),
                source,
            })
        }
    }

    // Step 3: copy.
    fs::copy(src, dst).map_err(|source| TransferError::CopyFailed {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    })?;
    tracing::debug!("copied {} -> {}", src.display(), dst.display());
    Ok(())
}

//! Remote push over a secure channel.
//!
//! A batch is pushed under exactly one connection:
//!
//! 1. connect (password, else key file)
//! 2. create every ancestor directory of the batch, shallowest first;
//!    "already exists" is ignored
//! 3. put each file; one file failing does not stop its siblings
//! 4. close, whatever happened in 2 and 3
//!
//! The transport is abstracted behind [`Connector`] / [`RemoteSession`] so
//! the batch logic is independent of how bytes actually travel;
//! [`OpenSshConnector`] drives the system `ssh` client.

mod openssh;

use std::path::Path;
use std::slice;
use std::sync::Arc;

use tether_core::{DestPath, RemoteEndpoint, SyncTask};

use crate::error::{RemoteError, TransferError};
use crate::executor::{check_source, BatchReport, Executor, TransferOutcome};
use crate::precreate;
use crate::report::Reporter;

pub use openssh::OpenSshConnector;

/// An open connection to the remote host. Remote paths are always
/// forward-slash delimited.
pub trait RemoteSession {
    /// Create one directory (not recursively). An existing directory must be
    /// reported as [`RemoteError::AlreadyExists`].
    fn make_directory(&mut self, path: &str) -> Result<(), RemoteError>;

    fn put_file(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError>;

    fn close(&mut self) -> Result<(), RemoteError>;
}

/// Opens [`RemoteSession`]s.
pub trait Connector {
    fn connect(&self, endpoint: &RemoteEndpoint) -> Result<Box<dyn RemoteSession>, RemoteError>;
}

pub struct RemoteExecutor<C = OpenSshConnector> {
    endpoint: RemoteEndpoint,
    connector: C,
    reporter: Arc<dyn Reporter>,
}

impl RemoteExecutor<OpenSshConnector> {
    pub fn new(endpoint: RemoteEndpoint, reporter: Arc<dyn Reporter>) -> Self {
        Self::with_connector(endpoint, OpenSshConnector::default(), reporter)
    }
}

impl<C: Connector> RemoteExecutor<C> {
    pub fn with_connector(endpoint: RemoteEndpoint, connector: C, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            endpoint,
            connector,
            reporter,
        }
    }

    fn push(
        &self,
        session: &mut dyn RemoteSession,
        files: &[(&Path, &str)],
        report: &mut BatchReport,
    ) -> Result<(), TransferError> {
        for dir in precreate::plan(files.iter().map(|(_, dst)| *dst)) {
            match session.make_directory(&dir) {
                Ok(()) | Err(RemoteError::AlreadyExists { .. }) => {}
                Err(source @ RemoteError::Connection { .. }) => {
                    return Err(TransferError::ConnectionFailed {
                        target: self.endpoint.to_string(),
                        source,
                    })
                }
                Err(source) => {
                    return Err(TransferError::RemoteDirectoryCreateFailed { path: dir, source })
                }
            }
        }

        for (src, dst) in files {
            match session.put_file(src, dst) {
                Ok(()) => {
                    self.reporter.copied(&src.display().to_string(), dst);
                    report.copied += 1;
                }
                Err(source) => {
                    let err = TransferError::TransferFailed {
                        src: src.to_path_buf(),
                        dst: dst.to_string(),
                        source,
                    };
                    self.reporter.error(&err.to_string());
                    report.failed.push((src.to_path_buf(), err));
                }
            }
        }
        Ok(())
    }
}

impl<C: Connector> Executor for RemoteExecutor<C> {
    fn execute(&mut self, task: &SyncTask) -> Result<TransferOutcome, TransferError> {
        if !matches!(task.dst, Some(DestPath::Remote(_))) {
            let err = TransferError::UnresolvableDestination {
                src: task.src.clone(),
            };
            self.reporter.error(&err.to_string());
            return Err(err);
        }
        if let Some(reason) = check_source(&task.src) {
            return Ok(TransferOutcome::Skipped(reason));
        }

        let failure = match self.execute_batch(slice::from_ref(task)) {
            Ok(mut report) => match report.failed.pop() {
                None => return Ok(TransferOutcome::Copied),
                Some((_, err)) => err,
            },
            Err(err) => err,
        };
        self.reporter
            .info(&format!("Rescheduling {}", task.src.display()));
        Err(failure)
    }

    fn execute_batch(&mut self, tasks: &[SyncTask]) -> Result<BatchReport, TransferError> {
        let mut report = BatchReport::default();
        let mut files = Vec::with_capacity(tasks.len());
        for task in tasks {
            let Some(DestPath::Remote(dst)) = &task.dst else {
                let err = TransferError::UnresolvableDestination {
                    src: task.src.clone(),
                };
                self.reporter.error(&err.to_string());
                report.failed.push((task.src.clone(), err));
                continue;
            };
            if check_source(&task.src).is_some() {
                report.skipped += 1;
                continue;
            }
            files.push((task.src.as_path(), dst.as_str()));
        }
        if files.is_empty() {
            return Ok(report);
        }

        let mut session = self.connector.connect(&self.endpoint).map_err(|source| {
            let err = TransferError::ConnectionFailed {
                target: self.endpoint.to_string(),
                source,
            };
            self.reporter.error(&err.to_string());
            err
        })?;
        tracing::debug!("connected to {} for {} file(s)", self.endpoint, files.len());

        let pushed = self.push(session.as_mut(), &files, &mut report);
        if let Err(err) = session.close() {
            tracing::warn!("closing connection to {} failed: {err}", self.endpoint);
        }

        match pushed {
            Ok(()) => Ok(report),
            Err(err) => {
                self.reporter.error(&err.to_string());
                Err(err)
            }
        }
    }
}

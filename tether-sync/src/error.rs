//! Error types for tether-sync.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single transfer (or a whole remote batch) failed.
///
/// Every variant except [`TransferError::UnresolvableDestination`] is worth
/// retrying; the scheduler re-arms the task on those.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The task carries no destination. Terminal: never executed or retried.
    #[error("no destination for {}", src.display())]
    UnresolvableDestination { src: PathBuf },

    #[error("Failed to create {}: {source}", path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {}: {source}", path.display())]
    DestinationRemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {} -> {}: {source}", src.display(), dst.display())]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create remote directory {path}: {source}")]
    RemoteDirectoryCreateFailed {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to transfer {} -> {dst}: {source}", src.display())]
    TransferFailed {
        src: PathBuf,
        dst: String,
        #[source]
        source: RemoteError,
    },

    /// Fatal to the whole remote batch.
    #[error("Failed to connect to {target}: {source}")]
    ConnectionFailed {
        target: String,
        #[source]
        source: RemoteError,
    },
}

impl TransferError {
    /// Whether the scheduler should try the task again later.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransferError::UnresolvableDestination { .. })
    }
}

/// Failures reported by a [`RemoteSession`](crate::RemoteSession).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// `make_directory` on a directory that is already there. Harmless.
    #[error("{path} already exists")]
    AlreadyExists { path: String },

    /// The connection could not be established or was lost.
    #[error("connection to {target} failed: {message}")]
    Connection { target: String, message: String },

    /// A remote operation ran but did not succeed.
    #[error("{op} {path} failed: {message}")]
    Command {
        op: &'static str,
        path: String,
        message: String,
    },

    /// Local I/O needed by the session failed (spawning, reading the file).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from walking the source tree and reconciling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} not a file not a dir", path.display())]
    SourceNotFound { path: PathBuf },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

//! # tether-sync
//!
//! Transfer execution and the one-shot startup reconciliation.
//!
//! An [`Executor`] moves one [`SyncTask`](tether_core::SyncTask) (or a batch
//! of them) to the destination: [`LocalExecutor`] copies on the local
//! filesystem, [`RemoteExecutor`] pushes over a [`RemoteSession`]. The
//! [`reconcile`] module walks the source tree once and drives an executor
//! over everything that is out of date.

pub mod confirm;
pub mod error;
pub mod executor;
pub mod local;
pub mod precreate;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod walk;

pub use confirm::{is_affirmative, AssumeYes, Confirm, StdinConfirm};
pub use error::{RemoteError, SyncError, TransferError};
pub use executor::{BatchReport, Executor, SkipReason, TransferOutcome};
pub use local::LocalExecutor;
pub use reconcile::ReconcileSummary;
pub use remote::{Connector, OpenSshConnector, RemoteExecutor, RemoteSession};
pub use report::{MemoryReporter, ReportEvent, Reporter};

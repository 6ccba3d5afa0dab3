//! Continuous mirroring: filesystem watcher + debounce scheduler + the
//! single-threaded loop that ties them to an executor.

mod error;
pub mod runtime;
pub mod scheduler;
pub mod watcher;

pub use error::WatchError;
pub use runtime::{drive, init_tracing, run, start_blocking, WatchOptions};
pub use scheduler::{Appended, ChangeScheduler, FireReport, ScheduledEntry};

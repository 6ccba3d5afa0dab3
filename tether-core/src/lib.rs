//! Tether core library: domain types, destination addressing, path
//! resolution, glob filtering and settings.
//!
//! - [`types`]: sync target, tasks and change events
//! - [`address`]: `user@host:path` destination parsing
//! - [`resolve`]: source path → destination path mapping
//! - [`filter`]: include / exclude globs
//! - [`config`]: `~/.tether/config.yaml`
//! - [`error`]: error enums for all of the above

pub mod address;
pub mod config;
pub mod error;
pub mod filter;
pub mod resolve;
pub mod types;

pub use error::{AddressError, ConfigError, FilterError, ResolveError};
pub use filter::PathFilter;
pub use resolve::resolve;
pub use types::{
    ChangeEvent, ChangeKind, Credential, DestPath, Destination, RemoteEndpoint, SyncTarget,
    SyncTask,
};

//! Error types for tether-core.

use std::path::PathBuf;

use thiserror::Error;

/// A source path could not be mapped onto the destination tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The root is neither an existing file nor an existing directory.
    #[error("{path} not a file not a dir")]
    NotFileNotDir { path: PathBuf },

    /// The changed path does not live under the source root.
    #[error("{path} is outside of {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Destination argument could not be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Neither a password nor a key was given and no home directory is known.
    #[error("cannot determine home directory for the default ssh key; pass --key or --password")]
    HomeNotFound,
}

/// An include or exclude glob failed to parse.
#[derive(Debug, Error)]
#[error("invalid glob '{pattern}': {source}")]
pub struct FilterError {
    pub pattern: String,
    #[source]
    pub source: glob::PatternError,
}

/// Errors reading `~/.tether/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

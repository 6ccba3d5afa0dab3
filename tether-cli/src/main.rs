//! tether: keep a destination in step with a source file or tree.
//!
//! # Usage
//!
//! ```text
//! tether <src> <dst> [-i GLOB]... [-e GLOB]... [-c] [-y] [--once]
//! tether <src> user@host:/path [-p PASSWORD | -k KEYFILE]
//! ```
//!
//! On start every out-of-date file is pushed once (after a `[Y/n]`
//! prompt), then the source is watched and each change is copied after a
//! quiet period.

mod console;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Mirror a file or directory to a local path or an SSH host and keep it in sync",
    long_about = None,
)]
pub struct Cli {
    /// Source file or directory.
    pub src: PathBuf,

    /// Destination: a local path, or `user@host:/remote/path`.
    pub dst: String,

    /// Only sync files matching this glob (repeatable).
    #[arg(short, long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Skip files and directories matching this glob (repeatable).
    #[arg(short, long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Create a missing local destination directory.
    #[arg(short, long)]
    pub create: bool,

    /// SSH password for a remote destination (needs `sshpass`).
    #[arg(short, long, conflicts_with = "key")]
    pub password: Option<String>,

    /// SSH private key for a remote destination [default: ~/.ssh/id_rsa].
    #[arg(short, long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Answer yes to the initial push prompt.
    #[arg(short, long)]
    pub yes: bool,

    /// Skip the initial push and start watching right away.
    #[arg(long, conflicts_with = "once")]
    pub no_initial_sync: bool,

    /// Exit after the initial push instead of watching.
    #[arg(long)]
    pub once: bool,

    /// Quiet period after the last change to a file before it is copied.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    Cli::parse().run()
}

//! Startup validation and wiring: settings → target → initial push → watch.

use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tether_core::address::{default_key_path, parse_destination};
use tether_core::config::{self, Settings};
use tether_core::{Destination, PathFilter, ResolveError, SyncTarget};
use tether_sync::reconcile::{self, ReconcileSummary};
use tether_sync::{
    AssumeYes, Confirm, Executor, LocalExecutor, RemoteExecutor, Reporter, StdinConfirm,
};
use tether_watch::WatchOptions;

use crate::console::ConsoleReporter;
use crate::Cli;

impl Cli {
    pub fn run(self) -> Result<ExitCode> {
        tether_watch::init_tracing("warn");

        let home = dirs::home_dir();
        let settings = match &home {
            Some(home) => config::load_at(home).with_context(|| {
                format!(
                    "failed to load settings from {}",
                    config::settings_path_at(home).display()
                )
            })?,
            None => Settings::default(),
        };
        let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter);

        let include = merged(&settings.include, &self.include);
        let exclude = merged(&settings.exclude, &self.exclude);
        let filter = PathFilter::new(&include, &exclude).context("invalid glob")?;

        let default_key = settings
            .default_key
            .clone()
            .or_else(|| home.as_deref().map(default_key_path));
        let destination = parse_destination(
            &self.dst,
            self.password.clone(),
            self.key.clone(),
            default_key,
        )
        .context("no ssh credential: pass --key or --password")?;

        if let Destination::Local(dst) = &destination {
            if self.create {
                if let Err(err) = fs::create_dir_all(dst) {
                    tracing::debug!("create_dir_all {}: {err}", dst.display());
                }
                if !dst.is_dir() {
                    reporter.error(&format!("Failed to create {}", dst.display()));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        let src = match fs::canonicalize(&self.src) {
            Ok(src) => src,
            Err(err) => {
                tracing::debug!("canonicalize {}: {err}", self.src.display());
                let err = ResolveError::NotFileNotDir {
                    path: self.src.clone(),
                };
                reporter.error(&err.to_string());
                return Ok(ExitCode::FAILURE);
            }
        };
        if let Some(message) = dir_onto_file(&src, &destination) {
            reporter.error(&message);
            return Ok(ExitCode::FAILURE);
        }

        let target = SyncTarget::new(src, destination, filter);
        let mut executor = executor_for(&target.destination, reporter.clone());

        if !self.no_initial_sync {
            reporter.info("Initial sync");
            let mut confirm: Box<dyn Confirm> = if self.yes {
                Box::new(AssumeYes)
            } else {
                Box::new(StdinConfirm)
            };
            let summary = match reconcile::run(
                &target,
                executor.as_mut(),
                confirm.as_mut(),
                reporter.as_ref(),
            ) {
                Ok(summary) => summary,
                Err(err) => {
                    reporter.error(&err.to_string());
                    ReconcileSummary::default()
                }
            };
            tracing::info!(
                candidates = summary.candidates,
                selected = summary.selected,
                copied = summary.report.copied,
                failed = summary.report.failed.len(),
                "initial sync finished"
            );
            if self.once {
                return Ok(exit_code(&summary));
            }
        }

        let options = WatchOptions {
            debounce: self
                .debounce_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or_else(|| settings.debounce()),
            retry_delay: settings.retry_delay(),
        };
        reporter.info(&format!("Watching {}", target.src_root.display()));
        tether_watch::start_blocking(&target, options, executor.as_mut(), reporter.clone())
            .with_context(|| format!("watching {} failed", target.src_root.display()))?;
        Ok(ExitCode::SUCCESS)
    }
}

/// Settings-file globs first, then the command line ones.
fn merged(from_settings: &[String], from_cli: &[String]) -> Vec<String> {
    from_settings.iter().chain(from_cli).cloned().collect()
}

fn dir_onto_file(src: &Path, destination: &Destination) -> Option<String> {
    match destination {
        Destination::Local(dst) if src.is_dir() && dst.is_file() => Some(format!(
            "{} is dir and {} is file, cannot synchronize dir to file",
            src.display(),
            dst.display()
        )),
        _ => None,
    }
}

fn executor_for(destination: &Destination, reporter: Arc<dyn Reporter>) -> Box<dyn Executor> {
    match destination {
        Destination::Local(_) => Box::new(LocalExecutor::new(reporter)),
        Destination::Remote(endpoint) => Box::new(RemoteExecutor::new(endpoint.clone(), reporter)),
    }
}

fn exit_code(summary: &ReconcileSummary) -> ExitCode {
    if summary.batch_error.is_some() || !summary.report.failed.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

use std::sync::Arc;
use std::time::Duration;

use tether_core::{resolve, ChangeEvent, SyncTarget, SyncTask};
use tether_sync::{Executor, Reporter};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::Instant;

use crate::error::{io_err, WatchError};
use crate::scheduler::ChangeScheduler;
use crate::watcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Quiet period after the last change to a path before it is copied.
    pub debounce: Duration,
    /// Wait before re-running a failed copy.
    pub retry_delay: Duration,
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `default`.
pub fn init_tracing(default: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Watch `target` and mirror changes until ctrl-c. Blocks the current
/// thread; everything runs on a single-threaded runtime.
pub fn start_blocking(
    target: &SyncTarget,
    options: WatchOptions,
    executor: &mut dyn Executor,
    reporter: Arc<dyn Reporter>,
) -> Result<(), WatchError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(target, options, executor, reporter))
}

pub async fn run(
    target: &SyncTarget,
    options: WatchOptions,
    executor: &mut dyn Executor,
    reporter: Arc<dyn Reporter>,
) -> Result<(), WatchError> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let _watcher = watcher::spawn(&target.src_root, event_tx)?;

    tokio::select! {
        result = drive(target, options, event_rx, executor, reporter.as_ref()) => result,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => {
                    tracing::info!("received ctrl-c, stopping watch");
                    Ok(())
                }
                Err(err) => Err(WatchError::Signal(format!("ctrl-c handler failed: {err}"))),
            }
        }
    }
}

/// Feed change events through the scheduler and execute whatever falls due.
///
/// Returns once `events` is closed and every scheduled entry has completed.
/// Failing entries keep being retried, so with a persistent failure this
/// only ends when the surrounding future is dropped.
pub async fn drive(
    target: &SyncTarget,
    options: WatchOptions,
    mut events: UnboundedReceiver<ChangeEvent>,
    executor: &mut dyn Executor,
    reporter: &dyn Reporter,
) -> Result<(), WatchError> {
    let mut scheduler = ChangeScheduler::new(options.retry_delay);
    let mut open = true;

    loop {
        if !open && scheduler.is_empty() {
            break;
        }
        let next_due = scheduler.next_due();

        tokio::select! {
            event = events.recv(), if open => {
                match event {
                    Some(event) => on_change(target, event, &mut scheduler, options.debounce, reporter),
                    None => {
                        tracing::debug!(pending = scheduler.len(), "event stream closed, draining");
                        open = false;
                    }
                }
            }
            _ = sleep_until(next_due) => {
                let report = scheduler.fire_due(Instant::now(), executor);
                tracing::debug!(?report, pending = scheduler.len(), "fired due entries");
            }
        }
    }
    Ok(())
}

fn on_change(
    target: &SyncTarget,
    event: ChangeEvent,
    scheduler: &mut ChangeScheduler,
    debounce: Duration,
    reporter: &dyn Reporter,
) {
    if !target.accepts(&event.path) {
        tracing::trace!(path = %event.path.display(), "filtered out");
        return;
    }
    tracing::debug!(path = %event.path.display(), kind = %event.kind, "change");

    let dst = match resolve(&event.path, target) {
        Ok(dst) => dst,
        Err(err) => {
            reporter.error(&err.to_string());
            None
        }
    };
    scheduler.append(SyncTask::new(event.path, dst), debounce, Instant::now());
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

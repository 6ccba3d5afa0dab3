//! Per-file debounce and retry.
//!
//! Each source path owns at most one [`ScheduledEntry`]. A new change for a
//! path that is already pending replaces the task and pushes the due time
//! out again (the window slides while edits keep arriving). Due entries are
//! dispatched in due-time order, ties broken by insertion order; a failed
//! dispatch is re-armed after a fixed delay with no attempt cap.
//!
//! The scheduler never reads the clock itself: every call takes `now`, so
//! the loop decides what time it is and tests can use any instant.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tether_core::SyncTask;
use tether_sync::Executor;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEntry {
    pub task: SyncTask,
    pub due_at: Instant,
    /// Failed dispatches so far.
    pub attempt: u32,
    seq: u64,
}

/// Result of [`ChangeScheduler::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appended {
    /// First pending change for this path.
    Scheduled,
    /// Replaced a pending entry and restarted its window.
    Debounced,
    /// Task had no destination; never scheduled.
    Dropped,
}

/// Tally of one [`ChangeScheduler::fire_due`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FireReport {
    pub completed: usize,
    pub retried: usize,
    pub dropped: usize,
}

impl FireReport {
    pub fn dispatched(&self) -> usize {
        self.completed + self.retried + self.dropped
    }
}

#[derive(Debug)]
pub struct ChangeScheduler {
    entries: HashMap<PathBuf, ScheduledEntry>,
    retry_delay: Duration,
    next_seq: u64,
}

impl ChangeScheduler {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            retry_delay,
            next_seq: 0,
        }
    }

    /// Schedule `task` to run once `delay` has passed without another change
    /// to the same source.
    pub fn append(&mut self, task: SyncTask, delay: Duration, now: Instant) -> Appended {
        if !task.is_resolved() {
            tracing::warn!(src = %task.src.display(), "dropping change without destination");
            return Appended::Dropped;
        }

        let due_at = now + delay;
        let seq = self.bump_seq();
        match self.entries.entry(task.key().to_path_buf()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.task = task;
                entry.due_at = due_at;
                entry.seq = seq;
                Appended::Debounced
            }
            Entry::Vacant(vacant) => {
                vacant.insert(ScheduledEntry {
                    task,
                    due_at,
                    attempt: 0,
                    seq,
                });
                Appended::Scheduled
            }
        }
    }

    /// Earliest due time among pending entries.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.values().map(|entry| entry.due_at).min()
    }

    /// Run every entry due at `now`, one after another, on the caller's
    /// thread.
    pub fn fire_due(&mut self, now: Instant, executor: &mut dyn Executor) -> FireReport {
        let mut due: Vec<(Instant, u64, PathBuf)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.due_at <= now)
            .map(|(key, entry)| (entry.due_at, entry.seq, key.clone()))
            .collect();
        due.sort();

        let mut report = FireReport::default();
        for (_, _, key) in due {
            let Some(entry) = self.entries.remove(&key) else {
                continue;
            };
            match executor.execute(&entry.task) {
                Ok(outcome) => {
                    tracing::debug!(src = %key.display(), ?outcome, "task done");
                    report.completed += 1;
                }
                Err(err) if err.is_retryable() => {
                    tracing::debug!(
                        src = %key.display(),
                        attempt = entry.attempt + 1,
                        error = %err,
                        "task failed, re-arming",
                    );
                    self.rearm(entry, now);
                    report.retried += 1;
                }
                Err(err) => {
                    tracing::warn!(src = %key.display(), error = %err, "task dropped");
                    report.dropped += 1;
                }
            }
        }
        report
    }

    pub fn get(&self, key: &Path) -> Option<&ScheduledEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rearm(&mut self, entry: ScheduledEntry, now: Instant) {
        let seq = self.bump_seq();
        let key = entry.task.key().to_path_buf();
        // A newer change for the same path supersedes the retry.
        self.entries.entry(key).or_insert(ScheduledEntry {
            due_at: now + self.retry_delay,
            attempt: entry.attempt + 1,
            seq,
            task: entry.task,
        });
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

//! User-facing progress lines.
//!
//! The engine never prints. It hands four kinds of events to a [`Reporter`]
//! and moves on; nothing it returns is consumed.

use std::sync::Mutex;

pub trait Reporter: Send + Sync {
    fn info(&self, msg: &str);
    /// A prompt; the answer is read separately through a
    /// [`Confirm`](crate::Confirm).
    fn question(&self, msg: &str);
    fn error(&self, msg: &str);
    fn copied(&self, src: &str, dst: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Info(String),
    Question(String),
    Error(String),
    Copied { src: String, dst: String },
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.collect(|e| match e {
            ReportEvent::Info(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(|e| match e {
            ReportEvent::Error(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    pub fn questions(&self) -> Vec<String> {
        self.collect(|e| match e {
            ReportEvent::Question(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    /// `(src, dst)` pairs of every copied event.
    pub fn copies(&self) -> Vec<(String, String)> {
        self.collect(|e| match e {
            ReportEvent::Copied { src, dst } => Some((src.clone(), dst.clone())),
            _ => None,
        })
    }

    fn collect<T>(&self, pick: impl Fn(&ReportEvent) -> Option<T>) -> Vec<T> {
        self.lock().iter().filter_map(pick).collect()
    }

    fn push(&self, event: ReportEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReportEvent>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, msg: &str) {
        self.push(ReportEvent::Info(msg.to_string()));
    }

    fn question(&self, msg: &str) {
        self.push(ReportEvent::Question(msg.to_string()));
    }

    fn error(&self, msg: &str) {
        self.push(ReportEvent::Error(msg.to_string()));
    }

    fn copied(&self, src: &str, dst: &str) {
        self.push(ReportEvent::Copied {
            src: src.to_string(),
            dst: dst.to_string(),
        });
    }
}

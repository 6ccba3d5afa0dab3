//! Shared fixtures: an in-memory remote session and a scripted confirmation.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tether_core::{Credential, RemoteEndpoint};
use tether_sync::{Confirm, Connector, RemoteError, RemoteSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Mkdir(String),
    Put { local: PathBuf, remote: String },
    Close,
}

/// Behaviour knobs for [`FakeConnector`].
#[derive(Debug, Default, Clone)]
pub struct FakeRemote {
    /// Directories that already exist remotely.
    pub existing: HashSet<String>,
    /// Directories whose creation is refused (permission denied).
    pub forbidden: HashSet<String>,
    /// Remote file paths whose upload fails.
    pub failing_puts: HashSet<String>,
    pub refuse_connection: bool,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    pub remote: FakeRemote,
    pub calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeConnector {
    pub fn new(remote: FakeRemote) -> Self {
        Self {
            remote,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn mkdirs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Mkdir(dir) => Some(dir),
                _ => None,
            })
            .collect()
    }

    pub fn puts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Put { remote, .. } => Some(remote),
                _ => None,
            })
            .collect()
    }
}

impl Connector for FakeConnector {
    fn connect(&self, endpoint: &RemoteEndpoint) -> Result<Box<dyn RemoteSession>, RemoteError> {
        self.calls.lock().expect("calls lock").push(Call::Connect);
        if self.remote.refuse_connection {
            return Err(RemoteError::Connection {
                target: endpoint.login(),
                message: "connection refused".into(),
            });
        }
        Ok(Box::new(FakeSession {
            remote: self.remote.clone(),
            calls: self.calls.clone(),
        }))
    }
}

struct FakeSession {
    remote: FakeRemote,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RemoteSession for FakeSession {
    fn make_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(Call::Mkdir(path.to_string()));
        if self.remote.forbidden.contains(path) {
            return Err(RemoteError::Command {
                op: "mkdir",
                path: path.to_string(),
                message: "Permission denied".into(),
            });
        }
        if !self.remote.existing.insert(path.to_string()) {
            return Err(RemoteError::AlreadyExists {
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn put_file(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        self.calls.lock().expect("calls lock").push(Call::Put {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        });
        if self.remote.failing_puts.contains(remote) {
            return Err(RemoteError::Command {
                op: "put",
                path: remote.to_string(),
                message: "No space left on device".into(),
            });
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        self.calls.lock().expect("calls lock").push(Call::Close);
        Ok(())
    }
}

pub fn endpoint(root: &str) -> RemoteEndpoint {
    RemoteEndpoint {
        user: "user".into(),
        host: "1.2.3.4".into(),
        root: root.into(),
        credential: Credential::KeyFile(PathBuf::from("/keys/id_rsa")),
    }
}

/// Answers with a fixed string and counts how often it was asked.
pub struct Scripted {
    pub answer: String,
    pub asked: usize,
}

impl Scripted {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            asked: 0,
        }
    }
}

impl Confirm for Scripted {
    fn answer(&mut self) -> io::Result<String> {
        self.asked += 1;
        Ok(self.answer.clone())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

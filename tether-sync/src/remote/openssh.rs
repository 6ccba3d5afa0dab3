//! [`Connector`] backed by the system OpenSSH client.
//!
//! `connect` starts a ControlMaster in the background; every later
//! operation multiplexes over its control socket, so a batch costs one
//! authentication no matter how many files it carries. Host keys are
//! auto-accepted on first contact (`StrictHostKeyChecking=accept-new`).
//!
//! Password authentication needs `sshpass` on `PATH`; the password travels
//! in the `SSHPASS` environment variable, never on the command line.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use tempfile::TempDir;
use tether_core::{Credential, RemoteEndpoint};

use super::{Connector, RemoteSession};
use crate::error::RemoteError;

/// Exit status ssh uses for its own (connection) errors.
const SSH_CONNECTION_ERROR: i32 = 255;
/// Exit status of the remote mkdir snippet when the directory exists.
const ALREADY_EXISTS: i32 = 17;

#[derive(Debug, Clone)]
pub struct OpenSshConnector {
    ssh: PathBuf,
    sshpass: PathBuf,
}

impl Default for OpenSshConnector {
    fn default() -> Self {
        Self {
            ssh: PathBuf::from("ssh"),
            sshpass: PathBuf::from("sshpass"),
        }
    }
}

impl OpenSshConnector {
    /// Use specific `ssh` / `sshpass` binaries instead of the ones on `PATH`.
    pub fn with_programs(ssh: impl Into<PathBuf>, sshpass: impl Into<PathBuf>) -> Self {
        Self {
            ssh: ssh.into(),
            sshpass: sshpass.into(),
        }
    }

    fn master_command(&self, endpoint: &RemoteEndpoint, control_path: &Path) -> Command {
        let mut cmd = match &endpoint.credential {
            Credential::Password(password) => {
                let mut cmd = Command::new(&self.sshpass);
                cmd.arg("-e").arg(&self.ssh).env("SSHPASS", password);
                cmd
            }
            Credential::KeyFile(_) => Command::new(&self.ssh),
        };
        cmd.args(["-M", "-f", "-N", "-S"])
            .arg(control_path)
            .args(["-o", "ControlPersist=no"])
            .args(["-o", "StrictHostKeyChecking=accept-new"]);
        match &endpoint.credential {
            Credential::KeyFile(key) => {
                cmd.arg("-i")
                    .arg(key)
                    .args(["-o", "IdentitiesOnly=yes", "-o", "BatchMode=yes"]);
            }
            Credential::Password(_) => {
                cmd.args(["-o", "PubkeyAuthentication=no"]);
            }
        }
        cmd.arg(endpoint.login());
        cmd
    }
}

impl Connector for OpenSshConnector {
    fn connect(&self, endpoint: &RemoteEndpoint) -> Result<Box<dyn RemoteSession>, RemoteError> {
        let control_dir = tempfile::Builder::new()
            .prefix("tether-ssh-")
            .tempdir()
            .map_err(|source| RemoteError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        let control_path = control_dir.path().join("ctl");

        // The master forks into the background after authenticating; it keeps
        // stderr, so only wait for the foreground process via `status()`.
        let status = self
            .master_command(endpoint, &control_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|err| RemoteError::Connection {
                target: endpoint.login(),
                message: format!("cannot start ssh: {err}"),
            })?;
        if !status.success() {
            return Err(RemoteError::Connection {
                target: endpoint.login(),
                message: exit_message(status),
            });
        }

        tracing::debug!("ssh master for {} at {}", endpoint.login(), control_path.display());
        Ok(Box::new(OpenSshSession {
            ssh: self.ssh.clone(),
            login: endpoint.login(),
            control_path,
            _control_dir: control_dir,
            closed: false,
        }))
    }
}

struct OpenSshSession {
    ssh: PathBuf,
    login: String,
    control_path: PathBuf,
    // Removed (with the socket inside) when the session is dropped.
    _control_dir: TempDir,
    closed: bool,
}

impl OpenSshSession {
    fn remote(&self, script: &str) -> Command {
        let mut cmd = Command::new(&self.ssh);
        cmd.arg("-S")
            .arg(&self.control_path)
            .args(["-o", "ControlMaster=no"])
            .arg(&self.login)
            .arg(script);
        cmd
    }

    fn classify(&self, op: &'static str, path: &str, output: Output) -> Result<(), RemoteError> {
        match output.status.code() {
            Some(0) => Ok(()),
            Some(SSH_CONNECTION_ERROR) | None => Err(RemoteError::Connection {
                target: self.login.clone(),
                message: stderr_or_status(&output),
            }),
            Some(_) => Err(RemoteError::Command {
                op,
                path: path.to_string(),
                message: stderr_or_status(&output),
            }),
        }
    }
}

impl RemoteSession for OpenSshSession {
    fn make_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        let quoted = shell_quote(path);
        let script = format!(
            "mkdir -- {quoted} 2>/dev/null || {{ test -d {quoted} && exit {ALREADY_EXISTS}; mkdir -- {quoted}; }}"
        );
        let output = self
            .remote(&script)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RemoteError::Io {
                path: self.ssh.clone(),
                source,
            })?;
        if output.status.code() == Some(ALREADY_EXISTS) {
            return Err(RemoteError::AlreadyExists {
                path: path.to_string(),
            });
        }
        self.classify("mkdir", path, output)
    }

    fn put_file(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        let file = File::open(local).map_err(|source| RemoteError::Io {
            path: local.to_path_buf(),
            source,
        })?;
        let script = format!("cat > {}", shell_quote(remote));
        let output = self
            .remote(&script)
            .stdin(Stdio::from(file))
            .output()
            .map_err(|source| RemoteError::Io {
                path: self.ssh.clone(),
                source,
            })?;
        self.classify("put", remote, output)
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let output = Command::new(&self.ssh)
            .arg("-S")
            .arg(&self.control_path)
            .args(["-O", "exit"])
            .arg(&self.login)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RemoteError::Io {
                path: self.ssh.clone(),
                source,
            })?;
        self.classify("close", &self.login.clone(), output)
    }
}

impl Drop for OpenSshSession {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::debug!("ssh master for {} did not exit cleanly: {err}", self.login);
        }
    }
}

/// Single-quote a path for the remote shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

fn exit_message(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("ssh exited with code {code}"),
        None => "ssh terminated by signal".to_string(),
    }
}

fn stderr_or_status(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        exit_message(output.status)
    } else {
        stderr
    }
}

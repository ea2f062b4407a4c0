//! OpenSSH-backed collaborators.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use super::{
    KnownHostsPruner, Prober, ToolError, ToolResult, TrustInstaller, locate, run_with_timeout,
};
use crate::address::ConnectionIdentity;

/// Arguments for an interactive session: `-p <port> <user>@<host>`
#[must_use]
pub fn session_args(id: &ConnectionIdentity) -> Vec<String> {
    vec!["-p".to_string(), id.port.to_string(), id.destination()]
}

/// Probes a target with `ssh ... exit` under a hard time bound
#[derive(Debug, Clone)]
pub struct SshProber {
    program: String,
    timeout: Duration,
}

impl SshProber {
    /// Creates a prober using the given client and bound
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Command-line arguments passed to the client
    #[must_use]
    pub fn args(&self, id: &ConnectionIdentity) -> Vec<String> {
        vec![
            "-o".to_string(),
            format!("ConnectTimeout={}", self.timeout.as_secs().max(1)),
            "-p".to_string(),
            id.port.to_string(),
            id.destination(),
            "exit".to_string(),
        ]
    }
}

impl Prober for SshProber {
    fn probe(&self, id: &ConnectionIdentity) -> ToolResult<()> {
        let path = locate(&self.program)?;
        let args = self.args(id);
        tracing::debug!(program = %path.display(), ?args, "Probing");

        let mut command = Command::new(path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = run_with_timeout(command, &self.program, self.timeout)?;
        if status.success() {
            Ok(())
        } else {
            Err(ToolError::failed(&self.program, status))
        }
    }
}

/// Installs the public key with `ssh-copy-id`
#[derive(Debug, Clone)]
pub struct SshCopyId {
    program: String,
    public_key: PathBuf,
}

impl SshCopyId {
    /// Creates an installer for the given public key
    #[must_use]
    pub fn new(program: impl Into<String>, public_key: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            public_key: public_key.into(),
        }
    }

    /// Command-line arguments passed to the helper
    #[must_use]
    pub fn args(&self, id: &ConnectionIdentity) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.public_key.display().to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-p".to_string(),
            id.port.to_string(),
            id.destination(),
        ]
    }
}

impl TrustInstaller for SshCopyId {
    fn install(&self, id: &ConnectionIdentity) -> ToolResult<()> {
        if !self.public_key.is_file() {
            return Err(ToolError::PublicKeyMissing(self.public_key.clone()));
        }
        let path = locate(&self.program)?;
        let args = self.args(id);
        tracing::debug!(program = %path.display(), ?args, "Copying key");

        // Inherited stdio: the helper may ask for the remote password.
        let status = Command::new(path)
            .args(&args)
            .status()
            .map_err(|e| ToolError::io(&self.program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::failed(&self.program, status))
        }
    }
}

/// Forgets host keys with `ssh-keygen -R`
#[derive(Debug, Clone)]
pub struct SshKeygenPruner {
    program: String,
}

impl SshKeygenPruner {
    /// Creates a pruner using the given helper
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl KnownHostsPruner for SshKeygenPruner {
    fn prune(&self, id: &ConnectionIdentity) -> ToolResult<()> {
        let path = locate(&self.program)?;
        let pattern = id.known_hosts_pattern();
        tracing::debug!(program = %path.display(), %pattern, "Pruning known_hosts");

        let status = Command::new(path)
            .arg("-R")
            .arg(&pattern)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| ToolError::io(&self.program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::failed(&self.program, status))
        }
    }
}

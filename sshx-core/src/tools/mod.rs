//! External collaborators.
//!
//! Every piece of network or terminal work is delegated to an external
//! program. The orchestrator only sees the capability traits defined here,
//! so tests can substitute deterministic fakes while production wiring
//! binds them to `ssh`, `ssh-copy-id`, `ssh-keygen` and `fzf`.

mod fzf;
mod process;
mod ssh;

use std::path::PathBuf;

use thiserror::Error;

use crate::address::ConnectionIdentity;

pub use fzf::{FzfSelector, SELECTOR_PROMPT};
pub use process::{locate, run_with_timeout};
pub use ssh::{SshCopyId, SshKeygenPruner, SshProber, session_args};

/// Errors raised by external collaborators
#[derive(Debug, Error)]
pub enum ToolError {
    /// Program is not on the execution path
    #[error("{0} not installed")]
    Missing(String),

    /// Program did not finish within the allowed time
    #[error("{program} timed out after {seconds} seconds")]
    Timeout {
        /// Program that was killed
        program: String,
        /// Configured bound
        seconds: u64,
    },

    /// Program exited unsuccessfully
    #[error("{program} exited with {status}")]
    Failed {
        /// Program that failed
        program: String,
        /// Exit code, or `signal` when terminated by a signal
        status: String,
    },

    /// Public key required for trust establishment does not exist
    #[error("Public key missing: {}", .0.display())]
    PublicKeyMissing(PathBuf),

    /// Program could not be started or waited on
    #[error("Failed to run {program}: {source}")]
    Io {
        /// Program involved
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for collaborator calls
pub type ToolResult<T> = Result<T, ToolError>;

impl ToolError {
    pub(crate) fn failed(program: &str, status: std::process::ExitStatus) -> Self {
        Self::Failed {
            program: program.to_string(),
            status: status
                .code()
                .map_or_else(|| "signal".to_string(), |code| format!("status {code}")),
        }
    }

    pub(crate) fn io(program: &str, source: std::io::Error) -> Self {
        Self::Io {
            program: program.to_string(),
            source,
        }
    }
}

/// Bounded, non-interactive reachability and authentication test
pub trait Prober {
    /// Succeeds only if the target accepted a session within the bound.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, non-zero exit, or a missing client.
    fn probe(&self, id: &ConnectionIdentity) -> ToolResult<()>;
}

/// Installs the local public key as an authorized key on the target
pub trait TrustInstaller {
    /// Installs the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or installation fails.
    fn install(&self, id: &ConnectionIdentity) -> ToolResult<()>;
}

/// Removes the target's entries from the local known-hosts file
pub trait KnownHostsPruner {
    /// Prunes the host key records for the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the helper cannot run or fails.
    fn prune(&self, id: &ConnectionIdentity) -> ToolResult<()>;
}

/// Interactive picker over registry keys
pub trait Selector {
    /// Checks that the selector can be launched at all.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Missing`] if the selector is not installed.
    fn ensure_available(&self) -> ToolResult<()> {
        Ok(())
    }

    /// Returns the chosen line, or `None` when the user cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector cannot be started.
    fn select(&self, candidates: &[&str]) -> ToolResult<Option<String>>;
}

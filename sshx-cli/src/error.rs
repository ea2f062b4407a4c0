//! CLI error types and exit codes.

use sshx_core::{ConfigError, SshxError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - parse, registry, missing tool, not found, usage
    pub const GENERAL_ERROR: i32 = 1;
    /// First contact failed - probe or key installation
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Malformed connection string
    #[error("{0}")]
    Parse(String),

    /// Probe or key installation failed; nothing was registered
    #[error("{0}")]
    FirstContact(String),

    /// Registry could not be written
    #[error("Registry error: {0}")]
    Registry(String),

    /// Remove requested for an unregistered host
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Required external program absent from PATH
    #[error("{0} not installed")]
    MissingDependency(String),

    /// Selector failed for a reason other than cancellation
    #[error("Selector error: {0}")]
    Selector(String),

    /// Configuration could not be resolved or prepared
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session client could not be started
    #[error("Failed to start session: {0}")]
    Session(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SshxError> for CliError {
    fn from(err: SshxError) -> Self {
        match err {
            SshxError::Parse(e) => Self::Parse(e.to_string()),
            e @ (SshxError::Probe(_) | SshxError::TrustEstablish(_)) => {
                Self::FirstContact(e.to_string())
            }
            SshxError::Registry(e) => Self::Registry(e.to_string()),
            SshxError::NotFound(key) => Self::NotFound(key),
            SshxError::MissingDependency(program) => Self::MissingDependency(program),
            SshxError::Selector(e) => Self::Selector(e.to_string()),
            SshxError::Config(e) => Self::Config(e.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error
    /// - 2: First contact failed, host not registered
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::FirstContact(_) => exit_codes::CONNECTION_FAILURE,
            Self::Parse(_)
            | Self::Registry(_)
            | Self::NotFound(_)
            | Self::MissingDependency(_)
            | Self::Selector(_)
            | Self::Config(_)
            | Self::Session(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }

    /// Returns true for recovered failures that are reported as warnings
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::FirstContact(_))
    }
}

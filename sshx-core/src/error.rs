//! Crate-level error type.

use thiserror::Error;

use crate::address::ParseError;
use crate::config::ConfigError;
use crate::registry::RegistryError;
use crate::tools::ToolError;

/// Every failure an sshx operation can report
#[derive(Debug, Error)]
pub enum SshxError {
    /// Malformed connection string
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// First-contact probe failed; nothing was registered
    #[error("Connection test failed: {0}")]
    Probe(ToolError),

    /// Key installation failed; nothing was registered
    #[error("Key copy failed: {0}")]
    TrustEstablish(ToolError),

    /// Registry could not be persisted
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Removal requested for an identity that is not registered
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Required external program is not installed
    #[error("{0} not installed")]
    MissingDependency(String),

    /// Interactive selector failed to run
    #[error("Selector failed: {0}")]
    Selector(ToolError),

    /// Configuration could not be resolved or prepared
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for sshx operations
pub type SshxResult<T> = Result<T, SshxError>;

impl SshxError {
    /// Wraps a probe failure, surfacing a missing client as such
    #[must_use]
    pub fn probe(err: ToolError) -> Self {
        match err {
            ToolError::Missing(program) => Self::MissingDependency(program),
            other => Self::Probe(other),
        }
    }

    /// Wraps a trust-establishment failure, surfacing a missing helper as such
    #[must_use]
    pub fn trust(err: ToolError) -> Self {
        match err {
            ToolError::Missing(program) => Self::MissingDependency(program),
            other => Self::TrustEstablish(other),
        }
    }

    /// Wraps a selector failure, surfacing a missing selector as such
    #[must_use]
    pub fn selector(err: ToolError) -> Self {
        match err {
            ToolError::Missing(program) => Self::MissingDependency(program),
            other => Self::Selector(other),
        }
    }

    /// Returns true for first-contact failures that leave the registry
    /// untouched and are reported as warnings
    #[must_use]
    pub const fn is_first_contact_failure(&self) -> bool {
        matches!(self, Self::Probe(_) | Self::TrustEstablish(_))
    }
}

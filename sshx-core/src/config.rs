//! Per-user configuration resolved once at startup.
//!
//! [`SshxConfig`] is built by the entry point and handed to the registry
//! and the orchestrator; nothing in the library reads the home directory
//! on its own.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Registry file name inside the SSH directory
pub const REGISTRY_FILE_NAME: &str = "sshx.json";

/// Private key used for trust establishment
pub const DEFAULT_KEY_NAME: &str = "id_ed25519";

/// Default bound for the first-contact probe (5 seconds)
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Environment variable that relocates the SSH directory
pub const SSH_DIR_ENV: &str = "SSHX_SSH_DIR";

/// Errors that can occur while resolving or preparing the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No home directory could be determined for the current user
    #[error("Cannot determine the home directory")]
    HomeDirUnavailable,

    /// Filesystem operation on a configuration path failed
    #[error("Cannot prepare {}: {source}", path.display())]
    Io {
        /// Path being prepared
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Names of the external programs the core delegates to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTools {
    /// Secure-shell client
    pub ssh: String,
    /// Authorized-key installation helper
    pub copy_id: String,
    /// Known-hosts pruning helper
    pub keygen: String,
    /// Interactive fuzzy selector
    pub selector: String,
}

impl Default for ExternalTools {
    fn default() -> Self {
        Self {
            ssh: "ssh".to_string(),
            copy_id: "ssh-copy-id".to_string(),
            keygen: "ssh-keygen".to_string(),
            selector: "fzf".to_string(),
        }
    }
}

/// Resolved paths and limits for one invocation
#[derive(Debug, Clone)]
pub struct SshxConfig {
    /// Per-user SSH directory (normally `~/.ssh`)
    pub ssh_dir: PathBuf,
    /// Registry file
    pub registry_path: PathBuf,
    /// Private key whose public half is installed on first contact
    pub key_path: PathBuf,
    /// Bound on the first-contact probe
    pub probe_timeout: Duration,
    /// External program names
    pub tools: ExternalTools,
}

impl SshxConfig {
    /// Resolves the configuration from the current user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HomeDirUnavailable`] if no home directory
    /// can be determined.
    pub fn resolve() -> ConfigResult<Self> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
        Ok(Self::with_ssh_dir(home.join(".ssh")))
    }

    /// Creates a configuration rooted at an explicit SSH directory
    #[must_use]
    pub fn with_ssh_dir(ssh_dir: impl Into<PathBuf>) -> Self {
        let ssh_dir = ssh_dir.into();
        Self {
            registry_path: ssh_dir.join(REGISTRY_FILE_NAME),
            key_path: ssh_dir.join(DEFAULT_KEY_NAME),
            ssh_dir,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            tools: ExternalTools::default(),
        }
    }

    /// Sets the probe timeout
    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the external program names
    #[must_use]
    pub fn with_tools(mut self, tools: ExternalTools) -> Self {
        self.tools = tools;
        self
    }

    /// Public half of [`Self::key_path`]
    #[must_use]
    pub fn public_key_path(&self) -> PathBuf {
        let mut path = self.key_path.clone().into_os_string();
        path.push(".pub");
        PathBuf::from(path)
    }

    /// Creates the SSH directory with owner-only permissions and tightens
    /// the private key's permissions if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory cannot be created or
    /// its permissions cannot be set.
    pub fn prepare(&self) -> ConfigResult<()> {
        std::fs::create_dir_all(&self.ssh_dir).map_err(|source| ConfigError::Io {
            path: self.ssh_dir.clone(),
            source,
        })?;
        restrict_permissions(&self.ssh_dir, 0o700)?;

        if self.key_path.is_file() {
            restrict_permissions(&self.key_path, 0o600)?;
            tracing::debug!(key = %self.key_path.display(), "Key permissions set to 600");
        }

        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> ConfigResult<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|source| {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> ConfigResult<()> {
    Ok(())
}

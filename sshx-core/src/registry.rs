//! Persistent registry of hosts that completed first contact.
//!
//! The registry is a single JSON object mapping `user@host:port` to a
//! [`RegistryEntry`]. A missing file is an empty registry. A file that
//! cannot be read or parsed is reset to `{}` with a warning instead of
//! failing the command. Writes go to a sibling `.tmp` file that is then
//! renamed over the target, so readers only ever see a complete file.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::ConnectionIdentity;

/// Contents written for an empty registry
pub const EMPTY_REGISTRY: &str = "{}";

/// Errors that can occur while persisting the registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Serialization of the mapping failed
    #[error("Failed to serialize registry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing, syncing or renaming the registry file failed
    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        /// What was being attempted (`write`, `rename`, ...)
        action: &'static str,
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A remembered host as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Remote login name
    pub user: String,
    /// Unbracketed host
    pub host: String,
    /// SSH port
    pub port: u16,
}

impl RegistryEntry {
    /// Identity this entry was recorded for
    #[must_use]
    pub fn identity(&self) -> ConnectionIdentity {
        ConnectionIdentity::new(&self.user, &self.host, self.port)
    }
}

impl From<&ConnectionIdentity> for RegistryEntry {
    fn from(id: &ConnectionIdentity) -> Self {
        Self {
            user: id.user.clone(),
            host: id.host.clone(),
            port: id.port,
        }
    }
}

/// In-memory view of the registry keyed by `user@host:port`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Mapping {
    /// Creates an empty mapping
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the identity has been registered
    #[must_use]
    pub fn contains(&self, id: &ConnectionIdentity) -> bool {
        self.entries.contains_key(&id.key())
    }

    /// Looks up an entry by its key string
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    /// Records an entry for the identity, returning any previous entry
    pub fn put(&mut self, id: &ConnectionIdentity) -> Option<RegistryEntry> {
        self.entries.insert(id.key(), RegistryEntry::from(id))
    }

    /// Removes the entry stored under `key`
    pub fn delete(&mut self, key: &str) -> Option<RegistryEntry> {
        self.entries.remove(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered hosts
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handle on the registry file
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    /// Creates a handle for the registry stored at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the registry.
    ///
    /// An absent file is created as `{}`. An unreadable or malformed file
    /// is reset to `{}` and an empty mapping is returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the empty registry cannot be written.
    pub fn load(&self) -> RegistryResult<Mapping> {
        let _span = tracing::debug_span!("registry.load", path = %self.path.display()).entered();

        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Registry file absent, initializing");
                self.write_atomic(EMPTY_REGISTRY.as_bytes())?;
                return Ok(Mapping::new());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache unreadable, resetting");
                self.write_atomic(EMPTY_REGISTRY.as_bytes())?;
                return Ok(Mapping::new());
            }
        };

        match serde_json::from_str::<Mapping>(&data) {
            Ok(mapping) => {
                tracing::debug!(entries = mapping.len(), "Registry loaded");
                Ok(mapping)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache corrupted, resetting");
                self.write_atomic(EMPTY_REGISTRY.as_bytes())?;
                Ok(Mapping::new())
            }
        }
    }

    /// Persists the mapping, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing, or the final rename
    /// fails. The previous file is left intact in every failure case.
    pub fn save(&self, mapping: &Mapping) -> RegistryResult<()> {
        let _span = tracing::debug_span!(
            "registry.save",
            path = %self.path.display(),
            entries = mapping.len()
        )
        .entered();

        let body = serde_json::to_vec_pretty(mapping)?;
        self.write_atomic(&body)
    }

    /// Sibling file used for staging writes
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_atomic(&self, body: &[u8]) -> RegistryResult<()> {
        let temp_path = self.temp_path();

        let mut file = File::create(&temp_path).map_err(io_error("create", &temp_path))?;
        file.write_all(body).map_err(io_error("write", &temp_path))?;
        file.sync_all().map_err(io_error("sync", &temp_path))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(io_error("rename", &self.path))
    }
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> RegistryError {
    let path = path.to_path_buf();
    move |source| RegistryError::Io {
        action,
        path,
        source,
    }
}

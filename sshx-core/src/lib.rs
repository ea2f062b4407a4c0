//! `sshx` Core Library
//!
//! Connection-registry core of the `sshx` SSH connection manager: it
//! remembers hosts that completed first contact and reconnects to them
//! without re-typing credentials.
//!
//! # Crate Structure
//!
//! - [`address`] - Connection string parsing (`user@host:port`, `user@[ipv6]:port`)
//! - [`registry`] - Persistent `sshx.json` cache with atomic replace
//! - [`orchestrator`] - First-contact protocol and action dispatch
//! - [`tools`] - Capability traits and their OpenSSH / fzf bindings
//! - [`config`] - Per-invocation paths and limits
//! - [`doctor`] - Dependency and key-material diagnostics
//! - [`tracing`] - Logging initialisation

#![warn(missing_docs)]

pub mod address;
pub mod config;
pub mod doctor;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod tools;
pub mod tracing;

pub use address::{ConnectionIdentity, ParseError, parse};
pub use config::{ConfigError, ExternalTools, SshxConfig};
pub use doctor::{Check, CheckStatus, DoctorReport, diagnose};
pub use error::{SshxError, SshxResult};
pub use orchestrator::{
    Collaborators, ConnectState, ConnectionOrchestrator, EMPTY_MARKER, SessionCommand,
    TerminalAction, render_listing,
};
pub use registry::{Mapping, Registry, RegistryEntry, RegistryError};
pub use tools::{KnownHostsPruner, Prober, Selector, ToolError, TrustInstaller};

//! First-contact protocol and action dispatch.
//!
//! A connect request for an unknown identity walks
//! `Unknown -> Probing -> TrustEstablished -> Registered -> Connecting`.
//! A registered identity goes straight to `Connecting`. Registration only
//! happens after both the probe and the key installation succeeded.
//!
//! The orchestrator never starts the interactive session itself. It returns
//! a [`TerminalAction`] and the entry point decides how to hand over the
//! terminal.

use std::fmt;

use crate::address::{self, ConnectionIdentity};
use crate::config::SshxConfig;
use crate::error::{SshxError, SshxResult};
use crate::registry::{Mapping, Registry, RegistryEntry};
use crate::tools::{
    FzfSelector, KnownHostsPruner, Prober, Selector, SshCopyId, SshKeygenPruner, SshProber,
    TrustInstaller, session_args,
};

/// Printed by `list` when nothing is registered
pub const EMPTY_MARKER: &str = "(empty)";

/// Per-invocation connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
    /// Identity not yet checked against the registry, or not present in it
    Unknown,
    /// Bounded reachability/authentication test running
    Probing,
    /// Probe passed, public key being installed
    TrustEstablished,
    /// Key installed and entry persisted
    Registered,
    /// Session handed to the shell client
    Connecting,
}

impl fmt::Display for ConnectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Probing => write!(f, "probing"),
            Self::TrustEstablished => write!(f, "trust-established"),
            Self::Registered => write!(f, "registered"),
            Self::Connecting => write!(f, "connecting"),
        }
    }
}

/// Shell client invocation for an interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCommand {
    /// Program name of the shell client
    pub program: String,
    /// Arguments: `-p <port> <user>@<host>`
    pub args: Vec<String>,
    /// Identity being connected to
    pub identity: ConnectionIdentity,
}

impl fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}

/// What the entry point should do once the orchestrator is finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalAction {
    /// Hand the terminal to the shell client
    Session(SessionCommand),
    /// The user dismissed the selector; exit cleanly
    Cancelled,
    /// The selector had nothing to offer; print [`EMPTY_MARKER`]
    EmptyRegistry,
}

/// External capabilities used by the orchestrator
pub struct Collaborators {
    /// First-contact probe
    pub prober: Box<dyn Prober>,
    /// Public key installation
    pub trust: Box<dyn TrustInstaller>,
    /// Known-hosts pruning on removal
    pub pruner: Box<dyn KnownHostsPruner>,
    /// Interactive picker for the menu
    pub selector: Box<dyn Selector>,
}

impl Collaborators {
    /// Binds every capability to its OpenSSH / fzf implementation
    #[must_use]
    pub fn from_config(config: &SshxConfig) -> Self {
        Self {
            prober: Box::new(SshProber::new(&config.tools.ssh, config.probe_timeout)),
            trust: Box::new(SshCopyId::new(
                &config.tools.copy_id,
                config.public_key_path(),
            )),
            pruner: Box::new(SshKeygenPruner::new(&config.tools.keygen)),
            selector: Box::new(FzfSelector::new(&config.tools.selector)),
        }
    }
}

/// Drives connect, remove, list and menu against the registry
pub struct ConnectionOrchestrator {
    registry: Registry,
    ssh_program: String,
    collaborators: Collaborators,
}

impl ConnectionOrchestrator {
    /// Creates an orchestrator wired to the real external tools
    #[must_use]
    pub fn new(config: &SshxConfig) -> Self {
        Self::with_collaborators(config, Collaborators::from_config(config))
    }

    /// Creates an orchestrator with explicit collaborators
    #[must_use]
    pub fn with_collaborators(config: &SshxConfig, collaborators: Collaborators) -> Self {
        Self {
            registry: Registry::new(&config.registry_path),
            ssh_program: config.tools.ssh.clone(),
            collaborators,
        }
    }

    /// Registry backing this orchestrator
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Connects to `id`, running first contact if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`SshxError::Probe`] or [`SshxError::TrustEstablish`] when
    /// first contact fails (the registry is left untouched), and
    /// [`SshxError::Registry`] when the new entry cannot be persisted.
    pub fn connect(&self, id: &ConnectionIdentity) -> SshxResult<TerminalAction> {
        let _span = tracing::info_span!("connection.establish", target = %id).entered();

        let mut mapping = self.registry.load()?;
        transition(ConnectState::Unknown, id);

        if !mapping.contains(id) {
            self.first_contact(&mut mapping, id)?;
        }

        transition(ConnectState::Connecting, id);
        tracing::info!("Connecting to {id}");
        Ok(TerminalAction::Session(self.session_command(id)))
    }

    fn first_contact(&self, mapping: &mut Mapping, id: &ConnectionIdentity) -> SshxResult<()> {
        transition(ConnectState::Probing, id);
        tracing::info!("First time connecting, testing connection...");
        if let Err(e) = self.collaborators.prober.probe(id) {
            tracing::debug!(error = %e, "Probe failed, host not added to cache");
            return Err(SshxError::probe(e));
        }
        tracing::info!("Connection test successful");

        transition(ConnectState::TrustEstablished, id);
        if let Err(e) = self.collaborators.trust.install(id) {
            tracing::debug!(error = %e, "Key copy failed, host not added to cache");
            return Err(SshxError::trust(e));
        }
        tracing::info!("Key copied successfully");

        mapping.put(id);
        self.registry.save(mapping)?;
        transition(ConnectState::Registered, id);
        tracing::info!("Host registered");
        Ok(())
    }

    /// Removes `id` from the registry and prunes its known-hosts records.
    ///
    /// Pruning is best-effort; its failure is logged and the entry is
    /// still removed.
    ///
    /// # Errors
    ///
    /// Returns [`SshxError::NotFound`] if `id` is not registered and
    /// [`SshxError::Registry`] if the updated registry cannot be saved.
    pub fn remove(&self, id: &ConnectionIdentity) -> SshxResult<RegistryEntry> {
        let _span = tracing::info_span!("connection.remove", target = %id).entered();

        let mut mapping = self.registry.load()?;
        let key = id.key();
        if !mapping.contains(id) {
            return Err(SshxError::NotFound(key));
        }

        match self.collaborators.pruner.prune(id) {
            Ok(()) => tracing::info!("Removed known_hosts entry"),
            Err(e) => tracing::warn!(error = %e, "Could not prune known_hosts entry"),
        }

        let entry = mapping
            .delete(&key)
            .ok_or_else(|| SshxError::NotFound(key.clone()))?;
        self.registry.save(&mapping)?;
        tracing::info!("Removed entry from sshx cache");
        Ok(entry)
    }

    /// Registered keys in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`SshxError::Registry`] if a corrupted registry cannot be
    /// reset.
    pub fn keys(&self) -> SshxResult<Vec<String>> {
        let mapping = self.registry.load()?;
        Ok(mapping.keys().map(str::to_string).collect())
    }

    /// Renders the registry for display, one key per line, or
    /// [`EMPTY_MARKER`] when nothing is registered.
    ///
    /// # Errors
    ///
    /// Returns [`SshxError::Registry`] if a corrupted registry cannot be
    /// reset.
    pub fn list(&self) -> SshxResult<String> {
        Ok(render_listing(&self.keys()?))
    }

    /// Lets the user pick a registered host and connects to it.
    ///
    /// # Errors
    ///
    /// Returns [`SshxError::MissingDependency`] when the selector is not
    /// installed, [`SshxError::Parse`] when the chosen line is not a
    /// connection string, and any error from [`Self::connect`].
    pub fn interactive_select(&self) -> SshxResult<TerminalAction> {
        let selector = &self.collaborators.selector;
        selector.ensure_available().map_err(SshxError::selector)?;

        let mapping = self.registry.load()?;
        if mapping.is_empty() {
            return Ok(TerminalAction::EmptyRegistry);
        }

        let keys: Vec<&str> = mapping.keys().collect();
        let Some(choice) = selector.select(&keys).map_err(SshxError::selector)? else {
            tracing::debug!("Selection cancelled");
            return Ok(TerminalAction::Cancelled);
        };

        // Registry keys hold IPv6 hosts unbracketed, which the parser
        // cannot read back, so known keys are resolved directly.
        let id = match mapping.get(&choice) {
            Some(entry) => entry.identity(),
            None => address::parse(&choice)?,
        };
        self.connect(&id)
    }

    fn session_command(&self, id: &ConnectionIdentity) -> SessionCommand {
        SessionCommand {
            program: self.ssh_program.clone(),
            args: session_args(id),
            identity: id.clone(),
        }
    }
}

/// Formats keys for `--list`
#[must_use]
pub fn render_listing(keys: &[String]) -> String {
    if keys.is_empty() {
        EMPTY_MARKER.to_string()
    } else {
        keys.join("\n")
    }
}

fn transition(state: ConnectState, id: &ConnectionIdentity) {
    tracing::debug!(%state, target = %id, "State transition");
}

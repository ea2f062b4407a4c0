//! Connect command: first contact if needed, then hand over the terminal.

use sshx_core::{ConnectionIdentity, ConnectionOrchestrator, SshxConfig, SshxError};

use super::session::hand_over;
use crate::error::CliError;

/// Connect command handler
pub fn cmd_connect(config: &SshxConfig, target: &str) -> Result<(), CliError> {
    let id: ConnectionIdentity = target.parse().map_err(SshxError::from)?;
    let orchestrator = ConnectionOrchestrator::new(config);
    hand_over(orchestrator.connect(&id)?)
}

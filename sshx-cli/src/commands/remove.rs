//! Remove command: forget a registered host.

use sshx_core::{ConnectionIdentity, ConnectionOrchestrator, SshxConfig, SshxError};

use crate::error::CliError;

/// Remove command handler
pub fn cmd_remove(config: &SshxConfig, target: &str) -> Result<(), CliError> {
    let id: ConnectionIdentity = target.parse().map_err(SshxError::from)?;
    let orchestrator = ConnectionOrchestrator::new(config);

    let entry = orchestrator.remove(&id)?;
    println!("Removed {}", entry.identity());
    Ok(())
}

//! List command: print registered hosts.

use sshx_core::{ConnectionOrchestrator, SshxConfig};

use crate::error::CliError;

/// List command handler
pub fn cmd_list(config: &SshxConfig) -> Result<(), CliError> {
    let orchestrator = ConnectionOrchestrator::new(config);
    println!("{}", orchestrator.list()?);
    Ok(())
}

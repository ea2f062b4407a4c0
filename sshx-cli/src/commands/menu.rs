//! Menu command: pick a registered host interactively.

use sshx_core::{ConnectionOrchestrator, SshxConfig};

use super::session::hand_over;
use crate::error::CliError;

/// Menu command handler
pub fn cmd_menu(config: &SshxConfig) -> Result<(), CliError> {
    let orchestrator = ConnectionOrchestrator::new(config);
    hand_over(orchestrator.interactive_select()?)
}

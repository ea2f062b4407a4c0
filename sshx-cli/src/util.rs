//! Shared utility functions used across command modules.

use std::time::Duration;

use sshx_core::SshxConfig;

use crate::cli::Cli;
use crate::error::CliError;

/// Resolves the configuration from CLI args without touching the disk
pub fn resolve_config(cli: &Cli) -> Result<SshxConfig, CliError> {
    let config = match &cli.ssh_dir {
        Some(dir) => SshxConfig::with_ssh_dir(dir),
        None => SshxConfig::resolve()?,
    };
    Ok(config.with_probe_timeout(Duration::from_secs(cli.probe_timeout)))
}

/// Resolves the configuration and prepares the SSH directory for registry
/// access.
pub fn prepared_config(cli: &Cli) -> Result<SshxConfig, CliError> {
    let config = resolve_config(cli)?;
    config.prepare()?;
    Ok(config)
}

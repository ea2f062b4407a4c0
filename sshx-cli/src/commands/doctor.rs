//! Doctor command: report external tools and key material.

use sshx_core::{SshxConfig, diagnose};

use crate::cli::VERSION_LINE;
use crate::error::CliError;

/// Doctor command handler
///
/// Fails only when a required tool is missing; optional tools and keys
/// are reported but never change the exit code.
pub fn cmd_doctor(config: &SshxConfig) -> Result<(), CliError> {
    let report = diagnose(config);

    println!("{VERSION_LINE}");
    for check in &report.checks {
        println!("{check}");
    }

    let missing: Vec<&str> = report
        .missing_required()
        .map(|check| check.name.as_str())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::MissingDependency(missing.join(", ")))
    }
}

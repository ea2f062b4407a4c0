//! Environment diagnostics for `--doctor`.

use std::fmt;
use std::path::PathBuf;

use crate::config::SshxConfig;
use crate::tools::locate;

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Tool found on the path, or file present
    Present(PathBuf),
    /// Tool or file absent
    Missing,
}

/// One line of the doctor report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// What was checked
    pub name: String,
    /// Whether its absence makes sshx unusable
    pub required: bool,
    /// Result
    pub status: CheckStatus,
}

impl Check {
    /// Returns true if the checked item exists
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self.status, CheckStatus::Present(_))
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            CheckStatus::Present(path) => write!(f, "ok       {} ({})", self.name, path.display()),
            CheckStatus::Missing if self.required => write!(f, "MISSING  {} (required)", self.name),
            CheckStatus::Missing => write!(f, "missing  {}", self.name),
        }
    }
}

/// Full diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Individual checks in display order
    pub checks: Vec<Check>,
}

impl DoctorReport {
    /// Required checks that failed
    pub fn missing_required(&self) -> impl Iterator<Item = &Check> {
        self.checks
            .iter()
            .filter(|c| c.required && !c.is_present())
    }

    /// Returns true when every required check passed
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.missing_required().next().is_none()
    }
}

/// Checks external tools and key material.
#[must_use]
pub fn diagnose(config: &SshxConfig) -> DoctorReport {
    let tools = &config.tools;
    let mut checks = vec![
        tool_check(&tools.ssh, true),
        tool_check(&tools.copy_id, false),
        tool_check(&tools.keygen, false),
        tool_check(&tools.selector, false),
    ];
    checks.push(file_check("SSH key", config.key_path.clone()));
    checks.push(file_check("SSH public key", config.public_key_path()));

    DoctorReport { checks }
}

fn tool_check(program: &str, required: bool) -> Check {
    Check {
        name: program.to_string(),
        required,
        status: locate(program).map_or(CheckStatus::Missing, CheckStatus::Present),
    }
}

fn file_check(name: &str, path: PathBuf) -> Check {
    let status = if path.is_file() {
        CheckStatus::Present(path)
    } else {
        CheckStatus::Missing
    };
    Check {
        name: name.to_string(),
        required: false,
        status,
    }
}

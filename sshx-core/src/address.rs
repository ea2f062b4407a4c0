//! Connection string parsing.
//!
//! Two textual forms are recognised:
//!
//! - `user@host:port` where `host` is an IPv4 literal or a hostname
//! - `user@[host]:port` where `host` is an IPv6 literal
//!
//! The bracketed form is tried first. Brackets are stripped from the stored
//! host and re-added whenever the host is written back onto an `ssh`
//! command line.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Syntax hint shown with every parse failure
pub const EXPECTED_SYNTAX: &str = "user@ip:port or user@[ipv6]:port";

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^@\s]+)@\[([^@\s\[\]]+)\]:([0-9]+)$")
        .expect("BRACKETED is a valid regex pattern")
});

static PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^@\s]+)@([^:@\[\]\s]+):([0-9]+)$").expect("PLAIN is a valid regex pattern")
});

/// Errors produced while parsing a connection string
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input matches neither recognised form
    #[error("Invalid format '{0}'. Use: user@ip:port or user@[ipv6]:port")]
    InvalidFormat(String),

    /// Port segment is not a number in 1..=65535
    #[error("Invalid port number '{0}'")]
    InvalidPort(String),
}

/// The (user, host, port) triple identifying a remembered target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionIdentity {
    /// Remote login name
    pub user: String,
    /// Hostname, IPv4 literal, or unbracketed IPv6 literal
    pub host: String,
    /// TCP port of the SSH daemon
    pub port: u16,
}

impl ConnectionIdentity {
    /// Creates an identity from already-validated parts
    #[must_use]
    pub fn new(user: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
            port,
        }
    }

    /// Registry key, always `user@host:port` with the host unbracketed
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }

    /// Returns true when the host is an IPv6 literal
    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        self.host.contains(':')
    }

    /// Host as it must appear on an `ssh` command line
    #[must_use]
    pub fn ssh_host(&self) -> String {
        if self.is_ipv6() {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// `user@host` destination argument for `ssh` and `ssh-copy-id`
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.ssh_host())
    }

    /// `host:port` pattern understood by `ssh-keygen -R`
    #[must_use]
    pub fn known_hosts_pattern(&self) -> String {
        format!("{}:{}", self.ssh_host(), self.port)
    }
}

impl fmt::Display for ConnectionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

impl FromStr for ConnectionIdentity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parses a connection string into a [`ConnectionIdentity`].
///
/// # Errors
///
/// Returns [`ParseError::InvalidFormat`] when the input matches neither
/// form, and [`ParseError::InvalidPort`] when the port does not fit in
/// 1..=65535.
pub fn parse(input: &str) -> Result<ConnectionIdentity, ParseError> {
    let caps = BRACKETED
        .captures(input)
        .or_else(|| PLAIN.captures(input))
        .ok_or_else(|| ParseError::InvalidFormat(input.to_string()))?;

    let port = parse_port(&caps[3])?;
    Ok(ConnectionIdentity::new(&caps[1], &caps[2], port))
}

fn parse_port(raw: &str) -> Result<u16, ParseError> {
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ParseError::InvalidPort(raw.to_string())),
    }
}

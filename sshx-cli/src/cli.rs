//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use sshx_core::config::{DEFAULT_PROBE_TIMEOUT_SECS, SSH_DIR_ENV};

/// Line printed by `--version` and at the top of `--doctor`
pub const VERSION_LINE: &str = concat!("sshx v", env!("CARGO_PKG_VERSION"));

const USAGE: &str = "\
sshx user@ip:port
       sshx user@[ipv6]:port
       sshx user@ip:port --remove
       sshx --list | --menu | --doctor";

/// Simple SSH manager that remembers hosts after a successful first contact
#[derive(Parser)]
#[command(name = "sshx")]
#[command(version = concat!("v", env!("CARGO_PKG_VERSION")))]
#[command(about = "Simple SSH Manager")]
#[command(override_usage = USAGE)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Connection string: user@host:port or user@[ipv6]:port
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Forget TARGET: drop it from the registry and prune known_hosts
    #[arg(long, requires = "target", conflicts_with_all = ["list", "menu", "doctor"])]
    pub remove: bool,

    /// Print every registered host
    #[arg(long, conflicts_with_all = ["target", "menu", "doctor"])]
    pub list: bool,

    /// Pick a registered host with fzf and connect to it
    #[arg(long, conflicts_with_all = ["target", "doctor"])]
    pub menu: bool,

    /// Check external tools and key material
    #[arg(long, conflicts_with = "target")]
    pub doctor: bool,

    /// SSH directory holding the registry and keys [default: ~/.ssh]
    #[arg(long, value_name = "DIR", env = SSH_DIR_ENV, global = true)]
    pub ssh_dir: Option<PathBuf>,

    /// Seconds to wait for the first-contact probe
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_PROBE_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub probe_timeout: u64,

    /// Increase log verbosity (--verbose, --verbose --verbose)
    #[arg(long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress everything except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append log output to FILE instead of stderr
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

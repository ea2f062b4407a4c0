//! `sshx` - Simple SSH manager
//!
//! Connects to `user@host:port` targets, running a one-time probe and key
//! installation for hosts it has not seen before, and keeps a registry of
//! the hosts that passed.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use error::exit_codes;
use sshx_core::tracing::{TracingConfig, TracingLevel, init_tracing};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(exit_codes::GENERAL_ERROR);
        }
    };

    let tracing_config = TracingConfig::new()
        .with_level(TracingLevel::from_verbosity(cli.verbose, cli.quiet))
        .with_log_file(cli.log_file.clone())
        .with_env_filter();
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = commands::dispatch(&cli) {
        if e.is_warning() {
            if !cli.quiet {
                eprintln!("Warning: {e}");
            }
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

//! Command handler modules for the CLI.

mod connect;
mod doctor;
mod list;
mod menu;
mod remove;
mod session;

use clap::CommandFactory;

use crate::cli::{Cli, VERSION_LINE};
use crate::error::CliError;
use crate::util::{prepared_config, resolve_config};

/// Dispatch parsed arguments to the appropriate handler.
pub fn dispatch(cli: &Cli) -> Result<(), CliError> {
    if cli.doctor {
        return doctor::cmd_doctor(&resolve_config(cli)?);
    }
    if cli.list {
        return list::cmd_list(&prepared_config(cli)?);
    }
    if cli.menu {
        return menu::cmd_menu(&prepared_config(cli)?);
    }

    match cli.target.as_deref() {
        Some(target) if cli.remove => remove::cmd_remove(&prepared_config(cli)?, target),
        None | Some("help") => print_help(),
        Some("version") => {
            println!("{VERSION_LINE}");
            Ok(())
        }
        Some(target) => connect::cmd_connect(&prepared_config(cli)?, target),
    }
}

fn print_help() -> Result<(), CliError> {
    Cli::command().print_help()?;
    Ok(())
}

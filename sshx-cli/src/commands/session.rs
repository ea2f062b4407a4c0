//! Terminal handoff for the orchestrator's final action.

use std::process::Command;

use sshx_core::tools::locate;
use sshx_core::{EMPTY_MARKER, SessionCommand, TerminalAction};

use crate::error::CliError;

/// Performs the action returned by the orchestrator
pub fn hand_over(action: TerminalAction) -> Result<(), CliError> {
    match action {
        TerminalAction::Session(command) => execute_session(&command),
        TerminalAction::Cancelled => Ok(()),
        TerminalAction::EmptyRegistry => {
            println!("{EMPTY_MARKER}");
            Ok(())
        }
    }
}

/// Replaces this process with the shell client on unix. Elsewhere the
/// client runs as a child and its exit code becomes ours.
fn execute_session(session: &SessionCommand) -> Result<(), CliError> {
    let program =
        locate(&session.program).map_err(|_| CliError::MissingDependency(session.program.clone()))?;

    let mut cmd = Command::new(program);
    cmd.args(&session.args);
    tracing::debug!(command = %session, "Executing");

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        let err = cmd.exec();
        Err(CliError::Session(format!("{}: {err}", session.program)))
    }

    #[cfg(not(unix))]
    {
        let status = cmd
            .status()
            .map_err(|e| CliError::Session(format!("{}: {e}", session.program)))?;

        if status.success() {
            Ok(())
        } else {
            std::process::exit(
                status
                    .code()
                    .unwrap_or(crate::error::exit_codes::GENERAL_ERROR),
            )
        }
    }
}

//! Process helpers shared by the production collaborators.

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::time::{Duration, Instant};

use super::{ToolError, ToolResult};

/// How often a bounded child is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Resolves a program name on the execution path.
///
/// # Errors
///
/// Returns [`ToolError::Missing`] naming the program if it cannot be found.
pub fn locate(program: &str) -> ToolResult<PathBuf> {
    which::which(program).map_err(|_| ToolError::Missing(program.to_string()))
}

/// Runs `command` to completion or kills it at `timeout`.
///
/// On unix the child is placed in its own process group and the whole
/// group is killed on timeout, so nothing it spawned outlives the call.
/// When this process owns the terminal, the child's group is made the
/// foreground group while it runs so it can read prompts from `/dev/tty`;
/// the terminal is handed back on every return path. The child is always
/// reaped before returning.
///
/// # Errors
///
/// Returns [`ToolError::Timeout`] when the bound is hit and
/// [`ToolError::Io`] if the child cannot be spawned or waited on.
pub fn run_with_timeout(
    mut command: Command,
    program: &str,
    timeout: Duration,
) -> ToolResult<ExitStatus> {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command.spawn().map_err(|e| ToolError::io(program, e))?;
    #[cfg(unix)]
    let _terminal = ForegroundHandoff::acquire(&child);
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait().map_err(|e| ToolError::io(program, e))? {
            return Ok(status);
        }

        let now = Instant::now();
        if now >= deadline {
            terminate(&mut child);
            let _ = child.wait();
            tracing::debug!(program, ?timeout, "Child killed at deadline");
            return Err(ToolError::Timeout {
                program: program.to_string(),
                seconds: timeout.as_secs(),
            });
        }

        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let group = i32::try_from(child.id()).map(Pid::from_raw);
    match group {
        Ok(pgid) => {
            if let Err(e) = killpg(pgid, Signal::SIGKILL) {
                tracing::debug!(error = %e, "killpg failed, killing child only");
                let _ = child.kill();
            }
        }
        Err(_) => {
            let _ = child.kill();
        }
    }
}

/// Foreground ownership of the controlling terminal lent to a child group.
///
/// Dropping the handoff returns the terminal to the previous group.
#[cfg(unix)]
struct ForegroundHandoff {
    previous: nix::unistd::Pid,
}

#[cfg(unix)]
impl ForegroundHandoff {
    fn acquire(child: &Child) -> Option<Self> {
        use std::io::IsTerminal;

        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::{Pid, getpgrp, tcgetpgrp, tcsetpgrp};

        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return None;
        }
        let previous = tcgetpgrp(&stdin).ok()?;
        if previous != getpgrp() {
            return None;
        }

        let group = Pid::from_raw(i32::try_from(child.id()).ok()?);
        if let Err(e) = tcsetpgrp(&stdin, group) {
            tracing::debug!(error = %e, "Terminal handoff failed");
            return None;
        }
        // A read before the handoff stops the group with SIGTTIN.
        let _ = killpg(group, Signal::SIGCONT);
        tracing::trace!(?group, "Terminal handed to child group");

        Some(Self { previous })
    }
}

#[cfg(unix)]
impl Drop for ForegroundHandoff {
    fn drop(&mut self) {
        use nix::sys::signal::{SigSet, SigmaskHow, Signal};

        // A background group may only take the terminal back with SIGTTOU blocked.
        let mut ttou = SigSet::empty();
        ttou.add(Signal::SIGTTOU);
        let saved = ttou.thread_swap_mask(SigmaskHow::SIG_BLOCK);

        if let Err(e) = nix::unistd::tcsetpgrp(std::io::stdin(), self.previous) {
            tracing::debug!(error = %e, "Terminal could not be reclaimed");
        }

        if let Ok(mask) = saved {
            let _ = mask.thread_set_mask();
        }
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}

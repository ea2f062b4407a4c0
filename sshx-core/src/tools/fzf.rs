//! `fzf`-backed selector.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use super::{Selector, ToolError, ToolResult, locate};

/// Prompt shown by the selector
pub const SELECTOR_PROMPT: &str = "SSH > ";

/// Picks a registry key with `fzf`
#[derive(Debug, Clone)]
pub struct FzfSelector {
    program: String,
}

impl FzfSelector {
    /// Creates a selector using the given program
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Selector for FzfSelector {
    fn ensure_available(&self) -> ToolResult<()> {
        locate(&self.program).map(|_| ())
    }

    fn select(&self, candidates: &[&str]) -> ToolResult<Option<String>> {
        let path = locate(&self.program)?;

        // stderr stays attached: fzf draws its interface there.
        let mut child = Command::new(path)
            .arg(format!("--prompt={SELECTOR_PROMPT}"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| ToolError::io(&self.program, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            let mut input = candidates.join("\n");
            input.push('\n');
            match stdin.write_all(input.as_bytes()) {
                Ok(()) => {}
                // Exited without reading; its status decides below.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => return Err(ToolError::io(&self.program, e)),
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ToolError::io(&self.program, e))?;

        if !output.status.success() {
            tracing::debug!(status = ?output.status.code(), "Selector cancelled");
            return Ok(None);
        }

        Ok(parse_selection(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_selection(raw: &str) -> Option<String> {
    let selected = raw.trim();
    (!selected.is_empty()).then(|| selected.to_string())
}

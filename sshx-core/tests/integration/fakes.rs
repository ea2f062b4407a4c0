//! Deterministic stand-ins for the external tools.

use std::cell::RefCell;
use std::rc::Rc;

use sshx_core::tools::ToolResult;
use sshx_core::{
    Collaborators, ConnectionIdentity, KnownHostsPruner, Prober, Selector, ToolError,
    TrustInstaller,
};

/// How a fake collaborator responds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Timeout,
    Missing,
}

impl Behavior {
    fn respond(self, program: &str) -> ToolResult<()> {
        match self {
            Self::Succeed => Ok(()),
            Self::Fail => Err(ToolError::Failed {
                program: program.to_string(),
                status: "status 255".to_string(),
            }),
            Self::Timeout => Err(ToolError::Timeout {
                program: program.to_string(),
                seconds: 5,
            }),
            Self::Missing => Err(ToolError::Missing(program.to_string())),
        }
    }
}

/// Records every call made to the fakes, in order
pub type CallLog = Rc<RefCell<Vec<String>>>;

struct FakeProber {
    behavior: Behavior,
    log: CallLog,
}

impl Prober for FakeProber {
    fn probe(&self, id: &ConnectionIdentity) -> ToolResult<()> {
        self.log.borrow_mut().push(format!("probe {id}"));
        self.behavior.respond("ssh")
    }
}

struct FakeTrust {
    behavior: Behavior,
    log: CallLog,
}

impl TrustInstaller for FakeTrust {
    fn install(&self, id: &ConnectionIdentity) -> ToolResult<()> {
        self.log.borrow_mut().push(format!("install {id}"));
        self.behavior.respond("ssh-copy-id")
    }
}

struct FakePruner {
    behavior: Behavior,
    log: CallLog,
}

impl KnownHostsPruner for FakePruner {
    fn prune(&self, id: &ConnectionIdentity) -> ToolResult<()> {
        self.log
            .borrow_mut()
            .push(format!("prune {}", id.known_hosts_pattern()));
        self.behavior.respond("ssh-keygen")
    }
}

struct FakeSelector {
    available: bool,
    choice: Option<String>,
    log: CallLog,
}

impl Selector for FakeSelector {
    fn ensure_available(&self) -> ToolResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(ToolError::Missing("fzf".to_string()))
        }
    }

    fn select(&self, candidates: &[&str]) -> ToolResult<Option<String>> {
        self.log
            .borrow_mut()
            .push(format!("select [{}]", candidates.join(",")));
        Ok(self.choice.clone())
    }
}

/// Builder for a set of fake collaborators sharing one call log
pub struct Fakes {
    pub probe: Behavior,
    pub trust: Behavior,
    pub prune: Behavior,
    pub selector_available: bool,
    pub choice: Option<String>,
    pub log: CallLog,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            probe: Behavior::Succeed,
            trust: Behavior::Succeed,
            prune: Behavior::Succeed,
            selector_available: true,
            choice: None,
            log: CallLog::default(),
        }
    }
}

impl Fakes {
    pub fn build(&self) -> Collaborators {
        Collaborators {
            prober: Box::new(FakeProber {
                behavior: self.probe,
                log: Rc::clone(&self.log),
            }),
            trust: Box::new(FakeTrust {
                behavior: self.trust,
                log: Rc::clone(&self.log),
            }),
            pruner: Box::new(FakePruner {
                behavior: self.prune,
                log: Rc::clone(&self.log),
            }),
            selector: Box::new(FakeSelector {
                available: self.selector_available,
                choice: self.choice.clone(),
                log: Rc::clone(&self.log),
            }),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

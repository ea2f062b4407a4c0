//! Integration tests for the first-contact protocol and action dispatch

use std::fs;

use sshx_core::{
    ConnectionIdentity, ConnectionOrchestrator, Mapping, Registry, SshxConfig, SshxError,
    TerminalAction,
};
use tempfile::TempDir;

use super::fakes::{Behavior, Fakes};

fn setup(fakes: &Fakes) -> (TempDir, SshxConfig, ConnectionOrchestrator) {
    let temp = TempDir::new().unwrap();
    let config = SshxConfig::with_ssh_dir(temp.path());
    let orchestrator = ConnectionOrchestrator::with_collaborators(&config, fakes.build());
    (temp, config, orchestrator)
}

fn seed(config: &SshxConfig, ids: &[ConnectionIdentity]) -> Mapping {
    let mut mapping = Mapping::new();
    for id in ids {
        mapping.put(id);
    }
    Registry::new(&config.registry_path).save(&mapping).unwrap();
    mapping
}

fn stored(config: &SshxConfig) -> Mapping {
    Registry::new(&config.registry_path).load().unwrap()
}

// ============================================================================
// connect
// ============================================================================

#[test]
fn test_first_contact_registers_and_connects() {
    let fakes = Fakes::default();
    let (_temp, config, orchestrator) = setup(&fakes);
    let id = ConnectionIdentity::new("alice", "10.0.0.5", 2222);

    let action = orchestrator.connect(&id).unwrap();

    let TerminalAction::Session(session) = action else {
        panic!("expected a session, got {action:?}");
    };
    assert_eq!(session.program, "ssh");
    assert_eq!(session.args, vec!["-p", "2222", "alice@10.0.0.5"]);
    assert_eq!(session.identity, id);

    let mapping = stored(&config);
    assert_eq!(mapping.len(), 1);
    let entry = mapping.get("alice@10.0.0.5:2222").unwrap();
    assert_eq!(entry.user, "alice");
    assert_eq!(entry.host, "10.0.0.5");
    assert_eq!(entry.port, 2222);

    assert_eq!(
        fakes.calls(),
        vec!["probe alice@10.0.0.5:2222", "install alice@10.0.0.5:2222"]
    );
}

#[test]
fn test_known_identity_skips_first_contact() {
    let fakes = Fakes {
        probe: Behavior::Fail,
        trust: Behavior::Fail,
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);
    let id = ConnectionIdentity::new("bob", "db.internal", 22);
    let before = seed(&config, &[id.clone()]);

    let action = orchestrator.connect(&id).unwrap();

    assert!(matches!(action, TerminalAction::Session(_)));
    assert!(fakes.calls().is_empty());
    assert_eq!(stored(&config), before);
}

#[test]
fn test_probe_failure_leaves_registry_unchanged() {
    let fakes = Fakes {
        probe: Behavior::Fail,
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);
    let existing = ConnectionIdentity::new("ops", "gw", 22);
    let before = seed(&config, &[existing]);

    let err = orchestrator
        .connect(&ConnectionIdentity::new("alice", "unreachable", 22))
        .unwrap_err();

    assert!(matches!(err, SshxError::Probe(_)));
    assert!(err.is_first_contact_failure());
    assert_eq!(stored(&config), before);
    assert_eq!(fakes.calls(), vec!["probe alice@unreachable:22"]);
}

#[test]
fn test_probe_timeout_is_a_probe_failure() {
    let fakes = Fakes {
        probe: Behavior::Timeout,
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);

    let err = orchestrator
        .connect(&ConnectionIdentity::new("alice", "slow", 22))
        .unwrap_err();

    assert!(matches!(err, SshxError::Probe(_)));
    assert!(stored(&config).is_empty());
}

#[test]
fn test_trust_failure_leaves_registry_unchanged() {
    let fakes = Fakes {
        trust: Behavior::Fail,
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);

    let err = orchestrator
        .connect(&ConnectionIdentity::new("alice", "host", 22))
        .unwrap_err();

    assert!(matches!(err, SshxError::TrustEstablish(_)));
    assert!(stored(&config).is_empty());
    assert_eq!(
        fakes.calls(),
        vec!["probe alice@host:22", "install alice@host:22"]
    );
}

#[test]
fn test_missing_client_is_a_dependency_error() {
    let fakes = Fakes {
        probe: Behavior::Missing,
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);

    let err = orchestrator
        .connect(&ConnectionIdentity::new("alice", "host", 22))
        .unwrap_err();

    assert!(matches!(err, SshxError::MissingDependency(ref p) if p == "ssh"));
    assert!(stored(&config).is_empty());
}

#[test]
fn test_ipv6_first_contact() {
    let fakes = Fakes::default();
    let (_temp, config, orchestrator) = setup(&fakes);
    let id = sshx_core::parse("alice@[::1]:2222").unwrap();

    let TerminalAction::Session(session) = orchestrator.connect(&id).unwrap() else {
        panic!("expected a session");
    };

    assert_eq!(session.args, vec!["-p", "2222", "alice@[::1]"]);
    let mapping = stored(&config);
    assert_eq!(mapping.get("alice@::1:2222").unwrap().host, "::1");
}

#[test]
fn test_registry_write_failure_is_fatal() {
    let fakes = Fakes::default();
    let temp = TempDir::new().unwrap();
    // The registry's directory does not exist, so the first load cannot
    // create the file.
    let config = SshxConfig::with_ssh_dir(temp.path().join("absent"));
    let orchestrator = ConnectionOrchestrator::with_collaborators(&config, fakes.build());

    let err = orchestrator
        .connect(&ConnectionIdentity::new("alice", "host", 22))
        .unwrap_err();

    assert!(matches!(err, SshxError::Registry(_)));
    assert!(fakes.calls().is_empty());
}

/// Installs the key, then leaves the SSH directory read-only
#[cfg(unix)]
struct LockingTrust {
    dir: std::path::PathBuf,
}

#[cfg(unix)]
impl sshx_core::TrustInstaller for LockingTrust {
    fn install(&self, _id: &ConnectionIdentity) -> sshx_core::tools::ToolResult<()> {
        set_mode(&self.dir, 0o500);
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(path: &std::path::Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_save_failure_after_trust_is_fatal() {
    let fakes = Fakes::default();
    let temp = TempDir::new().unwrap();
    let config = SshxConfig::with_ssh_dir(temp.path());
    let mut collaborators = fakes.build();
    collaborators.trust = Box::new(LockingTrust {
        dir: config.ssh_dir.clone(),
    });
    let orchestrator = ConnectionOrchestrator::with_collaborators(&config, collaborators);
    let before = seed(&config, &[ConnectionIdentity::new("ops", "gw", 22)]);
    let bytes_before = fs::read(&config.registry_path).unwrap();

    // Permission bits do not bind a privileged user.
    set_mode(&config.ssh_dir, 0o500);
    let privileged = fs::write(config.ssh_dir.join("writable"), "").is_ok();
    set_mode(&config.ssh_dir, 0o700);
    if privileged {
        eprintln!("directory permissions are not enforced, skipping");
        return;
    }

    let result = orchestrator.connect(&ConnectionIdentity::new("alice", "host", 22));
    set_mode(&config.ssh_dir, 0o700);

    let err = result.unwrap_err();
    assert!(matches!(err, SshxError::Registry(_)), "got {err:?}");
    assert!(!err.is_first_contact_failure());
    assert_eq!(fakes.calls(), vec!["probe alice@host:22"]);
    assert_eq!(fs::read(&config.registry_path).unwrap(), bytes_before);
    assert_eq!(stored(&config), before);
    assert!(!Registry::new(&config.registry_path).temp_path().exists());
}

// ============================================================================
// remove
// ============================================================================

#[test]
fn test_remove_deletes_exactly_one_entry() {
    let fakes = Fakes::default();
    let (_temp, config, orchestrator) = setup(&fakes);
    let keep = ConnectionIdentity::new("ops", "gw", 22);
    let gone = ConnectionIdentity::new("alice", "::1", 2222);
    seed(&config, &[keep.clone(), gone.clone()]);

    let entry = orchestrator.remove(&gone).unwrap();

    assert_eq!(entry.identity(), gone);
    let mapping = stored(&config);
    assert_eq!(mapping.len(), 1);
    assert!(mapping.contains(&keep));
    assert!(!mapping.contains(&gone));
    assert_eq!(fakes.calls(), vec!["prune [::1]:2222"]);
}

#[test]
fn test_remove_absent_is_not_found() {
    let fakes = Fakes::default();
    let (_temp, config, orchestrator) = setup(&fakes);
    let before = seed(&config, &[ConnectionIdentity::new("ops", "gw", 22)]);

    let err = orchestrator
        .remove(&ConnectionIdentity::new("alice", "host", 22))
        .unwrap_err();

    assert!(matches!(err, SshxError::NotFound(ref key) if key == "alice@host:22"));
    assert_eq!(stored(&config), before);
    assert!(fakes.calls().is_empty());
}

#[test]
fn test_remove_tolerates_prune_failure() {
    let fakes = Fakes {
        prune: Behavior::Fail,
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);
    let id = ConnectionIdentity::new("alice", "host", 22);
    seed(&config, &[id.clone()]);

    orchestrator.remove(&id).unwrap();

    assert!(stored(&config).is_empty());
    assert_eq!(fakes.calls(), vec!["prune host:22"]);
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_empty_registry() {
    let fakes = Fakes::default();
    let (_temp, _config, orchestrator) = setup(&fakes);

    assert_eq!(orchestrator.list().unwrap(), "(empty)");
}

#[test]
fn test_list_sorted_keys() {
    let fakes = Fakes::default();
    let (_temp, config, orchestrator) = setup(&fakes);
    seed(
        &config,
        &[
            ConnectionIdentity::new("zed", "z", 22),
            ConnectionIdentity::new("amy", "a", 2200),
        ],
    );

    assert_eq!(orchestrator.list().unwrap(), "amy@a:2200\nzed@z:22");
}

#[test]
fn test_list_recovers_from_corruption() {
    let fakes = Fakes::default();
    let (_temp, config, orchestrator) = setup(&fakes);
    fs::write(&config.registry_path, "garbage").unwrap();

    assert_eq!(orchestrator.list().unwrap(), "(empty)");
    assert_eq!(fs::read_to_string(&config.registry_path).unwrap(), "{}");
}

// ============================================================================
// interactive select
// ============================================================================

#[test]
fn test_menu_connects_to_selection() {
    let fakes = Fakes {
        probe: Behavior::Fail,
        choice: Some("bob@b:22".to_string()),
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);
    seed(
        &config,
        &[
            ConnectionIdentity::new("alice", "a", 22),
            ConnectionIdentity::new("bob", "b", 22),
        ],
    );

    let TerminalAction::Session(session) = orchestrator.interactive_select().unwrap() else {
        panic!("expected a session");
    };

    assert_eq!(session.identity, ConnectionIdentity::new("bob", "b", 22));
    assert_eq!(fakes.calls(), vec!["select [alice@a:22,bob@b:22]"]);
}

#[test]
fn test_menu_resolves_ipv6_keys() {
    let fakes = Fakes {
        choice: Some("alice@fe80::1:22".to_string()),
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);
    seed(&config, &[ConnectionIdentity::new("alice", "fe80::1", 22)]);

    let TerminalAction::Session(session) = orchestrator.interactive_select().unwrap() else {
        panic!("expected a session");
    };

    assert_eq!(session.args, vec!["-p", "22", "alice@[fe80::1]"]);
}

#[test]
fn test_menu_cancel_is_silent() {
    let fakes = Fakes {
        choice: None,
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);
    let before = seed(&config, &[ConnectionIdentity::new("alice", "a", 22)]);

    assert_eq!(
        orchestrator.interactive_select().unwrap(),
        TerminalAction::Cancelled
    );
    assert_eq!(stored(&config), before);
}

#[test]
fn test_menu_empty_registry() {
    let fakes = Fakes::default();
    let (_temp, _config, orchestrator) = setup(&fakes);

    assert_eq!(
        orchestrator.interactive_select().unwrap(),
        TerminalAction::EmptyRegistry
    );
    assert!(fakes.calls().is_empty());
}

#[test]
fn test_menu_requires_selector() {
    let fakes = Fakes {
        selector_available: false,
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);
    seed(&config, &[ConnectionIdentity::new("alice", "a", 22)]);

    let err = orchestrator.interactive_select().unwrap_err();
    assert!(matches!(err, SshxError::MissingDependency(ref p) if p == "fzf"));
}

#[test]
fn test_menu_unparseable_selection_is_fatal() {
    let fakes = Fakes {
        choice: Some("not-a-host".to_string()),
        ..Fakes::default()
    };
    let (_temp, config, orchestrator) = setup(&fakes);
    seed(&config, &[ConnectionIdentity::new("alice", "a", 22)]);

    let err = orchestrator.interactive_select().unwrap_err();
    assert!(matches!(err, SshxError::Parse(_)));
}

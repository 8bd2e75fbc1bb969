//! Integration tests for the script and command actions

use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use provision_actions::modules::core::{CommandAction, ScriptAction};
use provision_actions::{
    Action, ActionEntry, ActionError, ActionOutcome, ActionRegistry, ActionsConfig, BuildContext,
    CacheError, Collaborators, LaunchError, ProcessLauncher, ResourceCache, ScriptHost,
    ScriptHostError, StaticBuildContext, ValidationError,
};

const CACHED_SCRIPT: &str = r"C:\Cache\Some-Script.ps1";

#[derive(Default)]
struct FakeCache {
    requests: Mutex<Vec<String>>,
    fail: bool,
}

impl ResourceCache for FakeCache {
    fn resolve(&self, reference: &str, _build: &dyn BuildContext) -> Result<PathBuf, CacheError> {
        self.requests.lock().unwrap().push(reference.to_string());
        if self.fail {
            return Err(CacheError::NotFound {
                reference: reference.to_string(),
            });
        }
        Ok(PathBuf::from(CACHED_SCRIPT))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum HostCall {
    Script(PathBuf, Vec<String>),
    Command(Vec<String>),
}

struct FakeHost {
    exit_code: i32,
    fail: bool,
    calls: Mutex<Vec<HostCall>>,
}

impl FakeHost {
    fn returning(exit_code: i32) -> Arc<Self> {
        Arc::new(Self {
            exit_code,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            exit_code: 0,
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn result(&self) -> Result<i32, ScriptHostError> {
        if self.fail {
            return Err(ScriptHostError::Launch(LaunchError::SpawnFailed {
                binary: "powershell.exe".to_string(),
                error: "file not found".to_string(),
            }));
        }
        Ok(self.exit_code)
    }
}

impl ScriptHost for FakeHost {
    fn run_script(
        &self,
        path: &Path,
        args: &[String],
        _build: &dyn BuildContext,
    ) -> Result<i32, ScriptHostError> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Script(path.to_path_buf(), args.to_vec()));
        self.result()
    }

    fn run_command(&self, tokens: &[String], _build: &dyn BuildContext) -> Result<i32, ScriptHostError> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Command(tokens.to_vec()));
        self.result()
    }
}

fn build() -> StaticBuildContext {
    StaticBuildContext::new("stable")
}

fn script_action(cache: &Arc<FakeCache>, host: &Arc<FakeHost>) -> ScriptAction {
    ScriptAction::new(cache.clone(), host.clone(), 5)
}

fn command_action(cache: &Arc<FakeCache>, host: &Arc<FakeHost>) -> CommandAction {
    CommandAction::new(cache.clone(), host.clone(), 5)
}

#[test]
fn test_script_default_success_code() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(0);
    let action = script_action(&cache, &host);

    let outcome = action
        .run(&json!(["#Some-Script.ps1", ["-Flag1"]]), &build())
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Completed);

    assert_eq!(*cache.requests.lock().unwrap(), vec!["#Some-Script.ps1"]);
    assert_eq!(
        *host.calls.lock().unwrap(),
        vec![HostCall::Script(
            PathBuf::from(CACHED_SCRIPT),
            vec!["-Flag1".to_string()]
        )]
    );
}

#[test]
fn test_script_custom_success_codes() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(1337);
    let action = script_action(&cache, &host);

    let outcome = action
        .run(&json!(["#Some-Script.ps1", ["-Flag1"], [1337, 1338]]), &build())
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Completed);
    assert!(!outcome.is_restart());
}

#[test]
fn test_script_reboot_without_retry() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(1337);
    let action = script_action(&cache, &host);

    let outcome = action
        .run(&json!(["#Some-Script.ps1", ["-Flag1"], [0], [1337, 1338]]), &build())
        .unwrap();
    assert!(outcome.is_restart());
    match outcome {
        ActionOutcome::RestartRequired(signal) => {
            assert!(!signal.retry_on_restart);
            assert_eq!(signal.timeout_secs, 5);
        }
        other => panic!("expected restart, got {other:?}"),
    }
}

#[test]
fn test_script_reboot_with_retry_uses_symbolic_reference() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(1337);
    let action = script_action(&cache, &host);

    let outcome = action
        .run(
            &json!(["#Some-Script.ps1", ["-Flag1"], [0], [1337, 1338], true]),
            &build(),
        )
        .unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::RestartRequired(ref signal) if signal.retry_on_restart
    ));
    assert_eq!(*cache.requests.lock().unwrap(), vec!["#Some-Script.ps1"]);
}

#[test]
fn test_script_invalid_exit_code() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(1337);
    let action = script_action(&cache, &host);

    let err = action.run(&json!(["#Some-Script.ps1"]), &build()).unwrap_err();
    match err {
        ActionError::InvalidExitCode {
            code,
            success_codes,
        } => {
            assert_eq!(code, 1337);
            assert_eq!(success_codes, vec![0]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_script_literal_path_skips_cache() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(0);
    let action = script_action(&cache, &host);

    action
        .run(&json!([r"C:\Scripts\local.ps1"]), &build())
        .unwrap();
    assert!(cache.requests.lock().unwrap().is_empty());
    assert_eq!(
        *host.calls.lock().unwrap(),
        vec![HostCall::Script(PathBuf::from(r"C:\Scripts\local.ps1"), vec![])]
    );
}

#[test]
fn test_script_cache_error_is_wrapped() {
    let cache = Arc::new(FakeCache {
        fail: true,
        ..Default::default()
    });
    let host = FakeHost::returning(0);
    let action = script_action(&cache, &host);

    let err = action.run(&json!(["#Missing.ps1"]), &build()).unwrap_err();
    assert!(matches!(err, ActionError::Cache { ref reference, .. } if reference == "#Missing.ps1"));
    assert!(host.calls.lock().unwrap().is_empty());
}

#[test]
fn test_script_host_error_is_wrapped() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::failing();
    let action = script_action(&cache, &host);

    let err = action.run(&json!(["#Some-Script.ps1"]), &build()).unwrap_err();
    match err {
        ActionError::ExecutionFailed { message } => assert!(message.contains("file not found")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_script_run_rejects_malformed_entry() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(0);
    let action = script_action(&cache, &host);

    let err = action
        .run(&json!(["#Some-Script.ps1", "-Flag1"]), &build())
        .unwrap_err();
    assert!(matches!(err, ActionError::Validation(_)));
    assert!(cache.requests.lock().unwrap().is_empty());
    assert!(host.calls.lock().unwrap().is_empty());
}

#[test]
fn test_command_tokenizes_and_succeeds() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(1337);
    let action = command_action(&cache, &host);

    let outcome = action
        .run(&json!(["Write-Verbose Foo -Verbose", [1337]]), &build())
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(
        *host.calls.lock().unwrap(),
        vec![HostCall::Command(vec![
            "Write-Verbose".to_string(),
            "Foo".to_string(),
            "-Verbose".to_string(),
        ])]
    );
    assert!(cache.requests.lock().unwrap().is_empty());
}

#[test]
fn test_command_invalid_exit_code() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(1337);
    let action = command_action(&cache, &host);

    let err = action
        .run(&json!(["Write-Verbose Foo -Verbose", [0]]), &build())
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidExitCode { code: 1337, .. }));
}

#[test]
fn test_command_reboot_codes() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(3010);
    let action = command_action(&cache, &host);

    let outcome = action
        .run(&json!(["Install-Thing", [0], [3010], true]), &build())
        .unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::RestartRequired(ref signal) if signal.retry_on_restart
    ));
}

#[test]
fn test_command_resolves_cached_script() {
    let cache = Arc::new(FakeCache::default());
    let host = FakeHost::returning(0);
    let action = command_action(&cache, &host);

    action
        .run(&json!(["#Some-Script.ps1 -Verbose -Name Foo"]), &build())
        .unwrap();
    assert_eq!(*cache.requests.lock().unwrap(), vec!["#Some-Script.ps1"]);
    assert_eq!(
        *host.calls.lock().unwrap(),
        vec![HostCall::Command(vec![
            CACHED_SCRIPT.to_string(),
            "-Verbose".to_string(),
            "-Name".to_string(),
            "Foo".to_string(),
        ])]
    );
}

#[test]
fn test_command_cache_error_is_wrapped() {
    let cache = Arc::new(FakeCache {
        fail: true,
        ..Default::default()
    });
    let host = FakeHost::returning(0);
    let action = command_action(&cache, &host);

    let err = action.run(&json!(["@missing.ps1"]), &build()).unwrap_err();
    assert!(matches!(err, ActionError::Cache { .. }));
    assert!(host.calls.lock().unwrap().is_empty());
}

struct NoLauncher;

impl ProcessLauncher for NoLauncher {
    fn execute_binary(&self, binary: &Path, _args: &[String]) -> Result<i32, LaunchError> {
        Err(LaunchError::NoExitCode {
            binary: binary.display().to_string(),
        })
    }

    fn call(&self, command_line: &str) -> Result<i32, LaunchError> {
        Err(LaunchError::NoExitCode {
            binary: command_line.to_string(),
        })
    }
}

fn registry(host: Arc<FakeHost>) -> ActionRegistry {
    let collaborators = Collaborators::new(Arc::new(FakeCache::default()), Arc::new(NoLauncher));
    ActionRegistry::with_script_host(&ActionsConfig::default(), collaborators, host)
}

#[test]
fn test_registry_lists_core_actions() {
    let registry = registry(FakeHost::returning(0));
    assert_eq!(
        registry.list_actions(),
        vec!["GooGetInstall", "PSCommand", "PSScript"]
    );
}

#[test]
fn test_registry_validates_entries() {
    let registry = registry(FakeHost::returning(0));

    assert!(registry
        .validate_entry(&ActionEntry::new("PSScript", json!(["#a.ps1", [], [0], [], false])))
        .is_ok());
    assert!(registry
        .validate_entry(&ActionEntry::new("PSCommand", json!(["Get-Date", [0], [], false, 1])))
        .is_err());
    assert_eq!(
        registry.validate_entry(&ActionEntry::new("Reboot", json!([]))),
        Err(ValidationError::UnknownAction {
            name: "Reboot".to_string()
        })
    );
}

#[test]
fn test_registry_execute_runs_through_host() {
    let host = FakeHost::returning(0);
    let registry = registry(host.clone());

    let outcome = registry
        .execute(&ActionEntry::new("PSCommand", json!(["Get-Date"])), &build())
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(host.calls.lock().unwrap().len(), 1);
}

#[test]
fn test_registry_default_host_wraps_launch_errors() {
    let collaborators = Collaborators::new(Arc::new(FakeCache::default()), Arc::new(NoLauncher));
    let registry = ActionRegistry::with_core_actions(&ActionsConfig::default(), collaborators);

    let err = registry
        .execute(&ActionEntry::new("PSCommand", json!(["Get-Date"])), &build())
        .unwrap_err();
    assert!(matches!(err, ActionError::ExecutionFailed { .. }));
}

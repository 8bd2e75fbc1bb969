//! Action interface traits and collaborator contracts

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::modules::error::{ActionError, CacheError, LaunchError, ScriptHostError, ValidationError};

/// Unified interface for all provisioning actions
pub trait Action: Send + Sync {
    /// Action name as it appears in a task list (e.g., "PSScript")
    fn name(&self) -> &'static str;

    /// Check the shape of a raw entry without side effects
    fn validate(&self, args: &Value) -> Result<(), ValidationError>;

    /// Execute the action
    fn run(&self, args: &Value, build: &dyn BuildContext) -> Result<ActionOutcome, ActionError>;
}

/// Signal returned to the orchestrator when the host must restart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartSignal {
    pub reason: String,
    pub timeout_secs: u32,
    /// Re-run the triggering action after the restart
    pub retry_on_restart: bool,
}

/// Non-error result of running an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Completed,
    RestartRequired(RestartSignal),
}

impl ActionOutcome {
    pub fn is_restart(&self) -> bool {
        matches!(self, ActionOutcome::RestartRequired(_))
    }
}

/// Read-only build metadata
pub trait BuildContext: Send + Sync {
    fn branch(&self) -> String;

    /// True while running inside the preinstallation environment
    fn is_winpe(&self) -> bool {
        false
    }
}

/// Build context with fixed values, used by the CLI and in tests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticBuildContext {
    pub branch: String,
    pub winpe: bool,
}

impl StaticBuildContext {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            winpe: false,
        }
    }
}

impl BuildContext for StaticBuildContext {
    fn branch(&self) -> String {
        self.branch.clone()
    }

    fn is_winpe(&self) -> bool {
        self.winpe
    }
}

/// Content cache turning a symbolic reference into a local file
pub trait ResourceCache: Send + Sync {
    fn resolve(&self, reference: &str, build: &dyn BuildContext) -> Result<PathBuf, CacheError>;
}

/// Lookup of installer resources shipped next to the provisioning binary
pub trait ResourceLocator: Send + Sync {
    /// Local path of `relative`, failing when the file does not exist
    fn resource_path(&self, relative: &str) -> Result<PathBuf, CacheError>;
}

/// Marker prefixes for references resolved through the resource cache:
/// `#` is relative to the active config root, `@` lives on the binary server.
pub const CACHE_PREFIXES: [char; 2] = ['#', '@'];

pub fn is_cache_symbolic(reference: &str) -> bool {
    reference.starts_with(CACHE_PREFIXES)
}

/// Script interpreter. Both calls return the raw exit code; classifying
/// it is the caller's job.
pub trait ScriptHost: Send + Sync {
    fn run_script(
        &self,
        path: &Path,
        args: &[String],
        build: &dyn BuildContext,
    ) -> Result<i32, ScriptHostError>;

    fn run_command(&self, tokens: &[String], build: &dyn BuildContext) -> Result<i32, ScriptHostError>;
}

/// Low-level process spawning primitive
pub trait ProcessLauncher: Send + Sync {
    /// Run `binary` with an argument vector and wait for its exit code
    fn execute_binary(&self, binary: &Path, args: &[String]) -> Result<i32, LaunchError>;

    /// Run a full command line and wait for its exit code
    fn call(&self, command_line: &str) -> Result<i32, LaunchError>;
}

/// Blocking delay between retries
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// External collaborators injected into the core actions
#[derive(Clone)]
pub struct Collaborators {
    pub cache: Arc<dyn ResourceCache>,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub sleeper: Arc<dyn Sleeper>,
}

impl Collaborators {
    pub fn new(cache: Arc<dyn ResourceCache>, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            cache,
            launcher,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

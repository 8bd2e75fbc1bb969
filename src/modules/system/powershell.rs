//! PowerShell interpreter wrapper

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::PowerShellConfig;
use crate::modules::{
    error::ScriptHostError,
    interface::{BuildContext, ProcessLauncher, ResourceLocator, ScriptHost},
    system::ResourceDirectory,
};

const SUPPORTED_POLICIES: [&str; 4] = ["Restricted", "RemoteSigned", "AllSigned", "Unrestricted"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaunchMode {
    File,
    Command,
}

impl LaunchMode {
    fn flag(self) -> &'static str {
        match self {
            LaunchMode::File => "-File",
            LaunchMode::Command => "-Command",
        }
    }
}

/// Runs scripts and commands through `powershell.exe`
pub struct PowerShell {
    config: PowerShellConfig,
    launcher: Arc<dyn ProcessLauncher>,
    resources: Option<Arc<dyn ResourceLocator>>,
}

impl PowerShell {
    /// Resources come from `config.resource_root` when it is set
    pub fn new(config: PowerShellConfig, launcher: Arc<dyn ProcessLauncher>) -> Self {
        let resources = config
            .resource_root
            .clone()
            .map(|root| Arc::new(ResourceDirectory::new(root)) as Arc<dyn ResourceLocator>);
        Self {
            config,
            launcher,
            resources,
        }
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceLocator>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn interpreter_path(&self, build: &dyn BuildContext) -> PathBuf {
        self.config.interpreter(build.is_winpe()).to_path_buf()
    }

    fn launch(
        &self,
        mode: LaunchMode,
        args: Vec<String>,
        build: &dyn BuildContext,
    ) -> Result<i32, ScriptHostError> {
        let mut mode_args = vec![mode.flag().to_string()];
        mode_args.extend(args);
        self.spawn(mode_args, build)
    }

    fn spawn(&self, args: Vec<String>, build: &dyn BuildContext) -> Result<i32, ScriptHostError> {
        let interpreter = self.interpreter_path(build);
        let mut full_args = vec!["-NoProfile".to_string(), "-NoLogo".to_string()];
        full_args.extend(args);

        debug!("Launching {} {:?}", interpreter.display(), full_args);
        Ok(self.launcher.execute_binary(&interpreter, &full_args)?)
    }

    /// Run a script shipped with the installer resources
    pub fn run_resource(
        &self,
        resource: &str,
        args: &[String],
        build: &dyn BuildContext,
    ) -> Result<i32, ScriptHostError> {
        let resources = self
            .resources
            .as_ref()
            .ok_or_else(|| ScriptHostError::ResourceNotFound {
                resource: resource.to_string(),
                reason: "no resource directory configured".to_string(),
            })?;
        let path = resources
            .resource_path(resource)
            .map_err(|e| ScriptHostError::ResourceNotFound {
                resource: resource.to_string(),
                reason: e.to_string(),
            })?;
        self.run_script(&path, args, build)
    }

    /// Open an interactive shell and wait for it to exit
    pub fn start_shell(&self, build: &dyn BuildContext) -> Result<i32, ScriptHostError> {
        self.spawn(Vec::new(), build)
    }

    /// Set the shell execution policy
    pub fn set_execution_policy(
        &self,
        policy: &str,
        build: &dyn BuildContext,
    ) -> Result<i32, ScriptHostError> {
        if !SUPPORTED_POLICIES.contains(&policy) {
            return Err(ScriptHostError::UnknownPolicy(policy.to_string()));
        }
        let tokens = [
            "Set-ExecutionPolicy".to_string(),
            "-ExecutionPolicy".to_string(),
            policy.to_string(),
        ];
        self.run_command(&tokens, build)
    }
}

impl ScriptHost for PowerShell {
    fn run_script(
        &self,
        path: &Path,
        args: &[String],
        build: &dyn BuildContext,
    ) -> Result<i32, ScriptHostError> {
        let mut launch_args = vec![path.display().to_string()];
        launch_args.extend_from_slice(args);
        self.launch(LaunchMode::File, launch_args, build)
    }

    fn run_command(&self, tokens: &[String], build: &dyn BuildContext) -> Result<i32, ScriptHostError> {
        self.launch(LaunchMode::Command, tokens.to_vec(), build)
    }
}

//! Central registry for all provisioning actions

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ActionsConfig;
use crate::execution::ActionEntry;
use crate::modules::{
    core::{CommandAction, GooGetInstallAction, ScriptAction},
    error::{ActionError, ValidationError},
    interface::{Action, ActionOutcome, BuildContext, Collaborators, ScriptHost},
    system::{GooGetInstaller, PowerShell},
};

/// Central registry for all provisioning actions
pub struct ActionRegistry {
    actions: HashMap<String, Box<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Create a registry with the script, command and package actions,
    /// running scripts through PowerShell on the injected launcher
    pub fn with_core_actions(config: &ActionsConfig, collaborators: Collaborators) -> Self {
        let host: Arc<dyn ScriptHost> = Arc::new(PowerShell::new(
            config.powershell.clone(),
            collaborators.launcher.clone(),
        ));
        Self::with_script_host(config, collaborators, host)
    }

    /// Same as [`ActionRegistry::with_core_actions`] with a caller-supplied script host
    pub fn with_script_host(
        config: &ActionsConfig,
        collaborators: Collaborators,
        host: Arc<dyn ScriptHost>,
    ) -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(ScriptAction::new(
            collaborators.cache.clone(),
            host.clone(),
            config.restart_timeout_secs,
        )));
        registry.register(Box::new(CommandAction::new(
            collaborators.cache.clone(),
            host,
            config.restart_timeout_secs,
        )));
        registry.register(Box::new(GooGetInstallAction::new(
            GooGetInstaller::new(
                config.googet.clone(),
                collaborators.launcher,
                collaborators.sleeper,
            ),
            config.googet.clone(),
        )));

        registry
    }

    pub fn register(&mut self, action: Box<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn get_action(&self, name: &str) -> Option<&dyn Action> {
        self.actions.get(name).map(|a| a.as_ref())
    }

    pub fn list_actions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    fn lookup(&self, name: &str) -> Result<&dyn Action, ValidationError> {
        self.get_action(name)
            .ok_or_else(|| ValidationError::UnknownAction {
                name: name.to_string(),
            })
    }

    pub fn validate(&self, name: &str, args: &Value) -> Result<(), ValidationError> {
        self.lookup(name)?.validate(args)
    }

    pub fn validate_entry(&self, entry: &ActionEntry) -> Result<(), ValidationError> {
        self.validate(&entry.name, &entry.args)
    }

    /// Validate, then run a single entry
    pub fn execute(
        &self,
        entry: &ActionEntry,
        build: &dyn BuildContext,
    ) -> Result<ActionOutcome, ActionError> {
        let action = self.lookup(&entry.name)?;
        action.validate(&entry.args)?;
        action.run(&entry.args, build)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

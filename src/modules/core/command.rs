//! Command action - runs a PowerShell command line

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::modules::{
    core::script::resolve_reference,
    error::{ActionError, ValidationError},
    interface::{is_cache_symbolic, Action, ActionOutcome, BuildContext, ResourceCache, ScriptHost},
    policy::ExitCodePolicy,
    validator::CommandSpec,
};

/// Runs `[command_line, success_codes, reboot_codes, retry_on_reboot]`
pub struct CommandAction {
    cache: Arc<dyn ResourceCache>,
    host: Arc<dyn ScriptHost>,
    restart_timeout_secs: u32,
}

impl CommandAction {
    pub fn new(
        cache: Arc<dyn ResourceCache>,
        host: Arc<dyn ScriptHost>,
        restart_timeout_secs: u32,
    ) -> Self {
        Self {
            cache,
            host,
            restart_timeout_secs,
        }
    }

    pub fn run_spec(
        &self,
        spec: &CommandSpec,
        build: &dyn BuildContext,
    ) -> Result<ActionOutcome, ActionError> {
        let mut tokens = spec.tokens();

        if let Some(first) = tokens.first_mut() {
            if is_cache_symbolic(first) {
                info!("Interpreting Powershell script: {}", first);
                let local = resolve_reference(self.cache.as_ref(), first, build)?;
                *first = local.display().to_string();
            }
        }

        let code = self.host.run_command(&tokens, build)?;

        ExitCodePolicy {
            success_codes: &spec.success_codes,
            reboot_codes: &spec.reboot_codes,
            retry_on_reboot: spec.retry_on_reboot,
            restart_timeout_secs: self.restart_timeout_secs,
        }
        .apply(code)
    }
}

impl Action for CommandAction {
    fn name(&self) -> &'static str {
        CommandSpec::ACTION
    }

    fn validate(&self, args: &Value) -> Result<(), ValidationError> {
        CommandSpec::parse(args).map(|_| ())
    }

    fn run(&self, args: &Value, build: &dyn BuildContext) -> Result<ActionOutcome, ActionError> {
        let spec = CommandSpec::parse(args)?;
        self.run_spec(&spec, build)
    }
}

//! Script action - runs a PowerShell script file

use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::modules::{
    error::{ActionError, ValidationError},
    interface::{is_cache_symbolic, Action, ActionOutcome, BuildContext, ResourceCache, ScriptHost},
    policy::ExitCodePolicy,
    validator::ScriptSpec,
};

/// Runs `[reference, args, success_codes, reboot_codes, retry_on_reboot]`
pub struct ScriptAction {
    cache: Arc<dyn ResourceCache>,
    host: Arc<dyn ScriptHost>,
    restart_timeout_secs: u32,
}

impl ScriptAction {
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
        spec: &ScriptSpec,
        build: &dyn BuildContext,
    ) -> Result<ActionOutcome, ActionError> {
        info!("Interpreting Powershell script: {}", spec.reference);
        let script = resolve_reference(self.cache.as_ref(), &spec.reference, build)?;

        let code = self.host.run_script(&script, &spec.args, build)?;

        ExitCodePolicy {
            success_codes: &spec.success_codes,
            reboot_codes: &spec.reboot_codes,
            retry_on_reboot: spec.retry_on_reboot,
            restart_timeout_secs: self.restart_timeout_secs,
        }
        .apply(code)
    }
}

/// Resolve cache-symbolic references to a local path; literal paths pass through.
pub(crate) fn resolve_reference(
    cache: &dyn ResourceCache,
    reference: &str,
    build: &dyn BuildContext,
) -> Result<PathBuf, ActionError> {
    if !is_cache_symbolic(reference) {
        return Ok(PathBuf::from(reference));
    }
    cache
        .resolve(reference, build)
        .map_err(|e| ActionError::Cache {
            reference: reference.to_string(),
            reason: e.to_string(),
        })
}

impl Action for ScriptAction {
    fn name(&self) -> &'static str {
        ScriptSpec::ACTION
    }

    fn validate(&self, args: &Value) -> Result<(), ValidationError> {
        ScriptSpec::parse(args).map(|_| ())
    }

    fn run(&self, args: &Value, build: &dyn BuildContext) -> Result<ActionOutcome, ActionError> {
        let spec = ScriptSpec::parse(args)?;
        self.run_spec(&spec, build)
    }
}

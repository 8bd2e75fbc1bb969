//! Exit-code interpretation

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::modules::{
    error::ActionError,
    interface::{ActionOutcome, RestartSignal},
};

/// Classification of one observed exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitOutcome {
    Success,
    RebootRequired { retry: bool },
    Failure { code: i32 },
}

/// Reboot codes are checked before success codes, so a code listed in
/// both always requests a reboot.
pub fn classify(
    code: i32,
    success_codes: &[i32],
    reboot_codes: &[i32],
    retry_on_reboot: bool,
) -> ExitOutcome {
    if reboot_codes.contains(&code) {
        ExitOutcome::RebootRequired {
            retry: retry_on_reboot,
        }
    } else if success_codes.contains(&code) {
        ExitOutcome::Success
    } else {
        ExitOutcome::Failure { code }
    }
}

/// Reboot and success-code settings shared by the script and command actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitCodePolicy<'a> {
    pub success_codes: &'a [i32],
    pub reboot_codes: &'a [i32],
    pub retry_on_reboot: bool,
    pub restart_timeout_secs: u32,
}

impl ExitCodePolicy<'_> {
    /// Map an exit code onto the signal handed back to the orchestrator
    pub fn apply(&self, code: i32) -> Result<ActionOutcome, ActionError> {
        match classify(
            code,
            self.success_codes,
            self.reboot_codes,
            self.retry_on_reboot,
        ) {
            ExitOutcome::Success => Ok(ActionOutcome::Completed),
            ExitOutcome::RebootRequired { retry } => {
                info!("Restart triggered by exit code {} (retry: {})", code, retry);
                Ok(ActionOutcome::RestartRequired(RestartSignal {
                    reason: format!("Restart triggered by exit code {code}"),
                    timeout_secs: self.restart_timeout_secs,
                    retry_on_restart: retry,
                }))
            }
            ExitOutcome::Failure { code } => Err(ActionError::InvalidExitCode {
                code,
                success_codes: self.success_codes.to_vec(),
            }),
        }
    }
}

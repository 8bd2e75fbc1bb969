//! Package action - installs GooGet packages

use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::config::GooGetConfig;
use crate::modules::{
    error::{ActionError, ValidationError},
    interface::{Action, ActionOutcome, BuildContext},
    system::package_managers::{googet::flags_from_value, GooGetInstaller, InstallRequest},
    validator::{json_type_name, PositionalArgs},
};

pub const ACTION: &str = "GooGetInstall";

/// `[package, flags, path, retries, sleep_secs]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GooGetSpec {
    pub package: String,
    pub flags: Vec<String>,
    pub path: Option<PathBuf>,
    pub retries: u32,
    pub sleep_secs: u64,
}

impl GooGetSpec {
    pub fn parse(entry: &Value, defaults: &GooGetConfig) -> Result<Self, ValidationError> {
        let slots = PositionalArgs::new(ACTION, entry, 1, 5)?;

        let package = slots.string(0)?.unwrap_or_default();
        let flags = slots.string_list(1)?.unwrap_or_default();
        let path = slots.string(2)?.map(PathBuf::from);
        let retries = match slots.int(3)? {
            Some(n) => u32::try_from(n).ok().filter(|n| *n >= 1).ok_or_else(|| {
                slots.invalid_value(3, format!("retries must be at least 1, got {n}"))
            })?,
            None if defaults.retries >= 1 => defaults.retries,
            None => {
                return Err(slots.invalid_value(
                    3,
                    format!("default retries must be at least 1, got {}", defaults.retries),
                ))
            }
        };
        let sleep_secs = match slots.int(4)? {
            Some(n) => u64::try_from(n)
                .map_err(|_| slots.invalid_value(4, format!("sleep must not be negative, got {n}")))?,
            None => defaults.sleep_secs,
        };

        Ok(Self {
            package,
            flags,
            path,
            retries,
            sleep_secs,
        })
    }

    /// Parse a whole action: a sequence of package entries
    pub fn parse_all(args: &Value, defaults: &GooGetConfig) -> Result<Vec<Self>, ValidationError> {
        let entries = args.as_array().ok_or_else(|| ValidationError::NotASequence {
            action: ACTION.to_string(),
            found: json_type_name(args).to_string(),
        })?;
        entries
            .iter()
            .map(|entry| Self::parse(entry, defaults))
            .collect()
    }
}

/// Installs every listed package in order, stopping at the first failure
pub struct GooGetInstallAction {
    installer: GooGetInstaller,
    defaults: GooGetConfig,
}

impl GooGetInstallAction {
    pub fn new(installer: GooGetInstaller, defaults: GooGetConfig) -> Self {
        Self {
            installer,
            defaults,
        }
    }

    /// Build the install request straight from a raw entry. Flags go through
    /// the templater's own list check, so unvalidated input still fails cleanly.
    fn request(&self, entry: &Value) -> Result<InstallRequest, ActionError> {
        let slots = entry.as_array().map(Vec::as_slice).unwrap_or_default();
        let flags = match slots.get(1) {
            Some(value) => Some(flags_from_value(value)?),
            None => None,
        };

        let spec = GooGetSpec::parse(entry, &self.defaults)?;
        Ok(InstallRequest {
            package: spec.package,
            path: spec.path,
            flags,
            retries: spec.retries,
            sleep: Duration::from_secs(spec.sleep_secs),
        })
    }
}

impl Action for GooGetInstallAction {
    fn name(&self) -> &'static str {
        ACTION
    }

    fn validate(&self, args: &Value) -> Result<(), ValidationError> {
        GooGetSpec::parse_all(args, &self.defaults).map(|_| ())
    }

    fn run(&self, args: &Value, build: &dyn BuildContext) -> Result<ActionOutcome, ActionError> {
        let entries = args.as_array().ok_or_else(|| ValidationError::NotASequence {
            action: ACTION.to_string(),
            found: json_type_name(args).to_string(),
        })?;

        for entry in entries {
            let request = self.request(entry)?;
            info!("Installing GooGet package {}", request.package);
            self.installer.install(&request, build)?;
        }

        Ok(ActionOutcome::Completed)
    }
}

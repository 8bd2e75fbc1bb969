//! GooGet package manager for Windows provisioning

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::GooGetConfig;
use crate::modules::{
    error::ToolingError,
    interface::{BuildContext, ProcessLauncher, Sleeper},
};

const SOURCE_SCHEMES: [&str; 2] = ["http://", "https://"];
const PLACEHOLDER: char = '%';
const ESCAPE: char = '\\';

/// Substitute every unescaped `%` with `branch`; `\%` yields a literal `%`.
pub fn substitute_placeholder(flag: &str, branch: &str) -> String {
    let mut out = String::with_capacity(flag.len());
    let mut chars = flag.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE if chars.peek() == Some(&PLACEHOLDER) => {
                chars.next();
                out.push(PLACEHOLDER);
            }
            PLACEHOLDER => out.push_str(branch),
            other => out.push(other),
        }
    }
    out
}

/// Rewrite caller-supplied flags: source URLs are templated with the branch
/// and merged into one leading `-sources` flag; other flags keep their order.
pub fn template_flags(flags: &[String], branch: &str) -> Result<Vec<String>, ToolingError> {
    let mut sources = Vec::new();
    let mut remaining = Vec::new();

    for flag in flags {
        let trimmed = flag.trim_start();
        if trimmed.starts_with("--root") || trimmed.starts_with("-root") {
            return Err(ToolingError::RootFlag { flag: flag.clone() });
        }
        if trimmed.starts_with("-sources") {
            return Err(ToolingError::SourcesKeyword { flag: flag.clone() });
        }
        if SOURCE_SCHEMES.iter().any(|scheme| flag.contains(scheme)) {
            sources.push(substitute_placeholder(flag, branch));
        } else {
            remaining.push(flag.clone());
        }
    }

    if !sources.is_empty() {
        remaining.insert(0, format!("-sources {}", sources.join(", ")));
    }
    Ok(remaining)
}

/// Read a flag list from a raw configuration value
pub fn flags_from_value(value: &Value) -> Result<Vec<String>, ToolingError> {
    let items = value.as_array().ok_or(ToolingError::FlagsNotList)?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(String::from)
                .ok_or(ToolingError::FlagsNotList)
        })
        .collect()
}

/// One install request, built per package and discarded after the final attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GooGetInvocation {
    pub binary: PathBuf,
    pub root: PathBuf,
    pub package: String,
    pub flags: Vec<String>,
    pub retries: u32,
    pub sleep: Duration,
}

impl GooGetInvocation {
    /// `<path> -noconfirm --root=<root> install [<flags>] <package>`
    pub fn command_line(&self) -> String {
        let mut parts = vec![
            self.binary.display().to_string(),
            "-noconfirm".to_string(),
            format!("--root={}", self.root.display()),
            "install".to_string(),
        ];
        parts.extend(self.flags.iter().cloned());
        parts.push(self.package.clone());
        parts.join(" ")
    }
}

/// Parameters of a single install request as given by the caller
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    pub package: String,
    /// Binary override; defaults to `<root>/googet.exe`
    pub path: Option<PathBuf>,
    pub flags: Option<Vec<String>>,
    pub retries: u32,
    pub sleep: Duration,
}

/// Drives GooGet installs with a fixed delay between failed attempts
pub struct GooGetInstaller {
    config: GooGetConfig,
    launcher: Arc<dyn ProcessLauncher>,
    sleeper: Arc<dyn Sleeper>,
}

impl GooGetInstaller {
    pub fn new(
        config: GooGetConfig,
        launcher: Arc<dyn ProcessLauncher>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            config,
            launcher,
            sleeper,
        }
    }

    /// Check preconditions, including that the binary exists, and assemble the invocation
    pub fn prepare(
        &self,
        request: &InstallRequest,
        build: &dyn BuildContext,
    ) -> Result<GooGetInvocation, ToolingError> {
        if request.package.is_empty() {
            return Err(ToolingError::MissingPackageName);
        }

        let binary = self.binary_path(request, build);
        if !binary.exists() {
            return Err(ToolingError::BinaryNotFound {
                path: binary.display().to_string(),
            });
        }

        self.render(request, build)
    }

    /// Assemble the invocation without touching the filesystem
    pub fn render(
        &self,
        request: &InstallRequest,
        build: &dyn BuildContext,
    ) -> Result<GooGetInvocation, ToolingError> {
        if request.package.is_empty() {
            return Err(ToolingError::MissingPackageName);
        }
        if request.retries == 0 {
            return Err(ToolingError::InvalidRetries {
                retries: request.retries,
            });
        }

        let flags = match &request.flags {
            Some(flags) => template_flags(flags, &build.branch())?,
            None => Vec::new(),
        };

        Ok(GooGetInvocation {
            binary: self.binary_path(request, build),
            root: self.root(build).to_path_buf(),
            package: request.package.clone(),
            flags,
            retries: request.retries,
            sleep: request.sleep,
        })
    }

    fn binary_path(&self, request: &InstallRequest, build: &dyn BuildContext) -> PathBuf {
        request
            .path
            .clone()
            .unwrap_or_else(|| self.config.default_binary(build.is_winpe()))
    }

    pub fn install(
        &self,
        request: &InstallRequest,
        build: &dyn BuildContext,
    ) -> Result<(), ToolingError> {
        let invocation = self.prepare(request, build)?;
        self.run(&invocation)
    }

    /// Attempt the install up to `retries` times, sleeping between failures
    pub fn run(&self, invocation: &GooGetInvocation) -> Result<(), ToolingError> {
        let command = invocation.command_line();

        for attempt in 1..=invocation.retries {
            info!("Executing GooGet command: {}", command);
            match self.launcher.call(&command) {
                Ok(0) => {
                    info!("GooGet installed {} on attempt {}", invocation.package, attempt);
                    return Ok(());
                }
                Ok(code) => warn!(
                    "GooGet command exited with {} (attempt {}/{})",
                    code, attempt, invocation.retries
                ),
                Err(e) => warn!(
                    "GooGet command could not be launched: {} (attempt {}/{})",
                    e, attempt, invocation.retries
                ),
            }

            if attempt < invocation.retries {
                warn!("Retrying GooGet command in {:?}", invocation.sleep);
                self.sleeper.sleep(invocation.sleep);
            }
        }

        Err(ToolingError::RetriesExhausted {
            attempts: invocation.retries,
        })
    }

    pub fn root(&self, build: &dyn BuildContext) -> &Path {
        self.config.root(build.is_winpe())
    }
}

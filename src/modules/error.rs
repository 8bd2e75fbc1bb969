use thiserror::Error;

/// Errors raised while checking the shape of a raw action entry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid args for {action}: expected a sequence, found {found}")]
    NotASequence { action: String, found: String },

    #[error("Invalid args length for {action}: {len} (expected {min}..={max})")]
    InvalidLength {
        action: String,
        len: usize,
        min: usize,
        max: usize,
    },

    #[error("Invalid type for {action} arg {slot}: expected {expected}, found {found}")]
    InvalidType {
        action: String,
        slot: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid argument value for {action} arg {slot}: {reason}")]
    InvalidValue {
        action: String,
        slot: usize,
        reason: String,
    },

    #[error("Unknown action: {name}")]
    UnknownAction { name: String },
}

/// Runtime failure of a single action, surfaced to the orchestrator
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unable to cache {reference}: {reason}")]
    Cache { reference: String, reason: String },

    #[error("Execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("Command returned invalid exit code {code} (expected one of {success_codes:?})")]
    InvalidExitCode { code: i32, success_codes: Vec<i32> },

    #[error("Failure executing GooGet command with error: [{0}]")]
    Tooling(#[from] ToolingError),
}

/// Package-manager preconditions and retry exhaustion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolingError {
    #[error("Missing package name for GooGet install.")]
    MissingPackageName,

    #[error("Cannot find path of GooGet binary [{path}]")]
    BinaryNotFound { path: String },

    #[error("GooGet flags were not passed as a list")]
    FlagsNotList,

    #[error("Root flag detected, remove flag to continue. [{flag}]")]
    RootFlag { flag: String },

    #[error("Sources keyword detected, pass source URLs without the flag. [{flag}]")]
    SourcesKeyword { flag: String },

    #[error("GooGet retries must be at least 1, got {retries}")]
    InvalidRetries { retries: u32 },

    #[error("GooGet command failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

/// Error reported by a resource cache implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("Resource not found: {reference}")]
    NotFound { reference: String },

    #[error("Failed to fetch {reference}: {error}")]
    FetchFailed { reference: String, error: String },
}

/// Error reported by the process-launching primitive
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LaunchError {
    #[error("Failed to launch {binary}: {error}")]
    SpawnFailed { binary: String, error: String },

    #[error("Process {binary} terminated without an exit code")]
    NoExitCode { binary: String },
}

/// Errors from the script interpreter wrapper
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptHostError {
    #[error("Unknown execution policy: {0}")]
    UnknownPolicy(String),

    #[error("PowerShell launch failed: {0}")]
    Launch(#[from] LaunchError),

    #[error("Cannot locate PowerShell resource {resource}: {reason}")]
    ResourceNotFound { resource: String, reason: String },
}

impl From<ScriptHostError> for ActionError {
    fn from(err: ScriptHostError) -> Self {
        ActionError::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

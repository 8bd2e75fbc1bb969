use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON format: {reason}")]
    InvalidJson { reason: String },

    #[error("Invalid YAML format: {reason}")]
    InvalidYaml { reason: String },

    #[error("Task list must be a sequence of actions")]
    NotASequence,

    #[error("Invalid task list entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("Failed to read task list {path}: {error}")]
    Io { path: String, error: String },
}

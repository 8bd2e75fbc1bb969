//! Provision Actions - action execution core for unattended host provisioning
//!
//! This crate validates declarative action entries (run a script, run a command
//! line, install a package), resolves cached resources, drives the external
//! process through injected collaborators, and turns exit codes into either a
//! completed action or a failure, with restarts reported to the orchestrator as an outcome.

pub mod config;
pub mod execution;
pub mod modules;

pub use config::ActionsConfig;
pub use execution::{ActionEntry, TaskList};
pub use modules::{
    classify, error::*, interface::*, ActionRegistry, CommandSpec, ExitCodePolicy, ExitOutcome,
    ScriptSpec,
};

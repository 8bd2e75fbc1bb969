//! Core provisioning actions

pub mod command;
pub mod package;
pub mod script;

pub use command::CommandAction;
pub use package::{GooGetInstallAction, GooGetSpec};
pub use script::ScriptAction;

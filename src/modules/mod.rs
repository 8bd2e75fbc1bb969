//! Provisioning actions and the collaborator contracts they run against

pub mod core;
pub mod error;
pub mod interface;
pub mod policy;
pub mod registry;
pub mod system;
pub mod validator;

// Re-export commonly used types
pub use error::*;
pub use interface::*;
pub use policy::{classify, ExitCodePolicy, ExitOutcome};
pub use registry::ActionRegistry;
pub use validator::{CommandSpec, ScriptSpec};

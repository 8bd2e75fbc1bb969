//! Package manager implementations

pub mod googet;

pub use googet::{GooGetInstaller, GooGetInvocation, InstallRequest};

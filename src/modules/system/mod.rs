//! Host-side tooling wrapped by the core actions

pub mod package_managers;
pub mod powershell;
pub mod resources;

pub use package_managers::{GooGetInstaller, GooGetInvocation, InstallRequest};
pub use powershell::PowerShell;
pub use resources::ResourceDirectory;

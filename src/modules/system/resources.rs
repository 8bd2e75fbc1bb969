//! Installer resources on the local filesystem

use std::path::PathBuf;

use crate::modules::{error::CacheError, interface::ResourceLocator};

/// Resolves resource names against a fixed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDirectory {
    root: PathBuf,
}

impl ResourceDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceLocator for ResourceDirectory {
    fn resource_path(&self, relative: &str) -> Result<PathBuf, CacheError> {
        let path = self.root.join(relative);
        if path.exists() {
            Ok(path)
        } else {
            Err(CacheError::NotFound {
                reference: path.display().to_string(),
            })
        }
    }
}

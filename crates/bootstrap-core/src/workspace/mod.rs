//! The on-disk project being bootstrapped
//!
//! This module provides:
//! - Naming rules for the project
//! - The safe pre-existing content policy
//! - The temporary manifest that drives the install
//! - Rollback of install artifacts on failure

pub mod naming;
pub mod rollback;
pub mod safety;

use crate::error::{BootstrapError, Result};
use crate::paths::normalize;
use crate::runtime::PackageManager;
use crate::specifier::ResolvedReference;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use naming::check_app_name;
pub use rollback::{rollback, RollbackReport, ROLLBACK_ALLOW_LIST};
pub use safety::ensure_safe_to_create;

/// File name of the bootstrap manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Lockfiles removed together with the manifest after a successful install
pub const LOCKFILES: &[&str] = &[
    PackageManager::Npm.lockfile(),
    PackageManager::Yarn.lockfile(),
];

/// Minimal package descriptor written before the install
#[derive(Debug, Serialize)]
pub struct BootstrapManifest {
    pub name: String,
    pub version: String,
    pub private: bool,
    pub dependencies: BTreeMap<String, String>,
}

impl BootstrapManifest {
    pub fn new(app_name: &str, dependencies: &[ResolvedReference]) -> Self {
        Self {
            name: app_name.to_string(),
            version: "0.1.0".to_string(),
            private: true,
            dependencies: dependencies
                .iter()
                .map(|d| (d.display_name().to_string(), d.manifest_range().to_string()))
                .collect(),
        }
    }
}

/// Where the project lives and where the user started from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectWorkspace {
    root: PathBuf,
    app_name: String,
    original_directory: PathBuf,
}

impl ProjectWorkspace {
    /// Resolve `target` against the directory the user ran us from
    pub fn new(target: &Path, original_directory: &Path) -> Self {
        let root = normalize(&original_directory.join(target));
        let app_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            root,
            app_name,
            original_directory: original_directory.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn original_directory(&self) -> &Path {
        &self.original_directory
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Create the root if needed and check it holds nothing that could conflict
    pub fn prepare_directory(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            BootstrapError::io(format!("Failed to create directory {}", self.root.display()), e)
        })?;
        ensure_safe_to_create(&self.root)
    }

    /// Write the bootstrap manifest declaring `dependencies`
    pub fn write_manifest(&self, dependencies: &[ResolvedReference]) -> Result<()> {
        let manifest = BootstrapManifest::new(&self.app_name, dependencies);
        let mut content = serde_json::to_string_pretty(&manifest).map_err(|e| {
            BootstrapError::io("Failed to serialize package.json", std::io::Error::other(e))
        })?;
        content.push('\n');

        let path = self.manifest_path();
        std::fs::write(&path, content)
            .map_err(|e| BootstrapError::io(format!("Failed to write {}", path.display()), e))
    }

    /// Remove the manifest and lockfiles once the install no longer needs them
    pub fn strip_scaffold(&self) -> Result<()> {
        for name in std::iter::once(MANIFEST_FILE).chain(LOCKFILES.iter().copied()) {
            let path = self.root.join(name);
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(file = name, "removed bootstrap file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(BootstrapError::io(
                        format!("Failed to remove {}", path.display()),
                        e,
                    ))
                }
            }
        }
        Ok(())
    }
}

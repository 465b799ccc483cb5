//! Pre-existing content policy for the target directory

use crate::error::{BootstrapError, Result};
use std::path::Path;

/// Entries that may already exist in a directory we bootstrap into
pub const BENIGN_ENTRIES: &[&str] = &[
    ".DS_Store",
    ".git",
    ".gitattributes",
    ".gitignore",
    ".gitlab-ci.yml",
    ".hg",
    ".hgcheck",
    ".hgignore",
    ".idea",
    ".npmignore",
    ".travis.yml",
    "docs",
    "LICENSE",
    "README.md",
    "mkdocs.yml",
    "Thumbs.db",
];

/// Log files left behind by an earlier failed install
const ERROR_LOG_PREFIXES: &[&str] = &["npm-debug.log", "yarn-error.log", "yarn-debug.log"];

fn is_error_log(name: &str) -> bool {
    ERROR_LOG_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn is_benign(name: &str) -> bool {
    BENIGN_ENTRIES.contains(&name) || name.ends_with(".iml") || is_error_log(name)
}

/// Fail if `root` holds anything outside the benign list. When the directory
/// is safe, error logs from a previous attempt are removed.
pub fn ensure_safe_to_create(root: &Path) -> Result<()> {
    let entries = std::fs::read_dir(root)
        .map_err(|e| BootstrapError::io(format!("Failed to read {}", root.display()), e))?;

    let mut conflicts = Vec::new();
    let mut stale_logs = Vec::new();

    for entry in entries {
        let entry =
            entry.map_err(|e| BootstrapError::io(format!("Failed to read {}", root.display()), e))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if is_error_log(&name) {
            stale_logs.push(entry.path());
        } else if !is_benign(&name) {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            conflicts.push(if is_dir { format!("{}/", name) } else { name });
        }
    }

    if !conflicts.is_empty() {
        conflicts.sort();
        return Err(BootstrapError::UnsafeWorkspace {
            root: root.to_path_buf(),
            conflicts,
        });
    }

    for log in stale_logs {
        tracing::debug!(path = %log.display(), "removing stale error log");
        std::fs::remove_file(&log)
            .map_err(|e| BootstrapError::io(format!("Failed to remove {}", log.display()), e))?;
    }

    Ok(())
}

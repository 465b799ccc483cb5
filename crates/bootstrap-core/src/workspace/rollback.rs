//! Failure recovery for a partially bootstrapped project

use super::MANIFEST_FILE;
use crate::runtime::PackageManager;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// The only entries rollback is ever allowed to delete
pub const ROLLBACK_ALLOW_LIST: &[&str] = &[
    MANIFEST_FILE,
    PackageManager::Npm.lockfile(),
    PackageManager::Yarn.lockfile(),
    "node_modules",
];

/// What rollback did to the project root
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    /// Allow-listed entries that were deleted
    pub deleted: Vec<String>,
    /// Entries left in place because they are not on the allow-list
    pub leftovers: Vec<String>,
    /// Whether the emptied root directory itself was removed
    pub removed_root: bool,
    /// Entries that matched the allow-list but could not be deleted
    pub failed: Vec<String>,
}

/// Delete allow-listed install artifacts from `root`, then the root itself if
/// nothing else is left. Never touches anything outside `root`.
pub fn rollback(root: &Path) -> RollbackReport {
    let mut report = RollbackReport::default();

    for name in ROLLBACK_ALLOW_LIST {
        let path = root.join(name);
        let Ok(meta) = std::fs::symlink_metadata(&path) else {
            continue;
        };

        println!("Deleting generated file... {}", name.cyan());
        let result = if meta.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };

        match result {
            Ok(()) => report.deleted.push(name.to_string()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not delete generated file");
                report.failed.push(name.to_string());
            }
        }
    }

    report.leftovers = remaining_entries(root);

    if report.leftovers.is_empty() && report.failed.is_empty() && root.exists() {
        let parent = root.parent().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
        let dir_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "Deleting {} from {}",
            format!("{}/", dir_name).cyan(),
            parent.display().to_string().cyan()
        );
        match std::fs::remove_dir(root) {
            Ok(()) => report.removed_root = true,
            Err(e) => tracing::warn!(root = %root.display(), error = %e, "could not delete project directory"),
        }
    } else {
        for leftover in &report.leftovers {
            println!(
                "{} {} {}",
                "Warning:".yellow(),
                leftover.cyan(),
                "is not a known generated file and was left in place".yellow()
            );
        }
    }

    report
}

fn remaining_entries(root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_rollback_removes_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("yarn.lock"), "").unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();

        let report = rollback(&root);

        assert_eq!(report.deleted, vec!["package.json", "yarn.lock", "node_modules"]);
        assert!(report.leftovers.is_empty());
        assert!(report.removed_root);
        assert!(!root.exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_rollback_never_removes_unlisted_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "keep me").unwrap();
        fs::write(root.join("pnpm-lock.yaml"), "").unwrap();

        let report = rollback(&root);

        assert_eq!(report.deleted, vec!["package.json"]);
        assert_eq!(report.leftovers, vec!["notes.txt", "pnpm-lock.yaml"]);
        assert!(!report.removed_root);
        assert_eq!(fs::read_to_string(root.join("notes.txt")).unwrap(), "keep me");
    }

    #[cfg(unix)]
    #[test]
    fn test_rollback_does_not_follow_symlinked_dependency_dir() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("shared_modules");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("precious.js"), "").unwrap();

        let root = dir.path().join("app");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("node_modules")).unwrap();

        let report = rollback(&root);

        assert_eq!(report.deleted, vec!["node_modules"]);
        assert!(outside.join("precious.js").exists());
        assert!(!root.exists());
    }

    #[test]
    fn test_rollback_of_missing_root_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let report = rollback(&dir.path().join("never-created"));
        assert_eq!(report, RollbackReport::default());
    }
}

//! Error types for the bootstrap flow

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Every way a bootstrap run can end unsuccessfully
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// No project directory was given on the command line
    #[error("no project directory specified")]
    MissingProjectName,

    /// The name breaks package naming rules
    #[error("cannot create a project named \"{name}\" because of npm naming restrictions")]
    InvalidName { name: String, problems: Vec<String> },

    /// The name collides with one of the packages we install
    #[error("cannot create a project named \"{name}\" because a dependency with the same name exists")]
    ReservedName {
        name: String,
        reserved: Vec<String>,
    },

    /// The target directory already holds files that could conflict
    #[error("the directory {} contains files that could conflict", .root.display())]
    UnsafeWorkspace {
        root: PathBuf,
        conflicts: Vec<String>,
    },

    /// The package manager failed; the workspace has been rolled back
    #[error("installation failed{}", .command.as_deref().map(|c| format!(": `{}` has failed", c)).unwrap_or_default())]
    InstallFailure {
        /// Command line that failed, when known
        command: Option<String>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The generator entry point failed after a successful install
    #[error("the {engine} generator failed: {reason}")]
    HandoffFailure { engine: String, reason: String },

    /// Filesystem failure outside the install step
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::MissingProjectName
            | BootstrapError::InvalidName { .. }
            | BootstrapError::ReservedName { .. }
            | BootstrapError::UnsafeWorkspace { .. }
            | BootstrapError::InstallFailure { .. }
            | BootstrapError::HandoffFailure { .. }
            | BootstrapError::Io { .. } => 1,
        }
    }

    /// True when the cause is not one we anticipated and should be reported
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            BootstrapError::InstallFailure { command: None, .. } | BootstrapError::Io { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_exits_with_one() {
        let errors = [
            BootstrapError::MissingProjectName,
            BootstrapError::InvalidName {
                name: "A".into(),
                problems: vec![],
            },
            BootstrapError::InstallFailure {
                command: Some("npm install".into()),
                source: None,
            },
            BootstrapError::HandoffFailure {
                engine: "scripts".into(),
                reason: "exit code 1".into(),
            },
        ];
        for error in &errors {
            assert_eq!(error.exit_code(), 1);
        }
    }

    #[test]
    fn test_install_failure_message_names_command() {
        let error = BootstrapError::InstallFailure {
            command: Some("npm install pkg".into()),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "installation failed: `npm install pkg` has failed"
        );
        assert!(!error.is_unexpected());

        let error = BootstrapError::InstallFailure {
            command: None,
            source: None,
        };
        assert!(error.is_unexpected());
    }
}

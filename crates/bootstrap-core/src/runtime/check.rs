//! Version detection for Node.js and the package managers

use semver::Version;
use std::process::Command;

/// Minimum Node.js version for a fully supported bootstrap
pub const MIN_NODE_VERSION: &str = "8.0.0";

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

impl RuntimeInfo {
    /// Parsed version, with any leading `v` removed
    pub fn semver(&self) -> Option<Version> {
        self.version.as_deref().and_then(|v| parse_version(v).ok())
    }
}

/// Run `<program> --version` and capture its trimmed output
fn probe(name: &'static str, program: &str) -> RuntimeInfo {
    let output = Command::new(program).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    probe("Node", "node")
}

/// Check if npm is available
pub fn check_npm() -> RuntimeInfo {
    probe("npm", "npm")
}

/// Check if Yarn is available (through its `yarnpkg` alias, which avoids the
/// Hadoop `yarn` binary on some systems)
pub fn check_yarn() -> RuntimeInfo {
    probe("Yarn", "yarnpkg")
}

/// Parse version string, handling various formats
pub fn parse_version(version_str: &str) -> Result<Version, semver::Error> {
    // Remove leading 'v' if present
    let trimmed = version_str.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(cleaned)
}

/// Warning text when Node is older than the supported minimum
pub fn node_version_warning(node: &RuntimeInfo) -> Option<String> {
    let version = node.semver()?;
    let minimum = Version::parse(MIN_NODE_VERSION).ok()?;
    (version < minimum).then(|| {
        format!(
            "You are using Node {} so the project will be bootstrapped with an old unsupported version of tools.\n\n\
             Please update to Node {} or higher for a better, fully supported experience.",
            version, minimum.major
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(version: Option<&str>) -> RuntimeInfo {
        RuntimeInfo {
            name: "Node",
            version: version.map(str::to_string),
            available: version.is_some(),
        }
    }

    #[test]
    fn test_parse_version_strips_prefix() {
        assert_eq!(parse_version("v18.17.0").unwrap(), Version::new(18, 17, 0));
        assert_eq!(parse_version(" 6.14.4\n").unwrap(), Version::new(6, 14, 4));
        assert!(parse_version("not a version").is_err());
    }

    #[test]
    fn test_old_node_warns() {
        let warning = node_version_warning(&node(Some("v6.17.1"))).unwrap();
        assert!(warning.contains("6.17.1"));
        assert!(warning.contains("Node 8"));
    }

    #[test]
    fn test_current_node_is_quiet() {
        assert!(node_version_warning(&node(Some("v20.11.0"))).is_none());
        assert!(node_version_warning(&node(None)).is_none());
    }
}

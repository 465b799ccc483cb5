//! Package manager selection and command lines

use super::check::{parse_version, RuntimeInfo};
use crate::specifier::ResolvedReference;
use semver::Version;
use std::fmt;
use std::path::Path;

/// Minimum npm version for a fully supported bootstrap
pub const MIN_NPM_VERSION: &str = "6.0.0";

/// First Yarn release with plug-and-play support
pub const MIN_YARN_PNP_VERSION: &str = "1.12.0";

/// Yarn releases from here on ignore `--enable-pnp` and pick their own default
pub const MAX_YARN_PNP_VERSION: &str = "2.0.0";

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Npm,
    Yarn,
}

impl PackageManager {
    /// Binary invoked for installs
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarnpkg",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "Yarn",
        }
    }

    /// Lockfile this manager writes into the project root
    pub const fn lockfile(&self) -> &'static str {
        match self {
            PackageManager::Npm => "package-lock.json",
            PackageManager::Yarn => "yarn.lock",
        }
    }

    /// Arguments for installing `dependencies` into `root`
    pub fn install_args(
        &self,
        root: &Path,
        dependencies: &[ResolvedReference],
        use_pnp: bool,
        online: bool,
        verbose: bool,
    ) -> Vec<String> {
        let mut args: Vec<String> = match self {
            PackageManager::Yarn => {
                let mut args = vec!["add".to_string(), "--exact".to_string()];
                if !online {
                    args.push("--offline".to_string());
                }
                if use_pnp {
                    args.push("--enable-pnp".to_string());
                }
                args.extend(dependencies.iter().map(|d| d.install_string().to_string()));
                args.push("--cwd".to_string());
                args.push(root.display().to_string());
                args
            }
            PackageManager::Npm => {
                let mut args: Vec<String> = [
                    "install",
                    "--no-audit",
                    "--save",
                    "--save-exact",
                    "--loglevel",
                    "error",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect();
                args.extend(dependencies.iter().map(|d| d.install_string().to_string()));
                args
            }
        };

        if verbose {
            args.push("--verbose".to_string());
        }

        args
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What the installed manager can do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerVersionInfo {
    pub version: Option<String>,
    /// Meets the minimum supported version (unknown versions pass)
    pub meets_minimum: bool,
    /// Can honour a plug-and-play request
    pub supports_requested_feature: bool,
}

impl ManagerVersionInfo {
    /// Evaluate a detected manager against the version gates
    pub fn evaluate(manager: PackageManager, runtime: &RuntimeInfo) -> Self {
        let version = runtime.version.clone();
        let parsed = version.as_deref().and_then(|v| parse_version(v).ok());

        let at_least = |min: &str| match (&parsed, Version::parse(min)) {
            (Some(v), Ok(min)) => *v >= min,
            _ => false,
        };

        match manager {
            PackageManager::Npm => Self {
                meets_minimum: parsed.is_none() || at_least(MIN_NPM_VERSION),
                supports_requested_feature: false,
                version,
            },
            PackageManager::Yarn => {
                let below_max = match (&parsed, Version::parse(MAX_YARN_PNP_VERSION)) {
                    (Some(v), Ok(max)) => *v < max,
                    _ => false,
                };
                Self {
                    meets_minimum: true,
                    supports_requested_feature: at_least(MIN_YARN_PNP_VERSION) && below_max,
                    version,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn runtime(version: Option<&str>) -> RuntimeInfo {
        RuntimeInfo {
            name: "tool",
            version: version.map(str::to_string),
            available: version.is_some(),
        }
    }

    fn deps() -> Vec<ResolvedReference> {
        vec![
            ResolvedReference::new("test-scripts@1.2.0", "test-scripts"),
            ResolvedReference::new("test-template", "test-template"),
        ]
    }

    #[test]
    fn test_npm_args() {
        let args =
            PackageManager::Npm.install_args(&PathBuf::from("/p"), &deps(), true, false, false);
        assert_eq!(
            args,
            vec![
                "install",
                "--no-audit",
                "--save",
                "--save-exact",
                "--loglevel",
                "error",
                "test-scripts@1.2.0",
                "test-template"
            ]
        );
    }

    #[test]
    fn test_yarn_args_offline_pnp_verbose() {
        let args =
            PackageManager::Yarn.install_args(&PathBuf::from("/p"), &deps(), true, false, true);
        assert_eq!(
            args,
            vec![
                "add",
                "--exact",
                "--offline",
                "--enable-pnp",
                "test-scripts@1.2.0",
                "test-template",
                "--cwd",
                "/p",
                "--verbose"
            ]
        );
    }

    #[test]
    fn test_npm_minimum() {
        let meets = |v| ManagerVersionInfo::evaluate(PackageManager::Npm, &runtime(v)).meets_minimum;
        assert!(!meets(Some("5.6.0")));
        assert!(meets(Some("6.14.4")));
        assert!(meets(None));
    }

    #[test]
    fn test_yarn_pnp_window() {
        let supports = |v| {
            ManagerVersionInfo::evaluate(PackageManager::Yarn, &runtime(Some(v)))
                .supports_requested_feature
        };
        assert!(!supports("1.11.0"));
        assert!(supports("1.12.0"));
        assert!(supports("1.22.19"));
        assert!(!supports("2.4.3"));
        assert!(!supports("3.6.0"));
    }
}

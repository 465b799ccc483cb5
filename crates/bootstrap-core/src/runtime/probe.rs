//! Environment probing: network reachability and package manager choice

use super::check::{self, RuntimeInfo};
use super::manager::{ManagerVersionInfo, PackageManager};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Host whose resolution decides whether Yarn can reach its registry
const YARN_REGISTRY_HOST: &str = "registry.yarnpkg.com";

/// A DNS probe that takes longer than this is treated as inconclusive
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the create flow needs to know about the machine it runs on
#[async_trait]
pub trait EnvironmentProbe: Send + Sync {
    /// Best-effort reachability check. Inconclusive probes report online so the
    /// package manager surfaces any real failure itself.
    async fn is_online(&self, using_yarn: bool) -> bool;

    /// Pick a package manager, honouring an explicit npm override
    fn detect_package_manager(&self, force_npm: bool) -> PackageManager;

    /// Version gates for the chosen manager
    fn manager_version_info(&self, manager: PackageManager) -> ManagerVersionInfo;

    /// Installed Node.js runtime
    fn node(&self) -> RuntimeInfo;

    /// Whether npm started in `dir` reports `dir` as its working directory.
    /// The bootstrapper never changes its own directory, so callers pass the
    /// directory it was started from.
    async fn npm_can_read_cwd(&self, dir: &Path) -> bool;
}

/// Probe backed by the real system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl SystemProbe {
    /// `Some(true)` resolved, `Some(false)` failed, `None` inconclusive
    async fn resolves(host_and_port: String) -> Option<bool> {
        match timeout(LOOKUP_TIMEOUT, tokio::net::lookup_host(host_and_port)).await {
            Ok(Ok(mut addrs)) => Some(addrs.next().is_some()),
            Ok(Err(_)) => Some(false),
            Err(_) => None,
        }
    }

    async fn https_proxy() -> Option<Url> {
        let output = tokio::process::Command::new("npm")
            .args(["config", "get", "https-proxy"])
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let value = String::from_utf8(output.stdout).ok()?.trim().to_string();
        if value.is_empty() || value == "null" || value == "undefined" {
            return None;
        }
        Url::parse(&value).ok()
    }
}

#[async_trait]
impl EnvironmentProbe for SystemProbe {
    async fn is_online(&self, using_yarn: bool) -> bool {
        // npm reports network problems itself, only Yarn needs the hint for --offline
        if !using_yarn {
            return true;
        }

        match Self::resolves(format!("{}:443", YARN_REGISTRY_HOST)).await {
            Some(true) | None => return true,
            Some(false) => {}
        }

        let Some(proxy) = Self::https_proxy().await else {
            tracing::debug!("registry lookup failed and no https-proxy is configured");
            return false;
        };
        let Some(host) = proxy.host_str() else {
            return false;
        };
        let port = proxy.port_or_known_default().unwrap_or(443);
        Self::resolves(format!("{}:{}", host, port))
            .await
            .unwrap_or(true)
    }

    fn detect_package_manager(&self, force_npm: bool) -> PackageManager {
        if force_npm {
            return PackageManager::Npm;
        }
        if check::check_yarn().available {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    fn manager_version_info(&self, manager: PackageManager) -> ManagerVersionInfo {
        let runtime = match manager {
            PackageManager::Npm => check::check_npm(),
            PackageManager::Yarn => check::check_yarn(),
        };
        ManagerVersionInfo::evaluate(manager, &runtime)
    }

    fn node(&self) -> RuntimeInfo {
        check::check_node()
    }

    async fn npm_can_read_cwd(&self, dir: &Path) -> bool {
        let output = tokio::process::Command::new("npm")
            .args(["config", "list"])
            .current_dir(dir)
            .output()
            .await;
        let Ok(output) = output else {
            return true;
        };
        let listing = String::from_utf8_lossy(&output.stdout);
        npm_cwd_matches(&listing, dir)
    }
}

/// npm prints `; cwd = <dir>` in `npm config list`; a mismatch means npm
/// would install somewhere else.
fn npm_cwd_matches(listing: &str, dir: &Path) -> bool {
    const PREFIX: &str = "; cwd = ";
    match listing.lines().find_map(|line| line.strip_prefix(PREFIX)) {
        Some(npm_cwd) => Path::new(npm_cwd.trim()) == dir,
        None => true,
    }
}

//! Package registry lookups
//!
//! The registry is an opaque service: we only ever ask it for a version
//! string or a name/version pair. Every lookup degrades to "unknown"
//! instead of failing the run.

use crate::product::ProductConfig;
use crate::specifier::ResolvedReference;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Timeout for a single registry request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Name and published version of a package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageMetadata {
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
        }
    }
}

/// Registry boundary consumed by the create flow
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Latest published version of `name`, or `None` if it cannot be determined
    async fn latest_version(&self, name: &str) -> Option<String>;

    /// Metadata for a resolved reference
    async fn package_metadata(&self, reference: &ResolvedReference) -> PackageMetadata;
}

#[derive(Debug, Deserialize)]
struct DistTags {
    latest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionDocument {
    version: Option<String>,
}

/// HTTP client for an npm-compatible registry
pub struct NpmRegistry {
    base: Url,
    client: reqwest::Client,
}

impl NpmRegistry {
    /// Create a new registry client with a custom user agent
    pub fn new(base: Url, user_agent: &str) -> Self {
        Self {
            base,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a registry client from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self, url::ParseError> {
        let base = Url::parse(&config.registry_url())?;
        Ok(Self::new(base, config.user_agent()))
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(&self, segments: &[&str]) -> Option<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
        Some(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Option<T> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%url, error = %e, "registry request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(%url, status = %response.status(), "registry returned an error");
            return None;
        }

        response.json::<T>().await.ok()
    }

    /// Ask the registry which version a dist-tag points at
    async fn tagged_version(&self, name: &str, tag: &str) -> Option<String> {
        let url = self.build_url(&[name, tag])?;
        self.get_json::<VersionDocument>(url).await?.version
    }

    /// Fall back to the npm CLI, which honours private registries and proxies
    async fn npm_view_version(name: &str) -> Option<String> {
        let output = tokio::process::Command::new("npm")
            .args(["view", name, "version"])
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let version = String::from_utf8(output.stdout).ok()?.trim().to_string();
        (!version.is_empty()).then_some(version)
    }
}

#[async_trait]
impl PackageRegistry for NpmRegistry {
    async fn latest_version(&self, name: &str) -> Option<String> {
        let from_api = match self.build_url(&["-", "package", name, "dist-tags"]) {
            Some(url) => self
                .get_json::<DistTags>(url)
                .await
                .and_then(|tags| tags.latest),
            None => None,
        };

        match from_api {
            Some(version) => Some(version),
            None => Self::npm_view_version(name).await,
        }
    }

    async fn package_metadata(&self, reference: &ResolvedReference) -> PackageMetadata {
        match metadata_from_reference(reference) {
            LocalMetadata::Known(metadata) => metadata,
            LocalMetadata::ReadManifest(dir) => read_manifest_metadata(&dir)
                .await
                .unwrap_or_else(|| PackageMetadata::new(reference.display_name(), None)),
            LocalMetadata::AskRegistry { name, tag } => {
                let version = self.tagged_version(&name, &tag).await;
                PackageMetadata {
                    name,
                    version,
                }
            }
        }
    }
}

/// How much of a reference's metadata can be known without the network
#[derive(Debug, PartialEq, Eq)]
enum LocalMetadata {
    Known(PackageMetadata),
    ReadManifest(std::path::PathBuf),
    AskRegistry { name: String, tag: String },
}

fn metadata_from_reference(reference: &ResolvedReference) -> LocalMetadata {
    let install = reference.install_string();

    if let Some(dir) = install.strip_prefix("file:") {
        return LocalMetadata::ReadManifest(dir.into());
    }

    if install.contains("://") || install.ends_with(".tgz") || install.ends_with(".tar.gz") {
        return LocalMetadata::Known(PackageMetadata::new(reference.display_name(), None));
    }

    // Split on the version `@`, never on the scope `@`
    let (name, spec) = match install.get(1..).and_then(|tail| tail.find('@')) {
        Some(at) => (&install[..at + 1], Some(&install[at + 2..])),
        None => (install, None),
    };

    match spec {
        Some(spec) if semver::Version::parse(spec).is_ok() => {
            LocalMetadata::Known(PackageMetadata::new(name, Some(spec)))
        }
        Some(tag) => LocalMetadata::AskRegistry {
            name: name.to_string(),
            tag: tag.to_string(),
        },
        None => LocalMetadata::AskRegistry {
            name: name.to_string(),
            tag: "latest".to_string(),
        },
    }
}

#[derive(Debug, Deserialize)]
struct ManifestStub {
    name: Option<String>,
    version: Option<String>,
}

async fn read_manifest_metadata(dir: &Path) -> Option<PackageMetadata> {
    let content = tokio::fs::read_to_string(dir.join("package.json")).await.ok()?;
    let stub: ManifestStub = serde_json::from_str(&content).ok()?;
    Some(PackageMetadata {
        name: stub.name?,
        version: stub.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_reference_is_known_locally() {
        let reference = ResolvedReference::new("test-scripts@1.2.3", "test-scripts");
        assert_eq!(
            metadata_from_reference(&reference),
            LocalMetadata::Known(PackageMetadata::new("test-scripts", Some("1.2.3")))
        );
    }

    #[test]
    fn test_scoped_tag_asks_registry() {
        let reference = ResolvedReference::new("@org/test-template@next", "@org/test-template");
        assert_eq!(
            metadata_from_reference(&reference),
            LocalMetadata::AskRegistry {
                name: "@org/test-template".to_string(),
                tag: "next".to_string()
            }
        );
    }

    #[test]
    fn test_bare_name_asks_for_latest() {
        let reference = ResolvedReference::new("test-scripts", "test-scripts");
        assert_eq!(
            metadata_from_reference(&reference),
            LocalMetadata::AskRegistry {
                name: "test-scripts".to_string(),
                tag: "latest".to_string()
            }
        );
    }

    #[test]
    fn test_url_uses_display_name() {
        let reference = ResolvedReference::new(
            "https://example.com/test-scripts-2.0.0.tgz",
            "test-scripts-2.0.0",
        );
        assert_eq!(
            metadata_from_reference(&reference),
            LocalMetadata::Known(PackageMetadata::new("test-scripts-2.0.0", None))
        );
    }

    #[tokio::test]
    async fn test_file_reference_reads_package_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "local-scripts", "version": "0.4.0", "main": "index.js" }"#,
        )
        .unwrap();

        let registry = NpmRegistry::new(Url::parse("http://127.0.0.1:9").unwrap(), "test");
        let reference =
            ResolvedReference::new(format!("file:{}", dir.path().display()), "whatever");
        let metadata = registry.package_metadata(&reference).await;
        assert_eq!(metadata, PackageMetadata::new("local-scripts", Some("0.4.0")));
    }

    #[tokio::test]
    async fn test_missing_local_manifest_falls_back_to_display_name() {
        let dir = tempfile::tempdir().unwrap();
        let registry = NpmRegistry::new(Url::parse("http://127.0.0.1:9").unwrap(), "test");
        let reference = ResolvedReference::new(format!("file:{}", dir.path().display()), "tpl");
        let metadata = registry.package_metadata(&reference).await;
        assert_eq!(metadata, PackageMetadata::new("tpl", None));
    }

    #[test]
    fn test_build_url() {
        let registry = NpmRegistry::new(Url::parse("https://registry.example.com/").unwrap(), "t");
        let url = registry.build_url(&["-", "package", "@org/pkg", "dist-tags"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://registry.example.com/-/package/@org%2Fpkg/dist-tags"
        );
    }
}

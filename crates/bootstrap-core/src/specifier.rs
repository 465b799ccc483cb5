//! Package specifier resolution
//!
//! Turns the loosely-specified strings users pass on the command line
//! (`1.2.3`, `@canary`, `file:../my-scripts`, a tarball URL, `@org`,
//! `typescript`) into the exact string handed to the package manager.
//! Nothing here touches the filesystem or the network.

use crate::paths::normalize;
use crate::product::ProductConfig;
use semver::Version;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which role a package plays in the new project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The tooling package that owns the generator entry point
    Engine,
    /// The optional starter-content package
    Template,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Engine => write!(f, "engine"),
            Role::Template => write!(f, "template"),
        }
    }
}

/// Raw user input for one role, captured once from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpecifier {
    raw: Option<String>,
    role: Role,
}

impl PackageSpecifier {
    pub fn new(raw: Option<&str>, role: Role) -> Self {
        Self {
            raw: raw.filter(|s| !s.is_empty()).map(str::to_string),
            role,
        }
    }

    pub fn engine(raw: Option<&str>) -> Self {
        Self::new(raw, Role::Engine)
    }

    pub fn template(raw: Option<&str>) -> Self {
        Self::new(raw, Role::Template)
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Classify the raw input. `original_dir` anchors relative `file:` paths.
    pub fn parse(&self, original_dir: &Path) -> Specifier {
        let Some(raw) = self.raw.as_deref() else {
            return Specifier::Default;
        };

        if self.role == Role::Engine {
            if let Some(version) = valid_semver(raw) {
                return Specifier::Pinned(version);
            }
            if raw.starts_with('@') && !raw.contains('/') {
                return Specifier::Tagged(raw[1..].to_string());
            }
        }

        if let Some(path) = raw.strip_prefix("file:") {
            return Specifier::FilePath(normalize(&original_dir.join(path)));
        }

        if raw.contains("://") || is_tarball(raw) {
            return Specifier::Url(raw.to_string());
        }

        match self.role {
            Role::Engine => Specifier::Verbatim(raw.to_string()),
            Role::Template => {
                let (scope, name, version) = split_package_pattern(raw);
                Specifier::Scoped {
                    scope,
                    name,
                    version,
                }
            }
        }
    }
}

/// Classified specifier, one variant per resolution rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// Nothing given: install the role's default package
    Default,
    /// Exact semantic version of the default package
    Pinned(Version),
    /// Dist-tag of the default package, without the leading `@`
    Tagged(String),
    /// Absolute local directory
    FilePath(PathBuf),
    /// Remote URL or tarball, installed as given
    Url(String),
    /// Template shorthand split as `(@scope/)?(name)?(@version)?`
    Scoped {
        scope: Option<String>,
        name: Option<String>,
        version: Option<String>,
    },
    /// Engine package named explicitly, installed as given
    Verbatim(String),
}

impl Specifier {
    /// Turn the classification into the reference handed to the package manager.
    /// `default_name` is the role's default package (also the template prefix).
    pub fn to_reference(&self, default_name: &str) -> ResolvedReference {
        match self {
            Specifier::Default => ResolvedReference::new(default_name, default_name),
            Specifier::Pinned(version) => {
                ResolvedReference::new(format!("{}@{}", default_name, version), default_name)
            }
            Specifier::Tagged(tag) => {
                ResolvedReference::new(format!("{}@{}", default_name, tag), default_name)
            }
            Specifier::FilePath(path) => {
                let display = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                ResolvedReference::new(format!("file:{}", path.display()), display)
            }
            Specifier::Url(url) => ResolvedReference::new(url.clone(), url_stem(url)),
            Specifier::Verbatim(raw) => ResolvedReference::new(raw.clone(), strip_version(raw)),
            Specifier::Scoped {
                scope,
                name,
                version,
            } => {
                let scope = scope.as_deref().unwrap_or("");
                let name = name.as_deref().unwrap_or("");
                let version = version.as_deref().unwrap_or("");

                let install = if name == default_name
                    || name.starts_with(&format!("{}-", default_name))
                {
                    format!("{}{}{}", scope, name, version)
                } else if !version.is_empty() && scope.is_empty() && name.is_empty() {
                    // `@org` alone means the canonical template published under that scope
                    format!("{}/{}", version, default_name)
                } else {
                    format!("{}{}-{}{}", scope, default_name, name, version)
                };

                let display = strip_version(&install);
                ResolvedReference::new(install, display)
            }
        }
    }
}

/// What the package manager should fetch, plus a name for messages
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedReference {
    install_string: String,
    display_name: String,
}

impl ResolvedReference {
    pub fn new(install_string: impl Into<String>, display_name: impl Into<String>) -> Self {
        let install_string = install_string.into();
        let mut display_name = display_name.into();
        if display_name.is_empty() {
            display_name = install_string.clone();
        }
        Self {
            install_string,
            display_name,
        }
    }

    pub fn install_string(&self) -> &str {
        &self.install_string
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Version range written next to the display name in the bootstrap manifest
    pub fn manifest_range(&self) -> &str {
        match self.install_string.strip_prefix(&self.display_name) {
            Some("") => "latest",
            Some(rest) if rest.starts_with('@') => &rest[1..],
            _ => &self.install_string,
        }
    }
}

impl fmt::Display for ResolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.install_string)
    }
}

/// Resolve a specifier against the product's default packages
pub fn resolve<C: ProductConfig>(
    config: &C,
    specifier: &PackageSpecifier,
    original_dir: &Path,
) -> ResolvedReference {
    let default_name = match specifier.role() {
        Role::Engine => config.engine_package(),
        Role::Template => config.template_package(),
    };
    let reference = specifier.parse(original_dir).to_reference(default_name);
    tracing::debug!(
        role = %specifier.role(),
        raw = ?specifier.raw(),
        install = %reference.install_string(),
        "resolved package specifier"
    );
    reference
}

/// Accepts what a lenient semver parser would: an optional `v` or `=` prefix
fn valid_semver(raw: &str) -> Option<Version> {
    let cleaned = raw
        .trim()
        .strip_prefix('v')
        .or_else(|| raw.trim().strip_prefix('='))
        .unwrap_or(raw.trim());
    Version::parse(cleaned).ok()
}

fn is_tarball(raw: &str) -> bool {
    raw.len() > ".tgz".len() && raw.ends_with(".tgz")
        || raw.len() > ".tar.gz".len() && raw.ends_with(".tar.gz")
}

/// Split `(@scope/)?(name)?(@version)?`. The scope keeps its trailing slash and
/// the version keeps its leading `@`, so the parts concatenate back verbatim.
fn split_package_pattern(raw: &str) -> (Option<String>, Option<String>, Option<String>) {
    let mut rest = raw;
    let mut scope = None;

    if rest.starts_with('@') {
        if let Some(slash) = rest.find('/') {
            if !rest[1..slash].contains('@') && slash > 1 {
                scope = Some(rest[..=slash].to_string());
                rest = &rest[slash + 1..];
            }
        }
    }

    let (name, version) = match rest.find('@') {
        Some(0) => (None, Some(rest.to_string())),
        Some(at) => (Some(rest[..at].to_string()), Some(rest[at..].to_string())),
        None if rest.is_empty() => (None, None),
        None => (Some(rest.to_string()), None),
    };

    (scope, name, version.filter(|v| v.len() > 1))
}

/// `@scope/name@1.0` -> `@scope/name`, `name@tag` -> `name`
fn strip_version(raw: &str) -> String {
    match raw.get(1..).and_then(|tail| tail.find('@')) {
        Some(at) => raw[..at + 1].to_string(),
        None => raw.to_string(),
    }
}

/// Best-effort package name from a URL or tarball path
fn url_stem(raw: &str) -> String {
    let path = raw.split(['#', '?']).next().unwrap_or(raw);
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
    let stem = last
        .strip_suffix(".tar.gz")
        .or_else(|| last.strip_suffix(".tgz"))
        .or_else(|| last.strip_suffix(".git"))
        .unwrap_or(last);
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::testing::TestProduct;

    fn engine(raw: Option<&str>) -> String {
        resolve(
            &TestProduct,
            &PackageSpecifier::engine(raw),
            Path::new("/work"),
        )
        .install_string()
        .to_string()
    }

    fn template(raw: Option<&str>) -> String {
        resolve(
            &TestProduct,
            &PackageSpecifier::template(raw),
            Path::new("/work"),
        )
        .install_string()
        .to_string()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(engine(None), "test-scripts");
        assert_eq!(template(None), "test-template");
        assert_eq!(engine(Some("")), "test-scripts");
    }

    #[test]
    fn test_pinned_versions() {
        for version in ["0.0.1", "1.2.3", "10.20.30-beta.1", "2.0.0+build.5"] {
            let resolved = engine(Some(version));
            assert_eq!(resolved, format!("test-scripts@{}", version));
            assert_eq!(resolved, engine(Some(version)));
        }
        assert_eq!(engine(Some("v3.4.1")), "test-scripts@3.4.1");
    }

    #[test]
    fn test_dist_tags() {
        assert_eq!(engine(Some("@latest")), "test-scripts@latest");
        assert_eq!(engine(Some("@canary")), "test-scripts@canary");
    }

    #[test]
    fn test_file_paths_are_absolute() {
        assert_eq!(engine(Some("file:../scripts")), "file:/scripts");
        assert_eq!(engine(Some("file:./local/engine")), "file:/work/local/engine");
        assert_eq!(engine(Some("file:/abs/engine")), "file:/abs/engine");
        assert_eq!(template(Some("file:tpl")), "file:/work/tpl");
    }

    #[test]
    fn test_urls_and_tarballs_pass_through() {
        let url = "https://example.com/pkgs/test-scripts-1.0.0.tgz";
        assert_eq!(engine(Some(url)), url);
        assert_eq!(template(Some(url)), url);
        assert_eq!(template(Some("./my-template.tar.gz")), "./my-template.tar.gz");

        let reference = resolve(
            &TestProduct,
            &PackageSpecifier::engine(Some(url)),
            Path::new("/work"),
        );
        assert_eq!(reference.display_name(), "test-scripts-1.0.0");
    }

    #[test]
    fn test_engine_named_package_is_verbatim() {
        assert_eq!(engine(Some("my-scripts")), "my-scripts");
        let reference = resolve(
            &TestProduct,
            &PackageSpecifier::engine(Some("@org/my-scripts@2.0.0")),
            Path::new("/work"),
        );
        assert_eq!(reference.install_string(), "@org/my-scripts@2.0.0");
        assert_eq!(reference.display_name(), "@org/my-scripts");
    }

    #[test]
    fn test_template_short_names() {
        assert_eq!(template(Some("typescript")), "test-template-typescript");
        assert_eq!(template(Some("test-template")), "test-template");
        assert_eq!(
            template(Some("test-template-typescript@1.0.0")),
            "test-template-typescript@1.0.0"
        );
        assert_eq!(template(Some("typescript@next")), "test-template-typescript@next");
    }

    #[test]
    fn test_template_scopes() {
        assert_eq!(template(Some("@myorg")), "@myorg/test-template");
        assert_eq!(template(Some("@myorg/fancy")), "@myorg/test-template-fancy");
        assert_eq!(
            template(Some("@myorg/test-template-fancy@2.1.0")),
            "@myorg/test-template-fancy@2.1.0"
        );
        // a template never reads `@tag` as a dist-tag
        assert_eq!(template(Some("@latest")), "@latest/test-template");
    }

    #[test]
    fn test_split_package_pattern() {
        assert_eq!(
            split_package_pattern("@scope/name@1.0"),
            (
                Some("@scope/".to_string()),
                Some("name".to_string()),
                Some("@1.0".to_string())
            )
        );
        assert_eq!(
            split_package_pattern("@scope"),
            (None, None, Some("@scope".to_string()))
        );
        assert_eq!(split_package_pattern("name"), (None, Some("name".to_string()), None));
    }

    #[test]
    fn test_manifest_range() {
        assert_eq!(ResolvedReference::new("pkg", "pkg").manifest_range(), "latest");
        assert_eq!(ResolvedReference::new("pkg@1.2.3", "pkg").manifest_range(), "1.2.3");
        assert_eq!(
            ResolvedReference::new("@o/pkg@next", "@o/pkg").manifest_range(),
            "next"
        );
        assert_eq!(
            ResolvedReference::new("file:/a/pkg", "pkg").manifest_range(),
            "file:/a/pkg"
        );
    }

    #[test]
    fn test_parse_variants() {
        let dir = Path::new("/work");
        assert_eq!(PackageSpecifier::engine(None).parse(dir), Specifier::Default);
        assert_eq!(
            PackageSpecifier::engine(Some("@next")).parse(dir),
            Specifier::Tagged("next".to_string())
        );
        assert!(matches!(
            PackageSpecifier::engine(Some("1.0.0")).parse(dir),
            Specifier::Pinned(_)
        ));
        assert!(matches!(
            PackageSpecifier::template(Some("1.0.0")).parse(dir),
            Specifier::Scoped { .. }
        ));
    }
}

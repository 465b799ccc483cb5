//! Engine/template compatibility negotiation

use crate::registry::PackageMetadata;
use crate::specifier::ResolvedReference;
use semver::Version;

/// Outcome of negotiating the template against the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    pub include_template: bool,
}

/// Decide whether the engine understands the template argument.
///
/// The engine's reported version is coerced to semver; when that fails the
/// threshold itself is assumed, so unknown versions are treated as compatible.
pub fn negotiate(
    engine: &PackageMetadata,
    template: &ResolvedReference,
    min_engine_version: &str,
) -> Negotiation {
    let Ok(threshold) = Version::parse(min_engine_version) else {
        tracing::warn!(min_engine_version, "unparseable template threshold, allowing template");
        return Negotiation {
            include_template: true,
        };
    };

    let version = engine
        .version
        .as_deref()
        .and_then(coerce)
        .unwrap_or_else(|| threshold.clone());

    let include_template = version >= threshold;
    tracing::debug!(
        engine = %engine.name,
        %version,
        %threshold,
        template = %template.install_string(),
        include_template,
        "negotiated template support"
    );

    Negotiation { include_template }
}

/// Pull the first `major(.minor(.patch))` run out of a version-ish string,
/// so `^2.1`, `v3`, `1.2.3-beta.1` and `~0.4.0` all yield something comparable.
/// Prerelease and build metadata are dropped.
pub fn coerce(raw: &str) -> Option<Version> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let mut parts = raw[start..]
        .split(|c: char| !c.is_ascii_digit() && c != '.')
        .next()?
        .split('.')
        .filter(|p| !p.is_empty())
        .take(3)
        .map(|p| p.parse::<u64>().ok());

    let major = parts.next().flatten()?;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

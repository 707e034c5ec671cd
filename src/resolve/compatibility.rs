//! Runtime compatibility filter
//!
//! Keeps the releases of a package that declare support for the target
//! runtime. A release qualifies when at least one of its files carries a
//! `requires_python` expression that allows the target.

use crate::domain::{Version, VersionConstraint};
use crate::events::{DowngradeEvent, EventSink};
use crate::registry::{Release, ReleaseSet};
use std::collections::HashMap;

/// A release that declares support for the target runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibleVersion {
    /// Version key exactly as the registry published it
    pub text: String,
    /// Parsed form used for ordering
    pub version: Version,
}

impl CompatibleVersion {
    pub fn new(text: impl Into<String>, version: Version) -> Self {
        Self {
            text: text.into(),
            version,
        }
    }
}

impl Ord for CompatibleVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for CompatibleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Parsed `requires_python` expressions, shared across the releases of one package
struct RequirementCache<'a> {
    parsed: HashMap<&'a str, Option<VersionConstraint>>,
}

impl<'a> RequirementCache<'a> {
    fn new() -> Self {
        Self {
            parsed: HashMap::new(),
        }
    }

    /// Returns whether `requirement` allows `target`; unparsable text never does
    fn allows(
        &mut self,
        package: &str,
        release: &'a Release,
        requirement: &'a str,
        target: &Version,
        sink: &dyn EventSink,
    ) -> bool {
        let constraint = self.parsed.entry(requirement).or_insert_with(|| {
            match VersionConstraint::parse(requirement) {
                Ok(constraint) => Some(constraint),
                Err(_) => {
                    sink.emit(DowngradeEvent::UnparsableRequirement {
                        package: package.to_string(),
                        version: release.version.clone(),
                        requirement: requirement.to_string(),
                    });
                    None
                }
            }
        });
        constraint.as_ref().is_some_and(|c| c.allows(target))
    }
}

/// Returns every release of `releases` whose declarations admit `target`.
///
/// Releases without any declaration are excluded. Release keys that are not
/// valid versions are skipped and reported.
pub fn filter_compatible(
    releases: &ReleaseSet,
    target: &Version,
    sink: &dyn EventSink,
) -> Vec<CompatibleVersion> {
    let package = releases.package();
    let mut cache = RequirementCache::new();
    let mut compatible = Vec::new();

    for release in releases.releases() {
        if release.declarations.is_empty() {
            continue;
        }

        let version = match Version::parse(&release.version) {
            Ok(version) => version,
            Err(_) => {
                sink.emit(DowngradeEvent::UnparsableRelease {
                    package: package.to_string(),
                    version: release.version.clone(),
                });
                continue;
            }
        };

        let allowed = release
            .declarations
            .iter()
            .any(|req| cache.allows(package, release, req, target, sink));

        if allowed {
            compatible.push(CompatibleVersion::new(release.version.clone(), version));
        }
    }

    compatible
}

//! Per-package resolution against a registry
//!
//! This module provides:
//! - Runtime compatibility filtering of published releases
//! - Highest-version selection under the original constraint's floor
//! - The single-package lookup that ties both to a registry fetch

mod compatibility;
mod selector;

pub use compatibility::{filter_compatible, CompatibleVersion};
pub use selector::select_highest;

use crate::domain::{Version, VersionConstraint};
use crate::events::{DowngradeEvent, EventSink};
use crate::registry::PackageRegistry;

/// Finds the highest release of `package` that supports `target` and does
/// not exceed the floor of `constraint`.
///
/// A failed fetch is reported to `sink` and treated as no compatible
/// version.
pub async fn find_compatible_version(
    registry: &dyn PackageRegistry,
    package: &str,
    constraint: &VersionConstraint,
    target: &Version,
    sink: &dyn EventSink,
) -> Option<String> {
    let releases = match registry.fetch_releases(package).await {
        Ok(releases) => releases,
        Err(e) => {
            sink.emit(DowngradeEvent::FetchFailed {
                package: package.to_string(),
                message: e.to_string(),
            });
            return None;
        }
    };

    let compatible = filter_compatible(&releases, target, sink);
    let ceiling = constraint.minimum();
    select_highest(&compatible, ceiling.as_ref()).map(|found| found.text.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::registry::InMemoryRegistry;

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::new()
            .with_package(
                "mock",
                [("1.0.0", ">=3.6"), ("1.1.0", ">=3.8"), ("2.0.0", ">=3.8")],
            )
            .with_failure("flaky")
    }

    async fn lookup(package: &str, constraint: &str, target: &str) -> (Option<String>, MemorySink) {
        let sink = MemorySink::new();
        let constraint = VersionConstraint::parse(constraint).unwrap();
        let target = Version::parse(target).unwrap();
        let found = find_compatible_version(&registry(), package, &constraint, &target, &sink).await;
        (found, sink)
    }

    #[tokio::test]
    async fn test_lookup_caps_at_floor() {
        let (found, _) = lookup("mock", ">=1.1.0", "3.8").await;
        assert_eq!(found.as_deref(), Some("1.1.0"));
    }

    #[tokio::test]
    async fn test_lookup_older_runtime() {
        let (found, _) = lookup("mock", ">=1.1.0", "3.7").await;
        assert_eq!(found.as_deref(), Some("1.0.0"));
    }

    #[tokio::test]
    async fn test_lookup_unbounded_constraint() {
        let (found, _) = lookup("mock", "*", "3.8").await;
        assert_eq!(found.as_deref(), Some("2.0.0"));
    }

    #[tokio::test]
    async fn test_lookup_nothing_compatible() {
        let (found, _) = lookup("mock", "^2.0", "3.5").await;
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_lookup_fetch_failure_is_absent() {
        let (found, sink) = lookup("flaky", "^1.0", "3.8").await;
        assert_eq!(found, None);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "fetch_failed");
    }

    #[tokio::test]
    async fn test_lookup_unknown_package_is_absent() {
        let (found, sink) = lookup("missing", "^1.0", "3.8").await;
        assert_eq!(found, None);
        assert_eq!(sink.events()[0].kind(), "fetch_failed");
    }
}

//! In-memory registry
//!
//! Serves canned release data without any network access. Used for offline
//! runs and tests.

use crate::error::RegistryError;
use crate::registry::{PackageRegistry, Release, ReleaseSet};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Registry backed by a fixed table of packages
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistry {
    packages: HashMap<String, Vec<Release>>,
    failing: HashSet<String>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package whose releases each carry one `requires_python` string
    pub fn with_package<'a>(
        mut self,
        package: &str,
        releases: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let releases = releases
            .into_iter()
            .map(|(version, requires)| {
                let declarations = if requires.is_empty() {
                    Vec::new()
                } else {
                    vec![requires.to_string()]
                };
                Release::new(version, declarations)
            })
            .collect();
        self.packages.insert(package.to_string(), releases);
        self
    }

    /// Adds a package with fully specified releases
    pub fn with_releases(mut self, package: &str, releases: Vec<Release>) -> Self {
        self.packages.insert(package.to_string(), releases);
        self
    }

    /// Makes every fetch of `package` fail with a network error
    pub fn with_failure(mut self, package: &str) -> Self {
        self.failing.insert(package.to_string());
        self
    }
}

#[async_trait]
impl PackageRegistry for InMemoryRegistry {
    fn registry_name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_releases(&self, package: &str) -> Result<ReleaseSet, RegistryError> {
        if self.failing.contains(package) {
            return Err(RegistryError::network_error(
                package,
                self.registry_name(),
                "connection refused",
            ));
        }

        self.packages
            .get(package)
            .map(|releases| ReleaseSet::new(package, releases.clone()))
            .ok_or_else(|| RegistryError::package_not_found(package, self.registry_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_known_package() {
        let registry = InMemoryRegistry::new().with_package("foo", [("1.0.0", ">=3.6"), ("2.0.0", "")]);
        let set = registry.fetch_releases("foo").await.unwrap();
        assert_eq!(set.package(), "foo");
        assert_eq!(set.len(), 2);
        assert!(set.releases()[1].declarations.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_unknown_package() {
        let registry = InMemoryRegistry::new();
        let err = registry.fetch_releases("missing").await.unwrap_err();
        assert!(matches!(err, RegistryError::PackageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_fetch_failing_package() {
        let registry = InMemoryRegistry::new()
            .with_package("foo", [("1.0.0", ">=3.6")])
            .with_failure("foo");
        let err = registry.fetch_releases("foo").await.unwrap_err();
        assert!(matches!(err, RegistryError::NetworkError { .. }));
    }
}

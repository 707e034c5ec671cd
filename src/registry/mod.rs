//! Registry adapters for fetching package release information
//!
//! This module provides:
//! - HTTP client shared foundation
//! - PyPI JSON API adapter
//! - In-memory registry for offline use and tests

mod client;
mod memory;
mod pypi;

pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use memory::InMemoryRegistry;
pub use pypi::{PyPiRegistry, PYPI_API_URL};

use crate::error::RegistryError;
use async_trait::async_trait;

/// One published version of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Version key as published
    pub version: String,
    /// Runtime compatibility expressions, one per release file that declared one
    pub declarations: Vec<String>,
}

impl Release {
    pub fn new(version: impl Into<String>, declarations: Vec<String>) -> Self {
        Self {
            version: version.into(),
            declarations,
        }
    }
}

/// Every release of one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSet {
    package: String,
    releases: Vec<Release>,
}

impl ReleaseSet {
    pub fn new(package: impl Into<String>, releases: Vec<Release>) -> Self {
        Self {
            package: package.into(),
            releases,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Trait for package registries
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch every release of a package with its compatibility declarations
    async fn fetch_releases(&self, package: &str) -> Result<ReleaseSet, RegistryError>;
}

//! PyPI JSON API adapter
//!
//! Fetches every release of a package together with the `requires_python`
//! metadata of its files.
//! API endpoint: https://pypi.org/pypi/{package}/json

use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageRegistry, Release, ReleaseSet};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

/// PyPI API base URL
pub const PYPI_API_URL: &str = "https://pypi.org/pypi";

/// PyPI (or PyPI-compatible mirror) adapter
pub struct PyPiRegistry {
    client: HttpClient,
    base_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPiResponse {
    /// Release files keyed by version
    releases: BTreeMap<String, Vec<ReleaseFile>>,
}

/// Release file information
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    /// Python versions this file supports
    #[serde(default)]
    requires_python: Option<String>,
}

impl PyPiRegistry {
    /// Create an adapter for the public PyPI
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, PYPI_API_URL)
    }

    /// Create an adapter for a custom repository
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.base_url, package)
    }
}

impl PyPiResponse {
    fn into_releases(self) -> Vec<Release> {
        self.releases
            .into_iter()
            .map(|(version, files)| {
                let declarations = files
                    .into_iter()
                    .filter_map(|f| f.requires_python)
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect();
                Release::new(version, declarations)
            })
            .collect()
    }
}

#[async_trait]
impl PackageRegistry for PyPiRegistry {
    fn registry_name(&self) -> &'static str {
        "PyPI"
    }

    async fn fetch_releases(&self, package: &str) -> Result<ReleaseSet, RegistryError> {
        let url = self.build_url(package);
        let response: PyPiResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        Ok(ReleaseSet::new(package, response.into_releases()))
    }
}

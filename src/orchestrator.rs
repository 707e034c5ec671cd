//! Downgrade orchestrator coordinating the entire workflow
//!
//! This module provides:
//! - Workflow coordination: gate → resolve → mutate
//! - Parallel registry lookups with a concurrency cap
//! - Deterministic, manifest-ordered results regardless of completion order
//! - Target runtime normalization

use crate::domain::{
    Dependency, DependencyChange, DependencyGroup, Resolution, ResolutionResult, Version,
    VersionConstraint,
};
use crate::error::{AppError, ConfigError, ManifestError};
use crate::events::{DowngradeEvent, EventSink};
use crate::manifest::{ConstraintStyle, ManifestMutator, Pyproject, RUNTIME_KEY};
use crate::progress::{Progress, ProgressTracker};
use crate::registry::PackageRegistry;
use crate::resolve::find_compatible_version;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Default concurrency limit for registry requests
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Prefix of PyPy interpreter names, e.g. `pypy3.10`
const PYPY_PREFIX: &str = "pypy";

/// Strips an interpreter prefix from `raw` and parses the remaining version.
///
/// Returns the version text as it will be written into the manifest together
/// with its parsed form.
pub fn normalize_target(raw: &str) -> Result<(String, Version), ConfigError> {
    let trimmed = raw.trim();
    let text = trimmed.strip_prefix(PYPY_PREFIX).unwrap_or(trimmed);

    let version = Version::parse(text).map_err(|e| ConfigError::InvalidTargetVersion {
        value: raw.to_string(),
        message: e.to_string(),
    })?;
    Ok((text.to_string(), version))
}

/// Configuration for a downgrade run
#[derive(Debug, Clone)]
pub struct DowngradeConfig {
    /// Target runtime version as written into the manifest
    pub target: String,
    /// Parsed target runtime version
    pub target_version: Version,
    /// Pinned or caret constraints
    pub style: ConstraintStyle,
    /// Maximum concurrent registry lookups
    pub concurrency: usize,
    /// Show a progress bar while resolving
    pub show_progress: bool,
}

impl DowngradeConfig {
    /// Creates a configuration for `target`, which may carry a `pypy` prefix
    pub fn new(target: &str) -> Result<Self, ConfigError> {
        let (target, target_version) = normalize_target(target)?;
        Ok(Self {
            target,
            target_version,
            style: ConstraintStyle::default(),
            concurrency: DEFAULT_CONCURRENCY,
            show_progress: false,
        })
    }

    pub fn with_style(mut self, style: ConstraintStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Result of a downgrade run
#[derive(Debug)]
pub enum Outcome {
    /// The manifest already allows the target runtime; nothing was done
    AlreadySupported,
    /// The manifest was rewritten
    Downgraded {
        manifest: Pyproject,
        changes: Vec<DependencyChange>,
    },
}

/// A dependency whose constraint has been validated and is ready to look up
struct Lookup {
    dependency: Dependency,
    constraint: VersionConstraint,
}

/// A spawned lookup awaiting its result
struct PendingLookup {
    package: String,
    original: String,
    handle: JoinHandle<Option<String>>,
}

/// Orchestrator for the downgrade workflow
pub struct Downgrader {
    registry: Arc<dyn PackageRegistry>,
    sink: Arc<dyn EventSink>,
    config: DowngradeConfig,
    /// Caps in-flight registry requests across every table
    semaphore: Arc<Semaphore>,
}

impl Downgrader {
    pub fn new(
        registry: Arc<dyn PackageRegistry>,
        sink: Arc<dyn EventSink>,
        config: DowngradeConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
        Self {
            registry,
            sink,
            config,
            semaphore,
        }
    }

    pub fn config(&self) -> &DowngradeConfig {
        &self.config
    }

    /// Run the downgrade workflow on `manifest`
    pub async fn run(&self, mut manifest: Pyproject) -> Result<Outcome, AppError> {
        if manifest.supports_runtime(&self.config.target_version)? {
            return Ok(Outcome::AlreadySupported);
        }

        // Validate every table before anything is fetched
        let mut tables = Vec::new();
        for table in manifest.dependency_tables() {
            for package in &table.skipped {
                self.sink.emit(DowngradeEvent::SkippedNonRegistry {
                    group: table.group.clone(),
                    package: package.clone(),
                });
            }
            let lookups = prepare_lookups(&table.group, table.dependencies)?;
            tables.push((table.group, lookups));
        }

        let total: usize = tables.iter().map(|(_, lookups)| lookups.len()).sum();
        let mut progress = Progress::new(self.config.show_progress);
        progress.start(total as u64, "Resolving dependencies");
        let tracker = progress.tracker();

        // Every table is in flight at once; results are joined per table
        let pending: Vec<_> = tables
            .into_iter()
            .map(|(group, lookups)| (group, self.spawn_lookups(lookups, &tracker)))
            .collect();

        let mut resolved = Vec::with_capacity(pending.len());
        for (group, lookups) in pending {
            resolved.push((group, self.join_lookups(lookups).await));
        }
        progress.finish_and_clear();

        let mutator = ManifestMutator::new(self.config.style, self.sink.as_ref());
        let mut changes = Vec::new();
        for (group, results) in &resolved {
            if let Some(table) = manifest.table_mut(group) {
                changes.extend(mutator.apply(table, group, results));
                mutator.stamp_runtime(table, group, &self.config.target);
            }
        }

        Ok(Outcome::Downgraded { manifest, changes })
    }

    /// Resolves every dependency of one table except the runtime entry.
    ///
    /// Results keep the order of `dependencies`.
    pub async fn resolve_all(
        &self,
        group: &DependencyGroup,
        dependencies: Vec<Dependency>,
    ) -> Result<ResolutionResult, ManifestError> {
        let lookups = prepare_lookups(group, dependencies)?;
        let pending = self.spawn_lookups(lookups, &ProgressTracker::default());
        Ok(self.join_lookups(pending).await)
    }

    fn spawn_lookups(&self, lookups: Vec<Lookup>, tracker: &ProgressTracker) -> Vec<PendingLookup> {
        lookups
            .into_iter()
            .map(|lookup| {
                let package = lookup.dependency.name.clone();
                let original = lookup.dependency.constraint().to_string();

                let registry = Arc::clone(&self.registry);
                let sink = Arc::clone(&self.sink);
                let semaphore = Arc::clone(&self.semaphore);
                let tracker = tracker.clone();
                let target = self.config.target_version.clone();
                let name = package.clone();

                let handle = tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    tracker.set_message(&format!("Resolving {}", name));
                    let found = find_compatible_version(
                        registry.as_ref(),
                        &name,
                        &lookup.constraint,
                        &target,
                        sink.as_ref(),
                    )
                    .await;
                    tracker.inc();
                    found
                });

                PendingLookup {
                    package,
                    original,
                    handle,
                }
            })
            .collect()
    }

    async fn join_lookups(&self, pending: Vec<PendingLookup>) -> ResolutionResult {
        let mut results = ResolutionResult::new();
        for lookup in pending {
            let resolved = match lookup.handle.await {
                Ok(found) => found,
                Err(e) => {
                    self.sink.emit(DowngradeEvent::FetchFailed {
                        package: lookup.package.clone(),
                        message: format!("lookup task failed: {}", e),
                    });
                    None
                }
            };
            results.push(Resolution::new(lookup.package, lookup.original, resolved));
        }
        results
    }
}

/// Parses the constraint of every dependency other than the runtime entry
fn prepare_lookups(
    group: &DependencyGroup,
    dependencies: Vec<Dependency>,
) -> Result<Vec<Lookup>, ManifestError> {
    dependencies
        .into_iter()
        .filter(|dependency| dependency.name != RUNTIME_KEY)
        .map(|dependency| {
            let constraint = VersionConstraint::parse(dependency.constraint()).map_err(|e| {
                ManifestError::invalid_dependency(&dependency.name, group.to_string(), e)
            })?;
            Ok(Lookup {
                dependency,
                constraint,
            })
        })
        .collect()
}

//! Poetry pyproject.toml document
//!
//! Handles:
//! - tool.poetry.dependencies (main set, holds the `python` entry)
//! - tool.poetry.group.<name>.dependencies (Poetry 1.2+)
//! - tool.poetry.dev-dependencies (legacy)

use crate::domain::{Dependency, DependencyGroup, DependencySpec, Version, VersionConstraint};
use crate::error::ManifestError;
use crate::manifest::read_manifest;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

/// Key of the runtime constraint inside a dependency table
pub const RUNTIME_KEY: &str = "python";

const DEPENDENCIES_KEY: &str = "dependencies";
const DEV_DEPENDENCIES_KEY: &str = "dev-dependencies";
const GROUP_KEY: &str = "group";

/// Registry dependencies of one table, in manifest order
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyTable {
    pub group: DependencyGroup,
    /// Entries carrying a version constraint, `python` included
    pub dependencies: Vec<Dependency>,
    /// Entries with no registry version (git, path, url, multiple constraints)
    pub skipped: Vec<String>,
}

/// A parsed pyproject.toml together with its original text
#[derive(Debug, Clone)]
pub struct Pyproject {
    path: PathBuf,
    source: String,
    document: Table,
}

impl Pyproject {
    /// Parses `source`; `path` is only used in error messages
    pub fn parse(path: impl Into<PathBuf>, source: impl Into<String>) -> Result<Self, ManifestError> {
        let path = path.into();
        let source = source.into();
        let document: Table = toml::from_str(&source)
            .map_err(|e: toml::de::Error| ManifestError::toml_parse_error(path.clone(), e.to_string()))?;

        Ok(Self {
            path,
            source,
            document,
        })
    }

    /// Reads and parses the file at `path`
    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let source = read_manifest(path)?;
        Self::parse(path, source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The text the document was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn document(&self) -> &Table {
        &self.document
    }

    fn poetry(&self) -> Option<&Table> {
        self.document
            .get("tool")
            .and_then(Value::as_table)
            .and_then(|tool| tool.get("poetry"))
            .and_then(Value::as_table)
    }

    fn poetry_mut(&mut self) -> Option<&mut Table> {
        self.document
            .get_mut("tool")
            .and_then(Value::as_table_mut)
            .and_then(|tool| tool.get_mut("poetry"))
            .and_then(Value::as_table_mut)
    }

    /// Every dependency table present, main set first, then groups in
    /// manifest order, then the legacy dev table
    pub fn groups(&self) -> Vec<DependencyGroup> {
        let Some(poetry) = self.poetry() else {
            return Vec::new();
        };

        let mut groups = Vec::new();
        if poetry.get(DEPENDENCIES_KEY).is_some_and(Value::is_table) {
            groups.push(DependencyGroup::Main);
        }
        if let Some(named) = poetry.get(GROUP_KEY).and_then(Value::as_table) {
            for (name, group) in named {
                if group.get(DEPENDENCIES_KEY).is_some_and(Value::is_table) {
                    groups.push(DependencyGroup::Named(name.clone()));
                }
            }
        }
        if poetry.get(DEV_DEPENDENCIES_KEY).is_some_and(Value::is_table) {
            groups.push(DependencyGroup::LegacyDev);
        }
        groups
    }

    /// The dependency table of `group`
    pub fn table(&self, group: &DependencyGroup) -> Option<&Table> {
        let poetry = self.poetry()?;
        let value = match group {
            DependencyGroup::Main => poetry.get(DEPENDENCIES_KEY),
            DependencyGroup::Named(name) => poetry
                .get(GROUP_KEY)
                .and_then(|g| g.get(name))
                .and_then(|g| g.get(DEPENDENCIES_KEY)),
            DependencyGroup::LegacyDev => poetry.get(DEV_DEPENDENCIES_KEY),
        };
        value.and_then(Value::as_table)
    }

    /// Mutable access to the dependency table of `group`
    pub fn table_mut(&mut self, group: &DependencyGroup) -> Option<&mut Table> {
        let poetry = self.poetry_mut()?;
        let value = match group {
            DependencyGroup::Main => poetry.get_mut(DEPENDENCIES_KEY),
            DependencyGroup::Named(name) => poetry
                .get_mut(GROUP_KEY)
                .and_then(|g| g.get_mut(name))
                .and_then(|g| g.get_mut(DEPENDENCIES_KEY)),
            DependencyGroup::LegacyDev => poetry.get_mut(DEV_DEPENDENCIES_KEY),
        };
        value.and_then(Value::as_table_mut)
    }

    /// Splits every table into registry dependencies and skipped entries
    pub fn dependency_tables(&self) -> Vec<DependencyTable> {
        self.groups()
            .into_iter()
            .filter_map(|group| {
                let table = self.table(&group)?;
                let mut dependencies = Vec::new();
                let mut skipped = Vec::new();
                for (name, value) in table {
                    match DependencySpec::from_value(value) {
                        Some(spec) => dependencies.push(Dependency::new(name, spec)),
                        None if name == RUNTIME_KEY => {}
                        None => skipped.push(name.clone()),
                    }
                }
                Some(DependencyTable {
                    group,
                    dependencies,
                    skipped,
                })
            })
            .collect()
    }

    /// The runtime constraint declared in the main set
    pub fn runtime_constraint(&self) -> Option<String> {
        self.table(&DependencyGroup::Main)?
            .get(RUNTIME_KEY)
            .and_then(DependencySpec::from_value)
            .map(|spec| spec.constraint().to_string())
    }

    /// Returns true when the project already installs on `target`: either
    /// no runtime constraint is declared or it allows `target`
    pub fn supports_runtime(&self, target: &Version) -> Result<bool, ManifestError> {
        let Some(constraint) = self.runtime_constraint() else {
            return Ok(true);
        };
        let parsed = VersionConstraint::parse(&constraint).map_err(|e| {
            ManifestError::invalid_dependency(RUNTIME_KEY, DependencyGroup::Main.to_string(), e)
        })?;
        Ok(parsed.allows(target))
    }

    /// Serializes the document back to TOML text
    pub fn to_toml_string(&self) -> Result<String, ManifestError> {
        toml::to_string(&self.document).map_err(|e| ManifestError::SerializeError {
            message: e.to_string(),
        })
    }
}

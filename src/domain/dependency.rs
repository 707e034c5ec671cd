//! Dependency declarations as they appear in a Poetry manifest

use serde::{Deserialize, Serialize};
use std::fmt;
use toml::{Table, Value};

/// Key of the version field inside a structured declaration
const VERSION_KEY: &str = "version";

/// The constraint of one dependency, in whichever shape the manifest used
///
/// `numpy = "^1.24"` is [`DependencySpec::Bare`];
/// `numpy = { version = "^1.24", optional = true }` is
/// [`DependencySpec::Structured`]. Rewriting keeps the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencySpec {
    Bare(String),
    Structured(Table),
}

impl DependencySpec {
    /// Reads a declaration, returning `None` for entries that carry no
    /// registry version (git, path, url or multiple-constraint entries)
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(DependencySpec::Bare(s.clone())),
            Value::Table(t) if t.get(VERSION_KEY).is_some_and(Value::is_str) => {
                Some(DependencySpec::Structured(t.clone()))
            }
            _ => None,
        }
    }

    /// The constraint text
    pub fn constraint(&self) -> &str {
        match self {
            DependencySpec::Bare(s) => s,
            DependencySpec::Structured(t) => {
                t.get(VERSION_KEY).and_then(Value::as_str).unwrap_or_default()
            }
        }
    }

    /// Replaces the constraint text, keeping every other field
    pub fn set_constraint(&mut self, constraint: impl Into<String>) {
        match self {
            DependencySpec::Bare(s) => *s = constraint.into(),
            DependencySpec::Structured(t) => {
                t.insert(VERSION_KEY.to_string(), Value::String(constraint.into()));
            }
        }
    }

    /// Returns true if this is the structured form
    pub fn is_structured(&self) -> bool {
        matches!(self, DependencySpec::Structured(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            DependencySpec::Bare(s) => Value::String(s),
            DependencySpec::Structured(t) => Value::Table(t),
        }
    }
}

/// Which dependency table of the manifest a dependency lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum DependencyGroup {
    /// `tool.poetry.dependencies`
    Main,
    /// `tool.poetry.group.<name>.dependencies`
    Named(String),
    /// legacy `tool.poetry.dev-dependencies`
    LegacyDev,
}

impl DependencyGroup {
    /// Returns true for the main dependency table
    pub fn is_main(&self) -> bool {
        matches!(self, DependencyGroup::Main)
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyGroup::Main => write!(f, "dependencies"),
            DependencyGroup::Named(name) => write!(f, "group.{}", name),
            DependencyGroup::LegacyDev => write!(f, "dev-dependencies"),
        }
    }
}

/// A registry dependency: package name plus its declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub name: String,
    pub spec: DependencySpec,
}

impl Dependency {
    pub fn new(name: impl Into<String>, spec: DependencySpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }

    /// Returns the constraint text
    pub fn constraint(&self) -> &str {
        self.spec.constraint()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.constraint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> Table {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_bare_spec() {
        let spec = DependencySpec::from_value(&Value::String("^1.0.0".into())).unwrap();
        assert_eq!(spec.constraint(), "^1.0.0");
        assert!(!spec.is_structured());
    }

    #[test]
    fn test_structured_spec() {
        let t = table(r#"numpy = { version = "^2.0.0", optional = true }"#);
        let spec = DependencySpec::from_value(&t["numpy"]).unwrap();
        assert_eq!(spec.constraint(), "^2.0.0");
        assert!(spec.is_structured());
    }

    #[test]
    fn test_non_registry_entries_are_skipped() {
        let t = table(
            r#"
local = { path = "../local" }
vcs = { git = "https://example.com/repo.git" }
multi = [{ version = "^1.0", python = "<3.8" }, { version = "^2.0", python = ">=3.8" }]
"#,
        );
        assert!(DependencySpec::from_value(&t["local"]).is_none());
        assert!(DependencySpec::from_value(&t["vcs"]).is_none());
        assert!(DependencySpec::from_value(&t["multi"]).is_none());
        assert!(DependencySpec::from_value(&Value::Integer(1)).is_none());
    }

    #[test]
    fn test_set_constraint_bare() {
        let mut spec = DependencySpec::Bare("^1.0.0".into());
        spec.set_constraint("^1.1.0");
        assert_eq!(spec.into_value(), Value::String("^1.1.0".into()));
    }

    #[test]
    fn test_set_constraint_structured_keeps_fields() {
        let t = table(r#"requests = { version = "^2.28.0", extras = ["socks"] }"#);
        let mut spec = DependencySpec::from_value(&t["requests"]).unwrap();
        spec.set_constraint("2.27.1");

        let value = spec.into_value();
        let out = value.as_table().unwrap();
        assert_eq!(out["version"].as_str(), Some("2.27.1"));
        assert_eq!(out["extras"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_group_display() {
        assert_eq!(DependencyGroup::Main.to_string(), "dependencies");
        assert_eq!(
            DependencyGroup::Named("test".into()).to_string(),
            "group.test"
        );
        assert_eq!(DependencyGroup::LegacyDev.to_string(), "dev-dependencies");
        assert!(DependencyGroup::Main.is_main());
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::new("numpy", DependencySpec::Bare("^2.0.0".into()));
        assert_eq!(dep.to_string(), "numpy@^2.0.0");
    }
}

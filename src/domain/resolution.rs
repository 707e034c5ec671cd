//! Per-invocation resolution results and the changes applied from them

use super::DependencyGroup;
use serde::Serialize;

/// Outcome of resolving one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Package name
    pub package: String,
    /// Constraint text as declared in the manifest
    pub original: String,
    /// Highest compatible version, as spelled by the registry
    pub resolved: Option<String>,
}

impl Resolution {
    pub fn new(
        package: impl Into<String>,
        original: impl Into<String>,
        resolved: Option<String>,
    ) -> Self {
        Self {
            package: package.into(),
            original: original.into(),
            resolved,
        }
    }

    /// Returns true if no compatible version was found
    pub fn is_absent(&self) -> bool {
        self.resolved.is_none()
    }
}

/// Resolutions of one dependency table, in manifest order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    entries: Vec<Resolution>,
}

impl ResolutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resolution: Resolution) {
        self.entries.push(resolution);
    }

    /// Looks up the resolution of a package
    pub fn get(&self, package: &str) -> Option<&Resolution> {
        self.entries.iter().find(|r| r.package == package)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resolution> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Resolution> for ResolutionResult {
    fn from_iter<I: IntoIterator<Item = Resolution>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResolutionResult {
    type Item = &'a Resolution;
    type IntoIter = std::slice::Iter<'a, Resolution>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// What the mutator did with one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ChangeKind {
    /// No compatible version; the dependency was deleted
    Removed,
    /// The constraint was rewritten
    Rewritten { to: String },
    /// The computed constraint equals the declared one
    Unchanged,
}

/// A change applied to the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyChange {
    pub group: DependencyGroup,
    pub package: String,
    pub from: String,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

impl DependencyChange {
    pub fn new(
        group: DependencyGroup,
        package: impl Into<String>,
        from: impl Into<String>,
        kind: ChangeKind,
    ) -> Self {
        Self {
            group,
            package: package.into(),
            from: from.into(),
            kind,
        }
    }

    /// Returns true if the manifest entry was modified or deleted
    pub fn is_modification(&self) -> bool {
        !matches!(self.kind, ChangeKind::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResolutionResult {
        vec![
            Resolution::new("numpy", "^2.0.0", Some("1.24.4".into())),
            Resolution::new("foo", "^1.0.0", None),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_result_keeps_insertion_order() {
        let result = sample();
        let names: Vec<_> = result.iter().map(|r| r.package.as_str()).collect();
        assert_eq!(names, vec!["numpy", "foo"]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_result_lookup() {
        let result = sample();
        assert_eq!(
            result.get("numpy").and_then(|r| r.resolved.as_deref()),
            Some("1.24.4")
        );
        assert!(result.get("foo").unwrap().is_absent());
        assert!(result.get("missing").is_none());
    }

    #[test]
    fn test_change_is_modification() {
        let removed = DependencyChange::new(DependencyGroup::Main, "foo", "^1.0", ChangeKind::Removed);
        let same =
            DependencyChange::new(DependencyGroup::Main, "bar", "^1.0", ChangeKind::Unchanged);
        assert!(removed.is_modification());
        assert!(!same.is_modification());
    }

    #[test]
    fn test_change_serializes_flat() {
        let change = DependencyChange::new(
            DependencyGroup::Named("dev".into()),
            "pytest",
            "^8.0",
            ChangeKind::Rewritten { to: "^7.4.4".into() },
        );
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["action"], "rewritten");
        assert_eq!(json["to"], "^7.4.4");
        assert_eq!(json["group"]["name"], "dev");
    }
}

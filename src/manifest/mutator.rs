//! Applies resolution results to a dependency table
//!
//! Each resolved package ends in one of three states: removed (nothing
//! compatible), rewritten, or left as is because the computed constraint
//! equals the declared one. Rewrites keep the declaration's shape, so a
//! structured entry only has its `version` field replaced.

use crate::domain::{ChangeKind, DependencyChange, DependencyGroup, DependencySpec, ResolutionResult};
use crate::events::{DowngradeEvent, EventSink};
use crate::manifest::RUNTIME_KEY;
use toml::{Table, Value};

/// How a resolved version is written back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConstraintStyle {
    /// `^1.24.4`
    #[default]
    Caret,
    /// `1.24.4`
    Pinned,
}

impl ConstraintStyle {
    pub fn from_pin(pin: bool) -> Self {
        if pin {
            ConstraintStyle::Pinned
        } else {
            ConstraintStyle::Caret
        }
    }

    /// Renders the constraint for a resolved version
    pub fn render(self, version: &str) -> String {
        match self {
            ConstraintStyle::Caret => format!("^{}", version),
            ConstraintStyle::Pinned => version.to_string(),
        }
    }
}

/// Writes resolutions into dependency tables, reporting every decision
pub struct ManifestMutator<'a> {
    style: ConstraintStyle,
    sink: &'a dyn EventSink,
}

impl<'a> ManifestMutator<'a> {
    pub fn new(style: ConstraintStyle, sink: &'a dyn EventSink) -> Self {
        Self { style, sink }
    }

    /// Applies `results` to `table`, returning one change per resolution
    pub fn apply(
        &self,
        table: &mut Table,
        group: &DependencyGroup,
        results: &ResolutionResult,
    ) -> Vec<DependencyChange> {
        let mut changes = Vec::with_capacity(results.len());

        for resolution in results {
            let package = resolution.package.as_str();

            let Some(resolved) = resolution.resolved.as_deref() else {
                remove_entry(table, package);
                self.sink.emit(DowngradeEvent::Removed {
                    group: group.clone(),
                    package: package.to_string(),
                });
                changes.push(DependencyChange::new(
                    group.clone(),
                    package,
                    &resolution.original,
                    ChangeKind::Removed,
                ));
                continue;
            };

            let constraint = self.style.render(resolved);
            if constraint == resolution.original {
                self.sink.emit(DowngradeEvent::AlreadyCompatible {
                    group: group.clone(),
                    package: package.to_string(),
                });
                changes.push(DependencyChange::new(
                    group.clone(),
                    package,
                    &resolution.original,
                    ChangeKind::Unchanged,
                ));
                continue;
            }

            self.sink.emit(DowngradeEvent::Downgraded {
                group: group.clone(),
                package: package.to_string(),
                from: resolution.original.clone(),
                to: constraint.clone(),
            });
            set_constraint(table, package, &constraint);
            changes.push(DependencyChange::new(
                group.clone(),
                package,
                &resolution.original,
                ChangeKind::Rewritten { to: constraint },
            ));
        }

        changes
    }

    /// Sets the runtime constraint of `table` to `^target`, overwriting any
    /// existing entry. Every resolved table receives it, groups included.
    pub fn stamp_runtime(&self, table: &mut Table, group: &DependencyGroup, target: &str) {
        let constraint = ConstraintStyle::Caret.render(target);
        set_constraint(table, RUNTIME_KEY, &constraint);
        self.sink.emit(DowngradeEvent::RuntimeStamped {
            group: group.clone(),
            constraint,
        });
    }
}

/// Replaces the constraint of `package`, keeping a structured entry's other
/// fields and the key's position
fn set_constraint(table: &mut Table, package: &str, constraint: &str) {
    let value = match table.get(package).and_then(DependencySpec::from_value) {
        Some(mut spec) => {
            spec.set_constraint(constraint);
            spec.into_value()
        }
        None => Value::String(constraint.to_string()),
    };
    table.insert(package.to_string(), value);
}

/// Removes `package` while keeping the order of the remaining keys
fn remove_entry(table: &mut Table, package: &str) {
    *table = std::mem::take(table)
        .into_iter()
        .filter(|(name, _)| name != package)
        .collect();
}

//! Core domain models
//!
//! - Release versions and their ordering
//! - Version constraints (predicates over versions)
//! - Dependency declarations in their manifest shape
//! - Resolution results and applied changes

mod constraint;
mod dependency;
mod resolution;
mod version;

pub use constraint::{Comparator, Operator, VersionConstraint};
pub use dependency::{Dependency, DependencyGroup, DependencySpec};
pub use resolution::{ChangeKind, DependencyChange, Resolution, ResolutionResult};
pub use version::{PreRelease, PreReleaseKind, Version};

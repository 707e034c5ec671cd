//! Version and constraint text parsing
//!
//! Poetry manifests and PyPI `requires_python` metadata share one grammar:
//! Poetry's caret and tilde forms on top of PEP 440 specifiers.

mod constraint;

pub use constraint::parse_constraint;

use crate::domain::Version;
use crate::error::ConstraintError;

/// Parses a single version, e.g. a target runtime or a registry release key
pub fn parse_version(text: &str) -> Result<Version, ConstraintError> {
    Version::parse(text)
}

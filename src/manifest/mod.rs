//! Poetry manifest handling
//!
//! This module provides functionality to:
//! - Read and write pyproject.toml files
//! - Enumerate the main, group and legacy dev dependency tables
//! - Rewrite or remove dependency constraints from resolution results
//! - Stamp the runtime constraint

mod mutator;
mod pyproject;
mod writer;

pub use mutator::{ConstraintStyle, ManifestMutator};
pub use pyproject::{DependencyTable, Pyproject, RUNTIME_KEY};
pub use writer::{read_manifest, write_manifest};

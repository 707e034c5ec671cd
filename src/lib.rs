//! pydowngrade - Poetry dependency downgrader library
//!
//! Rewrites the dependency constraints of a Poetry pyproject.toml so the
//! project installs on an older Python:
//! - PEP 440 versions and Poetry constraint algebra (domain, parser)
//! - PyPI release metadata lookup (registry)
//! - Runtime compatibility filtering and version selection (resolve)
//! - Concurrent per-package resolution and manifest rewriting (orchestrator, manifest)

pub mod cli;
pub mod domain;
pub mod error;
pub mod events;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod registry;
pub mod resolve;

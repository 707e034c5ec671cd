//! Human-readable reporting of applied changes
//!
//! The rewritten manifest itself goes to stdout or a file; this module
//! only renders the per-package change summary shown on stderr.

mod summary;

pub use summary::SummaryFormatter;

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// No summary at all
    Quiet,
    /// Rewritten and removed packages
    #[default]
    Normal,
    /// Unchanged packages as well
    Verbose,
}

impl Verbosity {
    /// Derive the verbosity from the CLI flags; quiet wins
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

//! Text summary of dependency changes
//!
//! Groups changes by dependency table and aligns package names:
//!
//! ```text
//! dependencies
//!   numpy                ^2.0.0 → 1.24.4
//!   foo                  ^1.0.0 (removed)
//!
//! 1 downgraded, 1 removed
//! ```

use crate::domain::{ChangeKind, DependencyChange, DependencyGroup};
use crate::output::Verbosity;
use colored::Colorize;
use std::io::Write;

/// Minimum width of the package name column
const NAME_COLUMN: usize = 20;

/// Formatter for the change summary
pub struct SummaryFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl SummaryFormatter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn is_shown(&self, change: &DependencyChange) -> bool {
        match self.verbosity {
            Verbosity::Quiet => false,
            Verbosity::Normal => change.is_modification(),
            Verbosity::Verbose => true,
        }
    }

    /// Write the summary of `changes`
    pub fn format(&self, changes: &[DependencyChange], writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return Ok(());
        }

        let shown: Vec<&DependencyChange> = changes.iter().filter(|c| self.is_shown(c)).collect();
        let width = shown
            .iter()
            .map(|c| c.package.len())
            .max()
            .unwrap_or(0)
            .max(NAME_COLUMN);

        let mut groups: Vec<&DependencyGroup> = Vec::new();
        for change in &shown {
            if !groups.contains(&&change.group) {
                groups.push(&change.group);
            }
        }

        for group in groups {
            if self.color {
                writeln!(writer, "{}", group.to_string().bold())?;
            } else {
                writeln!(writer, "{}", group)?;
            }
            for change in shown.iter().filter(|c| &c.group == group) {
                self.format_line(change, width, writer)?;
            }
            writeln!(writer)?;
        }

        self.format_totals(changes, writer)
    }

    fn format_line(
        &self,
        change: &DependencyChange,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", change.package, width = width);
        match (&change.kind, self.color) {
            (ChangeKind::Rewritten { to }, true) => writeln!(
                writer,
                "  {} {} {} {}",
                name,
                change.from.dimmed(),
                "→".dimmed(),
                to.bright_white().bold()
            ),
            (ChangeKind::Rewritten { to }, false) => {
                writeln!(writer, "  {} {} -> {}", name, change.from, to)
            }
            (ChangeKind::Removed, true) => writeln!(
                writer,
                "  {} {} {}",
                name,
                change.from.dimmed(),
                "(removed)".red()
            ),
            (ChangeKind::Removed, false) => {
                writeln!(writer, "  {} {} (removed)", name, change.from)
            }
            (ChangeKind::Unchanged, true) => writeln!(
                writer,
                "  {} {}",
                name.dimmed(),
                format!("{} (unchanged)", change.from).dimmed()
            ),
            (ChangeKind::Unchanged, false) => {
                writeln!(writer, "  {} {} (unchanged)", name, change.from)
            }
        }
    }

    fn format_totals(&self, changes: &[DependencyChange], writer: &mut dyn Write) -> std::io::Result<()> {
        let downgraded = changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Rewritten { .. }))
            .count();
        let removed = changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Removed))
            .count();

        if downgraded == 0 && removed == 0 {
            return writeln!(writer, "No dependency changes needed");
        }

        if self.color {
            writeln!(
                writer,
                "{} downgraded, {} removed",
                downgraded.to_string().green(),
                removed.to_string().red()
            )
        } else {
            writeln!(writer, "{} downgraded, {} removed", downgraded, removed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_changes() -> Vec<DependencyChange> {
        vec![
            DependencyChange::new(
                DependencyGroup::Main,
                "numpy",
                "^2.0.0",
                ChangeKind::Rewritten {
                    to: "1.24.4".into(),
                },
            ),
            DependencyChange::new(DependencyGroup::Main, "requests", "^2.27", ChangeKind::Unchanged),
            DependencyChange::new(
                DependencyGroup::Named("dev".into()),
                "foo",
                "^1.0.0",
                ChangeKind::Removed,
            ),
        ]
    }

    fn render(verbosity: Verbosity, changes: &[DependencyChange]) -> String {
        let formatter = SummaryFormatter::with_color(verbosity, false);
        let mut output = Vec::new();
        formatter.format(changes, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_format_normal() {
        let output = render(Verbosity::Normal, &sample_changes());
        assert!(output.contains("dependencies\n"));
        assert!(output.contains("group.dev\n"));
        assert!(output.contains("^2.0.0 -> 1.24.4"));
        assert!(output.contains("^1.0.0 (removed)"));
        assert!(!output.contains("requests"));
        assert!(output.ends_with("1 downgraded, 1 removed\n"));
    }

    #[test]
    fn test_format_verbose_shows_unchanged() {
        let output = render(Verbosity::Verbose, &sample_changes());
        assert!(output.contains("^2.27 (unchanged)"));
    }

    #[test]
    fn test_format_quiet() {
        assert!(render(Verbosity::Quiet, &sample_changes()).is_empty());
    }

    #[test]
    fn test_format_no_changes() {
        let changes = vec![DependencyChange::new(
            DependencyGroup::Main,
            "numpy",
            "1.24.4",
            ChangeKind::Unchanged,
        )];
        assert_eq!(
            render(Verbosity::Normal, &changes),
            "No dependency changes needed\n"
        );
    }

    #[test]
    fn test_format_aligns_names() {
        let output = render(Verbosity::Normal, &sample_changes());
        let line = output.lines().find(|l| l.contains("numpy")).unwrap();
        assert!(line.starts_with(&format!("  {:20} ", "numpy")));
    }

    #[test]
    fn test_format_with_color_does_not_fail() {
        let formatter = SummaryFormatter::new(Verbosity::Verbose);
        let mut output = Vec::new();
        formatter.format(&sample_changes(), &mut output).unwrap();
        assert!(!output.is_empty());
    }
}

//! CLI argument parsing module for pydowngrade

use crate::error::ConfigError;
use crate::registry::PYPI_API_URL;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Parse a timeout given in whole seconds
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s))?;
    if secs == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a concurrency limit, which must be positive
fn parse_concurrency(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid concurrency: {}", s)),
    }
}

/// Downgrade packages in pyproject.toml to be compatible with a specific Python version
#[derive(Parser, Debug, Clone)]
#[command(name = "pydowngrade", version, about)]
pub struct CliArgs {
    /// Path to the pyproject.toml to downgrade
    #[arg(value_parser = existing_file)]
    pub pyproject: PathBuf,

    /// Target Python version, e.g. 3.8 or pypy3.10
    pub target_python: String,

    // Output options
    /// Write the result to this file instead of stdout
    #[arg(short, long, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(short, long)]
    pub in_place: bool,

    // Resolution options
    /// Pin packages to the exact compatible version instead of a caret range
    #[arg(long, overrides_with = "no_pin_versions")]
    pub pin_versions: bool,

    /// Write caret ranges (default)
    #[arg(long, overrides_with = "pin_versions")]
    pub no_pin_versions: bool,

    /// Package index JSON API base URL
    #[arg(short, long, default_value = PYPI_API_URL)]
    pub repository: String,

    /// Per-request registry timeout in seconds
    #[arg(long, default_value = "5", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Maximum number of concurrent registry requests
    #[arg(long, default_value = "10", value_parser = parse_concurrency)]
    pub concurrency: usize,

    // General options
    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Accept only paths that exist
fn existing_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("path '{}' does not exist", s))
    }
}

impl CliArgs {
    /// Whether resolved versions are pinned; the last of the two flags wins
    pub fn pin(&self) -> bool {
        self.pin_versions && !self.no_pin_versions
    }

    /// Where the rewritten manifest goes, `None` meaning stdout
    pub fn destination(&self) -> Option<PathBuf> {
        if let Some(ref output) = self.output {
            Some(output.clone())
        } else if self.in_place {
            Some(self.pyproject.clone())
        } else {
            None
        }
    }

    /// Whether the rewritten manifest is printed on stdout
    pub fn writes_stdout(&self) -> bool {
        self.output.is_none() && !self.in_place
    }

    /// The repository URL, which must be http(s)
    pub fn repository_url(&self) -> Result<&str, ConfigError> {
        let url = self.repository.trim();
        if url.starts_with("https://") || url.starts_with("http://") {
            Ok(url)
        } else {
            Err(ConfigError::InvalidRepository {
                value: self.repository.clone(),
            })
        }
    }
}

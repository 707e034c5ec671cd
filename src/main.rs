//! pydowngrade - make a Poetry project installable on an older Python
//!
//! Reads a pyproject.toml, finds for every dependency the highest release
//! that supports the target Python without exceeding the declared floor,
//! and writes the rewritten manifest to stdout or a file.

use clap::Parser;
use pydowngrade::cli::CliArgs;
use pydowngrade::error::IoError;
use pydowngrade::events::TracingSink;
use pydowngrade::manifest::{write_manifest, ConstraintStyle, Pyproject};
use pydowngrade::orchestrator::{DowngradeConfig, Downgrader, Outcome};
use pydowngrade::output::{SummaryFormatter, Verbosity};
use pydowngrade::registry::{HttpClient, PyPiRegistry};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` takes precedence over flags
fn init_tracing(args: &CliArgs) {
    let level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pydowngrade={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .with_level(false)
        .without_time()
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = DowngradeConfig::new(&args.target_python)?
        .with_style(ConstraintStyle::from_pin(args.pin()))
        .with_concurrency(args.concurrency)
        .with_progress(!args.quiet && io::stderr().is_terminal());

    let client = HttpClient::with_timeout(args.timeout)?;
    let registry = Arc::new(PyPiRegistry::with_base_url(client, args.repository_url()?));
    let manifest = Pyproject::read(&args.pyproject)?;
    let original = manifest.source().to_string();

    let downgrader = Downgrader::new(registry, Arc::new(TracingSink), config);
    let target = downgrader.config().target.clone();

    match downgrader.run(manifest).await? {
        Outcome::AlreadySupported => {
            eprintln!("Python version {} is already supported", target);
            if args.writes_stdout() {
                print_stdout(&original)?;
            }
        }
        Outcome::Downgraded { manifest, changes } => {
            let content = manifest.to_toml_string()?;
            match args.destination() {
                Some(path) => {
                    write_manifest(&path, &content)?;
                    eprintln!("Updated {} for Python {}", path.display(), target);
                }
                None => print_stdout(&content)?,
            }

            let formatter = SummaryFormatter::with_color(
                Verbosity::from_flags(args.verbose, args.quiet),
                io::stderr().is_terminal(),
            );
            let mut stderr = io::stderr().lock();
            formatter.format(&changes, &mut stderr)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Write `content` to stdout unchanged
fn print_stdout(content: &str) -> Result<(), IoError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|source| IoError::Stdout { source })
}

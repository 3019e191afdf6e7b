use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use rext::{CorrectError, ExtensionCorrector, Outcome, SignatureDatabase};

#[derive(Parser)]
#[command(name = "rext")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Restores missing or wrong file extensions from magic numbers")]
struct Cli {
    /// Files to analyze and rename
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// External signature list, one MAGIC:extension entry per line
    #[arg(short, long)]
    signatures: Option<PathBuf>,

    /// Leave files alone when the declared extension is already correct
    #[arg(long)]
    skip_correct: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let database = match &cli.signatures {
        Some(path) => SignatureDatabase::load(path)
            .with_context(|| format!("failed to load signature list {}", path.display()))?,
        None => SignatureDatabase::builtin(),
    };
    debug!(entries = database.len(), "signature database ready");

    let corrector = ExtensionCorrector::new(&database).skip_when_correct(cli.skip_correct);

    let (present, missing): (Vec<_>, Vec<_>) = cli.files.iter().partition(|path| path.exists());

    for path in &missing {
        eprintln!(
            "{} {}: file not found",
            style("failed").red().bold(),
            path.display()
        );
    }

    // The database is immutable once built, so one instance is shared
    // across the whole batch.
    let results: Vec<(&PathBuf, Result<Outcome, CorrectError>)> = present
        .par_iter()
        .map(|&path| (path, corrector.correct(path)))
        .collect();

    let mut failures = missing.len();
    for (path, result) in &results {
        match result {
            Ok(Outcome::Renamed(renamed)) => println!(
                "{} {} -> {}",
                style("renamed").green().bold(),
                path.display(),
                renamed.display()
            ),
            Ok(Outcome::NoChangeNeeded) => {
                println!("{} {}", style("ok").green(), path.display());
            }
            Err(err) => {
                failures += 1;
                eprintln!(
                    "{} {}: {}",
                    style("failed").red().bold(),
                    path.display(),
                    err
                );
            }
        }
    }

    if failures > 0 {
        warn!(failures, total = cli.files.len(), "some files were not corrected");
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

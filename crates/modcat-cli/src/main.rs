use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

mod progress;

use progress::ProgressReporter;

#[derive(Parser, Debug)]
#[command(name = "modcat", version)]
#[command(about = "Ingest, validate and assemble a GitHub organization's module catalog")]
struct Cli {
    /// Directory containing `.modcat.toml` and the `cache/` output directory.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Disable the TTY progress spinner even when stdout is a terminal.
    #[arg(long)]
    no_progress: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[error] {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = modcat_config::load_config(&cli.dir)
        .with_context(|| format!("failed to load configuration from {}", cli.dir.display()))?;

    let mut reporter = if cli.no_progress {
        ProgressReporter::silent()
    } else {
        ProgressReporter::new()
    };

    modcat::run(&config, &mut reporter)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

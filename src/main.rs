//! CLI entry point for priority-driven exemplar-based inpainting

use clap::Parser;
use patchfill::io::cli::{Cli, FileProcessor};
use tracing_subscriber::EnvFilter;

fn main() -> patchfill::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let processor = FileProcessor::new(cli);
    processor.process()?.ensure_complete().map(|_| ())
}

//! Command-line surface.

use clap::Parser;

/// Build the academic responsibility seed SQL from the roster sources.
#[derive(Debug, Parser)]
#[command(name = "roster-cli", version, about)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

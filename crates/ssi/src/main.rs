//! SSI CLI - server-side include template renderer.
//!
//! Provides commands for:
//! - `render`: Render a source file through the directive pipeline
//! - `check`: Parse a source file and report its structure

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, RenderArgs};
use output::Output;

/// ssi - render text documents containing include-style directives.
#[derive(Parser)]
#[command(name = "ssi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a source file to final text.
    Render(RenderArgs),
    /// Parse a source file and report its node structure.
    Check(CheckArgs),
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let output = Output::new();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

//! markview CLI - Markdown to HTML document converter.
//!
//! Provides commands for:
//! - `render`: Convert markdown to a complete HTML document
//! - `resources`: List the scripts and stylesheets a document needs

mod commands;
mod error;
mod output;
mod source;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, ResourcesArgs};
use error::CliError;
use output::Output;

/// markview - Markdown to HTML document converter.
#[derive(Parser)]
#[command(name = "markview", version, about)]
struct Cli {
    /// Enable verbose output (fetch and timing logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown to HTML.
    Render(RenderArgs),
    /// Print the resources a document requires as JSON.
    Resources(ResourcesArgs),
}

fn run(command: Commands) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    match command {
        Commands::Render(args) => rt.block_on(args.execute()),
        Commands::Resources(args) => rt.block_on(args.execute()),
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

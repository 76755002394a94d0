//! adeck CLI - Asciidoc slide decks.
//!
//! Provides commands for:
//! - `build`: Build one self-contained HTML deck
//! - `watch`: Rebuild on change and live reload open browsers
//! - `options`: Document the deck configuration attributes

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, OptionsArgs, WatchArgs};
use error::CliError;
use output::Output;

/// adeck - Asciidoc to HTML slide decks.
#[derive(Parser)]
#[command(name = "adeck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a deck.
    Build(BuildArgs),
    /// Build a deck, then rebuild it on every change.
    Watch(WatchArgs),
    /// Show the document attributes a deck can set.
    Options(OptionsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.settings.verbose,
        Commands::Watch(args) => args.settings.verbose,
        Commands::Options(_) => false,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Watch(args) => run_async(args),
        Commands::Options(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        #[allow(clippy::exit)]
        std::process::exit(1);
    }
}

fn run_async(args: WatchArgs) -> Result<(), CliError> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(args.execute())
}

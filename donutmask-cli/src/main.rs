//! DonutMask CLI - Command-line interface
//!
//! Masks sensitive point locations from GeoJSON files and reports how much
//! privacy and spatial pattern the masked data retains.

mod commands;
mod error;
mod geojson;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::config::ConfigCommands;
use commands::mask::MaskArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "donutmask")]
#[command(author, version, about = "Donut geomasking for sensitive point data", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mask a GeoJSON point layer and report privacy metrics
    Mask(MaskArgs),

    /// View or modify settings
    Config {
        /// Settings file (default: ~/.donutmask/config.ini)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Install the log subscriber. `RUST_LOG` overrides the default level.
fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Mask(args) => commands::mask::run(args),
        Commands::Config { config, command } => commands::config::run(command, config),
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

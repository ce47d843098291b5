//! CLI frontend for the Gravitas gravity simulation.

mod commands;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gv",
    about = "Gravitas: per-entity gravity simulation scenarios",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON scenario against the in-memory world
    Simulate {
        /// Path to the scenario file
        scenario: PathBuf,

        /// Number of ticks to simulate (default: 100 = five seconds)
        #[arg(short, long, default_value = "100")]
        ticks: u64,

        /// Show all events and debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the mace bonus damage for a fall distance
    MaceDamage {
        /// Fall distance in blocks
        #[arg(allow_negative_numbers = true)]
        fall: f64,
    },
}

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Simulate { verbose: true, .. });
    logging::init(verbose);

    let result = match cli.command {
        Commands::Simulate {
            scenario,
            ticks,
            verbose,
        } => commands::simulate::run(&scenario, ticks, verbose),
        Commands::MaceDamage { fall } => commands::mace::run(fall),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

//! Claimgrid CLI - play, script and simulate claimgrid games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Claimgrid - a territory-claiming game with a weight-based token economy
#[derive(Parser, Debug)]
#[command(name = "claimgrid")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON game config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of players (overrides the config file)
    #[arg(short, long, global = true)]
    players: Option<u8>,

    /// Grid side length (overrides the config file)
    #[arg(short, long, global = true)]
    grid_size: Option<u16>,

    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play interactively in the terminal
    Play,

    /// Apply a JSON array of actions to a fresh game
    Run {
        /// Action script (.json)
        #[arg(short, long, required = true)]
        actions: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Print the outcome of every action
        #[arg(short, long)]
        trace: bool,
    },

    /// Run many random games in parallel and aggregate statistics
    Simulate {
        /// Number of games to run (default: 1000)
        #[arg(short = 'n', long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum turns per game (default: 1000)
        #[arg(short = 'm', long, default_value = "1000")]
        max_actions: u32,

        /// Chance that a turn swaps instead of claiming (default: 0.1)
        #[arg(long, default_value = "0.1")]
        swap_probability: f64,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::SimulateFormat,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = cli::ConfigArgs {
        config: args.config,
        players: args.players,
        grid_size: args.grid_size,
    };

    let result = match args.command {
        Commands::Play => cli::play::execute(&config),

        Commands::Run {
            actions,
            format,
            trace,
        } => cli::run::execute(&config, actions, format, trace),

        Commands::Simulate {
            games,
            seed,
            threads,
            max_actions,
            swap_probability,
            format,
            progress,
        } => cli::simulate::execute(
            &config,
            cli::simulate::SimulateOptions {
                games,
                seed,
                threads,
                max_actions,
                swap_probability,
                format,
                progress,
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

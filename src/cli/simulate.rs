//! Simulate command implementation.

use super::output::{
    JsonSimulationResult, SimulationStats, format_simulation_csv, format_simulation_text,
};
use super::{CliError, ConfigArgs, SimulateFormat};
use claimgrid::simulation::{SimulationConfig, run_random_game};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;

/// Options for the simulate command.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimulateOptions {
    /// Number of games to run.
    pub(crate) games: u64,
    /// Starting seed (increments for each game).
    pub(crate) seed: Option<u64>,
    /// Parallel threads.
    pub(crate) threads: Option<usize>,
    /// Maximum turns per game.
    pub(crate) max_actions: u32,
    /// Chance of a swap per turn.
    pub(crate) swap_probability: f64,
    /// Output format.
    pub(crate) format: SimulateFormat,
    /// Show progress bar.
    pub(crate) progress: bool,
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the config is invalid or output fails.
pub(crate) fn execute(config: &ConfigArgs, options: SimulateOptions) -> Result<(), CliError> {
    let game = config.resolve()?;
    if !(0.0..=1.0).contains(&options.swap_probability) {
        return Err(CliError::new(format!(
            "swap probability must be between 0 and 1 (got {})",
            options.swap_probability
        )));
    }

    // Set thread pool size if specified
    if let Some(num_threads) = options.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = options.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(42)
    });

    let sim_config = SimulationConfig {
        game,
        max_actions: options.max_actions,
        swap_probability: options.swap_probability,
        check_invariants: true,
    };

    let pb = if options.progress {
        let pb = ProgressBar::new(options.games);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
                .map_err(|e| CliError::new(e.to_string()))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let num_players = usize::from(game.num_players);

    // Each thread accumulates into its own SimulationStats, merged at the end
    let stats = (0..options.games)
        .into_par_iter()
        .fold(
            || SimulationStats::new(num_players),
            |mut local, i| {
                match run_random_game(base_seed.wrapping_add(i), &sim_config) {
                    Ok(result) => local.add_result(&result),
                    Err(e) => {
                        tracing::warn!(game = i, error = %e, "simulation failed");
                        local.failures += 1;
                    }
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                local
            },
        )
        .reduce(
            || SimulationStats::new(num_players),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    #[allow(clippy::cast_precision_loss)]
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match options.format {
        SimulateFormat::Text => {
            println!("Base seed: {base_seed}");
            print!("{}", format_simulation_text(&stats));
            println!();
            println!(
                "Duration: {:.2}s ({games_per_sec:.0} games/sec)",
                duration.as_secs_f64()
            );
        }
        SimulateFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonSimulationResult::from_stats(&stats))?;
            println!("{json}");
        }
        SimulateFormat::Csv => {
            print!("{}", format_simulation_csv(&stats));
        }
    }

    if stats.invariant_violations > 0 {
        return Err(CliError::new(format!(
            "{} invariant violations detected",
            stats.invariant_violations
        )));
    }

    Ok(())
}

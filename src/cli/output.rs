//! Output formatting utilities for CLI.

#![allow(clippy::cast_precision_loss)]

use claimgrid::game::{Outcome, Snapshot};
use claimgrid::simulation::SimulationResult;
use serde::Serialize;

/// JSON-serializable result of an action script.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult<'a> {
    /// Actions that changed the game.
    pub(super) applied: usize,
    /// Actions that were rejected.
    pub(super) rejected: usize,
    /// Outcome of every action, in order (only with `--trace`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) outcomes: Option<&'a [Outcome]>,
    /// Final game state.
    pub(super) state: &'a Snapshot,
}

/// One-line description of an outcome.
pub(super) fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::PlayerSelected { player } => format!("player {player} is active"),
        Outcome::Claimed { cell, settlement } => format!(
            "player {} claimed cell {cell} for {:.2}{}",
            settlement.payer,
            settlement.fee.cost,
            if settlement.bootstrap { " (bootstrap)" } else { "" }
        ),
        Outcome::CellSelected { cell } => format!("cell {cell} selected"),
        Outcome::SelectionCleared { cell } => format!("cell {cell} deselected"),
        Outcome::Swapped {
            source,
            target,
            displaced,
            settlement,
        } => format!(
            "player {} swapped cell {source} with cell {target} of player {displaced} for {:.2}",
            settlement.payer, settlement.fee.cost
        ),
        Outcome::Rejected { rejection } => rejection.to_string(),
    }
}

/// Aggregated statistics over many simulated games.
#[derive(Debug, Default)]
pub(super) struct SimulationStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Games that failed to start.
    pub(super) failures: u64,
    /// Times each player finished with the highest balance.
    pub(super) richest: Vec<u64>,
    /// Total balance per player.
    total_balances: Vec<f64>,
    /// Balance sum of squares for std dev calculation.
    balance_sq_sums: Vec<f64>,
    /// Total final weight per player.
    total_weights: Vec<f64>,
    /// Total final cells per player.
    total_cells: Vec<u64>,
    /// Total claims across all games.
    total_claims: u64,
    /// Total swaps across all games.
    total_swaps: u64,
    /// Total rejected operations across all games.
    total_rejected: u64,
    /// Total final treasury across all games.
    total_treasury: f64,
    /// Invariant violations across all games.
    pub(super) invariant_violations: u64,
}

impl SimulationStats {
    /// Create new stats for n players.
    pub(super) fn new(num_players: usize) -> Self {
        Self {
            richest: vec![0; num_players],
            total_balances: vec![0.0; num_players],
            balance_sq_sums: vec![0.0; num_players],
            total_weights: vec![0.0; num_players],
            total_cells: vec![0; num_players],
            ..Self::default()
        }
    }

    /// Add a game result to the stats.
    pub(super) fn add_result(&mut self, result: &SimulationResult) {
        self.games_played += 1;
        self.total_claims += u64::from(result.claims);
        self.total_swaps += u64::from(result.swaps);
        self.total_rejected += u64::from(result.rejected);
        self.total_treasury += result.treasury;
        self.invariant_violations += result.invariant_violations as u64;

        if let Some(slot) = result
            .richest()
            .and_then(|p| self.richest.get_mut(usize::from(p)))
        {
            *slot += 1;
        }

        for (i, player) in result.players.iter().enumerate() {
            if i < self.total_balances.len() {
                self.total_balances[i] += player.balance;
                self.balance_sq_sums[i] += player.balance * player.balance;
                self.total_weights[i] += player.weight;
                self.total_cells[i] += player.cells as u64;
            }
        }
    }

    /// Merge another set of stats into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.failures += other.failures;
        self.total_claims += other.total_claims;
        self.total_swaps += other.total_swaps;
        self.total_rejected += other.total_rejected;
        self.total_treasury += other.total_treasury;
        self.invariant_violations += other.invariant_violations;

        let zip_add = |a: &mut [f64], b: &[f64]| a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
        zip_add(&mut self.total_balances, &other.total_balances);
        zip_add(&mut self.balance_sq_sums, &other.balance_sq_sums);
        zip_add(&mut self.total_weights, &other.total_weights);
        for (a, b) in self.richest.iter_mut().zip(&other.richest) {
            *a += b;
        }
        for (a, b) in self.total_cells.iter_mut().zip(&other.total_cells) {
            *a += b;
        }
    }

    fn per_game(&self, total: f64) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        total / self.games_played as f64
    }

    /// Share of games a player finished richest (0.0-1.0).
    pub(super) fn richest_rate(&self, player: usize) -> f64 {
        self.per_game(self.richest.get(player).copied().unwrap_or(0) as f64)
    }

    /// Average final balance for a player.
    pub(super) fn avg_balance(&self, player: usize) -> f64 {
        self.per_game(self.total_balances.get(player).copied().unwrap_or(0.0))
    }

    /// Final balance standard deviation for a player.
    pub(super) fn balance_std_dev(&self, player: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let mean = self.avg_balance(player);
        let sq = self.per_game(self.balance_sq_sums.get(player).copied().unwrap_or(0.0));
        let variance = sq - mean * mean;
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Average final weight for a player.
    pub(super) fn avg_weight(&self, player: usize) -> f64 {
        self.per_game(self.total_weights.get(player).copied().unwrap_or(0.0))
    }

    /// Average final cell count for a player.
    pub(super) fn avg_cells(&self, player: usize) -> f64 {
        self.per_game(self.total_cells.get(player).copied().unwrap_or(0) as f64)
    }

    /// Average claims per game.
    pub(super) fn avg_claims(&self) -> f64 {
        self.per_game(self.total_claims as f64)
    }

    /// Average swaps per game.
    pub(super) fn avg_swaps(&self) -> f64 {
        self.per_game(self.total_swaps as f64)
    }

    /// Average rejected operations per game.
    pub(super) fn avg_rejected(&self) -> f64 {
        self.per_game(self.total_rejected as f64)
    }

    /// Average final treasury.
    pub(super) fn avg_treasury(&self) -> f64 {
        self.per_game(self.total_treasury)
    }

    fn num_players(&self) -> usize {
        self.total_balances.len()
    }
}

/// JSON-serializable simulation summary.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimulationResult {
    /// Total games played.
    games_played: u64,
    /// Games that failed to start.
    failures: u64,
    /// Average claims per game.
    avg_claims: f64,
    /// Average swaps per game.
    avg_swaps: f64,
    /// Average rejected operations per game.
    avg_rejected: f64,
    /// Average final treasury.
    avg_treasury: f64,
    /// Invariant violations across all games.
    invariant_violations: u64,
    /// Per-player statistics.
    players: Vec<JsonSimulationPlayer>,
}

/// JSON-serializable per-player simulation stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimulationPlayer {
    /// Player index (0-based).
    player: usize,
    /// Games finished with the highest balance.
    richest: u64,
    /// Richest rate (0.0-1.0).
    richest_rate: f64,
    /// Average final balance.
    avg_balance: f64,
    /// Balance standard deviation.
    balance_std_dev: f64,
    /// Average final weight.
    avg_weight: f64,
    /// Average final cell count.
    avg_cells: f64,
}

impl JsonSimulationResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &SimulationStats) -> Self {
        let players = (0..stats.num_players())
            .map(|i| JsonSimulationPlayer {
                player: i,
                richest: stats.richest.get(i).copied().unwrap_or(0),
                richest_rate: stats.richest_rate(i),
                avg_balance: stats.avg_balance(i),
                balance_std_dev: stats.balance_std_dev(i),
                avg_weight: stats.avg_weight(i),
                avg_cells: stats.avg_cells(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            failures: stats.failures,
            avg_claims: stats.avg_claims(),
            avg_swaps: stats.avg_swaps(),
            avg_rejected: stats.avg_rejected(),
            avg_treasury: stats.avg_treasury(),
            invariant_violations: stats.invariant_violations,
            players,
        }
    }
}

/// Format simulation stats as human-readable text.
pub(super) fn format_simulation_text(stats: &SimulationStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("Simulation Results ({} games)\n", stats.games_played));
    output.push_str("========================================\n\n");

    output.push_str("Players:\n");
    for i in 0..stats.num_players() {
        output.push_str(&format!(
            "  Player {i}: richest {:.1}%  balance {:.2} (+/- {:.2})  weight {:.2}  cells {:.1}\n",
            stats.richest_rate(i) * 100.0,
            stats.avg_balance(i),
            stats.balance_std_dev(i),
            stats.avg_weight(i),
            stats.avg_cells(i),
        ));
    }

    output.push_str(&format!(
        "\nPer game: {:.1} claims, {:.1} swaps, {:.1} rejected, treasury {:.2}\n",
        stats.avg_claims(),
        stats.avg_swaps(),
        stats.avg_rejected(),
        stats.avg_treasury()
    ));
    output.push_str(&format!(
        "Invariant violations: {}\n",
        stats.invariant_violations
    ));
    if stats.failures > 0 {
        output.push_str(&format!("Failed games: {}\n", stats.failures));
    }

    output
}

/// Format simulation stats as CSV.
pub(super) fn format_simulation_csv(stats: &SimulationStats) -> String {
    let mut output = String::new();

    output.push_str("player,richest,richest_rate,avg_balance,balance_std_dev,avg_weight,avg_cells\n");

    for i in 0..stats.num_players() {
        output.push_str(&format!(
            "{},{},{:.4},{:.2},{:.2},{:.2},{:.2}\n",
            i,
            stats.richest.get(i).copied().unwrap_or(0),
            stats.richest_rate(i),
            stats.avg_balance(i),
            stats.balance_std_dev(i),
            stats.avg_weight(i),
            stats.avg_cells(i)
        ));
    }

    output
}

//! Game invariants - consistency checks that detect bugs.
//!
//! Every applied operation must leave the game satisfying all of these.
//! They are bug detectors, not gameplay rules.

use std::collections::{BTreeSet, HashSet};

use crate::game::{CellIndex, ClusterId, Snapshot, is_connected, player_weight};

/// Absolute tolerance for comparing derived money and weight values.
pub const LEDGER_TOLERANCE: f64 = 1e-6;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= LEDGER_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(snapshot: &Snapshot) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut violation = |message: String| violations.push(InvariantViolation { message });
    let topology = snapshot.topology;

    if snapshot.cells.len() != topology.cell_count() {
        violation(format!(
            "Board has {} cells, grid of size {} needs {}",
            snapshot.cells.len(),
            topology.size(),
            topology.cell_count()
        ));
        return violations;
    }

    if usize::from(snapshot.active_player) >= snapshot.players.len() {
        violation(format!(
            "Active player {} out of range ({} players)",
            snapshot.active_player,
            snapshot.players.len()
        ));
    }

    // Cluster partition: every owned cell in exactly one cluster of its owner
    let mut covered: Vec<Option<ClusterId>> = vec![None; topology.cell_count()];
    let mut ids = HashSet::new();

    for (index, player) in snapshot.players.iter().enumerate() {
        if usize::from(player.id) != index {
            violation(format!("Player at index {index} has id {}", player.id));
        }

        for cluster in &player.clusters {
            if !ids.insert(cluster.id) {
                violation(format!("Cluster id {} used more than once", cluster.id));
            }
            if cluster.owner != player.id {
                violation(format!(
                    "Cluster {} owned by {} is held by player {}",
                    cluster.id, cluster.owner, player.id
                ));
            }
            if cluster.is_empty() {
                violation(format!("Cluster {} is empty", cluster.id));
                continue;
            }
            if !is_connected(&cluster.cells, topology) {
                violation(format!("Cluster {} is not connected", cluster.id));
            }

            for &cell in &cluster.cells {
                if snapshot.owner(cell) != Some(player.id) {
                    violation(format!(
                        "Cluster {} contains cell {cell} not owned by player {}",
                        cluster.id, player.id
                    ));
                }
                match covered.get_mut(usize::from(cell)) {
                    Some(Some(other)) => violation(format!(
                        "Cell {cell} is in clusters {other} and {}",
                        cluster.id
                    )),
                    Some(slot) => *slot = Some(cluster.id),
                    None => violation(format!("Cluster {} contains off-grid cell {cell}", cluster.id)),
                }
            }
        }

        let expected = player_weight(&player.clusters);
        if !close(player.weight, expected) {
            violation(format!(
                "Player {} weight {} != cluster sum {expected}",
                player.id, player.weight
            ));
        }

        if !player.spent.is_finite() || player.spent < 0.0 {
            violation(format!("Player {} spent {} is invalid", player.id, player.spent));
        }
        if !player.earned.is_finite() || player.earned < 0.0 {
            violation(format!("Player {} earned {} is invalid", player.id, player.earned));
        }
        if !close(player.balance, player.earned - player.spent) {
            violation(format!(
                "Player {} balance {} != earned {} - spent {}",
                player.id, player.balance, player.earned, player.spent
            ));
        }
    }

    for cell in topology.cells() {
        let Some(owner) = snapshot.owner(cell) else {
            continue;
        };
        let Some(id) = covered[usize::from(cell)] else {
            violation(format!("Cell {cell} owned by {owner} is in no cluster"));
            continue;
        };
        // Maximality: same-owner neighbors share the cluster
        for next in topology.neighbors(cell).iter() {
            if snapshot.owner(next) == Some(owner) && covered[usize::from(next)] != Some(id) {
                violation(format!(
                    "Adjacent cells {cell} and {next} of player {owner} are in different clusters"
                ));
            }
        }
    }

    if !snapshot.treasury.is_finite() || snapshot.treasury < 0.0 {
        violation(format!("Treasury {} is invalid", snapshot.treasury));
    }

    // Conservation: every token spent went to the treasury or to a player
    let spent: f64 = snapshot.players.iter().map(|p| p.spent).sum();
    let received: f64 = snapshot.treasury + snapshot.players.iter().map(|p| p.earned).sum::<f64>();
    if !close(spent, received) {
        violation(format!(
            "Tokens not conserved: spent {spent}, treasury + earned {received}"
        ));
    }

    let implied = expected_available(snapshot);
    let available: BTreeSet<CellIndex> = snapshot.available.iter().copied().collect();
    if available != implied {
        violation(format!(
            "Available set has {} cells, board implies {}",
            available.len(),
            implied.len()
        ));
    }

    if let Some(cell) = snapshot
        .selected_cell
        .filter(|&cell| snapshot.owner(cell) != Some(snapshot.active_player))
    {
        violation(format!(
            "Selected cell {cell} is not owned by active player {}",
            snapshot.active_player
        ));
    }

    violations
}

fn expected_available(snapshot: &Snapshot) -> BTreeSet<CellIndex> {
    let topology = snapshot.topology;
    if snapshot.claimed_count() == 0 {
        return topology.cells().collect();
    }
    topology
        .cells()
        .filter(|&cell| {
            snapshot.owner(cell).is_none()
                && topology
                    .neighbors(cell)
                    .iter()
                    .any(|next| snapshot.owner(next).is_some())
        })
        .collect()
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(snapshot: &Snapshot) {
    let violations = check_invariants(snapshot);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_snapshot: &Snapshot) {}

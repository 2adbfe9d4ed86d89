//! Game state machine.
//!
//! [`GameState`] owns the board, the players and the treasury, and is the
//! only way to change them. Each operation either applies completely or
//! returns [`Outcome::Rejected`] with the state untouched.

use std::collections::BTreeSet;

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::game::snapshot::Listeners;
use crate::game::{
    Action, ActionKind, Board, CellIndex, ClusterFactory, ClusterStrategy, ColorPicker, Outcome,
    Player, PlayerId, Rejection, Snapshot, SnapshotListener, SubscriptionId, absorb_claim,
    available_cells, rebuild_clusters, settle,
};

/// Complete state of one game session.
#[derive(Debug)]
pub struct GameState {
    /// Settings the game was created with.
    config: GameConfig,
    /// Cell ownership.
    board: Board,
    /// Players indexed by id.
    players: Vec<Player>,
    /// Accumulated commissions.
    treasury: f64,
    /// Cells open for claiming.
    available: BTreeSet<CellIndex>,
    /// The acting player.
    active_player: PlayerId,
    /// Pending swap source.
    selected_cell: Option<CellIndex>,
    /// Cluster id and color source.
    factory: ClusterFactory,
    /// Snapshot subscribers.
    listeners: Listeners,
}

impl GameState {
    /// Start a new game: empty board, zeroed ledgers, player 0 active.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] if the configuration is invalid.
    pub fn new(config: GameConfig) -> GameResult<Self> {
        config.validate()?;
        let topology = config.topology()?;
        let board = Board::new(topology);
        let available = available_cells(&board);
        let colors = ColorPicker::new(config.color_scheme, config.color_seed, config.num_players);

        tracing::debug!(
            grid_size = config.grid_size,
            players = config.num_players,
            "new game"
        );

        Ok(Self {
            config,
            board,
            players: (0..config.num_players).map(Player::new).collect(),
            treasury: 0.0,
            available,
            active_player: 0,
            selected_cell: None,
            factory: ClusterFactory::new(colors),
            listeners: Listeners::default(),
        })
    }

    /// Settings the game was created with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Cell ownership.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// All players, indexed by id.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// A player by id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(usize::from(id))
    }

    /// Accumulated commissions and bootstrap fees.
    #[must_use]
    pub const fn treasury(&self) -> f64 {
        self.treasury
    }

    /// Cells open for a new claim.
    #[must_use]
    pub const fn available_cells(&self) -> &BTreeSet<CellIndex> {
        &self.available
    }

    /// Whether `cell` may be claimed now.
    #[must_use]
    pub fn is_available(&self, cell: CellIndex) -> bool {
        self.available.contains(&cell)
    }

    /// The acting player.
    #[must_use]
    pub const fn active_player(&self) -> PlayerId {
        self.active_player
    }

    /// Pending swap source.
    #[must_use]
    pub const fn selected_cell(&self) -> Option<CellIndex> {
        self.selected_cell
    }

    /// Current weight of every player, indexed by id.
    #[must_use]
    pub fn weights(&self) -> Vec<f64> {
        self.players.iter().map(|p| p.weight).collect()
    }

    /// Immutable copy of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            topology: self.board.topology(),
            cells: self.board.cells().to_vec(),
            players: self.players.clone(),
            treasury: self.treasury,
            available: self.available.iter().copied().collect(),
            active_player: self.active_player,
            selected_cell: self.selected_cell,
        }
    }

    /// Register a listener called with a fresh snapshot after every applied
    /// operation. Rejected operations do not notify.
    pub fn subscribe(&mut self, listener: SnapshotListener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Execute an [`Action`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an out-of-range
    /// [`Action::SelectPlayer`].
    pub fn apply(&mut self, action: Action) -> GameResult<Outcome> {
        Ok(match action {
            Action::SelectPlayer { player } => self.select_player(player)?,
            Action::Claim { cell } => self.claim(cell),
            Action::SelectCell { cell } => self.select_cell(cell),
            Action::Swap { target } => self.swap(target),
            Action::Click { cell } => self.click(cell),
        })
    }

    /// Make `player` the acting player and clear any pending selection.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] if `player` is out of range.
    pub fn select_player(&mut self, player: PlayerId) -> GameResult<Outcome> {
        if player >= self.config.num_players {
            return Err(GameError::InvalidPlayer {
                player,
                num_players: self.config.num_players,
            });
        }

        self.active_player = player;
        self.selected_cell = None;
        tracing::debug!(player, "player selected");
        Ok(self.commit(Outcome::PlayerSelected { player }))
    }

    /// Claim an available cell for the acting player.
    pub fn claim(&mut self, cell: CellIndex) -> Outcome {
        if !self.board.topology().contains(cell) {
            return reject(Rejection::CellOutOfBounds { cell });
        }
        if let Some(owner) = self.board.owner(cell) {
            return reject(Rejection::CellOccupied { cell, owner });
        }
        if !self.available.contains(&cell) {
            return reject(Rejection::CellUnavailable { cell });
        }

        let actor = self.active_player;
        let weights_before = self.weights();

        self.board.set_owner(cell, Some(actor));
        match self.config.cluster_strategy {
            ClusterStrategy::Incremental => {
                let idx = usize::from(actor);
                absorb_claim(
                    &mut self.players[idx].clusters,
                    &self.board,
                    actor,
                    cell,
                    &mut self.factory,
                );
                self.players[idx].refresh_weight();
            }
            ClusterStrategy::FullRecompute => self.rebuild_player(actor),
        }

        let settlement = settle(
            &mut self.players,
            &mut self.treasury,
            actor,
            ActionKind::Claim,
            self.config.pricing(),
            &weights_before,
        );
        self.available = available_cells(&self.board);

        tracing::debug!(
            cell,
            player = actor,
            bootstrap = settlement.bootstrap,
            treasury = self.treasury,
            "cell claimed"
        );
        self.commit(Outcome::Claimed { cell, settlement })
    }

    /// Select one of the acting player's cells as the swap source.
    ///
    /// Selecting the already selected cell clears the selection.
    pub fn select_cell(&mut self, cell: CellIndex) -> Outcome {
        if !self.board.topology().contains(cell) {
            return reject(Rejection::CellOutOfBounds { cell });
        }
        if self.board.owner(cell) != Some(self.active_player) {
            return reject(Rejection::NotOwnedByActivePlayer { cell });
        }

        if self.selected_cell == Some(cell) {
            self.selected_cell = None;
            tracing::debug!(cell, "selection cleared");
            self.commit(Outcome::SelectionCleared { cell })
        } else {
            self.selected_cell = Some(cell);
            tracing::debug!(cell, "cell selected");
            self.commit(Outcome::CellSelected { cell })
        }
    }

    /// Exchange the selected cell with `target`.
    ///
    /// The acting player pays the swap fee. The owner of `target` receives
    /// the selected cell in exchange.
    pub fn swap(&mut self, target: CellIndex) -> Outcome {
        let Some(source) = self.selected_cell else {
            return reject(Rejection::NoSelection);
        };
        if !self.board.topology().contains(target) {
            return reject(Rejection::CellOutOfBounds { cell: target });
        }
        if source == target {
            return reject(Rejection::SameCell { cell: target });
        }
        let Some(displaced) = self.board.owner(target) else {
            return reject(Rejection::TargetUnclaimed { cell: target });
        };

        let actor = self.active_player;
        let weights_before = self.weights();
        let settlement = settle(
            &mut self.players,
            &mut self.treasury,
            actor,
            ActionKind::Swap,
            self.config.pricing(),
            &weights_before,
        );

        self.board.swap_owners(source, target);
        self.rebuild_player(actor);
        if displaced != actor {
            self.rebuild_player(displaced);
        }
        self.selected_cell = None;

        tracing::debug!(source, target, player = actor, displaced, "cells swapped");
        self.commit(Outcome::Swapped {
            source,
            target,
            displaced,
            settlement,
        })
    }

    /// Route a click on `cell` the way a board UI would.
    ///
    /// - selection pending, clicked a claimed cell: swap (the selected cell
    ///   itself is rejected as [`Rejection::SameCell`])
    /// - clicked one of the acting player's cells: select it
    /// - clicked another player's cell: rejected
    /// - clicked an unclaimed cell: claim
    pub fn click(&mut self, cell: CellIndex) -> Outcome {
        if !self.board.topology().contains(cell) {
            return reject(Rejection::CellOutOfBounds { cell });
        }

        match (self.selected_cell, self.board.owner(cell)) {
            (Some(_), Some(_)) => self.swap(cell),
            (None, Some(owner)) if owner == self.active_player => self.select_cell(cell),
            (None, Some(owner)) => reject(Rejection::ClaimedByOtherPlayer { cell, owner }),
            (_, None) => self.claim(cell),
        }
    }

    /// Recompute one player's clusters and weight from the board.
    fn rebuild_player(&mut self, player: PlayerId) {
        let idx = usize::from(player);
        let rebuilt = rebuild_clusters(
            &self.players[idx].clusters,
            &self.board,
            player,
            &mut self.factory,
        );
        self.players[idx].clusters = rebuilt;
        self.players[idx].refresh_weight();
    }

    /// Finish an applied operation: check invariants and notify listeners.
    fn commit(&mut self, outcome: Outcome) -> Outcome {
        #[cfg(debug_assertions)]
        crate::game::assert_invariants(&self.snapshot());

        if !self.listeners.is_empty() {
            let snapshot = self.snapshot();
            self.listeners.notify(&snapshot);
        }
        outcome
    }
}

fn reject(rejection: Rejection) -> Outcome {
    tracing::trace!(%rejection, "operation rejected");
    Outcome::from(rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ColorScheme;

    const EPS: f64 = 1e-9;

    fn game() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    fn small_game(num_players: u8) -> GameState {
        GameState::new(GameConfig {
            grid_size: 5,
            num_players,
            ..GameConfig::default()
        })
        .unwrap()
    }

    fn claim_as(game: &mut GameState, player: PlayerId, cell: CellIndex) {
        game.select_player(player).unwrap();
        assert!(game.claim(cell).is_applied(), "claim of {cell} by {player} failed");
    }

    #[test]
    fn test_new_game() {
        let g = game();
        assert_eq!(g.players().len(), 10);
        assert_eq!(g.available_cells().len(), 400);
        assert_eq!(g.active_player(), 0);
        assert!(g.selected_cell().is_none());
        assert!(g.treasury().abs() < EPS);
    }

    #[test]
    fn test_invalid_config() {
        let err = GameState::new(GameConfig {
            num_players: 0,
            ..GameConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, GameError::Config(_)));
    }

    #[test]
    fn test_select_player() {
        let mut g = game();
        assert_eq!(g.select_player(9).unwrap(), Outcome::PlayerSelected { player: 9 });
        assert_eq!(g.active_player(), 9);
        assert!(matches!(
            g.select_player(10),
            Err(GameError::InvalidPlayer { player: 10, num_players: 10 })
        ));
        assert_eq!(g.active_player(), 9);
    }

    #[test]
    fn test_first_claim_bootstraps_treasury() {
        let mut g = game();
        let outcome = g.claim(210);
        let settlement = outcome.settlement().unwrap();

        assert!(settlement.bootstrap);
        assert!((g.treasury() - 5.0).abs() < EPS);
        assert!((g.players()[0].spent - 5.0).abs() < EPS);
        assert!(g.players().iter().all(|p| p.earned.abs() < EPS));
        assert!((g.players()[0].weight - 1.0).abs() < EPS);
        assert_eq!(
            g.available_cells().iter().copied().collect::<Vec<_>>(),
            vec![190, 209, 211, 230]
        );
    }

    #[test]
    fn test_second_claim_uses_pre_claim_weights() {
        let mut g = game();
        g.claim(210);
        g.claim(211);

        // Only player 0 had weight before the second claim, so they receive
        // the whole distributable part.
        let p0 = &g.players()[0];
        assert!((p0.spent - 10.0).abs() < EPS);
        assert!((p0.earned - 4.5).abs() < EPS);
        assert!((p0.balance + 5.5).abs() < EPS);
        assert!((g.treasury() - 5.5).abs() < EPS);
        assert!((p0.weight - 2.4).abs() < EPS);
    }

    #[test]
    fn test_claim_rejections() {
        let mut g = game();
        g.claim(210);

        assert_eq!(
            g.claim(210).rejection(),
            Some(Rejection::CellOccupied { cell: 210, owner: 0 })
        );
        assert_eq!(g.claim(0).rejection(), Some(Rejection::CellUnavailable { cell: 0 }));
        assert_eq!(g.claim(400).rejection(), Some(Rejection::CellOutOfBounds { cell: 400 }));
    }

    #[test]
    fn test_rejection_leaves_snapshot_unchanged() {
        let mut g = game();
        g.claim(210);
        g.select_player(1).unwrap();
        let before = g.snapshot();

        let _ = g.claim(210);
        let _ = g.claim(5);
        let _ = g.select_cell(210);
        let _ = g.swap(211);

        assert_eq!(g.snapshot(), before);
    }

    #[test]
    fn test_select_cell_toggle() {
        let mut g = game();
        g.claim(210);
        assert_eq!(g.select_cell(210), Outcome::CellSelected { cell: 210 });
        assert_eq!(g.selected_cell(), Some(210));
        assert_eq!(g.select_cell(210), Outcome::SelectionCleared { cell: 210 });
        assert!(g.selected_cell().is_none());
    }

    #[test]
    fn test_select_player_clears_selection() {
        let mut g = game();
        g.claim(210);
        let _ = g.select_cell(210);
        g.select_player(0).unwrap();
        assert!(g.selected_cell().is_none());
    }

    #[test]
    fn test_swap_rejections() {
        let mut g = game();
        g.claim(210);
        assert_eq!(g.swap(210).rejection(), Some(Rejection::NoSelection));

        let _ = g.select_cell(210);
        assert_eq!(g.swap(210).rejection(), Some(Rejection::SameCell { cell: 210 }));
        assert_eq!(g.swap(211).rejection(), Some(Rejection::TargetUnclaimed { cell: 211 }));
        assert_eq!(
            g.swap(500).rejection(),
            Some(Rejection::CellOutOfBounds { cell: 500 })
        );
        assert_eq!(g.selected_cell(), Some(210));
    }

    #[test]
    fn test_swap_exchanges_owners_and_charges_initiator() {
        let mut g = small_game(2);
        claim_as(&mut g, 0, 12);
        claim_as(&mut g, 1, 13);
        let p0_spent = g.players()[0].spent;
        let treasury = g.treasury();

        g.select_player(0).unwrap();
        let _ = g.select_cell(12);
        let outcome = g.swap(13);

        assert!(matches!(
            outcome,
            Outcome::Swapped { source: 12, target: 13, displaced: 1, .. }
        ));
        assert_eq!(g.board().owner(12), Some(1));
        assert_eq!(g.board().owner(13), Some(0));
        assert!((g.players()[0].spent - p0_spent - 1.0).abs() < EPS);
        assert!((g.treasury() - treasury - 0.1).abs() < EPS);
        assert!(g.selected_cell().is_none());
        assert_eq!(g.players()[0].cluster_of(13).map(|c| c.len()), Some(1));
        assert_eq!(g.players()[1].cluster_of(12).map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_swap_does_not_change_availability() {
        let mut g = small_game(2);
        claim_as(&mut g, 0, 12);
        claim_as(&mut g, 1, 13);
        let available = g.available_cells().clone();

        g.select_player(0).unwrap();
        let _ = g.select_cell(12);
        let _ = g.swap(13);
        assert_eq!(g.available_cells(), &available);
    }

    #[test]
    fn test_swap_distributes_on_pre_swap_weights() {
        let mut g = small_game(2);
        claim_as(&mut g, 0, 0);
        claim_as(&mut g, 0, 1);
        claim_as(&mut g, 0, 2);
        claim_as(&mut g, 1, 3);
        claim_as(&mut g, 1, 5);

        let weights_before = g.weights();
        assert!((weights_before[0] - 3.6).abs() < EPS);
        assert!((weights_before[1] - 2.0).abs() < EPS);
        let earned_before: Vec<f64> = g.players().iter().map(|p| p.earned).collect();

        assert_eq!(g.select_cell(5), Outcome::CellSelected { cell: 5 });
        assert!(matches!(g.swap(1), Outcome::Swapped { displaced: 0, .. }));

        // The swap splits player 0 into {0,5} and {2}, so the weights move.
        let weights_after = g.weights();
        assert!((weights_after[0] - 3.4).abs() < EPS);
        assert!((weights_after[1] - 2.0).abs() < EPS);

        let total: f64 = weights_before.iter().sum();
        for (i, player) in g.players().iter().enumerate() {
            let expected = 0.9 * weights_before[i] / total;
            let delta = player.earned - earned_before[i];
            assert!((delta - expected).abs() < EPS, "player {i}: {delta} != {expected}");
        }
    }

    #[test]
    fn test_click_dispatch() {
        let mut g = small_game(2);
        // Unclaimed cell: claim
        assert!(matches!(g.click(12), Outcome::Claimed { cell: 12, .. }));
        // Own cell: select
        assert_eq!(g.click(12), Outcome::CellSelected { cell: 12 });
        // Selected cell again: routed to swap, which rejects it
        let before = g.snapshot();
        assert_eq!(g.click(12).rejection(), Some(Rejection::SameCell { cell: 12 }));
        assert_eq!(g.snapshot(), before);
        assert_eq!(g.selected_cell(), Some(12));
        assert_eq!(g.select_cell(12), Outcome::SelectionCleared { cell: 12 });

        g.select_player(1).unwrap();
        assert!(g.click(13).is_applied());
        g.select_player(0).unwrap();
        // Other player's cell without selection: rejected
        assert_eq!(
            g.click(13).rejection(),
            Some(Rejection::ClaimedByOtherPlayer { cell: 13, owner: 1 })
        );
        // With selection: swap
        let _ = g.click(12);
        assert!(matches!(g.click(13), Outcome::Swapped { .. }));
    }

    #[test]
    fn test_apply_routes_actions() {
        let mut g = small_game(3);
        assert!(g.apply(Action::Claim { cell: 0 }).unwrap().is_applied());
        assert!(g.apply(Action::SelectPlayer { player: 2 }).unwrap().is_applied());
        assert!(g.apply(Action::Click { cell: 1 }).unwrap().is_applied());
        assert_eq!(g.board().owner(1), Some(2));
        assert!(g.apply(Action::SelectPlayer { player: 3 }).is_err());
    }

    #[test]
    fn test_listeners_fire_on_applied_only() {
        use std::sync::{Arc, Mutex};

        let mut g = game();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = g.subscribe(Box::new(move |s: &Snapshot| {
            sink.lock().unwrap().push(s.claimed_count());
        }));

        g.claim(210);
        let _ = g.claim(210);
        g.claim(211);
        assert!(g.unsubscribe(id));
        g.claim(212);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_incremental_strategy_matches_full_recompute() {
        let cells = [12, 13, 7, 17, 11, 6, 8, 18, 16];
        let mut games: Vec<GameState> = [ClusterStrategy::Incremental, ClusterStrategy::FullRecompute]
            .into_iter()
            .map(|strategy| {
                GameState::new(GameConfig {
                    grid_size: 5,
                    num_players: 2,
                    cluster_strategy: strategy,
                    ..GameConfig::default()
                })
                .unwrap()
            })
            .collect();

        for (i, &cell) in cells.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let player = (i % 2) as PlayerId;
            for g in &mut games {
                claim_as(g, player, cell);
            }
        }

        assert_eq!(games[0].snapshot(), games[1].snapshot());
    }

    #[test]
    fn test_player_hue_colors_follow_owner() {
        let mut g = GameState::new(GameConfig {
            grid_size: 5,
            num_players: 2,
            color_scheme: ColorScheme::PlayerHue,
            ..GameConfig::default()
        })
        .unwrap();
        claim_as(&mut g, 0, 0);
        claim_as(&mut g, 1, 1);
        claim_as(&mut g, 0, 2);
        let colors: Vec<_> = g.players()[0].clusters.iter().map(|c| c.color).collect();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0], colors[1]);
    }
}

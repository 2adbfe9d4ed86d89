#![no_main]

//! Action sequence fuzzer.
//!
//! Drives arbitrary operations through the state machine on a small board
//! and checks that every invariant holds and that rejected operations leave
//! the snapshot untouched.

use arbitrary::Arbitrary;
use claimgrid::GameConfig;
use claimgrid::game::{Action, ClusterStrategy, ColorScheme, GameState, check_invariants};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated operation.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzAction {
    SelectPlayer(u8),
    Claim(u16),
    SelectCell(u16),
    Swap(u16),
    Click(u16),
}

impl FuzzAction {
    fn to_action(self) -> Action {
        match self {
            Self::SelectPlayer(player) => Action::SelectPlayer { player },
            Self::Claim(cell) => Action::Claim { cell },
            Self::SelectCell(cell) => Action::SelectCell { cell },
            Self::Swap(target) => Action::Swap { target },
            Self::Click(cell) => Action::Click { cell },
        }
    }
}

/// Structured input for action fuzzing.
#[derive(Arbitrary, Debug)]
struct ActionsInput {
    /// Grid side length (capped).
    grid_size: u8,
    /// Player count (capped).
    num_players: u8,
    /// Use incremental cluster maintenance.
    incremental: bool,
    /// Use player hues instead of random colors.
    player_hue: bool,
    /// Seed for random colors.
    color_seed: u64,
    /// Operations to apply.
    actions: Vec<FuzzAction>,
}

fuzz_target!(|input: ActionsInput| {
    let config = GameConfig {
        grid_size: u16::from(input.grid_size % 8) + 1,
        num_players: input.num_players % 6 + 1,
        cluster_strategy: if input.incremental {
            ClusterStrategy::Incremental
        } else {
            ClusterStrategy::FullRecompute
        },
        color_scheme: if input.player_hue {
            ColorScheme::PlayerHue
        } else {
            ColorScheme::Random
        },
        color_seed: input.color_seed,
        ..GameConfig::default()
    };
    let Ok(mut game) = GameState::new(config) else {
        return;
    };

    for action in input.actions.into_iter().take(200) {
        let before = game.snapshot();
        let applied = matches!(game.apply(action.to_action()), Ok(outcome) if outcome.is_applied());

        let after = game.snapshot();
        if !applied {
            assert_eq!(before, after, "rejected {action:?} changed the game");
        }

        let violations = check_invariants(&after);
        assert!(violations.is_empty(), "{action:?}: {violations:?}");
    }
});

#![no_main]

//! Settlement fuzzer: arbitrary weights, prices and payers.

use arbitrary::Arbitrary;
use claimgrid::game::{ActionKind, Player, Pricing, settle};
use libfuzzer_sys::fuzz_target;

/// Structured input for economy fuzzing.
#[derive(Arbitrary, Debug)]
struct EconomyInput {
    /// Weight per player, scaled down to a sane range.
    weights: Vec<u16>,
    /// Paying player.
    payer: u8,
    /// Settle a swap instead of a claim.
    swap: bool,
    /// Cost in hundredths.
    cost_cents: u16,
    /// Commission in percent (capped at 100).
    commission: u8,
}

fuzz_target!(|input: EconomyInput| {
    let weights: Vec<f64> = input
        .weights
        .iter()
        .take(32)
        .map(|w| f64::from(*w) / 10.0)
        .collect();
    if weights.is_empty() {
        return;
    }

    let mut players: Vec<Player> = (0..weights.len())
        .map(|i| Player::new(u8::try_from(i).unwrap_or(u8::MAX)))
        .collect();
    let payer = input.payer % u8::try_from(players.len()).unwrap_or(u8::MAX);
    let cost = f64::from(input.cost_cents) / 100.0;
    let pricing = Pricing {
        claim_cost: cost,
        swap_cost: cost,
        commission_percent: f64::from(input.commission.min(100)),
    };
    let kind = if input.swap { ActionKind::Swap } else { ActionKind::Claim };

    let mut treasury = 0.0;
    let settlement = settle(&mut players, &mut treasury, payer, kind, pricing, &weights);

    let paid_out: f64 = players.iter().map(|p| p.earned).sum();
    assert!(treasury >= 0.0);
    assert!(players.iter().all(|p| p.earned >= 0.0));
    assert!(players.iter().all(|p| (p.balance - (p.earned - p.spent)).abs() < 1e-9));
    assert!((players[usize::from(payer)].spent - cost).abs() < 1e-9);

    let total_weight: f64 = weights.iter().sum();
    if settlement.bootstrap || total_weight > 0.0 {
        assert!((treasury + paid_out - cost).abs() < 1e-6);
    } else {
        // Nobody to distribute to: only the commission is kept.
        assert!((treasury - settlement.fee.commission).abs() < 1e-9);
        assert!(paid_out.abs() < 1e-12);
    }
});

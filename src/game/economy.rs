//! Economy: fees, commission, and weight-proportional distribution.
//!
//! Every costed action charges its initiator a fee. A fixed percentage of the
//! fee (the commission) goes to the treasury and the remainder is shared
//! among all players in proportion to their weight.
//!
//! # Ordering
//!
//! Shares are computed from the weights as they stood *before* the action
//! changed the board. Distribution rewards the standing board, not the move
//! that paid for it.
//!
//! # Bootstrap
//!
//! The very first claim of a game happens when every weight is zero, so there
//! is nobody to distribute to. The whole fee goes to the treasury instead.

use serde::{Deserialize, Serialize};

use crate::game::{Player, PlayerId};

/// Default cost of claiming a cell.
pub const DEFAULT_CLAIM_COST: f64 = 5.0;

/// Default cost of a swap.
pub const DEFAULT_SWAP_COST: f64 = 1.0;

/// Default share of every fee routed to the treasury, in percent.
pub const DEFAULT_COMMISSION_PERCENT: f64 = 10.0;

/// A monetized action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Claiming an unclaimed cell.
    Claim,
    /// Exchanging ownership of two claimed cells.
    Swap,
}

/// Action costs and commission rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Cost of a claim.
    pub claim_cost: f64,
    /// Cost of a swap.
    pub swap_cost: f64,
    /// Commission in percent of the cost.
    pub commission_percent: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            claim_cost: DEFAULT_CLAIM_COST,
            swap_cost: DEFAULT_SWAP_COST,
            commission_percent: DEFAULT_COMMISSION_PERCENT,
        }
    }
}

impl Pricing {
    /// Cost of an action.
    #[must_use]
    pub const fn cost(&self, kind: ActionKind) -> f64 {
        match kind {
            ActionKind::Claim => self.claim_cost,
            ActionKind::Swap => self.swap_cost,
        }
    }
}

/// A fee broken into commission and distributable remainder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Full cost paid.
    pub cost: f64,
    /// Treasury portion.
    pub commission: f64,
    /// Portion shared among players.
    pub distributable: f64,
}

/// Split `cost` into commission and distributable parts.
#[must_use]
pub fn split_fee(cost: f64, commission_percent: f64) -> FeeSplit {
    let commission = cost * commission_percent / 100.0;
    FeeSplit {
        cost,
        commission,
        distributable: cost - commission,
    }
}

/// Share `amount` across players proportionally to `weights`.
///
/// Returns all zeros when the total weight is zero.
#[must_use]
pub fn distribute(amount: f64, weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return vec![0.0; weights.len()];
    }
    weights.iter().map(|w| amount * w / total).collect()
}

/// Whether an action is the economy's bootstrap move.
///
/// Only a claim made while every weight is still zero qualifies.
#[must_use]
pub fn is_bootstrap(kind: ActionKind, weights: &[f64]) -> bool {
    kind == ActionKind::Claim && weights.iter().all(|w| *w <= 0.0)
}

/// Record of how one action's fee was settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Action that was paid for.
    pub kind: ActionKind,
    /// Player who paid.
    pub payer: PlayerId,
    /// Fee split of the cost.
    pub fee: FeeSplit,
    /// Amount added to the treasury.
    pub treasury_credit: f64,
    /// Amount credited to each player, indexed by player id.
    pub shares: Vec<f64>,
    /// Whether this was the bootstrap move.
    pub bootstrap: bool,
}

impl Settlement {
    /// Sum of all shares paid out.
    #[must_use]
    pub fn distributed(&self) -> f64 {
        self.shares.iter().sum()
    }
}

/// Charge `payer` for an action and distribute the fee.
///
/// `weights_before` must be the per-player weights captured before the
/// action touched the board. Balances of every player are refreshed.
pub fn settle(
    players: &mut [Player],
    treasury: &mut f64,
    payer: PlayerId,
    kind: ActionKind,
    pricing: Pricing,
    weights_before: &[f64],
) -> Settlement {
    let fee = split_fee(pricing.cost(kind), pricing.commission_percent);

    if let Some(player) = players.get_mut(usize::from(payer)) {
        player.spent += fee.cost;
    }

    let bootstrap = is_bootstrap(kind, weights_before);
    let (treasury_credit, shares) = if bootstrap {
        (fee.cost, vec![0.0; players.len()])
    } else {
        if weights_before.iter().sum::<f64>() <= 0.0 {
            tracing::warn!(?kind, payer, "no weight on the board, distributable fee is dropped");
        }
        (fee.commission, distribute(fee.distributable, weights_before))
    };

    *treasury += treasury_credit;
    for (player, share) in players.iter_mut().zip(&shares) {
        player.earned += share;
    }
    refresh_balances(players);

    Settlement {
        kind,
        payer,
        fee,
        treasury_credit,
        shares,
        bootstrap,
    }
}

/// Recompute every player's balance from their ledger.
pub fn refresh_balances(players: &mut [Player]) {
    for player in players {
        player.refresh_balance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn players(n: u8) -> Vec<Player> {
        (0..n).map(Player::new).collect()
    }

    #[test]
    fn test_split_fee_defaults() {
        let claim = split_fee(5.0, 10.0);
        assert!((claim.commission - 0.5).abs() < EPS);
        assert!((claim.distributable - 4.5).abs() < EPS);

        let swap = split_fee(1.0, 10.0);
        assert!((swap.commission - 0.1).abs() < EPS);
        assert!((swap.distributable - 0.9).abs() < EPS);
    }

    #[test]
    fn test_distribute_proportional() {
        let shares = distribute(9.0, &[1.0, 2.0, 0.0]);
        assert!((shares[0] - 3.0).abs() < EPS);
        assert!((shares[1] - 6.0).abs() < EPS);
        assert!(shares[2].abs() < EPS);
    }

    #[test]
    fn test_distribute_zero_weight() {
        let shares = distribute(9.0, &[0.0, 0.0]);
        assert!(shares.iter().all(|s| s.abs() < EPS));
    }

    #[test]
    fn test_bootstrap_claim_goes_to_treasury() {
        let mut ps = players(3);
        let mut treasury = 0.0;
        let s = settle(&mut ps, &mut treasury, 1, ActionKind::Claim, Pricing::default(), &[0.0; 3]);

        assert!(s.bootstrap);
        assert!((treasury - 5.0).abs() < EPS);
        assert!(s.distributed().abs() < EPS);
        assert!((ps[1].spent - 5.0).abs() < EPS);
        assert!((ps[1].balance + 5.0).abs() < EPS);
        assert!(ps.iter().all(|p| p.earned.abs() < EPS));
    }

    #[test]
    fn test_regular_claim_distributes_by_weight() {
        let mut ps = players(3);
        let mut treasury = 5.0;
        let weights = [1.0, 0.0, 2.0];
        let s = settle(&mut ps, &mut treasury, 1, ActionKind::Claim, Pricing::default(), &weights);

        assert!(!s.bootstrap);
        assert!((treasury - 5.5).abs() < EPS);
        assert!((ps[0].earned - 1.5).abs() < EPS);
        assert!(ps[1].earned.abs() < EPS);
        assert!((ps[2].earned - 3.0).abs() < EPS);
        assert!((s.treasury_credit + s.distributed() - 5.0).abs() < EPS);
    }

    #[test]
    fn test_payer_can_earn_back_a_share() {
        let mut ps = players(2);
        let mut treasury = 0.0;
        settle(&mut ps, &mut treasury, 0, ActionKind::Swap, Pricing::default(), &[1.0, 1.0]);

        assert!((ps[0].spent - 1.0).abs() < EPS);
        assert!((ps[0].earned - 0.45).abs() < EPS);
        assert!((ps[0].balance + 0.55).abs() < EPS);
        assert!((treasury - 0.1).abs() < EPS);
    }

    #[test]
    fn test_swap_never_bootstraps() {
        assert!(!is_bootstrap(ActionKind::Swap, &[0.0, 0.0]));
        assert!(is_bootstrap(ActionKind::Claim, &[0.0, 0.0]));
        assert!(!is_bootstrap(ActionKind::Claim, &[0.0, 1.0]));
    }

    #[test]
    fn test_zero_weight_swap_drops_distributable() {
        let mut ps = players(2);
        let mut treasury = 0.0;
        let s = settle(&mut ps, &mut treasury, 0, ActionKind::Swap, Pricing::default(), &[0.0, 0.0]);

        assert!(!s.bootstrap);
        assert!((treasury - 0.1).abs() < EPS);
        assert!(s.distributed().abs() < EPS);
    }
}

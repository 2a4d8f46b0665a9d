//! Leg bets and overall bets.

use leapfrog_protocol::{BetKind, PlayerId};
use serde::Serialize;

use crate::config::{LEG_BET_LOSS, LEG_BETS_PER_FROG, OVERALL_BET_PAYOUTS};

/// A claimable wager on one forward frog's placing at the end of a leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegBet {
    pub frog_idx: usize,
    /// 0 for the first bet claimed on this frog in the round, 1 for the
    /// second, and so on.
    pub claim_order: usize,
    /// `winnings[rank]` is paid when the frog finishes the leg at `rank`
    /// (0 = first place).
    pub winnings: Vec<i32>,
}

impl LegBet {
    /// Builds the bet for the given claim slot. `ranks` is the number of
    /// forward frogs, i.e. the length of the payout table.
    pub fn new(frog_idx: usize, claim_order: usize, ranks: usize) -> Self {
        let (first, second) = match claim_order {
            0 => (5, 3),
            1 => (3, 2),
            _ => (2, 1),
        };
        let mut winnings = vec![LEG_BET_LOSS; ranks];
        if let Some(slot) = winnings.get_mut(0) {
            *slot = first;
        }
        if let Some(slot) = winnings.get_mut(1) {
            *slot = second;
        }
        Self {
            frog_idx,
            claim_order,
            winnings,
        }
    }

    /// The fresh pool for one forward frog, in claim order.
    pub fn pool(frog_idx: usize, ranks: usize) -> Vec<Self> {
        (0..LEG_BETS_PER_FROG)
            .map(|claim| Self::new(frog_idx, claim, ranks))
            .collect()
    }

    /// Gold won (or lost, if negative) for a frog finishing at `rank`.
    pub fn payout(&self, rank: usize) -> i32 {
        self.winnings.get(rank).copied().unwrap_or(LEG_BET_LOSS)
    }
}

/// A whole-race wager on a frog winning or losing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallBet {
    pub frog_idx: usize,
    pub player_id: PlayerId,
}

/// A player's overall-bet status on one frog. Only ever moves from
/// `None` to one of the other two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallBetStatus {
    #[default]
    None,
    Winner,
    Loser,
}

impl From<BetKind> for OverallBetStatus {
    fn from(kind: BetKind) -> Self {
        match kind {
            BetKind::Winner => Self::Winner,
            BetKind::Loser => Self::Loser,
        }
    }
}

/// Payout for the `nth` correct overall bet (0-based, in arrival order).
pub fn overall_bet_payout(nth: usize) -> i32 {
    OVERALL_BET_PAYOUTS[nth.min(OVERALL_BET_PAYOUTS.len() - 1)]
}

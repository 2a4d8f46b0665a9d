//! The update log: one record per observable effect, in causal order.
//!
//! Clients replay these to animate a round and to show who won what.
//! The log only grows during a game; `GameState::reset_game` clears it.

use leapfrog_protocol::{BetKind, Direction, PlayerId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    /// A player moved a frog (and earned the move reward).
    PlayerMoveFrog {
        player_id: PlayerId,
        frog_idx: usize,
        from_tile: usize,
        to_tile: usize,
    },

    PlayerLegBet {
        player_id: PlayerId,
        frog_idx: usize,
    },

    /// A leg bet was settled at the end of a round.
    LegBetWinnings {
        player_id: PlayerId,
        frog_idx: usize,
        frog_placing: usize,
        winnings: i32,
    },

    /// The frog is deliberately left out; overall bets are secret.
    PlayerOverallBet {
        player_id: PlayerId,
        bet_type: BetKind,
    },

    OverallBetWinnings {
        player_id: PlayerId,
        bet_type: BetKind,
        frog_idx: usize,
        winnings: i32,
    },

    PlayerSpectatorTile {
        player_id: PlayerId,
        tile_idx: usize,
        direction: Direction,
    },

    /// A spectator tile caught a frog. `player_id` is the tile's owner.
    SpectatorTileWinnings {
        player_id: PlayerId,
        frog_idx: usize,
        from_tile: usize,
        to_tile: usize,
        winnings: i32,
    },

    #[serde(rename = "end_game_update")]
    GameEnded {
        player_rankings: Vec<PlayerId>,
        winning_frog_idx: usize,
        losing_frog_idx: usize,
    },
}

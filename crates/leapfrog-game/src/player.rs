//! Connections and the players materialized from them.

use leapfrog_protocol::{ConnectionId, ConnectionRole, PlayerId};
use serde::Serialize;

use crate::bet::{LegBet, OverallBetStatus};
use crate::config::INITIAL_GOLD;

/// A socket that joined the session, as a player or a spectator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    #[serde(rename = "websocket_id")]
    pub id: ConnectionId,
    pub name: String,
    pub role: ConnectionRole,
    pub active: bool,
    pub is_host: bool,
}

impl Connection {
    pub fn is_player(&self) -> bool {
        self.role == ConnectionRole::Player
    }

    /// The player id this connection maps to.
    pub fn player_id(&self) -> PlayerId {
        PlayerId::derive(&self.id)
    }
}

/// A participant in a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub connection: Connection,
    pub gold: i32,
    /// Leg bets held this round, in the order claimed.
    pub leg_bets: Vec<LegBet>,
    /// Overall-bet status, indexed by frog.
    pub overall_bets: Vec<OverallBetStatus>,
    /// Tile index of this player's spectator tile, if one is on the track.
    pub spectator_tile: Option<usize>,
}

impl Player {
    pub fn new(connection: Connection) -> Self {
        Self {
            player_id: connection.player_id(),
            connection,
            gold: INITIAL_GOLD,
            leg_bets: Vec::new(),
            overall_bets: Vec::new(),
            spectator_tile: None,
        }
    }

    pub fn overall_bet(&self, frog: usize) -> OverallBetStatus {
        self.overall_bets.get(frog).copied().unwrap_or_default()
    }
}

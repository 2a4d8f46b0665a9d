//! The closed set of actions a client can take in a session.
//!
//! JSON shape, as sent by the browser client:
//!
//! ```text
//! { "type": "leg_bet", "gameCode": "000001", "websocketId": "aB3dE9xY", "frogIdx": 2 }
//! ```
//!
//! `websocketId` is optional on the wire; the server always overwrites it
//! with the id of the socket the event arrived on before dispatching.

use serde::{Deserialize, Serialize};

use crate::{BetKind, ConnectionId, Direction, GameSettings, PlayerId, SessionCode};

/// One client action addressed to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Session the action is addressed to.
    #[serde(rename = "gameCode")]
    pub game_code: SessionCode,

    /// Connection that sent the action. Assigned by the server.
    #[serde(rename = "websocketId", default)]
    pub websocket_id: ConnectionId,

    /// What the client wants to do.
    #[serde(flatten)]
    pub action: Action,
}

impl Event {
    pub fn new(
        game_code: SessionCode,
        websocket_id: ConnectionId,
        action: Action,
    ) -> Self {
        Self {
            game_code,
            websocket_id,
            action,
        }
    }
}

/// Action-specific payload of an [`Event`].
///
/// Internally tagged by `type`; variant names are snake_case and field
/// names camelCase to match the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Action {
    /// Join as a player under the given display name.
    PlayerJoin { player_name: String },

    /// Join as a spectator.
    SpectatorJoin,

    /// Remove a player connection from the lobby.
    KickPlayer { player_id: PlayerId },

    /// Change the race shape for the next game.
    UpdateGameSettings { settings: GameSettings },

    /// Build the track and frogs and open the first round.
    StartGame,

    /// Move a random not-yet-moved frog.
    MoveFrog,

    /// Claim the next leg bet on a frog.
    LegBet { frog_idx: usize },

    /// Bet on a frog winning or losing the whole race.
    OverallBet { frog_idx: usize, bet_type: BetKind },

    /// Place a spectator tile on the track.
    SpectatorTile {
        tile_idx: usize,
        #[serde(rename = "displacement")]
        direction: Direction,
    },

    /// Return the session to the lobby.
    EndGame,

    /// The sender's socket closed. Emitted by the server, not by clients.
    Disconnect,
}

impl Action {
    /// The wire tag of this action, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayerJoin { .. } => "player_join",
            Self::SpectatorJoin => "spectator_join",
            Self::KickPlayer { .. } => "kick_player",
            Self::UpdateGameSettings { .. } => "update_game_settings",
            Self::StartGame => "start_game",
            Self::MoveFrog => "move_frog",
            Self::LegBet { .. } => "leg_bet",
            Self::OverallBet { .. } => "overall_bet",
            Self::SpectatorTile { .. } => "spectator_tile",
            Self::EndGame => "end_game",
            Self::Disconnect => "disconnect",
        }
    }

    /// Returns `true` for the two join actions.
    pub fn is_join(&self) -> bool {
        matches!(self, Self::PlayerJoin { .. } | Self::SpectatorJoin)
    }
}

//! Error types for the rules engine.

use leapfrog_protocol::{ConnectionId, PlayerId};

use crate::Phase;

/// A rejected game operation.
///
/// Every variant is a precondition failure: the operation was refused
/// before anything was mutated. Callers that check turn order and tile
/// eligibility up front should never see most of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("operation not allowed while the session is in {0}")]
    WrongPhase(Phase),

    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("connection {0} is not part of this session")]
    UnknownConnection(ConnectionId),

    #[error("player {0} is not part of this session")]
    UnknownPlayer(PlayerId),

    #[error("frog {0} does not exist")]
    FrogOutOfRange(usize),

    /// Only forward frogs are ranked, so only they take bets.
    #[error("frog {0} runs backwards and takes no bets")]
    NotForwardFrog(usize),

    #[error("tile {0} does not exist")]
    TileOutOfRange(usize),

    #[error("tile {0} cannot hold a spectator tile")]
    IneligibleTile(usize),

    #[error("player {0} already has a spectator tile on the track")]
    AlreadyPlacedTile(PlayerId),

    #[error("player {0} already has an overall bet on frog {1}")]
    AlreadyBet(PlayerId, usize),

    #[error("no leg bets left on frog {0} this round")]
    LegBetsExhausted(usize),

    #[error("every frog has already moved this round")]
    NoUnmovedFrogs,

    #[error("at least one player is needed to start")]
    NoPlayers,

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("track and frogs have not been created")]
    NotReady,
}

impl GameError {
    /// Stable snake_case reason code for client-facing rejections.
    pub fn code(&self) -> &'static str {
        match self {
            Self::WrongPhase(_) => "wrong_phase",
            Self::NotYourTurn(_) => "not_your_turn",
            Self::UnknownConnection(_) => "unknown_connection",
            Self::UnknownPlayer(_) => "unknown_player",
            Self::FrogOutOfRange(_) => "frog_out_of_range",
            Self::NotForwardFrog(_) => "not_forward_frog",
            Self::TileOutOfRange(_) => "tile_out_of_range",
            Self::IneligibleTile(_) => "ineligible_tile",
            Self::AlreadyPlacedTile(_) => "already_placed_tile",
            Self::AlreadyBet(..) => "already_bet",
            Self::LegBetsExhausted(_) => "leg_bets_exhausted",
            Self::NoUnmovedFrogs => "no_unmoved_frogs",
            Self::NoPlayers => "no_players",
            Self::InvalidSettings(_) => "invalid_settings",
            Self::NotReady => "not_ready",
        }
    }
}

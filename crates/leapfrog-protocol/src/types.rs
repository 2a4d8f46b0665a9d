//! Identity newtypes and small wire enums shared by every layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The short code that addresses one game session (e.g. `"000001"`).
///
/// Serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(String);

impl SessionCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Opaque per-connection token issued by the server when a socket is
/// accepted. Clients echo it back to resume after a reconnect.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no id has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Stable identifier of a player inside a session.
///
/// Always derived from the connection id with [`PlayerId::derive`], so a
/// client that reconnects with the same connection id maps back to the same
/// player. The value is the first four bytes of the SHA-256 digest of the
/// connection id, as eight lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Number of hex characters in a derived id.
    pub const LEN: usize = 8;

    /// Derives the player id for a connection.
    pub fn derive(connection_id: &ConnectionId) -> Self {
        let digest = Sha256::digest(connection_id.as_str().as_bytes());
        Self(hex::encode(&digest[..Self::LEN / 2]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Small wire enums
// ---------------------------------------------------------------------------

/// Whether a connection takes part in the game or only watches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRole {
    Player,
    Spectator,
}

/// Which end of the race an overall bet is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    Winner,
    Loser,
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner => f.write_str("winner"),
            Self::Loser => f.write_str("loser"),
        }
    }
}

/// The push a spectator tile gives to the frog it catches.
///
/// On the wire this is the plain integer `1` or `-1`; any other value is
/// rejected while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Signed tile offset for this direction.
    pub fn offset(self) -> i32 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Backward),
            other => Err(format!("displacement must be 1 or -1, got {other}")),
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

// ---------------------------------------------------------------------------
// GameSettings
// ---------------------------------------------------------------------------

/// Host-adjustable shape of a race.
///
/// Sent inside `update_game_settings` events; omitted fields take their
/// defaults. Range checks live with the rules engine, which is the only
/// place that knows how many names and colors it can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Number of tiles on the track, start and finish included.
    pub num_tiles: usize,
    /// Frogs racing from the start towards the finish.
    pub num_forward_frogs: usize,
    /// Frogs racing from the finish back towards the start.
    pub num_backward_frogs: usize,
    /// Frogs that must move before a round is settled.
    pub frogs_per_round: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            num_tiles: 17,
            num_forward_frogs: 5,
            num_backward_frogs: 2,
            frogs_per_round: 5,
        }
    }
}

impl GameSettings {
    /// Total number of frogs on the track.
    pub fn total_frogs(&self) -> usize {
        self.num_forward_frogs + self.num_backward_frogs
    }
}

//! Track pieces: frogs, tiles, and spectator tiles.

use leapfrog_protocol::{Direction, PlayerId};
use serde::Serialize;

use crate::config::{BACKWARD_MOVES, FORWARD_MOVES};

/// One racer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frog {
    pub idx: usize,
    pub name: String,
    pub color: String,
    pub start_tile: usize,
    /// Forward frogs race from tile 0 to the finish and are the only ones
    /// ranked for betting.
    pub is_forward_frog: bool,
    /// Legal signed move magnitudes.
    pub moves: Vec<i32>,
}

impl Frog {
    pub fn forward(idx: usize, name: &str, color: &str) -> Self {
        Self {
            idx,
            name: name.to_string(),
            color: color.to_string(),
            start_tile: 0,
            is_forward_frog: true,
            moves: FORWARD_MOVES.to_vec(),
        }
    }

    pub fn backward(idx: usize, name: &str, color: &str, last_tile: usize) -> Self {
        Self {
            idx,
            name: name.to_string(),
            color: color.to_string(),
            start_tile: last_tile,
            is_forward_frog: false,
            moves: BACKWARD_MOVES.to_vec(),
        }
    }
}

/// A placed spectator tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpectatorTile {
    pub player_id: PlayerId,
    pub player_name: String,
    pub direction: Direction,
}

/// One cell of the track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tile {
    /// Frogs on this tile in arrival order: index 0 is the bottom of the
    /// stack, the last entry arrived most recently.
    pub frogs: Vec<usize>,
    pub spectator_tile: Option<SpectatorTile>,
}

impl Tile {
    pub fn has_frogs(&self) -> bool {
        !self.frogs.is_empty()
    }

    pub fn has_spectator_tile(&self) -> bool {
        self.spectator_tile.is_some()
    }

    /// Removes `frog` from the stack, returning whether it was here.
    pub(crate) fn remove_frog(&mut self, frog: usize) -> bool {
        match self.frogs.iter().position(|&f| f == frog) {
            Some(pos) => {
                self.frogs.remove(pos);
                true
            }
            None => false,
        }
    }
}

//! The authoritative state of one session and the rules that change it.
//!
//! Only the session's actor ever holds a `&mut GameState`, so none of the
//! operations here need to think about concurrency. What they do need to
//! guarantee is that a rejected operation leaves the state untouched: every
//! method validates phase, turn, and indices first and only then mutates.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use leapfrog_protocol::{
    BetKind, ConnectionId, ConnectionRole, Direction, GameSettings, PlayerId, SessionCode,
};
use serde::Serialize;

use crate::GameError;
use crate::bet::{LegBet, OverallBet, OverallBetStatus, overall_bet_payout};
use crate::board::{Frog, SpectatorTile, Tile};
use crate::config::{
    self, FROG_COLORS, FROG_NAMES, MOVE_REWARD, OVERALL_BET_STAKE, SPECTATOR_TILE_FEE,
};
use crate::player::{Connection, Player};
use crate::rng::GameRng;
use crate::update::Update;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Lifecycle of a session.
///
/// ```text
/// Lobby ──(start_game)──→ Game ──(forward frog finishes)──→ Ended
///   ↑                                                        │
///   └───────────────────────(end_game)───────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Lobby,
    Game,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => f.write_str("lobby"),
            Self::Game => f.write_str("game"),
            Self::Ended => f.write_str("ended"),
        }
    }
}

/// Final standings, filled in when a forward frog reaches the finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndGameStats {
    /// Players by final gold, richest first.
    pub player_rankings: Vec<PlayerId>,
    pub winner: Player,
    pub winning_frog_idx: usize,
    pub losing_frog_idx: usize,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Everything one session knows: who is connected, the race, the bets,
/// and the update log.
///
/// Serialized in full for every snapshot; the random source is skipped.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    game_code: SessionCode,
    #[serde(rename = "state")]
    phase: Phase,
    settings: GameSettings,
    round: u32,
    connections: Vec<Connection>,
    players: BTreeMap<PlayerId, Player>,
    turn_order: Vec<PlayerId>,
    current_turn: Option<PlayerId>,
    track: Vec<Tile>,
    frogs: Vec<Frog>,
    unmoved_frogs: BTreeSet<usize>,
    /// Unclaimed leg bets per frog, front = next to be claimed. Empty for
    /// backward frogs.
    leg_bets: Vec<VecDeque<LegBet>>,
    overall_win_bets: Vec<OverallBet>,
    overall_lose_bets: Vec<OverallBet>,
    /// Tiles that would currently accept a spectator tile.
    spectator_tile_slots: Vec<usize>,
    updates: Vec<Update>,
    end_game_stats: Option<EndGameStats>,
    #[serde(skip)]
    rng: GameRng,
}

impl GameState {
    /// Creates an empty lobby with an OS-seeded random source.
    pub fn new(game_code: SessionCode) -> Self {
        Self::with_rng(game_code, GameRng::from_entropy())
    }

    /// Creates an empty lobby that draws all randomness from `rng`.
    pub fn with_rng(game_code: SessionCode, rng: GameRng) -> Self {
        Self {
            game_code,
            phase: Phase::Lobby,
            settings: GameSettings::default(),
            round: 0,
            connections: Vec::new(),
            players: BTreeMap::new(),
            turn_order: Vec::new(),
            current_turn: None,
            track: Vec::new(),
            frogs: Vec::new(),
            unmoved_frogs: BTreeSet::new(),
            leg_bets: Vec::new(),
            overall_win_bets: Vec::new(),
            overall_lose_bets: Vec::new(),
            spectator_tile_slots: Vec::new(),
            updates: Vec::new(),
            end_game_stats: None,
            rng,
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn game_code(&self) -> &SessionCode {
        &self.game_code
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.id == id)
    }

    pub fn has_connection(&self, id: &ConnectionId) -> bool {
        self.connection(id).is_some()
    }

    pub fn players(&self) -> &BTreeMap<PlayerId, Player> {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn turn_order(&self) -> &[PlayerId] {
        &self.turn_order
    }

    pub fn current_turn(&self) -> Option<&PlayerId> {
        self.current_turn.as_ref()
    }

    pub fn track(&self) -> &[Tile] {
        &self.track
    }

    pub fn frogs(&self) -> &[Frog] {
        &self.frogs
    }

    pub fn unmoved_frogs(&self) -> &BTreeSet<usize> {
        &self.unmoved_frogs
    }

    /// Unclaimed leg bets on `frog`, next claim first.
    pub fn leg_bet_pool(&self, frog: usize) -> Option<&VecDeque<LegBet>> {
        self.leg_bets.get(frog)
    }

    pub fn overall_win_bets(&self) -> &[OverallBet] {
        &self.overall_win_bets
    }

    pub fn overall_lose_bets(&self) -> &[OverallBet] {
        &self.overall_lose_bets
    }

    pub fn spectator_tile_slots(&self) -> &[usize] {
        &self.spectator_tile_slots
    }

    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    pub fn end_game_stats(&self) -> Option<&EndGameStats> {
        self.end_game_stats.as_ref()
    }

    /// Tile currently holding `frog`.
    pub fn frog_position(&self, frog: usize) -> Option<usize> {
        self.track.iter().position(|tile| tile.frogs.contains(&frog))
    }

    // -- Lobby -------------------------------------------------------------

    /// Registers a connection. The first player connection becomes host.
    ///
    /// A connection id that is already known is reactivated instead of
    /// added twice, which is how a reconnecting client gets its seat back.
    pub fn add_connection(
        &mut self,
        id: ConnectionId,
        role: ConnectionRole,
        name: impl Into<String>,
    ) {
        if let Some(existing) = self.connections.iter_mut().find(|c| c.id == id) {
            existing.active = true;
            tracing::debug!(code = %self.game_code, connection_id = %id, "connection rejoined");
            return;
        }

        let is_host =
            role == ConnectionRole::Player && !self.connections.iter().any(Connection::is_player);
        tracing::debug!(code = %self.game_code, connection_id = %id, ?role, is_host, "connection added");
        self.connections.push(Connection {
            id,
            name: name.into(),
            role,
            active: true,
            is_host,
        });
    }

    pub fn set_connection_active(
        &mut self,
        id: &ConnectionId,
        active: bool,
    ) -> Result<(), GameError> {
        let connection = self
            .connections
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| GameError::UnknownConnection(id.clone()))?;
        connection.active = active;
        Ok(())
    }

    /// Kicks a player connection out of the lobby. If it was the host, the
    /// next player connection in join order becomes host.
    pub fn remove_connection(&mut self, player_id: &PlayerId) -> Result<Connection, GameError> {
        self.require_phase(Phase::Lobby)?;
        let pos = self
            .connections
            .iter()
            .position(|c| c.is_player() && &c.player_id() == player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.clone()))?;

        let removed = self.connections.remove(pos);
        if removed.is_host {
            if let Some(next) = self.connections.iter_mut().find(|c| c.is_player()) {
                next.is_host = true;
            }
        }
        tracing::info!(code = %self.game_code, %player_id, "player kicked");
        Ok(removed)
    }

    pub fn update_settings(&mut self, settings: GameSettings) -> Result<(), GameError> {
        self.require_phase(Phase::Lobby)?;
        config::validate_settings(&settings).map_err(GameError::InvalidSettings)?;
        self.settings = settings;
        Ok(())
    }

    /// Clears everything a game builds up, keeping connections and
    /// settings. Safe to call repeatedly.
    pub fn reset_game(&mut self) {
        self.round = 0;
        self.players.clear();
        self.turn_order.clear();
        self.current_turn = None;
        self.track.clear();
        self.frogs.clear();
        self.unmoved_frogs.clear();
        self.leg_bets.clear();
        self.overall_win_bets.clear();
        self.overall_lose_bets.clear();
        self.spectator_tile_slots.clear();
        self.updates.clear();
        self.end_game_stats = None;
    }

    /// Returns to the lobby without clearing anything.
    pub fn to_lobby(&mut self) {
        self.phase = Phase::Lobby;
    }

    // -- Setup -------------------------------------------------------------

    /// One player per player connection, then a random turn order.
    pub fn create_players(&mut self) -> Result<(), GameError> {
        let players: Vec<Player> = self
            .connections
            .iter()
            .filter(|c| c.is_player())
            .cloned()
            .map(Player::new)
            .collect();
        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let mut order: Vec<PlayerId> = players.iter().map(|p| p.player_id.clone()).collect();
        self.rng.shuffle(&mut order);

        self.players = players
            .into_iter()
            .map(|p| (p.player_id.clone(), p))
            .collect();
        self.current_turn = order.first().cloned();
        self.turn_order = order;
        Ok(())
    }

    pub fn create_track(&mut self) {
        self.track = vec![Tile::default(); self.settings.num_tiles];
    }

    /// Builds the frogs with shuffled names and colors. Forward frogs take
    /// the low indices.
    pub fn create_frogs(&mut self) {
        let mut names = FROG_NAMES.to_vec();
        let mut colors = FROG_COLORS.to_vec();
        self.rng.shuffle(&mut names);
        self.rng.shuffle(&mut colors);

        let last_tile = self.settings.num_tiles.saturating_sub(1);
        let forward = self.settings.num_forward_frogs;
        self.frogs = names
            .into_iter()
            .zip(colors)
            .take(self.settings.total_frogs())
            .enumerate()
            .map(|(idx, (name, color))| {
                if idx < forward {
                    Frog::forward(idx, name, color)
                } else {
                    Frog::backward(idx, name, color, last_tile)
                }
            })
            .collect();

        let frog_count = self.frogs.len();
        self.leg_bets = vec![VecDeque::new(); frog_count];
        for player in self.players.values_mut() {
            player.overall_bets = vec![OverallBetStatus::None; frog_count];
        }
    }

    /// Puts every frog on its start tile, moves each once in random order
    /// to spread the field, and opens round one.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.require_phase(Phase::Lobby)?;
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if self.track.is_empty() || self.frogs.is_empty() {
            return Err(GameError::NotReady);
        }

        for tile in &mut self.track {
            tile.frogs.clear();
            tile.spectator_tile = None;
        }
        for frog in &self.frogs {
            if let Some(tile) = self.track.get_mut(frog.start_tile) {
                tile.frogs.push(frog.idx);
            }
        }

        let mut seed_order: Vec<usize> = (0..self.frogs.len()).collect();
        self.rng.shuffle(&mut seed_order);
        for frog in seed_order {
            self.step_frog(frog);
        }

        self.phase = Phase::Game;
        self.next_round();
        tracing::info!(
            code = %self.game_code,
            players = self.players.len(),
            frogs = self.frogs.len(),
            tiles = self.track.len(),
            "game started"
        );
        Ok(())
    }

    /// The full `start_game` event: reset, build, and start in one go.
    ///
    /// Preconditions are checked before the reset so a refused start
    /// leaves the lobby as it was.
    pub fn start_new_game(&mut self) -> Result<(), GameError> {
        self.require_phase(Phase::Lobby)?;
        config::validate_settings(&self.settings).map_err(GameError::InvalidSettings)?;
        if !self.connections.iter().any(Connection::is_player) {
            return Err(GameError::NoPlayers);
        }

        self.reset_game();
        self.create_players()?;
        self.create_track();
        self.create_frogs();
        self.start_game()
    }

    // -- Turns -------------------------------------------------------------

    /// `true` iff it is this connection's player's turn.
    pub fn check_turn(&self, connection_id: &ConnectionId) -> bool {
        self.phase == Phase::Game
            && self.current_turn.as_ref() == Some(&PlayerId::derive(connection_id))
    }

    /// Moves a random not-yet-moved frog for the player whose turn it is.
    pub fn move_frog(&mut self, connection_id: &ConnectionId) -> Result<(), GameError> {
        let player_id = self.require_turn(connection_id)?;
        let candidates: Vec<usize> = self.unmoved_frogs.iter().copied().collect();
        let frog = *self
            .rng
            .choose(&candidates)
            .ok_or(GameError::NoUnmovedFrogs)?;
        let (from, to) = self.step_frog(frog).ok_or(GameError::FrogOutOfRange(frog))?;

        self.unmoved_frogs.remove(&frog);
        self.updates.push(Update::PlayerMoveFrog {
            player_id: player_id.clone(),
            frog_idx: frog,
            from_tile: from,
            to_tile: to,
        });
        // The landing tile's neighbours never hold spectator tiles, so one
        // resolution is all a move can trigger.
        self.resolve_spectator_tile(to);
        self.credit(&player_id, MOVE_REWARD);
        self.advance_turn();

        if self.forward_frog_finished() {
            self.end_game();
        } else if self.unmoved_frogs.len() <= self.round_threshold() {
            self.next_round();
        } else {
            self.refresh_spectator_tile_slots();
        }
        Ok(())
    }

    /// Claims the next leg bet on `frog` for the player whose turn it is.
    pub fn make_leg_bet(
        &mut self,
        connection_id: &ConnectionId,
        frog: usize,
    ) -> Result<(), GameError> {
        let player_id = self.require_turn(connection_id)?;
        self.require_forward_frog(frog)?;
        let bet = self
            .leg_bets
            .get_mut(frog)
            .and_then(VecDeque::pop_front)
            .ok_or(GameError::LegBetsExhausted(frog))?;

        if let Some(player) = self.players.get_mut(&player_id) {
            player.leg_bets.push(bet);
        }
        self.updates.push(Update::PlayerLegBet {
            player_id,
            frog_idx: frog,
        });
        self.advance_turn();
        Ok(())
    }

    /// Records a winner or loser bet. One overall bet per frog per player.
    pub fn make_overall_bet(
        &mut self,
        connection_id: &ConnectionId,
        frog: usize,
        kind: BetKind,
    ) -> Result<(), GameError> {
        let player_id = self.require_turn(connection_id)?;
        self.require_forward_frog(frog)?;
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.clone()))?;
        let status = player
            .overall_bets
            .get_mut(frog)
            .ok_or(GameError::FrogOutOfRange(frog))?;
        if *status != OverallBetStatus::None {
            return Err(GameError::AlreadyBet(player_id, frog));
        }
        *status = kind.into();

        let bet = OverallBet {
            frog_idx: frog,
            player_id: player_id.clone(),
        };
        match kind {
            BetKind::Winner => self.overall_win_bets.push(bet),
            BetKind::Loser => self.overall_lose_bets.push(bet),
        }
        self.updates.push(Update::PlayerOverallBet {
            player_id,
            bet_type: kind,
        });
        self.advance_turn();
        Ok(())
    }

    /// Places the player's spectator tile on an eligible tile.
    pub fn place_spectator_tile(
        &mut self,
        connection_id: &ConnectionId,
        tile_idx: usize,
        direction: Direction,
    ) -> Result<(), GameError> {
        let player_id = self.require_turn(connection_id)?;
        if tile_idx >= self.track.len() {
            return Err(GameError::TileOutOfRange(tile_idx));
        }
        let player = self
            .players
            .get(&player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.clone()))?;
        if player.spectator_tile.is_some() {
            return Err(GameError::AlreadyPlacedTile(player_id));
        }
        if !self.is_valid_spectator_tile_placement(tile_idx) {
            return Err(GameError::IneligibleTile(tile_idx));
        }
        let player_name = player.connection.name.clone();

        self.track[tile_idx].spectator_tile = Some(SpectatorTile {
            player_id: player_id.clone(),
            player_name,
            direction,
        });
        if let Some(player) = self.players.get_mut(&player_id) {
            player.spectator_tile = Some(tile_idx);
        }
        self.updates.push(Update::PlayerSpectatorTile {
            player_id,
            tile_idx,
            direction,
        });
        self.advance_turn();
        self.refresh_spectator_tile_slots();
        Ok(())
    }

    /// A tile is eligible when it is not the first or last tile, holds no
    /// frog and no spectator tile, and neither neighbour holds a spectator
    /// tile.
    pub fn is_valid_spectator_tile_placement(&self, tile_idx: usize) -> bool {
        let Some(last) = self.track.len().checked_sub(1) else {
            return false;
        };
        if tile_idx == 0 || tile_idx >= last {
            return false;
        }
        let tile = &self.track[tile_idx];
        !tile.has_frogs()
            && !tile.has_spectator_tile()
            && !self.track[tile_idx - 1].has_spectator_tile()
            && !self.track[tile_idx + 1].has_spectator_tile()
    }

    /// Forward frogs in race order, leader first.
    ///
    /// Tiles are scanned from the finish backwards; within a tile the most
    /// recent arrival ranks ahead of frogs that were already there.
    pub fn frog_order(&self) -> Vec<usize> {
        self.track
            .iter()
            .rev()
            .flat_map(|tile| tile.frogs.iter().rev())
            .copied()
            .filter(|&frog| self.is_forward(frog))
            .collect()
    }

    // -- Internals ---------------------------------------------------------

    fn require_phase(&self, phase: Phase) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::WrongPhase(self.phase))
        }
    }

    fn require_turn(&self, connection_id: &ConnectionId) -> Result<PlayerId, GameError> {
        self.require_phase(Phase::Game)?;
        let player_id = PlayerId::derive(connection_id);
        if !self.players.contains_key(&player_id) {
            return Err(GameError::UnknownPlayer(player_id));
        }
        if self.current_turn.as_ref() != Some(&player_id) {
            return Err(GameError::NotYourTurn(player_id));
        }
        Ok(player_id)
    }

    fn require_forward_frog(&self, frog: usize) -> Result<(), GameError> {
        match self.frogs.get(frog) {
            None => Err(GameError::FrogOutOfRange(frog)),
            Some(f) if !f.is_forward_frog => Err(GameError::NotForwardFrog(frog)),
            Some(_) => Ok(()),
        }
    }

    fn is_forward(&self, frog: usize) -> bool {
        self.frogs.get(frog).is_some_and(|f| f.is_forward_frog)
    }

    /// `tile + delta`, clamped to the track.
    fn offset_tile(&self, tile: usize, delta: i32) -> usize {
        let last = self.track.len().saturating_sub(1) as i64;
        (tile as i64 + i64::from(delta)).clamp(0, last) as usize
    }

    /// Moves `frog` by one of its legal magnitudes. Returns `(from, to)`.
    fn step_frog(&mut self, frog: usize) -> Option<(usize, usize)> {
        let from = self.frog_position(frog)?;
        let magnitude = *self.rng.choose(&self.frogs.get(frog)?.moves)?;
        let to = self.offset_tile(from, magnitude);
        self.track[from].remove_frog(frog);
        self.track[to].frogs.push(frog);
        Some((from, to))
    }

    /// Fires the spectator tile on `tile_idx`, if any: the bottom frog is
    /// pushed one tile in the tile's direction and the owner is paid.
    fn resolve_spectator_tile(&mut self, tile_idx: usize) {
        let Some(tile) = self.track.get_mut(tile_idx) else {
            return;
        };
        if tile.frogs.is_empty() {
            return;
        }
        let Some(spectator) = tile.spectator_tile.take() else {
            return;
        };
        let frog = tile.frogs.remove(0);

        let to = self.offset_tile(tile_idx, spectator.direction.offset());
        self.track[to].frogs.push(frog);
        if let Some(owner) = self.players.get_mut(&spectator.player_id) {
            owner.gold += SPECTATOR_TILE_FEE;
            owner.spectator_tile = None;
        }
        tracing::debug!(
            code = %self.game_code,
            owner = %spectator.player_id,
            frog,
            from = tile_idx,
            to,
            "spectator tile triggered"
        );
        self.updates.push(Update::SpectatorTileWinnings {
            player_id: spectator.player_id,
            frog_idx: frog,
            from_tile: tile_idx,
            to_tile: to,
            winnings: SPECTATOR_TILE_FEE,
        });
    }

    fn credit(&mut self, player_id: &PlayerId, amount: i32) {
        if let Some(player) = self.players.get_mut(player_id) {
            player.gold += amount;
        }
    }

    fn advance_turn(&mut self) {
        let Some(current) = &self.current_turn else {
            return;
        };
        let Some(pos) = self.turn_order.iter().position(|id| id == current) else {
            return;
        };
        self.current_turn = self
            .turn_order
            .get((pos + 1) % self.turn_order.len())
            .cloned();
    }

    fn forward_frog_finished(&self) -> bool {
        self.track
            .last()
            .is_some_and(|tile| tile.frogs.iter().any(|&frog| self.is_forward(frog)))
    }

    /// Unmoved-frog count at which the current round is over.
    fn round_threshold(&self) -> usize {
        self.frogs.len().saturating_sub(self.settings.frogs_per_round)
    }

    fn refresh_spectator_tile_slots(&mut self) {
        self.spectator_tile_slots = (0..self.track.len())
            .filter(|&tile| self.is_valid_spectator_tile_placement(tile))
            .collect();
    }

    /// Settles the round's leg bets and opens the next round with fresh
    /// pools, an empty track of spectator tiles, and every frog unmoved.
    fn next_round(&mut self) {
        self.settle_leg_bets();
        self.round += 1;

        let ranks = self.frogs.iter().filter(|f| f.is_forward_frog).count();
        self.leg_bets = self
            .frogs
            .iter()
            .map(|frog| {
                if frog.is_forward_frog {
                    LegBet::pool(frog.idx, ranks).into()
                } else {
                    VecDeque::new()
                }
            })
            .collect();
        for tile in &mut self.track {
            tile.spectator_tile = None;
        }
        for player in self.players.values_mut() {
            player.spectator_tile = None;
        }
        self.unmoved_frogs = (0..self.frogs.len()).collect();
        self.refresh_spectator_tile_slots();
        tracing::debug!(code = %self.game_code, round = self.round, "round opened");
    }

    /// Pays out every held leg bet against the current race order.
    fn settle_leg_bets(&mut self) {
        let order = self.frog_order();
        for player in self.players.values_mut() {
            for bet in player.leg_bets.drain(..) {
                let placing = order
                    .iter()
                    .position(|&frog| frog == bet.frog_idx)
                    .unwrap_or(order.len());
                let winnings = bet.payout(placing);
                player.gold += winnings;
                self.updates.push(Update::LegBetWinnings {
                    player_id: player.player_id.clone(),
                    frog_idx: bet.frog_idx,
                    frog_placing: placing,
                    winnings,
                });
            }
        }
    }

    /// Final settlement: last leg bets, overall bets, rankings.
    fn end_game(&mut self) {
        self.settle_leg_bets();
        let order = self.frog_order();
        let (Some(&winning_frog), Some(&losing_frog)) = (order.first(), order.last()) else {
            return;
        };

        settle_overall_bets(
            &self.overall_win_bets,
            winning_frog,
            BetKind::Winner,
            &mut self.players,
            &mut self.updates,
        );
        settle_overall_bets(
            &self.overall_lose_bets,
            losing_frog,
            BetKind::Loser,
            &mut self.players,
            &mut self.updates,
        );

        // Stable sort: equal gold keeps turn order.
        let mut rankings = self.turn_order.clone();
        rankings.sort_by_key(|id| Reverse(self.players.get(id).map_or(i32::MIN, |p| p.gold)));

        self.updates.push(Update::GameEnded {
            player_rankings: rankings.clone(),
            winning_frog_idx: winning_frog,
            losing_frog_idx: losing_frog,
        });
        let winner = rankings.first().and_then(|id| self.players.get(id)).cloned();
        if let Some(winner) = winner {
            tracing::info!(
                code = %self.game_code,
                winner = %winner.player_id,
                gold = winner.gold,
                winning_frog,
                "game ended"
            );
            self.end_game_stats = Some(EndGameStats {
                player_rankings: rankings,
                winner,
                winning_frog_idx: winning_frog,
                losing_frog_idx: losing_frog,
            });
        }
        self.phase = Phase::Ended;
        self.current_turn = None;
    }
}

/// Pays correct bets by their claim index in `bets` and charges the stake
/// for wrong ones.
fn settle_overall_bets(
    bets: &[OverallBet],
    target_frog: usize,
    kind: BetKind,
    players: &mut BTreeMap<PlayerId, Player>,
    updates: &mut Vec<Update>,
) {
    for (claim_index, bet) in bets.iter().enumerate() {
        let winnings = if bet.frog_idx == target_frog {
            overall_bet_payout(claim_index)
        } else {
            -OVERALL_BET_STAKE
        };
        if let Some(player) = players.get_mut(&bet.player_id) {
            player.gold += winnings;
        }
        updates.push(Update::OverallBetWinnings {
            player_id: bet.player_id.clone(),
            bet_type: kind,
            frog_idx: bet.frog_idx,
            winnings,
        });
    }
}

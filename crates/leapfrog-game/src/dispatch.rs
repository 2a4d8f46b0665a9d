//! Routes a protocol [`Event`] to the matching [`GameState`] operation.

use leapfrog_protocol::{Action, ConnectionRole, Event};

use crate::{GameError, GameState};

impl GameState {
    /// Applies one event sent by `event.websocket_id`.
    ///
    /// On `Err` the state is exactly as it was before the call.
    pub fn apply(&mut self, event: &Event) -> Result<(), GameError> {
        let sender = &event.websocket_id;
        match &event.action {
            Action::PlayerJoin { player_name } => {
                self.add_connection(sender.clone(), ConnectionRole::Player, player_name.clone());
                Ok(())
            }
            Action::SpectatorJoin => {
                self.add_connection(sender.clone(), ConnectionRole::Spectator, "");
                Ok(())
            }
            Action::KickPlayer { player_id } => self.remove_connection(player_id).map(|_| ()),
            Action::UpdateGameSettings { settings } => self.update_settings(*settings),
            Action::StartGame => self.start_new_game(),
            Action::MoveFrog => self.move_frog(sender),
            Action::LegBet { frog_idx } => self.make_leg_bet(sender, *frog_idx),
            Action::OverallBet { frog_idx, bet_type } => {
                self.make_overall_bet(sender, *frog_idx, *bet_type)
            }
            Action::SpectatorTile {
                tile_idx,
                direction,
            } => self.place_spectator_tile(sender, *tile_idx, *direction),
            Action::EndGame => {
                self.reset_game();
                self.to_lobby();
                Ok(())
            }
            Action::Disconnect => self.set_connection_active(sender, false),
        }
    }
}

//! Per-subscriber views of a session snapshot.

use std::sync::Arc;

use leapfrog_protocol::{ConnectionId, ConnectionRole};
use serde::Serialize;

use crate::GameState;

/// How the receiving connection takes part in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Player,
    Spectator,
    /// The connection is subscribed but not (or no longer) registered in
    /// the session, e.g. after being kicked.
    Unknown,
}

impl From<ConnectionRole> for ViewKind {
    fn from(role: ConnectionRole) -> Self {
        match role {
            ConnectionRole::Player => Self::Player,
            ConnectionRole::Spectator => Self::Spectator,
        }
    }
}

/// What one subscriber receives after every processed event.
///
/// The snapshot is shared; building a view per subscriber costs one
/// `Arc` clone.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriberView {
    #[serde(rename = "type")]
    pub kind: ViewKind,
    pub websocket_id: ConnectionId,
    pub name: String,
    pub game_state: Arc<GameState>,
}

impl GameState {
    /// Builds the view `connection_id` should receive of this snapshot.
    pub fn make_websocket_response(self: &Arc<Self>, connection_id: &ConnectionId) -> SubscriberView {
        let (kind, name) = match self.connection(connection_id) {
            Some(connection) => (connection.role.into(), connection.name.clone()),
            None => (ViewKind::Unknown, String::new()),
        };
        SubscriberView {
            kind,
            websocket_id: connection_id.clone(),
            name,
            game_state: Arc::clone(self),
        }
    }
}

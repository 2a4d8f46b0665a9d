//! Game actor: an isolated Tokio task that owns one session's state.
//!
//! The actor is the only writer of its `GameState`. Events arrive on a
//! bounded mpsc channel and are applied one at a time, in arrival order.
//! After each event, applied or rejected, the actor publishes a fresh
//! snapshot so every subscriber can resync.

use std::sync::Arc;

use leapfrog_game::GameState;
use leapfrog_protocol::{Event, SessionCode};
use tokio::sync::{mpsc, oneshot};


/// A published snapshot, tagged with the session it belongs to.
pub type Snapshot = (SessionCode, Arc<GameState>);

/// Handle to a running game actor.
///
/// Owned by the manager's registry. Dropping the handle also stops the
/// actor, since the shutdown channel closes.
#[derive(Debug)]
pub struct GameHandle {
    code: SessionCode,
    events: mpsc::Sender<Event>,
    shutdown: oneshot::Sender<()>,
}

impl GameHandle {
    /// A clone of the inbound sender, for submitting without holding
    /// whatever lock guards the handle. Sends wait for channel capacity.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.events.clone()
    }

    /// Tells the actor to stop. Events still queued are discarded.
    pub fn shutdown(self) {
        tracing::debug!(code = %self.code, "stopping game actor");
        let _ = self.shutdown.send(());
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct GameActor {
    code: SessionCode,
    state: GameState,
    events: mpsc::Receiver<Event>,
    shutdown: oneshot::Receiver<()>,
    snapshots: mpsc::Sender<Snapshot>,
}

impl GameActor {
    async fn run(mut self) {
        tracing::info!(code = %self.code, "game actor started");

        loop {
            tokio::select! {
                biased;
                _ = &mut self.shutdown => {
                    tracing::info!(code = %self.code, "game actor shutting down");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }

        tracing::info!(code = %self.code, "game actor stopped");
    }

    async fn handle_event(&mut self, event: Event) {
        let action = event.action.name();
        match self.state.apply(&event) {
            Ok(()) => tracing::debug!(
                code = %self.code,
                connection_id = %event.websocket_id,
                action,
                "event applied"
            ),
            Err(err) => tracing::debug!(
                code = %self.code,
                connection_id = %event.websocket_id,
                action,
                reason = err.code(),
                "event rejected"
            ),
        }

        let snapshot = Arc::new(self.state.clone());
        if self
            .snapshots
            .send((self.code.clone(), snapshot))
            .await
            .is_err()
        {
            tracing::warn!(code = %self.code, "snapshot channel closed");
        }
    }
}

/// Spawns an actor that owns `state` and returns a handle to it.
///
/// `channel_size` bounds the inbound queue; submitters wait when it is
/// full.
pub(crate) fn spawn_game(
    state: GameState,
    snapshots: mpsc::Sender<Snapshot>,
    channel_size: usize,
) -> GameHandle {
    let code = state.game_code().clone();
    let (events_tx, events_rx) = mpsc::channel(channel_size);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let actor = GameActor {
        code: code.clone(),
        state,
        events: events_rx,
        shutdown: shutdown_rx,
        snapshots,
    };
    tokio::spawn(actor.run());

    GameHandle {
        code,
        events: events_tx,
        shutdown: shutdown_tx,
    }
}

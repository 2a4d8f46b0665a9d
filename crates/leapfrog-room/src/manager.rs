//! Game manager: creates, tracks, and routes events to sessions.
//!
//! The manager is shared behind an `Arc` by every connection handler and
//! by its two background workers:
//!
//! - the **fan-out** worker drains the snapshot channel that all actors
//!   publish to and pushes a per-subscriber view to each subscriber;
//! - the **purge** worker periodically removes sessions that have been
//!   idle for longer than the inactivity timeout.
//!
//! Lookups take the registry's read lock, registrations and removals the
//! write lock. Channel senders are cloned out before any send so no lock
//! is held across an await.

use std::collections::HashMap;
use std::sync::Arc;

use leapfrog_game::{GameState, SubscriberView};
use leapfrog_protocol::{ConnectionId, Event, SessionCode};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::game::{GameHandle, Snapshot, spawn_game};
use crate::{ManagerConfig, RoomError};

/// Channel sender for delivering views to one connection.
pub type SubscriberSender = mpsc::UnboundedSender<SubscriberView>;

/// Registry entry for one live session.
struct SessionEntry {
    handle: GameHandle,
    /// Most recent snapshot seen by the fan-out worker.
    latest: Arc<GameState>,
    subscribers: HashMap<ConnectionId, SubscriberSender>,
    last_update: Instant,
}

/// Owns every live session and the workers that serve them.
pub struct GameManager {
    config: ManagerConfig,
    sessions: RwLock<HashMap<SessionCode, SessionEntry>>,
    snapshot_tx: mpsc::Sender<Snapshot>,
    /// Taken by the fan-out worker when it starts.
    snapshot_rx: Mutex<Option<mpsc::Receiver<Snapshot>>>,
}

impl GameManager {
    pub fn new(config: ManagerConfig) -> Self {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(config.snapshot_channel_size);
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            snapshot_tx,
            snapshot_rx: Mutex::new(Some(snapshot_rx)),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Starts a session in the lobby under `code`.
    pub async fn create_session(&self, code: SessionCode) -> Result<(), RoomError> {
        self.create_session_with(GameState::new(code)).await
    }

    /// Starts a session from a prepared state, e.g. one with a seeded
    /// random source.
    pub async fn create_session_with(&self, state: GameState) -> Result<(), RoomError> {
        let code = state.game_code().clone();
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&code) {
            return Err(RoomError::AlreadyExists(code));
        }

        let latest = Arc::new(state.clone());
        let handle = spawn_game(
            state,
            self.snapshot_tx.clone(),
            self.config.event_channel_size,
        );
        sessions.insert(
            code.clone(),
            SessionEntry {
                handle,
                latest,
                subscribers: HashMap::new(),
                last_update: Instant::now(),
            },
        );
        tracing::info!(%code, sessions = sessions.len(), "session created");
        Ok(())
    }

    /// Latest published snapshot of a session.
    pub async fn get_session(&self, code: &SessionCode) -> Option<Arc<GameState>> {
        let sessions = self.sessions.read().await;
        sessions.get(code).map(|entry| Arc::clone(&entry.latest))
    }

    /// Whether `id` has joined the session, as of the latest snapshot.
    ///
    /// The snapshot only advances when the fan-out worker publishes, so a
    /// join becomes visible here once its update has been fanned out. A
    /// resume racing the join it refers to is rejected as unknown.
    pub async fn is_connection_known(&self, code: &SessionCode, id: &ConnectionId) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(code)
            .is_some_and(|entry| entry.latest.has_connection(id))
    }

    /// Routes an event to its session's actor.
    ///
    /// Waits for inbound capacity when the session is busy.
    pub async fn submit(&self, event: Event) -> Result<(), RoomError> {
        let sender = {
            let sessions = self.sessions.read().await;
            sessions
                .get(&event.game_code)
                .map(|entry| entry.handle.sender())
                .ok_or_else(|| RoomError::NotFound(event.game_code.clone()))?
        };
        sender
            .send(event)
            .await
            .map_err(|err| RoomError::Unavailable(err.0.game_code))
    }

    /// Subscribes `id` to every future snapshot of the session. A second
    /// registration for the same id replaces the first.
    pub async fn register_subscriber(
        &self,
        code: &SessionCode,
        id: ConnectionId,
        sender: SubscriberSender,
    ) -> Result<(), RoomError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        tracing::debug!(%code, connection_id = %id, "subscriber registered");
        entry.subscribers.insert(id, sender);
        Ok(())
    }

    /// Stops delivering to `id`, but only while `sender` is still the
    /// registered channel. A connection id resumed on another socket keeps
    /// its newer subscription. Returns whether anything was removed.
    pub async fn remove_subscriber(
        &self,
        code: &SessionCode,
        id: &ConnectionId,
        sender: &SubscriberSender,
    ) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(entry) = sessions.get_mut(code) else {
            return false;
        };
        if !entry
            .subscribers
            .get(id)
            .is_some_and(|current| current.same_channel(sender))
        {
            return false;
        }
        entry.subscribers.remove(id);
        tracing::debug!(%code, connection_id = %id, "subscriber removed");
        true
    }

    /// Drains the snapshot channel until the manager is dropped.
    ///
    /// Only one fan-out worker can run; a second call returns at once.
    pub async fn run_fanout(&self) {
        let Some(mut snapshots) = self.snapshot_rx.lock().await.take() else {
            tracing::warn!("fan-out worker already running");
            return;
        };
        while let Some((code, state)) = snapshots.recv().await {
            self.deliver(code, state).await;
        }
    }

    async fn deliver(&self, code: SessionCode, state: Arc<GameState>) {
        let targets: Vec<(ConnectionId, SubscriberSender)> = {
            let mut sessions = self.sessions.write().await;
            let Some(entry) = sessions.get_mut(&code) else {
                tracing::debug!(%code, "snapshot for purged session dropped");
                return;
            };
            entry.latest = Arc::clone(&state);
            entry.last_update = Instant::now();
            entry
                .subscribers
                .iter()
                .map(|(id, sender)| (id.clone(), sender.clone()))
                .collect()
        };

        for (id, sender) in targets {
            let view = state.make_websocket_response(&id);
            if sender.send(view).is_err() {
                tracing::debug!(%code, connection_id = %id, "subscriber gone, skipping");
            }
        }
    }

    /// Removes every session idle for longer than the inactivity timeout,
    /// stopping its actor and closing its subscriber channels.
    pub async fn purge_idle(&self) -> Vec<SessionCode> {
        let now = Instant::now();
        let expired: Vec<(SessionCode, SessionEntry)> = {
            let mut sessions = self.sessions.write().await;
            let codes: Vec<SessionCode> = sessions
                .iter()
                .filter(|(_, entry)| {
                    now.duration_since(entry.last_update) > self.config.inactivity_timeout
                })
                .map(|(code, _)| code.clone())
                .collect();
            codes
                .into_iter()
                .filter_map(|code| sessions.remove_entry(&code))
                .collect()
        };

        expired
            .into_iter()
            .map(|(code, entry)| {
                let subscribers = entry.subscribers.len();
                entry.handle.shutdown();
                tracing::info!(%code, subscribers, "session purged");
                code
            })
            .collect()
    }

    /// Runs [`purge_idle`](Self::purge_idle) every purge interval.
    pub async fn run_purge(&self) {
        let mut ticker = tokio::time::interval(self.config.purge_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = self.purge_idle().await;
            if !purged.is_empty() {
                tracing::debug!(count = purged.len(), "purge pass finished");
            }
        }
    }

    /// Starts the fan-out and purge workers.
    pub fn spawn_workers(self: &Arc<Self>) -> (JoinHandle<()>, JoinHandle<()>) {
        let fanout = {
            let manager = Arc::clone(self);
            tokio::spawn(async move { manager.run_fanout().await })
        };
        let purge = {
            let manager = Arc::clone(self);
            tokio::spawn(async move { manager.run_purge().await })
        };
        (fanout, purge)
    }

    /// Returns the number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Lists all live session codes.
    pub async fn session_codes(&self) -> Vec<SessionCode> {
        self.sessions.read().await.keys().cloned().collect()
    }
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

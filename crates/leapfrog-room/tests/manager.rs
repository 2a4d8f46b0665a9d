//! Integration tests for the session manager.

use std::sync::Arc;
use std::time::Duration;

use leapfrog_game::{GameRng, GameState, Phase, SubscriberView, ViewKind};
use leapfrog_protocol::{Action, ConnectionId, Event, SessionCode};
use leapfrog_room::{GameManager, ManagerConfig, RoomError};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn code(s: &str) -> SessionCode {
    SessionCode::new(s)
}

fn conn(s: &str) -> ConnectionId {
    ConnectionId::new(s)
}

fn join(session: &str, id: &str) -> Event {
    Event::new(
        code(session),
        conn(id),
        Action::PlayerJoin {
            player_name: id.to_string(),
        },
    )
}

fn started_manager(config: ManagerConfig) -> Arc<GameManager> {
    let manager = Arc::new(GameManager::new(config));
    manager.spawn_workers();
    manager
}

async fn subscribe(
    manager: &GameManager,
    session: &str,
    id: &str,
) -> mpsc::UnboundedReceiver<SubscriberView> {
    let (tx, rx) = mpsc::unbounded_channel();
    manager
        .register_subscriber(&code(session), conn(id), tx)
        .await
        .unwrap();
    rx
}

async fn next_view(rx: &mut mpsc::UnboundedReceiver<SubscriberView>) -> SubscriberView {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a view")
        .expect("subscriber channel closed")
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_create_session_duplicate_code_returns_already_exists() {
    let manager = GameManager::default();
    manager.create_session(code("111111")).await.unwrap();

    let err = manager.create_session(code("111111")).await.unwrap_err();
    assert_eq!(err, RoomError::AlreadyExists(code("111111")));
    assert_eq!(manager.session_count().await, 1);
    assert_eq!(manager.session_codes().await, vec![code("111111")]);
}

#[tokio::test]
async fn test_submit_unknown_code_returns_not_found() {
    let manager = GameManager::default();
    let err = manager.submit(join("999999", "alice")).await.unwrap_err();
    assert_eq!(err, RoomError::NotFound(code("999999")));
}

#[tokio::test]
async fn test_register_subscriber_unknown_code_returns_not_found() {
    let manager = GameManager::default();
    let (tx, _rx) = mpsc::unbounded_channel();
    let err = manager
        .register_subscriber(&code("999999"), conn("alice"), tx)
        .await
        .unwrap_err();
    assert_eq!(err, RoomError::NotFound(code("999999")));
}

// =========================================================================
// Routing and fan-out
// =========================================================================

#[tokio::test]
async fn test_submit_routes_only_to_addressed_session() {
    let manager = started_manager(ManagerConfig::default());
    manager.create_session(code("000001")).await.unwrap();
    manager.create_session(code("000002")).await.unwrap();
    let mut first = subscribe(&manager, "000001", "alice").await;
    let mut second = subscribe(&manager, "000002", "bob").await;

    manager.submit(join("000001", "alice")).await.unwrap();

    let view = next_view(&mut first).await;
    assert_eq!(view.kind, ViewKind::Player);
    assert_eq!(view.name, "alice");
    assert_eq!(view.game_state.game_code(), &code("000001"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(second.try_recv().is_err());
    let other = manager.get_session(&code("000002")).await.unwrap();
    assert!(other.connections().is_empty());
}

#[tokio::test]
async fn test_fanout_views_are_per_subscriber() {
    let manager = started_manager(ManagerConfig::default());
    manager.create_session(code("000003")).await.unwrap();
    let mut alice = subscribe(&manager, "000003", "alice").await;
    let mut watcher = subscribe(&manager, "000003", "watcher").await;

    manager.submit(join("000003", "alice")).await.unwrap();
    next_view(&mut alice).await;
    next_view(&mut watcher).await;
    manager
        .submit(Event::new(code("000003"), conn("watcher"), Action::SpectatorJoin))
        .await
        .unwrap();

    let for_alice = next_view(&mut alice).await;
    let for_watcher = next_view(&mut watcher).await;
    assert_eq!(for_alice.kind, ViewKind::Player);
    assert_eq!(for_watcher.kind, ViewKind::Spectator);
    assert!(Arc::ptr_eq(&for_alice.game_state, &for_watcher.game_state));
}

#[tokio::test]
async fn test_fanout_survives_closed_subscriber() {
    let manager = started_manager(ManagerConfig::default());
    manager.create_session(code("000004")).await.unwrap();
    let gone = subscribe(&manager, "000004", "gone").await;
    let mut alive = subscribe(&manager, "000004", "alive").await;
    drop(gone);

    manager.submit(join("000004", "alive")).await.unwrap();
    next_view(&mut alive).await;
    manager.submit(join("000004", "bob")).await.unwrap();
    let view = next_view(&mut alive).await;
    assert_eq!(view.game_state.connections().len(), 2);
}

#[tokio::test]
async fn test_rejected_event_still_publishes_snapshot() {
    let manager = started_manager(ManagerConfig::default());
    manager.create_session(code("000005")).await.unwrap();
    let mut alice = subscribe(&manager, "000005", "alice").await;

    manager
        .submit(Event::new(code("000005"), conn("alice"), Action::MoveFrog))
        .await
        .unwrap();
    let view = next_view(&mut alice).await;
    assert_eq!(view.game_state.phase(), Phase::Lobby);
}

#[tokio::test]
async fn test_is_connection_known_after_join() {
    let manager = started_manager(ManagerConfig::default());
    manager.create_session(code("000006")).await.unwrap();
    let mut alice = subscribe(&manager, "000006", "alice").await;
    assert!(!manager.is_connection_known(&code("000006"), &conn("alice")).await);

    manager.submit(join("000006", "alice")).await.unwrap();
    next_view(&mut alice).await;

    assert!(manager.is_connection_known(&code("000006"), &conn("alice")).await);
    assert!(!manager.is_connection_known(&code("000006"), &conn("bob")).await);
    assert!(!manager.is_connection_known(&code("123123"), &conn("alice")).await);
}

#[tokio::test]
async fn test_remove_subscriber_stops_delivery() {
    let manager = started_manager(ManagerConfig::default());
    manager.create_session(code("000007")).await.unwrap();
    let (tx, mut alice) = mpsc::unbounded_channel();
    manager
        .register_subscriber(&code("000007"), conn("alice"), tx.clone())
        .await
        .unwrap();

    assert!(manager.remove_subscriber(&code("000007"), &conn("alice"), &tx).await);
    assert!(!manager.remove_subscriber(&code("000007"), &conn("alice"), &tx).await);
    drop(tx);

    manager.submit(join("000007", "alice")).await.unwrap();
    // The registry dropped the only sender, so the channel closes.
    let closed = tokio::time::timeout(Duration::from_secs(5), alice.recv())
        .await
        .unwrap();
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_remove_subscriber_keeps_newer_registration() {
    let manager = started_manager(ManagerConfig::default());
    manager.create_session(code("000009")).await.unwrap();
    let (stale_tx, mut stale) = mpsc::unbounded_channel();
    manager
        .register_subscriber(&code("000009"), conn("alice"), stale_tx.clone())
        .await
        .unwrap();
    // The same id registers again from another socket.
    let mut fresh = subscribe(&manager, "000009", "alice").await;

    assert!(
        !manager
            .remove_subscriber(&code("000009"), &conn("alice"), &stale_tx)
            .await
    );
    drop(stale_tx);

    manager.submit(join("000009", "alice")).await.unwrap();
    let view = next_view(&mut fresh).await;
    assert_eq!(view.websocket_id, conn("alice"));
    assert!(stale.recv().await.is_none());
}

#[tokio::test]
async fn test_seeded_session_plays_a_game() {
    let manager = started_manager(ManagerConfig::default());
    let state = GameState::with_rng(code("000008"), GameRng::seeded(8));
    manager.create_session_with(state).await.unwrap();
    let mut alice = subscribe(&manager, "000008", "alice").await;

    manager.submit(join("000008", "alice")).await.unwrap();
    manager
        .submit(Event::new(code("000008"), conn("alice"), Action::StartGame))
        .await
        .unwrap();
    manager
        .submit(Event::new(code("000008"), conn("alice"), Action::MoveFrog))
        .await
        .unwrap();

    next_view(&mut alice).await;
    next_view(&mut alice).await;
    let view = next_view(&mut alice).await;
    assert_eq!(view.game_state.phase(), Phase::Game);
    assert_eq!(view.game_state.updates().len(), 1);
}

// =========================================================================
// Purge
// =========================================================================

fn purge_config() -> ManagerConfig {
    ManagerConfig {
        purge_interval: Duration::from_secs(60),
        inactivity_timeout: Duration::from_secs(30 * 60),
        ..ManagerConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_purge_idle_removes_session_and_closes_subscribers() {
    let manager = GameManager::new(purge_config());
    manager.create_session(code("000010")).await.unwrap();
    let mut alice = subscribe(&manager, "000010", "alice").await;

    assert!(manager.purge_idle().await.is_empty());
    tokio::time::advance(Duration::from_secs(31 * 60)).await;

    assert_eq!(manager.purge_idle().await, vec![code("000010")]);
    assert_eq!(manager.session_count().await, 0);
    assert!(manager.get_session(&code("000010")).await.is_none());
    assert!(alice.recv().await.is_none());

    let err = manager.submit(join("000010", "alice")).await.unwrap_err();
    assert_eq!(err, RoomError::NotFound(code("000010")));
}

#[tokio::test(start_paused = true)]
async fn test_purge_idle_keeps_active_sessions() {
    // Fan-out only, so the purge pass below is the only one.
    let manager = Arc::new(GameManager::new(purge_config()));
    let fanout = Arc::clone(&manager);
    tokio::spawn(async move { fanout.run_fanout().await });
    manager.create_session(code("000011")).await.unwrap();
    manager.create_session(code("000012")).await.unwrap();
    let mut busy = subscribe(&manager, "000012", "alice").await;

    tokio::time::advance(Duration::from_secs(20 * 60)).await;
    manager.submit(join("000012", "alice")).await.unwrap();
    next_view(&mut busy).await;
    tokio::time::advance(Duration::from_secs(15 * 60)).await;

    assert_eq!(manager.purge_idle().await, vec![code("000011")]);
    assert_eq!(manager.session_codes().await, vec![code("000012")]);
}

#[tokio::test(start_paused = true)]
async fn test_run_purge_removes_idle_session_on_interval() {
    let manager = started_manager(purge_config());
    manager.create_session(code("000013")).await.unwrap();

    tokio::time::sleep(Duration::from_secs(32 * 60)).await;
    assert_eq!(manager.session_count().await, 0);
}

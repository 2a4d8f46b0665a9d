//! Integration tests for the Leapfrog server, handler, and full connection flow.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use leapfrog::prelude::*;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let server = LeapfrogServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

/// Connects and consumes the welcome notice. Returns the socket and the
/// connection id the server issued.
async fn connect(addr: &str) -> (ClientWs, String) {
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    let welcome = recv(&mut ws).await;
    assert_eq!(welcome["type"], "welcome");
    let id = welcome["websocketId"]
        .as_str()
        .expect("welcome carries an id")
        .to_string();
    (ws, id)
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("send");
}

async fn recv(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("socket closed")
            .expect("recv error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("server sends JSON");
        }
    }
}

/// Reads messages until one satisfies `pred`.
async fn recv_until(ws: &mut ClientWs, pred: impl Fn(&Value) -> bool) -> Value {
    loop {
        let value = recv(ws).await;
        if pred(&value) {
            return value;
        }
    }
}

async fn host(ws: &mut ClientWs) -> String {
    send(ws, json!({ "type": "host_game" })).await;
    let hosted = recv(ws).await;
    assert_eq!(hosted["type"], "hosted");
    hosted["gameCode"].as_str().expect("hosted code").to_string()
}

async fn join(ws: &mut ClientWs, code: &str, name: &str) -> Value {
    send(
        ws,
        json!({ "type": "player_join", "gameCode": code, "playerName": name }),
    )
    .await;
    recv_until(ws, |v| v["type"] == "player").await
}

fn player_id_of(connection_id: &str) -> String {
    PlayerId::derive(&ConnectionId::new(connection_id))
        .as_str()
        .to_string()
}

fn connection_active(view: &Value, connection_id: &str) -> Option<bool> {
    view["game_state"]["connections"]
        .as_array()?
        .iter()
        .find(|c| c["websocket_id"] == connection_id)
        .and_then(|c| c["active"].as_bool())
}

// =========================================================================
// Connection and hosting
// =========================================================================

#[tokio::test]
async fn test_connect_receives_welcome_with_fresh_id() {
    let addr = start_server().await;
    let (_a, first) = connect(&addr).await;
    let (_b, second) = connect(&addr).await;

    assert_eq!(first.len(), 8);
    assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_host_game_returns_six_digit_code() {
    let addr = start_server().await;
    let (mut ws, _) = connect(&addr).await;

    let code = host(&mut ws).await;
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_malformed_message_is_rejected() {
    let addr = start_server().await;
    let (mut ws, _) = connect(&addr).await;

    ws.send(Message::text("{not json")).await.expect("send");
    let reply = recv(&mut ws).await;
    assert_eq!(reply["type"], "rejected");
    assert_eq!(reply["code"], "invalid_message");

    // The connection stays usable.
    host(&mut ws).await;
}

#[tokio::test]
async fn test_join_unknown_session_is_rejected_not_found() {
    let addr = start_server().await;
    let (mut ws, _) = connect(&addr).await;

    send(
        &mut ws,
        json!({ "type": "player_join", "gameCode": "999999", "playerName": "alice" }),
    )
    .await;
    let reply = recv(&mut ws).await;
    assert_eq!(reply["type"], "rejected");
    assert_eq!(reply["code"], "not_found");
}

// =========================================================================
// Joining and playing
// =========================================================================

#[tokio::test]
async fn test_player_join_receives_own_view() {
    let addr = start_server().await;
    let (mut ws, id) = connect(&addr).await;
    let code = host(&mut ws).await;

    let view = join(&mut ws, &code, "alice").await;
    assert_eq!(view["websocket_id"], id.as_str());
    assert_eq!(view["name"], "alice");
    assert_eq!(view["game_state"]["game_code"], code.as_str());
    assert_eq!(view["game_state"]["state"], "lobby");
    let connections = view["game_state"]["connections"].as_array().unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["is_host"], true);
}

#[tokio::test]
async fn test_spectator_sees_player_joins() {
    let addr = start_server().await;
    let (mut host_ws, _) = connect(&addr).await;
    let code = host(&mut host_ws).await;

    let (mut watcher, _) = connect(&addr).await;
    send(
        &mut watcher,
        json!({ "type": "spectator_join", "gameCode": code }),
    )
    .await;
    let first = recv(&mut watcher).await;
    assert_eq!(first["type"], "spectator");

    join(&mut host_ws, &code, "alice").await;
    let view = recv_until(&mut watcher, |v| {
        v["game_state"]["connections"].as_array().map(Vec::len) == Some(2)
    })
    .await;
    assert_eq!(view["type"], "spectator");
    assert_eq!(view["name"], "");
}

#[tokio::test]
async fn test_join_second_session_is_rejected() {
    let addr = start_server().await;
    let (mut ws, _) = connect(&addr).await;
    let first = host(&mut ws).await;
    let second = host(&mut ws).await;
    join(&mut ws, &first, "alice").await;

    send(
        &mut ws,
        json!({ "type": "player_join", "gameCode": second, "playerName": "alice" }),
    )
    .await;
    let reply = recv_until(&mut ws, |v| v["type"] == "rejected").await;
    assert_eq!(reply["code"], "already_subscribed");
}

#[tokio::test]
async fn test_two_players_start_and_move() {
    let addr = start_server().await;
    let (mut alice, alice_id) = connect(&addr).await;
    let (mut bob, bob_id) = connect(&addr).await;
    let code = host(&mut alice).await;
    join(&mut alice, &code, "alice").await;
    join(&mut bob, &code, "bob").await;

    send(&mut alice, json!({ "type": "start_game", "gameCode": code })).await;
    let started = recv_until(&mut alice, |v| v["game_state"]["state"] == "game").await;
    recv_until(&mut bob, |v| v["game_state"]["state"] == "game").await;

    let state = &started["game_state"];
    assert_eq!(state["round"], 1);
    assert_eq!(state["track"].as_array().unwrap().len(), 17);
    assert_eq!(state["frogs"].as_array().unwrap().len(), 7);
    assert!(state["updates"].as_array().unwrap().is_empty());

    let current = state["current_turn"].as_str().unwrap().to_string();
    let (mover, mover_id, waiter) = if current == player_id_of(&alice_id) {
        (&mut alice, &alice_id, &mut bob)
    } else {
        assert_eq!(current, player_id_of(&bob_id));
        (&mut bob, &bob_id, &mut alice)
    };

    send(mover, json!({ "type": "move_frog", "gameCode": code })).await;
    let moved = recv_until(waiter, |v| {
        v["game_state"]["updates"].as_array().map(Vec::len) == Some(1)
    })
    .await;
    let state = &moved["game_state"];
    assert_eq!(state["updates"][0]["type"], "player_move_frog");
    assert_ne!(state["current_turn"], player_id_of(mover_id).as_str());
    let gold = &state["players"][player_id_of(mover_id)]["gold"];
    assert_eq!(gold, 6);
}

#[tokio::test]
async fn test_move_out_of_turn_leaves_state_unchanged() {
    let addr = start_server().await;
    let (mut alice, alice_id) = connect(&addr).await;
    let (mut bob, _) = connect(&addr).await;
    let code = host(&mut alice).await;
    join(&mut alice, &code, "alice").await;
    join(&mut bob, &code, "bob").await;

    send(&mut alice, json!({ "type": "start_game", "gameCode": code })).await;
    let started = recv_until(&mut alice, |v| v["game_state"]["state"] == "game").await;
    let waiting = if started["game_state"]["current_turn"] == player_id_of(&alice_id).as_str()
    {
        &mut bob
    } else {
        &mut alice
    };

    send(waiting, json!({ "type": "move_frog", "gameCode": code })).await;
    let after = recv_until(waiting, |v| v["type"] == "player").await;
    assert!(after["game_state"]["updates"].as_array().unwrap().is_empty());
    assert_eq!(
        after["game_state"]["current_turn"],
        started["game_state"]["current_turn"]
    );
}

// =========================================================================
// Disconnect and resume
// =========================================================================

#[tokio::test]
async fn test_disconnect_marks_connection_inactive() {
    let addr = start_server().await;
    let (mut alice, alice_id) = connect(&addr).await;
    let code = host(&mut alice).await;
    join(&mut alice, &code, "alice").await;

    let (mut watcher, _) = connect(&addr).await;
    send(
        &mut watcher,
        json!({ "type": "spectator_join", "gameCode": code }),
    )
    .await;
    recv(&mut watcher).await;

    alice.close(None).await.expect("close");
    let view = recv_until(&mut watcher, |v| {
        connection_active(v, &alice_id) == Some(false)
    })
    .await;
    assert_eq!(view["game_state"]["connections"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_resume_adopts_previous_id_and_reactivates() {
    let addr = start_server().await;
    let (mut alice, alice_id) = connect(&addr).await;
    let code = host(&mut alice).await;
    join(&mut alice, &code, "alice").await;

    let (mut watcher, _) = connect(&addr).await;
    send(
        &mut watcher,
        json!({ "type": "spectator_join", "gameCode": code }),
    )
    .await;
    recv(&mut watcher).await;

    alice.close(None).await.expect("close");
    recv_until(&mut watcher, |v| connection_active(v, &alice_id) == Some(false)).await;

    let (mut again, fresh_id) = connect(&addr).await;
    assert_ne!(fresh_id, alice_id);
    send(
        &mut again,
        json!({ "type": "resume", "gameCode": code, "websocketId": alice_id }),
    )
    .await;
    let resumed = recv(&mut again).await;
    assert_eq!(resumed["type"], "resumed");
    assert_eq!(resumed["websocketId"], alice_id.as_str());

    let view = recv_until(&mut again, |v| connection_active(v, &alice_id) == Some(true)).await;
    assert_eq!(view["type"], "player");
    assert_eq!(view["websocket_id"], alice_id.as_str());
    assert_eq!(view["name"], "alice");
    assert_eq!(view["game_state"]["connections"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_resume_survives_old_socket_closing_later() {
    let addr = start_server().await;
    let (mut old, alice_id) = connect(&addr).await;
    let code = host(&mut old).await;
    join(&mut old, &code, "alice").await;

    let (mut watcher, _) = connect(&addr).await;
    send(
        &mut watcher,
        json!({ "type": "spectator_join", "gameCode": code }),
    )
    .await;
    recv(&mut watcher).await;

    // Resume while the first socket is still open.
    let (mut again, _) = connect(&addr).await;
    send(
        &mut again,
        json!({ "type": "resume", "gameCode": code, "websocketId": alice_id }),
    )
    .await;
    let resumed = recv(&mut again).await;
    assert_eq!(resumed["type"], "resumed");
    recv_until(&mut again, |v| v["type"] == "player").await;
    // The rejoin snapshot.
    recv(&mut watcher).await;

    let _ = old.close(None).await;
    drop(old);
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Any event fans out a fresh snapshot to both remaining sockets.
    send(
        &mut watcher,
        json!({ "type": "spectator_join", "gameCode": code }),
    )
    .await;
    let seen = recv(&mut watcher).await;
    assert_eq!(connection_active(&seen, &alice_id), Some(true));

    let view = recv(&mut again).await;
    assert_eq!(view["type"], "player");
    assert_eq!(view["websocket_id"], alice_id.as_str());
    assert_eq!(connection_active(&view, &alice_id), Some(true));
}

#[tokio::test]
async fn test_resume_unknown_connection_is_rejected() {
    let addr = start_server().await;
    let (mut ws, _) = connect(&addr).await;
    let code = host(&mut ws).await;

    send(
        &mut ws,
        json!({ "type": "resume", "gameCode": code, "websocketId": "nobody00" }),
    )
    .await;
    let reply = recv(&mut ws).await;
    assert_eq!(reply["type"], "rejected");
    assert_eq!(reply["code"], "unknown_connection");

    send(
        &mut ws,
        json!({ "type": "resume", "gameCode": "999999", "websocketId": "nobody00" }),
    )
    .await;
    let reply = recv(&mut ws).await;
    assert_eq!(reply["code"], "not_found");
}

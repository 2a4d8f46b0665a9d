//! Per-connection handler: identity, hosting, and event routing.
//!
//! Each accepted socket gets its own Tokio task running this handler.
//! The flow is:
//!   1. Upgrade to websocket, issue a connection id, send `welcome`
//!   2. Spawn a writer task that owns the sink half
//!   3. Loop: decode client requests → host, resume, or submit events
//!   4. On close: drop the subscription and submit `disconnect`, unless the
//!      connection was resumed on another socket

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use leapfrog_game::SubscriberView;
use leapfrog_protocol::{
    Action, ClientRequest, Codec, ConnectionId, ConnectionRole, ControlRequest, Event,
    JsonCodec, ProtocolError, ServerNotice, SessionCode,
};
use leapfrog_room::RoomError;
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::LeapfrogError;
use crate::server::ServerState;

/// Length of an issued connection id.
const CONNECTION_ID_LEN: usize = 8;

/// Attempts at finding an unused session code before giving up.
const HOST_ATTEMPTS: usize = 16;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// What the reader half hands to the writer task.
enum Outbound {
    Notice(ServerNotice),
    /// Start forwarding this session's views. Replaces any earlier one.
    Subscribe(mpsc::UnboundedReceiver<SubscriberView>),
}

/// The session a socket follows and a weak handle to its view channel.
///
/// Only the registry holds the strong sender, so the handle stops
/// upgrading once the subscription is replaced by a resume on another
/// socket or dropped by a purge.
struct Subscription {
    code: SessionCode,
    views: mpsc::WeakUnboundedSender<SubscriberView>,
}

/// Per-connection bookkeeping on the reader side.
struct Client {
    id: ConnectionId,
    addr: SocketAddr,
    /// The one session this connection is subscribed to, if any.
    subscription: Option<Subscription>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Client {
    fn notify(&self, notice: ServerNotice) {
        // Fails only once the writer has stopped; the reader notices the
        // closed socket on its own.
        let _ = self.outbound.send(Outbound::Notice(notice));
    }

    fn reject(&self, code: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(connection_id = %self.id, code, %message, "request rejected");
        self.notify(ServerNotice::rejected(code, message));
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> Result<(), LeapfrogError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (sink, mut frames) = ws.split();

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(sink, outbound_rx, state.codec));

    let mut client = Client {
        id: issue_connection_id(),
        addr,
        subscription: None,
        outbound: outbound_tx,
    };
    tracing::info!(connection_id = %client.id, %addr, "connection accepted");
    client.notify(ServerNotice::Welcome {
        websocket_id: client.id.clone(),
    });

    while let Some(frame) = frames.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(connection_id = %client.id, error = %e, "recv error");
                break;
            }
        };
        let decoded: Result<ClientRequest, ProtocolError> = match &frame {
            Message::Text(text) => state.codec.decode(text.as_bytes()),
            Message::Binary(data) => state.codec.decode(data),
            Message::Close(_) => break,
            _ => continue,
        };
        let request = match decoded {
            Ok(request) => request,
            Err(e) => {
                client.reject("invalid_message", e.to_string());
                continue;
            }
        };

        match request {
            ClientRequest::Control(ControlRequest::HostGame) => {
                host_game(&state, &client).await;
            }
            ClientRequest::Control(ControlRequest::Resume {
                game_code,
                websocket_id,
            }) => {
                resume(&state, &mut client, game_code, websocket_id).await;
            }
            ClientRequest::Event(event) => {
                handle_event(&state, &mut client, event).await;
            }
        }
    }

    disconnect(&state, &mut client).await;
    tracing::info!(connection_id = %client.id, addr = %client.addr, "connection closed");

    // Dropping the client closes the outbound channel, which stops the
    // writer once it has flushed.
    drop(client);
    match writer.await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "writer task failed");
            Ok(())
        }
    }
}

/// Creates a session under a fresh random code and reports it.
async fn host_game(state: &ServerState, client: &Client) {
    for _ in 0..HOST_ATTEMPTS {
        let code = generate_session_code();
        match state.manager.create_session(code.clone()).await {
            Ok(()) => {
                tracing::info!(connection_id = %client.id, %code, "game hosted");
                client.notify(ServerNotice::Hosted { game_code: code });
                return;
            }
            Err(RoomError::AlreadyExists(_)) => continue,
            Err(e) => {
                client.reject(e.code(), e.to_string());
                return;
            }
        }
    }
    tracing::warn!(connection_id = %client.id, "no free session code found");
    client.reject("no_free_code", "could not allocate a session code");
}

/// Adopts a connection id issued on an earlier socket and rejoins its
/// session with the same role.
async fn resume(
    state: &ServerState,
    client: &mut Client,
    game_code: SessionCode,
    websocket_id: ConnectionId,
) {
    if client.subscription.is_some() {
        client.reject("already_subscribed", "this connection already follows a session");
        return;
    }
    let Some(snapshot) = state.manager.get_session(&game_code).await else {
        let err = RoomError::NotFound(game_code);
        client.reject(err.code(), err.to_string());
        return;
    };
    if !state
        .manager
        .is_connection_known(&game_code, &websocket_id)
        .await
    {
        client.reject("unknown_connection", format!("{websocket_id} never joined {game_code}"));
        return;
    }

    let rejoin = match snapshot.connection(&websocket_id) {
        Some(c) if c.role == ConnectionRole::Player => Action::PlayerJoin {
            player_name: c.name.clone(),
        },
        _ => Action::SpectatorJoin,
    };

    tracing::info!(old = %client.id, new = %websocket_id, %game_code, "connection resumed");
    client.id = websocket_id;
    if let Err(e) = subscribe(state, client, &game_code).await {
        client.reject(e.code(), e.to_string());
        return;
    }
    client.notify(ServerNotice::Resumed {
        game_code: game_code.clone(),
        websocket_id: client.id.clone(),
    });
    submit(state, client, Event::new(game_code, client.id.clone(), rejoin)).await;
}

/// Stamps an event with this connection's id and routes it. Joins first
/// subscribe the connection to the session.
async fn handle_event(state: &ServerState, client: &mut Client, mut event: Event) {
    event.websocket_id = client.id.clone();

    if event.action.is_join() {
        match client.subscription.as_ref().map(|s| &s.code) {
            Some(code) if *code != event.game_code => {
                client.reject(
                    "already_subscribed",
                    format!("this connection already follows session {code}"),
                );
                return;
            }
            Some(_) => {}
            None => {
                if let Err(e) = subscribe(state, client, &event.game_code).await {
                    client.reject(e.code(), e.to_string());
                    return;
                }
            }
        }
    }

    submit(state, client, event).await;
}

async fn submit(state: &ServerState, client: &Client, event: Event) {
    if let Err(e) = state.manager.submit(event).await {
        client.reject(e.code(), e.to_string());
    }
}

async fn subscribe(
    state: &ServerState,
    client: &mut Client,
    code: &SessionCode,
) -> Result<(), RoomError> {
    let (views_tx, views_rx) = mpsc::unbounded_channel();
    let views = views_tx.downgrade();
    state
        .manager
        .register_subscriber(code, client.id.clone(), views_tx)
        .await?;
    let _ = client.outbound.send(Outbound::Subscribe(views_rx));
    client.subscription = Some(Subscription {
        code: code.clone(),
        views,
    });
    Ok(())
}

/// Drops this socket's subscription and marks its connection inactive,
/// unless another socket has since resumed the same connection id.
async fn disconnect(state: &ServerState, client: &mut Client) {
    let Some(Subscription { code, views }) = client.subscription.take() else {
        return;
    };
    let Some(views) = views.upgrade() else {
        tracing::debug!(connection_id = %client.id, %code, "subscription already released");
        return;
    };
    if !state
        .manager
        .remove_subscriber(&code, &client.id, &views)
        .await
    {
        tracing::debug!(connection_id = %client.id, %code, "connection resumed elsewhere");
        return;
    }
    drop(views);

    let event = Event::new(code.clone(), client.id.clone(), Action::Disconnect);
    if let Err(e) = state.manager.submit(event).await {
        tracing::debug!(connection_id = %client.id, %code, error = %e, "disconnect not delivered");
    }
}

/// Owns the sink half: forwards notices and session views as text frames.
///
/// When the subscribed session goes away (its view channel closes) the
/// socket is closed from this side.
async fn write_loop(
    mut sink: WsSink,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    codec: JsonCodec,
) -> Result<(), LeapfrogError> {
    let mut views: Option<mpsc::UnboundedReceiver<SubscriberView>> = None;

    loop {
        let text = tokio::select! {
            msg = outbound.recv() => match msg {
                Some(Outbound::Notice(notice)) => codec.encode_text(&notice)?,
                Some(Outbound::Subscribe(rx)) => {
                    views = Some(rx);
                    continue;
                }
                None => break,
            },
            view = next_view(&mut views) => match view {
                Some(view) => codec.encode_text(&view)?,
                None => {
                    tracing::debug!("session closed, closing socket");
                    sink.send(Message::Close(None)).await?;
                    return Ok(());
                }
            },
        };
        sink.send(Message::text(text)).await?;
    }

    let _ = sink.close().await;
    Ok(())
}

/// Next view from the current subscription; pends forever without one.
async fn next_view(
    views: &mut Option<mpsc::UnboundedReceiver<SubscriberView>>,
) -> Option<SubscriberView> {
    match views {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn issue_connection_id() -> ConnectionId {
    let id: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(CONNECTION_ID_LEN)
        .map(char::from)
        .collect();
    ConnectionId::new(id)
}

fn generate_session_code() -> SessionCode {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    SessionCode::new(format!("{n:06}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_connection_id_is_alphanumeric() {
        let id = issue_connection_id();
        assert_eq!(id.as_str().len(), CONNECTION_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(issue_connection_id(), id);
    }

    #[test]
    fn test_generate_session_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_session_code();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }
}

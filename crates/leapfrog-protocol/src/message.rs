//! Control envelopes the websocket server speaks around game events.

use serde::{Deserialize, Serialize};

use crate::{ConnectionId, Event, SessionCode};

/// Anything a client may send over its socket.
///
/// Control requests are tried first; everything else must be an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientRequest {
    Control(ControlRequest),
    Event(Event),
}

/// Requests handled by the server itself rather than by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ControlRequest {
    /// Create a fresh session under a newly generated code.
    HostGame,

    /// Take over a connection id issued earlier on another socket.
    Resume {
        game_code: SessionCode,
        websocket_id: ConnectionId,
    },
}

/// Server-originated messages that are not game snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerNotice {
    /// Sent once per socket, right after accept.
    Welcome { websocket_id: ConnectionId },

    /// Reply to [`ControlRequest::HostGame`].
    Hosted { game_code: SessionCode },

    /// Reply to [`ControlRequest::Resume`].
    Resumed {
        game_code: SessionCode,
        websocket_id: ConnectionId,
    },

    /// A request could not be honoured. `code` is a stable snake_case
    /// reason, `message` is for humans.
    Rejected { code: String, message: String },
}

impl ServerNotice {
    pub fn rejected(code: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::Action;

    #[test]
    fn test_client_request_host_game_is_control() {
        let req: ClientRequest = serde_json::from_str(r#"{"type":"host_game"}"#).unwrap();
        assert_eq!(req, ClientRequest::Control(ControlRequest::HostGame));
    }

    #[test]
    fn test_client_request_resume_is_control() {
        let req: ClientRequest = serde_json::from_str(
            r#"{"type":"resume","gameCode":"000042","websocketId":"abc"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            ClientRequest::Control(ControlRequest::Resume {
                game_code: "000042".into(),
                websocket_id: "abc".into(),
            })
        );
    }

    #[test]
    fn test_client_request_game_action_is_event() {
        let req: ClientRequest =
            serde_json::from_str(r#"{"type":"move_frog","gameCode":"000042"}"#).unwrap();
        let ClientRequest::Event(event) = req else {
            panic!("expected an event");
        };
        assert_eq!(event.action, Action::MoveFrog);
    }

    #[test]
    fn test_server_notice_welcome_shape() {
        let json = serde_json::to_value(ServerNotice::Welcome {
            websocket_id: "abc".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["websocketId"], "abc");
    }

    #[test]
    fn test_server_notice_rejected_shape() {
        let json =
            serde_json::to_value(ServerNotice::rejected("not_found", "no such game")).unwrap();
        assert_eq!(json["type"], "rejected");
        assert_eq!(json["code"], "not_found");
    }
}

//! Wire-level vocabulary for the Leapfrog backend.
//!
//! This crate defines everything that crosses the boundary between a
//! client and a game session:
//!
//! - **Identity** ([`SessionCode`], [`ConnectionId`], [`PlayerId`]) —
//!   newtypes so a session code can never be passed where a connection
//!   id is expected.
//! - **Events** ([`Event`], [`Action`]) — the closed set of client actions
//!   a session understands.
//! - **Envelopes** ([`ClientRequest`], [`ServerNotice`]) — the small control
//!   vocabulary the websocket server adds around events.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — bytes in, typed values out.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Event) → Room (actor per session) → Game (rules)
//! ```
//!
//! Nothing in here knows about sessions, tasks, or game rules.

mod codec;
mod error;
mod event;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{Action, Event};
pub use message::{ClientRequest, ControlRequest, ServerNotice};
pub use types::{
    BetKind, ConnectionId, ConnectionRole, Direction, GameSettings, PlayerId,
    SessionCode,
};

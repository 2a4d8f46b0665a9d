//! # Leapfrog
//!
//! Websocket backend for Leapfrog, a multiplayer frog-race betting game.
//!
//! Clients connect over a websocket, host or join a session by its
//! six-digit code, and send game events. Every session runs in its own
//! actor; after each event, every connection following that session
//! receives a fresh snapshot of the game tagged with its own role.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leapfrog::prelude::*;
//!
//! # async fn start() -> Result<(), LeapfrogError> {
//! let server = LeapfrogServer::builder()
//!     .bind("0.0.0.0:8000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::LeapfrogError;
pub use server::{DEFAULT_BIND, LeapfrogServer, LeapfrogServerBuilder};

/// Everything needed to run a server or drive a session directly.
pub mod prelude {
    pub use crate::{DEFAULT_BIND, LeapfrogError, LeapfrogServer, LeapfrogServerBuilder};
    pub use leapfrog_game::{GameError, GameRng, GameState, Phase, SubscriberView, ViewKind};
    pub use leapfrog_protocol::{
        Action, ClientRequest, ConnectionId, ConnectionRole, ControlRequest, Event,
        GameSettings, PlayerId, ServerNotice, SessionCode,
    };
    pub use leapfrog_room::{GameManager, ManagerConfig, RoomError};
}

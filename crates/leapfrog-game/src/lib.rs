//! The Leapfrog rules engine.
//!
//! A [`GameState`] is the whole of one session: lobby connections, the
//! race, bets, and the update log. It is a plain synchronous value. The
//! room layer owns one per session inside an actor and publishes an
//! `Arc<GameState>` snapshot after every event.
//!
//! # Key types
//!
//! - [`GameState`] — session state and every rule that mutates it
//! - [`Phase`] — lobby, game, ended
//! - [`GameError`] — why an event was refused
//! - [`GameRng`] — the injectable random source behind shuffles and moves
//! - [`SubscriberView`] — what one connection receives per snapshot
//!
//! # Example
//!
//! ```
//! use leapfrog_game::{GameRng, GameState, Phase};
//! use leapfrog_protocol::{Action, ConnectionId, Event, SessionCode};
//!
//! let code = SessionCode::new("000001");
//! let mut state = GameState::with_rng(code.clone(), GameRng::seeded(7));
//! let alice = ConnectionId::new("alice");
//!
//! let join = Action::PlayerJoin { player_name: "Alice".into() };
//! state.apply(&Event::new(code.clone(), alice.clone(), join)).unwrap();
//! state.apply(&Event::new(code, alice.clone(), Action::StartGame)).unwrap();
//!
//! assert_eq!(state.phase(), Phase::Game);
//! assert!(state.check_turn(&alice));
//! ```

mod bet;
mod board;
pub mod config;
mod dispatch;
mod error;
mod player;
mod rng;
mod state;
mod update;
mod view;

pub use bet::{LegBet, OverallBet, OverallBetStatus};
pub use board::{Frog, SpectatorTile, Tile};
pub use error::GameError;
pub use player::{Connection, Player};
pub use rng::{GameRng, RandomSource, ScriptedSource};
pub use state::{EndGameStats, GameState, Phase};
pub use update::Update;
pub use view::{SubscriberView, ViewKind};

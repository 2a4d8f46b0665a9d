//! Session lifecycle management for Leapfrog.
//!
//! Each session runs as an isolated Tokio task (actor model) that owns its
//! `GameState`. A shared [`GameManager`] routes events to the right actor,
//! fans snapshots out to subscribers, and purges idle sessions.
//!
//! # Key types
//!
//! - [`GameManager`] — creates sessions, routes events, manages subscribers
//! - [`GameHandle`] — send events to a running game actor
//! - [`ManagerConfig`] — channel sizes and purge timing
//! - [`RoomError`] — lookup and availability failures

mod config;
mod error;
mod game;
mod manager;

pub use config::ManagerConfig;
pub use error::RoomError;
pub use game::{GameHandle, Snapshot};
pub use manager::{GameManager, SubscriberSender};

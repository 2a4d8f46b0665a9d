//! Session manager configuration.

use std::time::Duration;

/// Tunables for a [`GameManager`](crate::GameManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Capacity of each session's inbound event channel. Submitters wait
    /// when it is full.
    pub event_channel_size: usize,

    /// Capacity of the shared snapshot channel from actors to the fan-out
    /// worker.
    pub snapshot_channel_size: usize,

    /// How often the purge worker scans for idle sessions.
    pub purge_interval: Duration,

    /// A session with no processed event for longer than this is purged.
    pub inactivity_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            event_channel_size: 64,
            snapshot_channel_size: 256,
            purge_interval: Duration::from_secs(60),
            inactivity_timeout: Duration::from_secs(30 * 60),
        }
    }
}

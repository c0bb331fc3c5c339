//! Observer-facing state types.
//!
//! Provides [`ConnectionState`] (what observers read), [`StateUpdate`] (what
//! they receive on every change), and [`Subscription`] (the receiving end).
//!
//! Every observer gets its own unbounded FIFO channel. Nothing is coalesced
//! or dropped: an observer sees every update, in the order the store made
//! them.

use std::sync::Arc;

use lockscope_types::SystemSnapshot;
use strum::Display;
use tokio::sync::mpsc;

/// Connection lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// The store's current view of the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub latest_snapshot: Option<Arc<SystemSnapshot>>,
    /// Reconnect attempts since the last successful connect.
    pub retry_count: u32,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Deadlock flag of the latest snapshot (false before the first one).
    pub fn deadlock_detected(&self) -> bool {
        self.latest_snapshot
            .as_ref()
            .is_some_and(|s| s.deadlock_detected)
    }
}

/// Why an update was published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateCause {
    /// A connect attempt began. `manual` is false for supervisor retries.
    ConnectStarted { manual: bool },
    Connected,
    /// The attempt failed before the stream opened.
    ConnectFailed { error: String },
    /// An open stream errored or ended.
    ConnectionLost { reason: String },
    /// A snapshot replaced `latest_snapshot`.
    Snapshot,
    /// Explicit disconnect or shutdown.
    Disconnected,
}

/// One notification: the full current state plus what changed.
#[derive(Clone, Debug)]
pub struct StateUpdate {
    /// Store-wide sequence number, strictly increasing.
    pub seq: u64,
    /// Connection generation the update belongs to.
    pub generation: u64,
    pub cause: UpdateCause,
    pub state: ConnectionState,
}

/// Observer identity, for unsubscribing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

/// Receiving end of an observer registration.
pub struct Subscription {
    pub id: ObserverId,
    /// State at the moment of subscribing. Not replayed through `recv`.
    pub initial: ConnectionState,
    pub(crate) rx: mpsc::UnboundedReceiver<StateUpdate>,
}

impl Subscription {
    /// Next update, or `None` once the store is gone or we were unsubscribed.
    pub async fn recv(&mut self) -> Option<StateUpdate> {
        self.rx.recv().await
    }

    /// Next update if one is already queued.
    pub fn try_recv(&mut self) -> Option<StateUpdate> {
        self.rx.try_recv().ok()
    }
}

/// Registered observer, held by the store.
pub(crate) struct Observer {
    pub id: ObserverId,
    pub tx: mpsc::UnboundedSender<StateUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = ConnectionState::default();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.latest_snapshot.is_none());
        assert_eq!(state.retry_count, 0);
        assert!(!state.is_connected());
        assert!(!state.deadlock_detected());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::Connecting.to_string(), "Connecting");
    }
}

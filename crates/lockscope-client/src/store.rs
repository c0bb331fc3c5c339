//! Stream state core: the single writer of [`ConnectionState`].
//!
//! `StreamStore` is a plain synchronous state machine. It never touches the
//! network: the actor in [`crate::actor`] feeds it connection events, each
//! tagged with the generation of the connection it came from.
//!
//! ```text
//!              begin_connect                 connection_opened
//!  Disconnected ─────────────▶ Connecting ─────────────────────▶ Connected
//!       ▲                          │                                 │
//!       │    connection_failed     │        connection_lost          │
//!       ├──────────────────────────┘◀────────────────────────────────┤
//!       │                         disconnect (any state)             │
//!       └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The generation is bumped by every `begin_connect` and every `disconnect`.
//! Events carrying an older generation are stale and are dropped, so a
//! delayed message from a superseded connection can never overwrite state
//! produced by a newer one.

use std::sync::Arc;

use lockscope_types::{ServerEvent, StreamMessage};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::subscriptions::{
    ConnectionState, ConnectionStatus, Observer, ObserverId, StateUpdate, Subscription,
    UpdateCause,
};

pub struct StreamStore {
    state: ConnectionState,
    generation: u64,
    seq: u64,
    observers: Vec<Observer>,
    next_observer: u64,
    events: broadcast::Sender<ServerEvent>,
}

impl Default for StreamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: ConnectionState::default(),
            generation: 0,
            seq: 0,
            observers: Vec::new(),
            next_observer: 0,
            events,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.status
    }

    /// Generation of the current (or most recently invalidated) connection.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Observers ────────────────────────────────────────────────────────

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer { id, tx });
        Subscription {
            id,
            initial: self.state.clone(),
            rx,
        }
    }

    /// Remove an observer. Returns false if it wasn't registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Start a connect attempt and return its generation.
    ///
    /// Valid from any state. Manual connects reset the retry counter;
    /// supervisor retries increment it.
    pub fn begin_connect(&mut self, manual: bool) -> u64 {
        self.generation += 1;
        self.state.status = ConnectionStatus::Connecting;
        if manual {
            self.state.retry_count = 0;
        } else {
            self.state.retry_count += 1;
        }
        info!(
            generation = self.generation,
            manual,
            retry_count = self.state.retry_count,
            "connecting to state stream"
        );
        self.notify(UpdateCause::ConnectStarted { manual });
        self.generation
    }

    /// The stream for `generation` is open.
    pub fn connection_opened(&mut self, generation: u64) -> bool {
        if !self.is_current(generation, ConnectionStatus::Connecting) {
            debug!(generation, current = self.generation, "ignoring stale connect result");
            return false;
        }
        self.state.status = ConnectionStatus::Connected;
        self.state.retry_count = 0;
        info!(generation, "state stream connected");
        self.notify(UpdateCause::Connected);
        true
    }

    /// The connect attempt for `generation` failed before opening.
    pub fn connection_failed(&mut self, generation: u64, error: String) -> bool {
        if !self.is_current(generation, ConnectionStatus::Connecting) {
            debug!(generation, current = self.generation, "ignoring stale connect failure");
            return false;
        }
        self.state.status = ConnectionStatus::Disconnected;
        warn!(generation, %error, "state stream connect failed");
        self.notify(UpdateCause::ConnectFailed { error });
        true
    }

    /// The open stream for `generation` errored or ended.
    ///
    /// Pure state transition: retry policy belongs to whoever drives the store.
    pub fn connection_lost(&mut self, generation: u64, reason: String) -> bool {
        if !self.is_current(generation, ConnectionStatus::Connected) {
            debug!(generation, current = self.generation, "ignoring stale connection loss");
            return false;
        }
        self.state.status = ConnectionStatus::Disconnected;
        warn!(generation, %reason, "state stream lost");
        self.notify(UpdateCause::ConnectionLost { reason });
        true
    }

    /// Apply one inbound message from the stream for `generation`.
    ///
    /// Snapshots replace `latest_snapshot` and always notify, even when the
    /// content is unchanged. Events go to the event channel. Undecodable
    /// messages are dropped and the previous snapshot is kept. Returns true
    /// if observers were notified.
    pub fn apply_message(&mut self, generation: u64, text: &str) -> bool {
        if !self.is_current(generation, ConnectionStatus::Connected) {
            debug!(generation, current = self.generation, "dropping message from stale connection");
            return false;
        }

        match StreamMessage::decode(text) {
            Ok(StreamMessage::Snapshot(snapshot)) => {
                self.state.latest_snapshot = Some(Arc::new(snapshot));
                self.notify(UpdateCause::Snapshot);
                true
            }
            Ok(StreamMessage::Event(event)) => {
                info!(?event, "server event");
                // No receivers is fine.
                let _ = self.events.send(event);
                false
            }
            Err(e) => {
                warn!(generation, error = %e, "dropping undecodable stream message");
                false
            }
        }
    }

    /// Close out whatever connection exists. Idempotent.
    ///
    /// Always invalidates the current generation so pending connects and
    /// scheduled retries become stale. Notifies only if the status changed.
    pub fn disconnect(&mut self) -> bool {
        self.generation += 1;
        if self.state.status == ConnectionStatus::Disconnected {
            return false;
        }
        self.state.status = ConnectionStatus::Disconnected;
        info!(generation = self.generation, "state stream disconnected");
        self.notify(UpdateCause::Disconnected);
        true
    }

    /// Whether a supervisor retry scheduled for `generation` may still run.
    pub fn accepts_retry(&self, generation: u64) -> bool {
        generation == self.generation && self.state.status == ConnectionStatus::Disconnected
    }

    fn is_current(&self, generation: u64, expected: ConnectionStatus) -> bool {
        generation == self.generation && self.state.status == expected
    }

    fn notify(&mut self, cause: UpdateCause) {
        self.seq += 1;
        let update = StateUpdate {
            seq: self.seq,
            generation: self.generation,
            cause,
            state: self.state.clone(),
        };
        // Dropped receivers are pruned here.
        self.observers.retain(|o| o.tx.send(update.clone()).is_ok());
    }
}

// ============================================================================
// Tests
// ============================================================================

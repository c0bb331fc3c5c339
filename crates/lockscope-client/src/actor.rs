//! Actor that drives a [`StreamStore`] from a live connection.
//!
//! Provides a `Send+Sync` [`StoreHandle`]. The actor task owns the store,
//! the in-flight connect attempt, and the active message stream, and
//! processes commands and connection events one at a time. That makes it
//! the only writer of the connection state.
//!
//! ```text
//!   StoreHandle (Clone)         mpsc        StoreActor (tokio task)
//!   ┌─────────────────────┐  ────────▶  ┌──────────────────────────────┐
//!   │ .connect()          │             │ StreamStore (single writer)  │
//!   │ .disconnect()       │             │ pending connect (generation) │
//!   │ .subscribe()        │  ◀────────  │ active stream   (generation) │
//!   └─────────────────────┘   oneshot   └──────────────────────────────┘
//! ```
//!
//! Replacing the active stream drops the old one, which closes its socket;
//! anything still buffered on it is gone with it.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::BoxFuture;
use lockscope_types::ServerEvent;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use crate::store::StreamStore;
use crate::subscriptions::{ConnectionState, ObserverId, Subscription};
use crate::transport::{Connector, MessageStream, TransportError};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store actor shut down")]
    Shutdown,
}

// ============================================================================
// Commands (internal)
// ============================================================================

enum StoreCommand {
    Connect,
    Retry {
        generation: u64,
    },
    Disconnect,
    Subscribe {
        reply: oneshot::Sender<Subscription>,
    },
    Unsubscribe {
        id: ObserverId,
    },
    State {
        reply: oneshot::Sender<ConnectionState>,
    },
    SubscribeEvents {
        reply: oneshot::Sender<broadcast::Receiver<ServerEvent>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

// ============================================================================
// StoreHandle (Send + Sync public API)
// ============================================================================

/// Handle to a running store actor.
///
/// Cheap to clone. When the last handle is dropped the actor shuts down and
/// closes its connection.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<StoreCommand>,
}

impl StoreHandle {
    /// Start a fresh connection, replacing any existing or pending one.
    pub fn connect(&self) -> Result<(), StoreError> {
        self.send(StoreCommand::Connect)
    }

    /// Supervisor retry for a failed `generation`.
    ///
    /// Ignored by the store if anything happened since that generation.
    pub fn retry(&self, generation: u64) -> Result<(), StoreError> {
        self.send(StoreCommand::Retry { generation })
    }

    /// Close the connection and cancel any pending attempt.
    pub fn disconnect(&self) -> Result<(), StoreError> {
        self.send(StoreCommand::Disconnect)
    }

    /// Register an observer.
    pub async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(StoreCommand::Subscribe { reply })?;
        rx.await.map_err(|_| StoreError::Shutdown)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> Result<(), StoreError> {
        self.send(StoreCommand::Unsubscribe { id })
    }

    /// Current state, for pull-style readers.
    pub async fn state(&self) -> Result<ConnectionState, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(StoreCommand::State { reply })?;
        rx.await.map_err(|_| StoreError::Shutdown)
    }

    /// Out-of-band server events (deadlock resolutions).
    pub async fn subscribe_events(&self) -> Result<broadcast::Receiver<ServerEvent>, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(StoreCommand::SubscribeEvents { reply })?;
        rx.await.map_err(|_| StoreError::Shutdown)
    }

    /// Stop the actor and wait until its connection is closed.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(StoreCommand::Shutdown { reply })?;
        rx.await.map_err(|_| StoreError::Shutdown)
    }

    fn send(&self, cmd: StoreCommand) -> Result<(), StoreError> {
        self.tx.send(cmd).map_err(|_| StoreError::Shutdown)
    }
}

// ============================================================================
// StoreActor (internal)
// ============================================================================

type ConnectFuture = BoxFuture<'static, Result<MessageStream, TransportError>>;

struct PendingConnect {
    generation: u64,
    future: ConnectFuture,
}

struct ActiveStream {
    generation: u64,
    messages: MessageStream,
}

struct StoreActor<C: Connector> {
    connector: Arc<C>,
    store: StreamStore,
    pending: Option<PendingConnect>,
    active: Option<ActiveStream>,
}

impl<C: Connector> StoreActor<C> {
    fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            store: StreamStore::new(),
            pending: None,
            active: None,
        }
    }

    /// Process commands and connection events until shut down.
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<StoreCommand>) {
        let mut shutdown_reply = None;

        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(StoreCommand::Shutdown { reply }) => {
                        shutdown_reply = Some(reply);
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                (generation, result) = next_connect(&mut self.pending) => {
                    self.pending = None;
                    self.handle_connect_result(generation, result);
                }
                (generation, item) = next_message(&mut self.active) => {
                    self.handle_stream_item(generation, item);
                }
            }
        }

        self.close_connection();
        self.store.disconnect();
        debug!("store actor shutting down");
        // Handles must observe the shutdown before the reply arrives.
        drop(rx);
        drop(self);
        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
    }

    fn handle_command(&mut self, cmd: StoreCommand) {
        match cmd {
            StoreCommand::Connect => self.start_connect(true),
            StoreCommand::Retry { generation } => {
                if self.store.accepts_retry(generation) {
                    self.start_connect(false);
                } else {
                    debug!(generation, current = self.store.generation(), "suppressing stale retry");
                }
            }
            StoreCommand::Disconnect => {
                self.close_connection();
                self.store.disconnect();
            }
            StoreCommand::Subscribe { reply } => {
                let _ = reply.send(self.store.subscribe());
            }
            StoreCommand::Unsubscribe { id } => {
                self.store.unsubscribe(id);
            }
            StoreCommand::State { reply } => {
                let _ = reply.send(self.store.state().clone());
            }
            StoreCommand::SubscribeEvents { reply } => {
                let _ = reply.send(self.store.subscribe_events());
            }
            // Intercepted in `run`.
            StoreCommand::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn start_connect(&mut self, manual: bool) {
        // Old connection identity dies before the new attempt exists.
        self.close_connection();
        let generation = self.store.begin_connect(manual);
        let connector = Arc::clone(&self.connector);
        self.pending = Some(PendingConnect {
            generation,
            future: Box::pin(async move { connector.connect().await }),
        });
    }

    fn handle_connect_result(&mut self, generation: u64, result: Result<MessageStream, TransportError>) {
        match result {
            Ok(messages) => {
                if self.store.connection_opened(generation) {
                    self.active = Some(ActiveStream {
                        generation,
                        messages,
                    });
                }
            }
            Err(e) => {
                self.store.connection_failed(generation, e.to_string());
            }
        }
    }

    fn handle_stream_item(&mut self, generation: u64, item: Option<Result<String, TransportError>>) {
        match item {
            Some(Ok(text)) => {
                self.store.apply_message(generation, &text);
            }
            Some(Err(e)) => {
                self.active = None;
                self.store.connection_lost(generation, e.to_string());
            }
            None => {
                self.active = None;
                self.store.connection_lost(generation, "stream closed".to_string());
            }
        }
    }

    fn close_connection(&mut self) {
        self.pending = None;
        self.active = None;
    }
}

/// Resolve the pending connect, or never if there is none.
async fn next_connect(
    pending: &mut Option<PendingConnect>,
) -> (u64, Result<MessageStream, TransportError>) {
    match pending {
        Some(p) => (p.generation, p.future.as_mut().await),
        None => std::future::pending().await,
    }
}

/// Next item from the active stream, or never if there is none.
async fn next_message(
    active: &mut Option<ActiveStream>,
) -> (u64, Option<Result<String, TransportError>>) {
    match active {
        Some(a) => (a.generation, a.messages.next().await),
        None => std::future::pending().await,
    }
}

// ============================================================================
// Public spawn function
// ============================================================================

/// Spawn a store actor on the current tokio runtime.
///
/// The store starts `Disconnected`; call [`StoreHandle::connect`] to open
/// the stream.
pub fn spawn_store<C: Connector>(connector: C) -> StoreHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = StoreActor::new(connector);
    tokio::spawn(actor.run(rx));
    StoreHandle { tx }
}

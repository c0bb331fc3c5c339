//! lockscope client library
//!
//! Keeps a live copy of the deadlock-detection backend's state and issues
//! commands to it.
//!
//! - [`spawn_store`] runs the stream state store: one streaming connection,
//!   the latest [`SystemSnapshot`](lockscope_types::SystemSnapshot), and
//!   connectivity status, pushed to observers on every change.
//! - [`spawn_reconnector`] supervises the store with a bounded retry policy.
//! - [`CommandClient`] wraps the REST API.
//!
//! All state changes arrive through the stream; commands never write to
//! the store.

pub mod actor;
pub mod commands;
pub mod constants;
pub mod endpoints;
pub mod reconnect;
pub mod store;
pub mod subscriptions;
pub mod transport;

pub use actor::{StoreError, StoreHandle, spawn_store};
pub use commands::{CommandClient, CommandError};
pub use endpoints::{EndpointError, Endpoints};
pub use reconnect::{ReconnectPolicy, ReconnectTask, spawn_reconnector};
pub use store::StreamStore;
pub use subscriptions::{
    ConnectionState, ConnectionStatus, ObserverId, StateUpdate, Subscription, UpdateCause,
};
pub use transport::{Connector, MessageStream, TransportError, WsConnector};

/// Spawn a store connected (lazily) to the backend's WebSocket stream.
///
/// Must be called within a tokio runtime. The store starts `Disconnected`;
/// call [`StoreHandle::connect`] to open it.
pub fn spawn_ws_store(endpoints: &Endpoints) -> StoreHandle {
    spawn_store(WsConnector::new(endpoints.stream_url().as_str()))
}

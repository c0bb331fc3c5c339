//! Shared wire types for lockscope.
//!
//! This crate is the schema layer between the deadlock-detection backend and
//! everything that consumes its state. It has **no internal lockscope
//! dependencies**. The client and view both build on it.
//!
//! # Overview
//!
//! ```text
//! StreamMessage ← one UTF-8 JSON document from the state stream
//!     ├── Snapshot(SystemSnapshot)
//!     │       ├── processes: [Process]
//!     │       ├── resources: [Resource]
//!     │       ├── graph: GraphData { nodes, edges }
//!     │       ├── deadlock_detected / deadlocked_processes
//!     │       └── prediction: Prediction { probability, risk_level }
//!     └── Event(ServerEvent)   (e.g. deadlock_resolved)
//! ```
//!
//! # Key Types
//!
//! |--------------------|----------------------------------------------|
//! | Type               | Purpose                                      |
//! |--------------------|----------------------------------------------|
//! | [`SystemSnapshot`] | Full backend state at one point in time      |
//! | [`GraphData`]      | Hold/wait graph projection                   |
//! | [`StreamMessage`]  | Validated decode of one stream message       |
//! | [`Scenario`]       | Catalogue of canned backend test setups      |
//! | [`command`]        | REST request/response payloads               |
//! |--------------------|----------------------------------------------|

pub mod command;
pub mod event;
pub mod graph;
pub mod scenario;
pub mod snapshot;

pub use event::{ServerEvent, StreamMessage};
pub use graph::{GraphData, GraphEdge, GraphNode, NodeKind};
pub use scenario::Scenario;
pub use snapshot::{Prediction, Process, Resource, RiskLevel, SystemSnapshot};

/// Errors from decoding backend payloads.
///
/// Decoding fails closed: anything that doesn't match the schema is an
/// error, never a half-populated value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object at the top level")]
    NotAnObject,
    #[error("unknown stream event: {0}")]
    UnknownEvent(String),
    #[error("deadlock probability out of range: {0}")]
    InvalidProbability(f64),
}

//! Request and response payloads for the backend's REST commands.
//!
//! Commands never mutate local state directly: their effects come back
//! through the state stream. These types only describe the acknowledgements.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::snapshot::{Prediction, SystemSnapshot};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProcess {
    pub name: String,
    /// Resource ids the new process starts out requesting.
    #[serde(default)]
    pub resources: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCreated {
    pub process_id: u64,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResource {
    pub name: String,
    pub instances: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCreated {
    pub resource_id: u64,
    pub status: String,
}

/// Body for both request and release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceClaim {
    pub process_id: u64,
    pub resource_id: u64,
}

/// Outcome of asking for a resource instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    Allocated,
    Failed,
    /// Refused up front because the predicted deadlock risk was too high.
    Blocked,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub status: RequestStatus,
    #[serde(default)]
    pub deadlock_detected: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub probability: Option<f64>,
}

/// Bare `{"status": ...}` acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAck {
    pub status: String,
}

/// Detector output embedded in scenario reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockInfo {
    pub has_deadlock: bool,
    #[serde(default)]
    pub cycle: Vec<String>,
}

/// Response from one of the `/api/test/*` setup endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub status: String,
    pub deadlock_detected: bool,
    pub deadlock_info: DeadlockInfo,
    pub ai_prediction: Prediction,
}

/// A scenario run: the setup report plus the state it produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioRun {
    pub report: ScenarioReport,
    pub snapshot: SystemSnapshot,
}

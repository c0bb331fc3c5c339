//! System snapshot: one complete description of backend state.
//!
//! Snapshots are immutable values. The stream delivers a fresh one roughly
//! every second; consumers replace, never patch.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::DecodeError;
use crate::graph::GraphData;

/// Full backend state at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub processes: Vec<Process>,
    pub resources: Vec<Resource>,
    pub graph: GraphData,
    pub deadlock_detected: bool,
    /// Node ids on the detected cycle. Only meaningful when
    /// `deadlock_detected` is set.
    pub deadlocked_processes: BTreeSet<String>,
    pub prediction: Prediction,
}

impl SystemSnapshot {
    /// Decode and validate a snapshot document.
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        let snapshot: SystemSnapshot = serde_json::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Decode and validate from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DecodeError> {
        let snapshot: SystemSnapshot = serde_json::from_value(value)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Semantic checks serde can't express.
    pub fn validate(&self) -> Result<(), DecodeError> {
        self.prediction.validate()
    }

    /// Whether a node id is part of the detected deadlock.
    pub fn is_deadlocked(&self, node_id: &str) -> bool {
        self.deadlock_detected && self.deadlocked_processes.contains(node_id)
    }

    /// Resource record behind a graph node id like `R3`.
    pub fn resource_for_node(&self, node_id: &str) -> Option<&Resource> {
        let id = parse_node_number(node_id, 'R')?;
        self.resources.iter().find(|r| r.id == id)
    }
}

fn parse_node_number(node_id: &str, prefix: char) -> Option<u64> {
    node_id.strip_prefix(prefix)?.parse().ok()
}

/// A process as tracked by the backend's process manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: u64,
    pub name: String,
    /// Free-form lifecycle label (`"ready"`, ...).
    pub state: String,
    /// Resource ids this process holds.
    #[serde(default)]
    pub allocated: Vec<u64>,
    /// Resource ids this process is waiting on.
    #[serde(default)]
    pub requested: Vec<u64>,
    #[serde(default)]
    pub wait_time: f64,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
}

/// A resource class with a fixed number of instances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: u64,
    pub name: String,
    /// Total instance count.
    #[serde(rename = "instances")]
    pub total: u32,
    /// Free instances as reported. Not trusted: see [`Resource::available_clamped`].
    pub available: i64,
    #[serde(default)]
    pub allocated_to: Vec<u64>,
}

impl Resource {
    /// Availability clamped into `0..=total`.
    pub fn available_clamped(&self) -> u32 {
        self.available.clamp(0, i64::from(self.total)) as u32
    }
}

/// Backend's deadlock forecast.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub deadlock_probability: f64,
    pub risk_level: RiskLevel,
}

impl Prediction {
    pub fn validate(&self) -> Result<(), DecodeError> {
        let p = self.deadlock_probability;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(DecodeError::InvalidProbability(p));
        }
        Ok(())
    }
}

/// Coarse risk bucket.
///
/// `Unknown` and `Error` are what the backend reports when it has nothing to
/// predict from or its model failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
    Error,
}

// ============================================================================
// Tests
// ============================================================================

//! Human-readable console lines.

use lockscope_client::{ConnectionState, StateUpdate, UpdateCause};
use lockscope_types::command::{RequestOutcome, ScenarioReport};
use lockscope_types::{Scenario, SystemSnapshot};

/// One-line summary of a snapshot.
pub fn snapshot_line(snapshot: &SystemSnapshot) -> String {
    let deadlock = if snapshot.deadlock_detected {
        let ids: Vec<&str> = snapshot.deadlocked_processes.iter().map(String::as_str).collect();
        format!("DEADLOCK [{}]", ids.join(", "))
    } else {
        "no deadlock".to_string()
    };
    format!(
        "{} processes, {} resources, {} edges | {} | risk {} ({:.2})",
        snapshot.processes.len(),
        snapshot.resources.len(),
        snapshot.graph.edges.len(),
        deadlock,
        snapshot.prediction.risk_level,
        snapshot.prediction.deadlock_probability,
    )
}

/// Console line for a store update, or `None` if it isn't worth printing.
pub fn update_line(update: &StateUpdate) -> Option<String> {
    let state = &update.state;
    let line = match &update.cause {
        UpdateCause::ConnectStarted { manual: true } => "connecting".to_string(),
        UpdateCause::ConnectStarted { manual: false } => {
            format!("reconnecting (attempt {})", state.retry_count)
        }
        UpdateCause::Connected => "connected".to_string(),
        UpdateCause::ConnectFailed { error } => format!("connect failed: {error}"),
        UpdateCause::ConnectionLost { reason } => format!("connection lost: {reason}"),
        UpdateCause::Disconnected => "disconnected".to_string(),
        UpdateCause::Snapshot => return state.latest_snapshot.as_deref().map(snapshot_line),
    };
    Some(format!("[{}] {line}", status_tag(state)))
}

fn status_tag(state: &ConnectionState) -> String {
    state.status.to_string().to_lowercase()
}

pub fn outcome_line(outcome: &RequestOutcome) -> String {
    let mut line = outcome.status.to_string();
    if let Some(reason) = &outcome.reason {
        line.push_str(&format!(": {reason}"));
    }
    if let Some(p) = outcome.probability {
        line.push_str(&format!(" (p={p:.2})"));
    }
    if outcome.deadlock_detected == Some(true) {
        line.push_str(" [deadlock detected]");
    }
    line
}

pub fn scenario_line(scenario: Scenario, report: &ScenarioReport) -> String {
    let cycle = if report.deadlock_info.cycle.is_empty() {
        String::new()
    } else {
        format!(" cycle {}", report.deadlock_info.cycle.join(" -> "))
    };
    format!(
        "{}: {} | deadlock {}{} | predicted {} ({:.2})",
        scenario,
        report.status,
        report.deadlock_detected,
        cycle,
        report.ai_prediction.risk_level,
        report.ai_prediction.deadlock_probability,
    )
}

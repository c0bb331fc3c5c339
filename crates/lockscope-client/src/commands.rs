//! REST command client.
//!
//! A thin request/response wrapper: one HTTP call per operation, no retries,
//! no idempotency tricks. Effects of commands show up later on the state
//! stream; the acknowledgements returned here are informational.

use lockscope_types::command::{
    CreateProcess, CreateResource, ProcessCreated, RequestOutcome, ResourceClaim,
    ResourceCreated, ScenarioReport, ScenarioRun, StatusAck,
};
use lockscope_types::{DecodeError, Scenario, SystemSnapshot};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::constants::REQUEST_TIMEOUT;
use crate::endpoints::{EndpointError, Endpoints};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("undecodable response: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Clone, Debug)]
pub struct CommandClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl CommandClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, CommandError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ── Processes & resources ────────────────────────────────────────────

    pub async fn create_process(
        &self,
        name: &str,
        resources: &[u64],
    ) -> Result<ProcessCreated, CommandError> {
        let body = CreateProcess {
            name: name.to_string(),
            resources: resources.to_vec(),
        };
        self.post("/api/process/create", &body).await
    }

    pub async fn create_resource(
        &self,
        name: &str,
        instances: u32,
    ) -> Result<ResourceCreated, CommandError> {
        let body = CreateResource {
            name: name.to_string(),
            instances,
        };
        self.post("/api/resource/create", &body).await
    }

    pub async fn request_resource(
        &self,
        process_id: u64,
        resource_id: u64,
    ) -> Result<RequestOutcome, CommandError> {
        let body = ResourceClaim {
            process_id,
            resource_id,
        };
        self.post("/api/process/request", &body).await
    }

    pub async fn release_resource(
        &self,
        process_id: u64,
        resource_id: u64,
    ) -> Result<StatusAck, CommandError> {
        let body = ResourceClaim {
            process_id,
            resource_id,
        };
        self.post("/api/process/release", &body).await
    }

    // ── System ───────────────────────────────────────────────────────────

    /// Poll the current state (fallback for when the stream is down).
    pub async fn fetch_state(&self) -> Result<SystemSnapshot, CommandError> {
        let url = self.endpoints.command_url("/api/system/state")?;
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        let text = success_body(response).await?;
        Ok(SystemSnapshot::from_json(&text)?)
    }

    pub async fn reset(&self) -> Result<(), CommandError> {
        let url = self.endpoints.command_url("/api/system/reset")?;
        debug!(%url, "POST");
        let response = self.http.post(url).send().await?;
        success_body(response).await?;
        Ok(())
    }

    /// Set up a canned scenario and return the state it produced.
    pub async fn run_scenario(&self, scenario: Scenario) -> Result<ScenarioRun, CommandError> {
        let url = self.endpoints.command_url(scenario.path())?;
        debug!(%url, %scenario, "POST");
        let response = self.http.post(url).send().await?;
        let report: ScenarioReport = decode_json(&success_body(response).await?)?;
        info!(
            %scenario,
            deadlock = report.deadlock_detected,
            risk = %report.ai_prediction.risk_level,
            "scenario set up"
        );
        let snapshot = self.fetch_state().await?;
        Ok(ScenarioRun { report, snapshot })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, CommandError> {
        let url = self.endpoints.command_url(path)?;
        debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        decode_json(&success_body(response).await?)
    }
}

/// Body text of a 2xx response, or a `Status` error carrying the body.
async fn success_body(response: reqwest::Response) -> Result<String, CommandError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(CommandError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn decode_json<R: DeserializeOwned>(text: &str) -> Result<R, CommandError> {
    serde_json::from_str(text).map_err(|e| CommandError::Decode(DecodeError::Json(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_error_is_decode() {
        let err = decode_json::<StatusAck>("{\"nope\": 1}").unwrap_err();
        assert!(matches!(err, CommandError::Decode(DecodeError::Json(_))));
    }

    #[test]
    fn test_status_error_display() {
        let err = CommandError::Status {
            status: 422,
            body: "{\"detail\": \"missing name\"}".into(),
        };
        assert_eq!(err.to_string(), "backend returned 422: {\"detail\": \"missing name\"}");
    }
}

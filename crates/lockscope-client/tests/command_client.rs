//! REST command client against a scripted loopback HTTP responder.

use lockscope_client::{CommandClient, CommandError, Endpoints};
use lockscope_types::command::RequestStatus;
use lockscope_types::{RiskLevel, Scenario};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the responder.
#[derive(Debug)]
struct Captured {
    method: String,
    path: String,
    body: String,
}

/// Answer one connection per scripted `(status, body)`, in order.
async fn serve(responses: Vec<(u16, String)>) -> (CommandClient, JoinHandle<Vec<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(tcp);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).await.unwrap();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut buf = vec![0u8; content_length];
            reader.read_exact(&mut buf).await.unwrap();
            captured.push(Captured {
                method,
                path,
                body: String::from_utf8(buf).unwrap(),
            });

            let response = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut tcp = reader.into_inner();
            tcp.write_all(response.as_bytes()).await.unwrap();
            tcp.shutdown().await.ok();
        }
        captured
    });
    let endpoints = Endpoints::from_base(&format!("http://{addr}")).unwrap();
    (CommandClient::new(endpoints).unwrap(), task)
}

fn state_body() -> String {
    serde_json::json!({
        "processes": [
            {"id": 1, "name": "P1", "allocated": [1], "requested": [2], "wait_time": 0.0,
             "created_at": 1700000000.0, "state": "waiting"},
            {"id": 2, "name": "P2", "allocated": [2], "requested": [1], "wait_time": 0.0,
             "created_at": 1700000001.0, "state": "waiting"}
        ],
        "resources": [
            {"id": 1, "name": "R1", "instances": 1, "available": 0, "allocated_to": [1]},
            {"id": 2, "name": "R2", "instances": 1, "available": 0, "allocated_to": [2]}
        ],
        "graph": {
            "nodes": [
                {"id": "P1", "type": "process"}, {"id": "P2", "type": "process"},
                {"id": "R1", "type": "resource"}, {"id": "R2", "type": "resource"}
            ],
            "edges": [
                {"source": "R1", "target": "P1"}, {"source": "P1", "target": "R2"},
                {"source": "R2", "target": "P2"}, {"source": "P2", "target": "R1"}
            ]
        },
        "deadlock_detected": true,
        "deadlocked_processes": ["P1", "R2", "P2", "R1"],
        "prediction": {"deadlock_probability": 0.85, "risk_level": "HIGH"}
    })
    .to_string()
}

#[tokio::test]
async fn test_fetch_state_decodes_snapshot() {
    let (client, server) = serve(vec![(200, state_body())]).await;

    let snapshot = client.fetch_state().await.unwrap();
    assert!(snapshot.deadlock_detected);
    assert_eq!(snapshot.processes.len(), 2);
    assert_eq!(snapshot.graph.edges.len(), 4);
    assert!(snapshot.is_deadlocked("P1"));
    assert_eq!(snapshot.prediction.risk_level, RiskLevel::High);

    let captured = server.await.unwrap();
    assert_eq!(captured[0].method, "GET");
    assert_eq!(captured[0].path, "/api/system/state");
}

#[tokio::test]
async fn test_create_process_posts_json() {
    let (client, server) = serve(vec![(
        200,
        r#"{"process_id": 3, "status": "created"}"#.to_string(),
    )])
    .await;

    let created = client.create_process("worker", &[1, 2]).await.unwrap();
    assert_eq!(created.process_id, 3);

    let captured = server.await.unwrap();
    assert_eq!(captured[0].method, "POST");
    assert_eq!(captured[0].path, "/api/process/create");
    let body: serde_json::Value = serde_json::from_str(&captured[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"name": "worker", "resources": [1, 2]}));
}

#[tokio::test]
async fn test_blocked_request_is_not_an_error() {
    let (client, server) = serve(vec![(
        200,
        r#"{"status": "blocked", "reason": "High deadlock risk", "probability": 0.91}"#.to_string(),
    )])
    .await;

    let outcome = client.request_resource(1, 2).await.unwrap();
    assert_eq!(outcome.status, RequestStatus::Blocked);
    assert_eq!(outcome.probability, Some(0.91));

    let captured = server.await.unwrap();
    assert_eq!(captured[0].path, "/api/process/request");
    let body: serde_json::Value = serde_json::from_str(&captured[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"process_id": 1, "resource_id": 2}));
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let (client, _server) = serve(vec![(500, r#"{"detail": "boom"}"#.to_string())]).await;

    let err = client.release_resource(1, 1).await.unwrap_err();
    match err {
        CommandError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_scenario_follows_up_with_state() {
    let report = serde_json::json!({
        "status": "success",
        "deadlock_detected": true,
        "deadlock_info": {"has_deadlock": true, "cycle": ["P1", "R2", "P2", "R1"]},
        "ai_prediction": {"deadlock_probability": 0.85, "risk_level": "HIGH"}
    })
    .to_string();
    let (client, server) = serve(vec![(200, report), (200, state_body())]).await;

    let run = client.run_scenario(Scenario::SimpleDeadlock).await.unwrap();
    assert!(run.report.deadlock_info.has_deadlock);
    assert_eq!(run.report.deadlock_info.cycle.len(), 4);
    assert_eq!(run.snapshot.graph.nodes.len(), 4);

    let captured = server.await.unwrap();
    assert_eq!(captured[0].method, "POST");
    assert_eq!(captured[0].path, Scenario::SimpleDeadlock.path());
    assert_eq!(captured[1].method, "GET");
    assert_eq!(captured[1].path, "/api/system/state");
}

#[tokio::test]
async fn test_reset_ignores_body() {
    let (client, server) = serve(vec![(200, r#"{"status": "reset"}"#.to_string())]).await;
    client.reset().await.unwrap();
    assert_eq!(server.await.unwrap()[0].path, "/api/system/reset");
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = CommandClient::new(Endpoints::from_base(&format!("http://{addr}")).unwrap()).unwrap();
    assert!(matches!(client.reset().await.unwrap_err(), CommandError::Http(_)));
}

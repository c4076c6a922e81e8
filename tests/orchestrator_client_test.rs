//! Integration tests for the HTTP orchestrator client
//!
//! - API version negotiation accepts compatible servers and rejects
//!   incompatible ones
//! - Job composition round-trips the job entries
//! - Submitting returns a job handle
//! - An unknown job id is a distinct error, not a protocol failure

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use forgeplan::error::OrchestratorError;
use forgeplan::orchestrator::client::HttpOrchestrator;
use forgeplan::orchestrator::{JobRequest, JobState, Orchestrator};

#[tokio::test]
async fn test_api_version_within_range_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "1.4.2" })))
        .mount(&server)
        .await;

    let client = HttpOrchestrator::new(server.uri());
    client.check_api_version().await.expect("1.x is supported");
}

#[tokio::test]
async fn test_api_version_outside_range_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "2.0.0" })))
        .mount(&server)
        .await;

    let client = HttpOrchestrator::new(server.uri());
    let err = client
        .check_api_version()
        .await
        .expect_err("2.x is unsupported");
    assert!(matches!(err, OrchestratorError::ApiVersionMismatch { .. }));
}

#[tokio::test]
async fn test_create_job_decodes_trove_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/compose"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "trove_list": [
                {
                    "name": "group-server",
                    "version": {
                        "label": "products.example.com@ex:devel",
                        "revision": "1.0-7",
                        "serial": 7
                    },
                    "flavor": "is: x86",
                    "context": "x86"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = HttpOrchestrator::new(server.uri());
    let request = JobRequest {
        targets: vec!["group-server{x86}".to_string()],
        ..JobRequest::default()
    };
    let job = client.create_job(&request).await.expect("create_job");
    assert_eq!(job.trove_list.len(), 1);
    assert_eq!(job.trove_list[0].context, "x86");
}

#[tokio::test]
async fn test_create_job_transport_failure_is_retried() {
    // Nothing listens on this port: every attempt is a transport error.
    let client = HttpOrchestrator::with_config("http://127.0.0.1:1", 2, 1);
    let request = JobRequest {
        targets: vec!["group-server{x86}".to_string()],
        ..JobRequest::default()
    };
    let err = client
        .create_job(&request)
        .await
        .expect_err("unreachable server must fail");
    assert!(matches!(err, OrchestratorError::Network { .. }));
}

#[tokio::test]
async fn test_submit_returns_job_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": 42 })))
        .mount(&server)
        .await;

    let client = HttpOrchestrator::new(server.uri());
    let handle = client
        .submit(&forgeplan::core::job::Job::new())
        .await
        .expect("submit");
    assert_eq!(handle.job_id, 42);
}

#[tokio::test]
async fn test_job_status_decodes_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": 42,
            "state": "building"
        })))
        .mount(&server)
        .await;

    let client = HttpOrchestrator::new(server.uri());
    let status = client.job_status(42).await.expect("job_status");
    assert_eq!(status.state, JobState::Building);
    assert!(!status.is_finished());
}

#[tokio::test]
async fn test_unknown_job_is_job_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = HttpOrchestrator::new(server.uri());
    let err = client.job_status(99).await.expect_err("unknown job");
    assert!(matches!(err, OrchestratorError::JobNotFound { job_id: 99 }));
}

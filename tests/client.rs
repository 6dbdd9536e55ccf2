//! Integration tests for MicrocksClient.
//!
//! Uses wiremock for HTTP mocking. Tests cover test creation and polling,
//! artifact upload, status mapping, and Keycloak token acquisition.

use std::io::Write;

use microcks_cli::auth::UNAUTHENTICATED_TOKEN;
use microcks_cli::client::{MicrocksApi, MicrocksClient, TestRunHandle, TestRunRequest};
use microcks_cli::config::ClientConfig;
use microcks_cli::error::ClientError;
use microcks_cli::runner::RunnerType;
use serde_json::json;
use wiremock::matchers::{
    body_partial_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_config(mock_server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/api", mock_server.uri()), "cli", "secret")
}

fn create_test_client(mock_server: &MockServer) -> MicrocksClient {
    let mut client = MicrocksClient::new(&client_config(mock_server)).expect("failed to create client");
    client.set_oauth_token("test-token");
    client
}

#[tokio::test]
async fn test_create_test_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tests"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "serviceId": "Beer Catalog API:0.9",
            "testEndpoint": "http://beer-catalog:9000/api/",
            "runnerType": "OPEN_API_SCHEMA",
            "timeout": 10000,
            "filteredOperations": ["GET /beer"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "5f3c2b1a",
            "inProgress": true,
            "success": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut request = TestRunRequest::new(
        "Beer Catalog API:0.9",
        "http://beer-catalog:9000/api/",
        RunnerType::OpenApiSchema,
        10_000,
    );
    request.filtered_operations = Some(vec!["GET /beer".to_string()]);

    let client = create_test_client(&mock_server);
    let handle = client
        .create_test_result(&request)
        .await
        .expect("create failed");

    assert_eq!(handle.as_str(), "5f3c2b1a");
}

#[tokio::test]
async fn test_create_test_result_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tests"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Service not found"))
        .mount(&mock_server)
        .await;

    let request = TestRunRequest::new("Unknown:1.0", "http://x", RunnerType::Http, 5_000);
    let client = create_test_client(&mock_server);
    let result = client.create_test_result(&request).await;

    match result {
        Err(ClientError::UnexpectedStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Service not found");
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_test_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tests/5f3c2b1a"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "5f3c2b1a",
            "success": true,
            "inProgress": false,
            "testedEndpoint": "http://beer-catalog:9000/api/",
            "runnerType": "OPEN_API_SCHEMA",
            "elapsedTime": 1234,
            "testCaseResults": []
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let status = client
        .get_test_result(&TestRunHandle::new("5f3c2b1a"))
        .await
        .expect("get failed");

    assert!(status.success);
    assert!(!status.in_progress);
    assert_eq!(status.elapsed_time, Some(1234));
}

#[tokio::test]
async fn test_get_test_result_invalid_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tests/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.get_test_result(&TestRunHandle::new("abc")).await;

    assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_get_test_result_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tests/abc"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.get_test_result(&TestRunHandle::new("abc")).await;

    assert!(matches!(
        result,
        Err(ClientError::Unauthorized { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_get_test_result_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tests/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.get_test_result(&TestRunHandle::new("missing")).await;

    assert!(matches!(result, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_upload_artifact() {
    let mock_server = MockServer::start().await;

    let mut artifact = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    write!(artifact, "{{\"info\": {{\"name\": \"Beer Catalog API\"}}}}").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/artifact/upload"))
        .and(query_param("mainArtifact", "false"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_string_contains("Beer Catalog API"))
        .and(body_string_contains("name=\"file\""))
        .respond_with(ResponseTemplate::new(201).set_body_string("Beer Catalog API:0.9"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let message = client
        .upload_artifact(artifact.path(), false)
        .await
        .expect("upload failed");

    assert_eq!(message, "Beer Catalog API:0.9");
}

#[tokio::test]
async fn test_upload_artifact_requires_created() {
    let mock_server = MockServer::start().await;

    let artifact = tempfile::NamedTempFile::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/artifact/upload"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.upload_artifact(artifact.path(), true).await;

    assert!(matches!(
        result,
        Err(ClientError::UnexpectedStatus { status: 204, .. })
    ));
}

#[tokio::test]
async fn test_upload_missing_artifact_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/artifact/upload"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client
        .upload_artifact(std::path::Path::new("/nonexistent/openapi.yaml"), true)
        .await;

    assert!(matches!(result, Err(ClientError::Artifact { .. })));
}

#[tokio::test]
async fn test_connect_without_keycloak_uses_placeholder_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/keycloak/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled": false,
            "realm": "microcks",
            "auth-server-url": "http://localhost:8180"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tests/abc"))
        .and(header(
            "authorization",
            format!("Bearer {}", UNAUTHENTICATED_TOKEN).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "success": false,
            "inProgress": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MicrocksClient::connect(&client_config(&mock_server))
        .await
        .expect("connect failed");
    let status = client
        .get_test_result(&TestRunHandle::new("abc"))
        .await
        .expect("get failed");

    assert!(status.in_progress);
}

#[tokio::test]
async fn test_connect_with_keycloak_fetches_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/keycloak/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled": true,
            "realm": "microcks",
            "auth-server-url": format!("{}/auth", mock_server.uri())
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/realms/microcks/protocol/openid-connect/token"))
        .and(header("authorization", "Basic Y2xpOnNlY3JldA=="))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "kc-token",
            "token_type": "bearer",
            "expires_in": 300
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tests/abc"))
        .and(header("authorization", "Bearer kc-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "success": true,
            "inProgress": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MicrocksClient::connect(&client_config(&mock_server))
        .await
        .expect("connect failed");
    let status = client
        .get_test_result(&TestRunHandle::new("abc"))
        .await
        .expect("get failed");

    assert!(status.success);
}

#[tokio::test]
async fn test_connect_with_rejected_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/keycloak/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "realm": "microcks",
            "auth-server-url": format!("{}/auth", mock_server.uri())
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/realms/microcks/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&mock_server)
        .await;

    let result = MicrocksClient::connect(&client_config(&mock_server)).await;

    assert!(matches!(
        result,
        Err(ClientError::Unauthorized { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_connection_refused() {
    // Nothing listens on port 1
    let config = ClientConfig::new("http://127.0.0.1:1/api", "cli", "secret");

    let result = MicrocksClient::connect(&config).await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
}

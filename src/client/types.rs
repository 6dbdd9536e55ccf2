//! Request and response bodies exchanged with the server.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runner::RunnerType;

/// Identifier of a test result, returned when a test run is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestRunHandle(String);

impl TestRunHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestRunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One header override: a name and its comma-separated values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDto {
    pub name: String,
    pub values: String,
}

/// Header overrides keyed by operation name, or `globals` for all operations.
pub type OperationsHeaders = BTreeMap<String, Vec<HeaderDto>>;

/// How the server obtains a token for the tested endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OAuth2GrantType {
    Password,
    ClientCredentials,
    RefreshToken,
}

/// OAuth2 client context the server uses when calling the tested endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2ClientContext {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub token_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub grant_type: OAuth2GrantType,
}

/// Body of the create-test call. Built once per `test` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRunRequest {
    /// `apiName:apiVersion`.
    #[serde(rename = "serviceId")]
    pub service_ref: String,

    /// URL of the implementation under test.
    #[serde(rename = "testEndpoint")]
    pub endpoint: String,

    #[serde(rename = "runnerType")]
    pub runner_type: RunnerType,

    /// Server-side test timeout in milliseconds.
    #[serde(rename = "timeout")]
    pub timeout_millis: u64,

    /// Secret the server uses to reach the endpoint.
    #[serde(rename = "secretName", skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    /// Restrict the test to these operations.
    #[serde(rename = "filteredOperations", skip_serializing_if = "Option::is_none")]
    pub filtered_operations: Option<Vec<String>>,

    #[serde(rename = "operationsHeaders", skip_serializing_if = "Option::is_none")]
    pub operations_headers: Option<OperationsHeaders>,

    #[serde(rename = "oAuth2Context", skip_serializing_if = "Option::is_none")]
    pub oauth2_context: Option<OAuth2ClientContext>,
}

impl TestRunRequest {
    /// A request with only the mandatory fields set.
    pub fn new(
        service_ref: impl Into<String>,
        endpoint: impl Into<String>,
        runner_type: RunnerType,
        timeout_millis: u64,
    ) -> Self {
        Self {
            service_ref: service_ref.into(),
            endpoint: endpoint.into(),
            runner_type,
            timeout_millis,
            secret_name: None,
            filtered_operations: None,
            operations_headers: None,
            oauth2_context: None,
        }
    }
}

/// The part of a created test result the client needs back.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedTestResult {
    pub id: String,
}

/// Current state of a test run, re-fetched on every poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunStatus {
    pub id: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<i64>,
}

/// Identity provider settings published by the server.
///
/// Servers predating the `enabled` field always run with Keycloak.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeycloakConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub realm: String,
    #[serde(rename = "auth-server-url", default)]
    pub auth_server_url: String,
}

fn default_enabled() -> bool {
    true
}

impl KeycloakConfig {
    /// Client-credentials token endpoint of the configured realm.
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.auth_server_url.trim_end_matches('/'),
            self.realm
        )
    }
}

/// Token endpoint response; only the access token is used.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

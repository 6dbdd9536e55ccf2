//! Remote client for the Microcks REST API.
//!
//! The commands only see the [`MicrocksApi`] trait, so they can run against
//! the real server through [`MicrocksClient`] or against an in-memory fake in
//! tests.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | [`MicrocksClient::keycloak_config`] | `GET {api}/keycloak/config` |
//! | [`MicrocksApi::create_test_result`] | `POST {api}/tests` |
//! | [`MicrocksApi::get_test_result`] | `GET {api}/tests/{id}` |
//! | [`MicrocksApi::upload_artifact`] | `POST {api}/artifact/upload?mainArtifact={bool}` |

pub mod types;

pub(crate) mod http;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::auth;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

use http::{Expect, HttpBackend};

pub use types::{
    HeaderDto, KeycloakConfig, OAuth2ClientContext, OAuth2GrantType, OperationsHeaders,
    TestRunHandle, TestRunRequest, TestRunStatus,
};

/// Operations the commands need from the server.
#[async_trait]
pub trait MicrocksApi: Send + Sync {
    /// Launch a test run and return its handle.
    async fn create_test_result(&self, request: &TestRunRequest) -> ClientResult<TestRunHandle>;

    /// Fetch the current status of a test run.
    async fn get_test_result(&self, handle: &TestRunHandle) -> ClientResult<TestRunStatus>;

    /// Upload one artifact file and return the server's message (the name
    /// of the discovered service).
    async fn upload_artifact(&self, path: &Path, main_artifact: bool) -> ClientResult<String>;
}

/// HTTP implementation of [`MicrocksApi`].
#[derive(Debug, Clone)]
pub struct MicrocksClient {
    http: HttpBackend,
}

impl MicrocksClient {
    /// Create a client for `config.api_url`; no request is sent.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: HttpBackend::new(&config.api_url, &config.transport)?,
        })
    }

    /// Create a client and authenticate it with the configured service account.
    pub async fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let mut client = Self::new(config)?;
        let token = auth::obtain_token(&client, config).await?;
        client.set_oauth_token(token);
        Ok(client)
    }

    /// Bearer token sent with every subsequent request.
    pub fn set_oauth_token(&mut self, token: impl Into<String>) {
        self.http.token = Some(token.into());
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    /// Identity provider settings published by the server.
    pub async fn keycloak_config(&self) -> ClientResult<KeycloakConfig> {
        let url = self.http.url("keycloak/config");
        let body = self
            .http
            .execute(self.http.client.get(&url), Expect::Success)
            .await?;

        serde_json::from_str(&body).map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse keycloak config: {}", e))
        })
    }
}

#[async_trait]
impl MicrocksApi for MicrocksClient {
    async fn create_test_result(&self, request: &TestRunRequest) -> ClientResult<TestRunHandle> {
        let url = self.http.url("tests");
        debug!(service = %request.service_ref, runner = %request.runner_type, "creating test");

        let body = self
            .http
            .execute(self.http.client.post(&url).json(request), Expect::Success)
            .await?;

        let created: types::CreatedTestResult = serde_json::from_str(&body).map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse created test result: {}", e))
        })?;

        Ok(TestRunHandle::new(created.id))
    }

    async fn get_test_result(&self, handle: &TestRunHandle) -> ClientResult<TestRunStatus> {
        let url = self.http.url(&format!("tests/{}", handle));

        let body = self
            .http
            .execute(self.http.client.get(&url), Expect::Success)
            .await?;

        serde_json::from_str(&body).map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse test result: {}", e))
        })
    }

    async fn upload_artifact(&self, path: &Path, main_artifact: bool) -> ClientResult<String> {
        let local = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let bytes = tokio::fs::read(&local)
            .await
            .map_err(|source| ClientError::Artifact {
                path: path.to_path_buf(),
                source,
            })?;

        let file_name = Path::new(&local)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| local.clone());
        debug!(file = %file_name, size = bytes.len(), main_artifact, "uploading artifact");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let url = self.http.url("artifact/upload");
        let request = self
            .http
            .client
            .post(&url)
            .query(&[("mainArtifact", main_artifact)])
            .multipart(form);

        self.http.execute(request, Expect::Created).await
    }
}

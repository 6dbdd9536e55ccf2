//! HTTP layer: transport construction, bearer auth, status mapping.
//!
//! This is the only place that interprets status codes; `client.rs` deals in
//! typed results.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use tracing::debug;

use crate::config::TransportConfig;
use crate::error::{ClientError, ClientResult};

/// Timeout applied to every request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT_VALUE: &str = concat!("microcks-cli/", env!("CARGO_PKG_VERSION"));

/// Which statuses count as success for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    /// Any 2xx.
    Success,
    /// Exactly 201 Created.
    Created,
}

impl Expect {
    fn accepts(self, status: StatusCode) -> bool {
        match self {
            Expect::Success => status.is_success(),
            Expect::Created => status == StatusCode::CREATED,
        }
    }
}

/// Build a reqwest client honouring the transport options.
pub(crate) fn build_client(transport: &TransportConfig) -> ClientResult<reqwest::Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    let mut builder = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .default_headers(default_headers);

    if transport.insecure_tls {
        debug!("TLS certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    for path in &transport.ca_cert_paths {
        let pem = std::fs::read(path).map_err(|e| {
            ClientError::Config(format!("cannot read CA certificate {}: {}", path.display(), e))
        })?;
        let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
            ClientError::Config(format!("invalid CA certificate {}: {}", path.display(), e))
        })?;
        debug!("Trusting CA certificate from {}", path.display());
        builder = builder.add_root_certificate(cert);
    }

    builder
        .build()
        .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {}", e)))
}

/// HTTP backend shared by the server and identity provider clients.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
    pub(crate) verbose: bool,
}

impl HttpBackend {
    pub(crate) fn new(base_url: &str, transport: &TransportConfig) -> ClientResult<Self> {
        Ok(Self {
            client: build_client(transport)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            verbose: transport.verbose,
        })
    }

    /// Absolute URL for a path relative to the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and return the body text if the status is expected.
    pub(crate) async fn execute(
        &self,
        builder: RequestBuilder,
        expect: Expect,
    ) -> ClientResult<String> {
        let builder = match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        debug!(%method, %url, "sending request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("failed to read response body: {}", e)))?;

        if self.verbose {
            debug!(%method, %url, status = status.as_u16(), body = %body, "received response");
        } else {
            debug!(%method, %url, status = status.as_u16(), "received response");
        }

        map_status(status, body, expect, url.as_str())
    }
}

/// Turn a status and body into the call result.
pub(crate) fn map_status(
    status: StatusCode,
    body: String,
    expect: Expect,
    url: &str,
) -> ClientResult<String> {
    if expect.accepts(status) {
        return Ok(body);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized {
            status: status.as_u16(),
            body,
        }),
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(url.to_string())),
        _ => Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }),
    }
}

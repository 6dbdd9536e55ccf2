//! Bearer token acquisition.
//!
//! The server publishes its identity provider settings at
//! `/keycloak/config`. When Keycloak is enabled, a token is requested with
//! the OAuth2 client-credentials grant using the service account given by
//! `--keycloakClientId` / `--keycloakClientSecret`. When it is disabled the
//! server accepts any token and a placeholder is sent.
//!
//! Tokens are requested once per invocation and never cached or refreshed.

use tracing::info;

use crate::client::http::{Expect, HttpBackend};
use crate::client::types::TokenResponse;
use crate::client::{KeycloakConfig, MicrocksClient};
use crate::config::{ClientConfig, TransportConfig};
use crate::error::{ClientError, ClientResult};

/// Token sent when the server runs without Keycloak.
pub const UNAUTHENTICATED_TOKEN: &str = "unauthentifed-token";

/// Client for the realm's token endpoint.
#[derive(Debug, Clone)]
pub struct KeycloakClient {
    http: HttpBackend,
    client_id: String,
    client_secret: String,
}

impl KeycloakClient {
    pub fn new(
        keycloak: &KeycloakConfig,
        transport: &TransportConfig,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ClientResult<Self> {
        Ok(Self {
            http: HttpBackend::new(&keycloak.token_url(), transport)?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    /// Request an access token with the client-credentials grant.
    pub async fn connect_and_get_token(&self) -> ClientResult<String> {
        let request = self
            .http
            .client
            .post(&self.http.base_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")]);

        let body = self.http.execute(request, Expect::Success).await?;

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse token response: {}", e))
        })?;

        Ok(token.access_token)
    }
}

/// Obtain the bearer token for `client`.
pub async fn obtain_token(client: &MicrocksClient, config: &ClientConfig) -> ClientResult<String> {
    let keycloak = client.keycloak_config().await?;

    if !keycloak.enabled {
        info!("Keycloak is disabled on the server, skipping authentication");
        return Ok(UNAUTHENTICATED_TOKEN.to_string());
    }

    let keycloak_client = KeycloakClient::new(
        &keycloak,
        &config.transport,
        &config.client_id,
        &config.client_secret,
    )?;

    info!("Requesting token from realm '{}'", keycloak.realm);
    keycloak_client.connect_and_get_token().await
}

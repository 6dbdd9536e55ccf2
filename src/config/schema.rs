//! Configuration schema definitions for microcks-cli.
//!
//! Two layers live here:
//!
//! - [`Config`]: the optional TOML defaults file passed with `--config`.
//!   Every section and key is optional; command-line flags win over it.
//! - [`ClientConfig`] / [`TransportConfig`]: the resolved, immutable values
//!   handed to the HTTP client once flags and file have been merged.
//!
//! # Schema Overview
//!
//! ```text
//! Config (root)
//! ├── MicrocksSection    - API base URL
//! ├── KeycloakSection    - service account credentials
//! └── TransportSection   - TLS and verbosity options
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root of the TOML defaults file.
///
/// # TOML Structure
///
/// ```toml
/// [microcks]
/// url = "http://localhost:8080/api"
///
/// [keycloak]
/// client_id = "microcks-serviceaccount"
/// client_secret = "ab54d329-e435-41ae-a900-ec6b3fe15c54"
///
/// [transport]
/// insecure = false
/// ca_certs = ["/etc/ssl/certs/my-ca.crt"]
/// verbose = false
/// ```
///
/// # Example
///
/// ```
/// use microcks_cli::config::Config;
///
/// let config: Config = toml::from_str(r#"
///     [microcks]
///     url = "http://localhost:8080/api"
/// "#).unwrap();
///
/// assert!(config.keycloak.client_id.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Server location.
    #[serde(default)]
    pub microcks: MicrocksSection,

    /// Service account used to obtain a bearer token.
    #[serde(default)]
    pub keycloak: KeycloakSection,

    /// HTTPS and logging options.
    #[serde(default)]
    pub transport: TransportSection,
}

/// `[microcks]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MicrocksSection {
    /// API base URL, equivalent to `--microcksURL`.
    ///
    /// Usually ends with `/api`; the web UI link printed after a test is
    /// derived from the part before `/api`.
    pub url: Option<String>,
}

/// `[keycloak]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeycloakSection {
    /// Equivalent to `--keycloakClientId`.
    pub client_id: Option<String>,

    /// Equivalent to `--keycloakClientSecret`.
    pub client_secret: Option<String>,
}

/// `[transport]` section.
///
/// # Defaults
///
/// | Field | Default |
/// |-------|---------|
/// | `insecure` | `false` |
/// | `ca_certs` | `[]` |
/// | `verbose` | `false` |
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransportSection {
    /// Accept invalid server certificates. Equivalent to `--insecure`.
    #[serde(default)]
    pub insecure: bool,

    /// Extra PEM files added to the trusted roots. Equivalent to `--caCerts`.
    #[serde(default)]
    pub ca_certs: Vec<PathBuf>,

    /// Dump HTTP exchanges through the logger. Equivalent to `--verbose`.
    #[serde(default)]
    pub verbose: bool,
}

impl TransportSection {
    /// The transport options this section describes, before flag overrides.
    pub fn to_transport(&self) -> TransportConfig {
        TransportConfig {
            insecure_tls: self.insecure,
            ca_cert_paths: self.ca_certs.clone(),
            verbose: self.verbose,
        }
    }
}

/// Transport options for every HTTP call of one invocation.
///
/// Built once from flags (and the optional file) before the client exists,
/// then passed by reference into the client constructor. Nothing mutates it
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Skip server certificate verification.
    pub insecure_tls: bool,

    /// PEM files whose certificates are added to the trusted roots.
    pub ca_cert_paths: Vec<PathBuf>,

    /// Log request and response bodies at debug level.
    pub verbose: bool,
}

impl TransportConfig {
    /// Replace the CA certificate list with the comma-separated `raw` paths.
    ///
    /// Empty segments are dropped and `~` is expanded.
    pub fn with_ca_cert_list(mut self, raw: &str) -> Self {
        self.ca_cert_paths = parse_path_list(raw);
        self
    }
}

/// Split a comma-separated path list, dropping empty segments.
pub fn parse_path_list(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| PathBuf::from(shellexpand::tilde(s).into_owned()))
        .collect()
}

/// Resolved connection settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:8080/api`.
    pub api_url: String,

    /// Keycloak service account client id.
    pub client_id: String,

    /// Keycloak service account secret.
    pub client_secret: String,

    /// HTTPS and logging options.
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Settings with the default transport options.
    pub fn new(
        api_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            transport: TransportConfig::default(),
        }
    }

    /// Replaces the transport options.
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Base URL of the web UI: everything before the first `/api`.
    ///
    /// ```
    /// use microcks_cli::config::{ClientConfig, TransportConfig};
    ///
    /// let config = ClientConfig {
    ///     api_url: "http://localhost:8080/api/".to_string(),
    ///     client_id: "id".to_string(),
    ///     client_secret: "secret".to_string(),
    ///     transport: TransportConfig::default(),
    /// };
    /// assert_eq!(config.ui_base_url(), "http://localhost:8080");
    /// ```
    pub fn ui_base_url(&self) -> &str {
        match self.api_url.find("/api") {
            Some(idx) => &self.api_url[..idx],
            None => self.api_url.trim_end_matches('/'),
        }
    }

    /// Link to the web page showing a test result in full.
    pub fn test_result_url(&self, id: &str) -> String {
        format!("{}/#/tests/{}", self.ui_base_url(), id)
    }
}

//! Command-line surface.
//!
//! Argument parsing is left to clap, but presence checks are done here so
//! that every usage error carries the exact message users and scripts
//! expect and exits with status 1. Nothing in this module touches the
//! network: a command that fails validation never builds a client.
//!
//! Validation order for `test`:
//!
//! 1. the three positionals are present
//! 2. the runner is a known [`RunnerType`]
//! 3. `--microcksURL`, `--keycloakClientId`, `--keycloakClientSecret`
//! 4. `--waitFor` (soft: falls back to 5 seconds)
//! 5. the JSON-valued flags

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::artifact::{ArtifactReference, parse_artifact_list};
use crate::client::{OAuth2ClientContext, OperationsHeaders, TestRunRequest};
use crate::config::{ClientConfig, Config, load_config};
use crate::duration::wait_millis_or_default;
use crate::error::CliError;
use crate::runner::RunnerType;

/// Printed when `test` is missing a positional argument.
pub const TEST_USAGE: &str = "test command require <apiName:apiVersion> <testEndpoint> <runner> args";

/// Printed when `import` is missing its artifact list.
pub const IMPORT_USAGE: &str =
    "import command require <specificationFile1[:primary],specificationFile2[:primary]> args";

#[derive(Parser, Debug)]
#[command(name = "microcks-cli")]
#[command(about = "Command line client for Microcks API mocking and testing", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch a conformance test run and wait for its result
    Test(TestArgs),

    /// Upload API artifacts to the server
    Import(ImportArgs),

    /// Print the client version
    Version,
}

impl Cli {
    /// Connection flags of the selected command, if it has any.
    pub fn connection(&self) -> Option<&ConnectionArgs> {
        match &self.command {
            Commands::Test(args) => Some(&args.connection),
            Commands::Import(args) => Some(&args.connection),
            Commands::Version => None,
        }
    }
}

/// Flags shared by every command that talks to the server.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Microcks API URL, e.g. http://localhost:8080/api
    #[arg(long = "microcksURL", value_name = "URL")]
    pub microcks_url: Option<String>,

    /// Keycloak Realm Service Account ClientId
    #[arg(long = "keycloakClientId", value_name = "ID")]
    pub keycloak_client_id: Option<String>,

    /// Keycloak Realm Service Account ClientSecret
    #[arg(long = "keycloakClientSecret", value_name = "SECRET")]
    pub keycloak_client_secret: Option<String>,

    /// Whether to accept insecure HTTPS connection
    #[arg(long)]
    pub insecure: bool,

    /// Comma separated paths of CRT files to add to Root CAs
    #[arg(long = "caCerts", value_name = "PATHS")]
    pub ca_certs: Option<String>,

    /// Produce dumps of HTTP exchanges
    #[arg(long)]
    pub verbose: bool,

    /// TOML file providing defaults for the flags above
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Load the `--config` file, or empty defaults when none was given.
    pub fn load_file(&self) -> Result<Config, CliError> {
        match &self.config {
            Some(path) => {
                debug!("Loading defaults from {}", path.display());
                load_config(path).map_err(CliError::Config)
            }
            None => Ok(Config::default()),
        }
    }

    /// Whether HTTP exchanges should be dumped.
    pub fn verbose(&self, file: &Config) -> bool {
        self.verbose || file.transport.verbose
    }

    /// Merge flags over `file` and check the mandatory values.
    pub fn resolve(&self, file: &Config) -> Result<ClientConfig, CliError> {
        let api_url = mandatory(
            self.microcks_url.as_deref(),
            file.microcks.url.as_deref(),
            "microcksURL",
        )?;
        let client_id = mandatory(
            self.keycloak_client_id.as_deref(),
            file.keycloak.client_id.as_deref(),
            "keycloakClientId",
        )?;
        let client_secret = mandatory(
            self.keycloak_client_secret.as_deref(),
            file.keycloak.client_secret.as_deref(),
            "keycloakClientSecret",
        )?;

        let mut transport = file.transport.to_transport();
        transport.insecure_tls |= self.insecure;
        transport.verbose |= self.verbose;
        if let Some(raw) = non_empty(self.ca_certs.as_deref()) {
            transport = transport.with_ca_cert_list(raw);
        }

        Ok(ClientConfig::new(api_url, client_id, client_secret).with_transport(transport))
    }
}

/// Arguments of the `test` command.
#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    /// API name and version, e.g. "Beer Catalog API:0.9"
    #[arg(value_name = "apiName:apiVersion")]
    pub service_ref: Option<String>,

    /// URL of the implementation to test
    #[arg(value_name = "testEndpoint")]
    pub test_endpoint: Option<String>,

    /// Test runner: HTTP, SOAP_HTTP, SOAP_UI, POSTMAN, OPEN_API_SCHEMA,
    /// ASYNC_API_SCHEMA, GRPC_PROTOBUF or GRAPHQL_SCHEMA
    #[arg(value_name = "runner")]
    pub runner: Option<String>,

    /// Time to wait for test to finish (e.g. 500milli, 5sec, 2min)
    #[arg(long = "waitFor", default_value = "5sec")]
    pub wait_for: String,

    /// Secret to use for connecting test endpoint
    #[arg(long = "secretName")]
    pub secret_name: Option<String>,

    /// List of operations to launch a test for
    #[arg(long = "filteredOperations")]
    pub filtered_operations: Option<String>,

    /// Override of operations headers as JSON string
    #[arg(long = "operationsHeaders")]
    pub operations_headers: Option<String>,

    /// OAuth2 client context as JSON string
    #[arg(long = "oAuth2Context")]
    pub oauth2_context: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Everything the `test` command needs once arguments are validated.
#[derive(Debug, Clone)]
pub struct TestSettings {
    pub client: ClientConfig,
    pub request: TestRunRequest,
}

impl TestArgs {
    pub fn resolve(&self, file: &Config) -> Result<TestSettings, CliError> {
        let (Some(service_ref), Some(endpoint), Some(runner)) = (
            non_empty(self.service_ref.as_deref()),
            non_empty(self.test_endpoint.as_deref()),
            non_empty(self.runner.as_deref()),
        ) else {
            return Err(CliError::usage(TEST_USAGE));
        };

        let runner = runner
            .parse::<RunnerType>()
            .map_err(|e| CliError::usage(e.to_string()))?;

        let client = self.connection.resolve(file)?;

        let timeout_millis = wait_millis_or_default(&self.wait_for);

        let mut request = TestRunRequest::new(service_ref, endpoint, runner, timeout_millis);
        request.secret_name = non_empty(self.secret_name.as_deref()).map(str::to_string);
        request.filtered_operations = non_empty(self.filtered_operations.as_deref())
            .map(parse_filtered_operations)
            .transpose()?;
        request.operations_headers = non_empty(self.operations_headers.as_deref())
            .map(parse_operations_headers)
            .transpose()?;
        request.oauth2_context = non_empty(self.oauth2_context.as_deref())
            .map(parse_oauth2_context)
            .transpose()?;

        Ok(TestSettings { client, request })
    }
}

/// Arguments of the `import` command.
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Comma separated artifact files, each optionally suffixed with
    /// `:true` or `:false` to say whether it is the primary artifact
    #[arg(value_name = "specificationFile1[:primary],specificationFile2[:primary]")]
    pub artifacts: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Everything the `import` command needs once arguments are validated.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub client: ClientConfig,
    pub artifacts: Vec<ArtifactReference>,
}

impl ImportArgs {
    pub fn resolve(&self, file: &Config) -> Result<ImportSettings, CliError> {
        let raw = non_empty(self.artifacts.as_deref()).ok_or_else(|| CliError::usage(IMPORT_USAGE))?;
        let client = self.connection.resolve(file)?;

        Ok(ImportSettings {
            client,
            artifacts: parse_artifact_list(raw),
        })
    }
}

/// Parse `--filteredOperations`.
///
/// A value starting with `[` must be a JSON array of strings; anything else
/// is read as a comma-separated list.
pub fn parse_filtered_operations(raw: &str) -> Result<Vec<String>, CliError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| {
            CliError::usage(format!("--filteredOperations is not a valid JSON array: {}", e))
        });
    }

    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parse `--operationsHeaders`.
pub fn parse_operations_headers(raw: &str) -> Result<OperationsHeaders, CliError> {
    serde_json::from_str(raw)
        .map_err(|e| CliError::usage(format!("--operationsHeaders is not valid JSON: {}", e)))
}

/// Parse `--oAuth2Context`.
pub fn parse_oauth2_context(raw: &str) -> Result<OAuth2ClientContext, CliError> {
    serde_json::from_str(raw)
        .map_err(|e| CliError::usage(format!("--oAuth2Context is not valid JSON: {}", e)))
}

fn mandatory<'a>(
    flag: Option<&'a str>,
    file: Option<&'a str>,
    name: &str,
) -> Result<&'a str, CliError> {
    non_empty(flag)
        .or_else(|| non_empty(file))
        .ok_or_else(|| CliError::usage(format!("--{} flag is mandatory. Check Usage.", name)))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

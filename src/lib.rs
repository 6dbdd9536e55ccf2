//! microcks-cli: command-line client for the Microcks API mocking and
//! contract-testing server.
//!
//! Two commands are provided:
//!
//! - **test**: launch a conformance test run against a live endpoint and
//!   poll it until it finishes or a deadline passes
//! - **import**: upload API artifacts (OpenAPI, AsyncAPI, Postman, ...) one
//!   at a time, stopping at the first failure
//!
//! # Architecture
//!
//! - **cli**: argument parsing and validation, no network access
//! - **client**: the [`MicrocksApi`] trait and its HTTP implementation
//! - **auth**: bearer token acquisition through Keycloak
//! - **orchestrator** / **import**: the command workflows, generic over
//!   [`MicrocksApi`]
//!
//! # Example
//!
//! ```no_run
//! use microcks_cli::client::MicrocksClient;
//! use microcks_cli::config::ClientConfig;
//! use microcks_cli::import::ImportOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::new("http://localhost:8080/api", "cli", "secret");
//!     let client = MicrocksClient::connect(&config).await?;
//!
//!     ImportOrchestrator::new(&client)
//!         .run_raw("beer-catalog-openapi.yaml,beer-catalog-postman.json:false", &mut std::io::stdout())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod import;
pub mod orchestrator;
pub mod runner;

// Re-export commonly used types
pub use artifact::ArtifactReference;
pub use client::{MicrocksApi, MicrocksClient, TestRunHandle, TestRunRequest, TestRunStatus};
pub use config::{ClientConfig, Config, TransportConfig, load_config};
pub use error::{CliError, ClientError};
pub use import::{ImportOrchestrator, ImportReport};
pub use orchestrator::{PollSchedule, PollState, TestRunOrchestrator, TestRunOutcome};
pub use runner::RunnerType;

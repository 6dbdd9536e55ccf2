//! Error types for the remote client and the commands.

use std::path::PathBuf;

/// Result type for remote client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by the remote client.
///
/// None of these are retried: a command reports the first one it sees and
/// exits.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server rejected the bearer token (401/403).
    #[error("unauthorized ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// The requested resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other status outside the expected range.
    #[error("unexpected response code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A local artifact could not be read before upload.
    #[error("cannot read artifact '{}': {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TLS or CA certificate setup failed.
    #[error("invalid transport configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Missing arguments, missing mandatory flags, invalid values.
    #[error("{0}")]
    Usage(String),

    /// The `--config` file could not be loaded.
    #[error("{0:#}")]
    Config(anyhow::Error),

    /// A remote call failed while performing `action`.
    #[error("Got error when invoking Microcks client {action}: {source}")]
    Client {
        action: &'static str,
        #[source]
        source: ClientError,
    },

    /// Writing command output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Build a usage error from any message.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Adapter for `map_err` tagging a client error with what was being done.
    pub fn client(action: &'static str) -> impl FnOnce(ClientError) -> Self {
        move |source| Self::Client { action, source }
    }

    /// Exit status for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

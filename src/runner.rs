//! Test runner types supported by the server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Protocol or specification style used to test an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunnerType {
    Http,
    SoapHttp,
    SoapUi,
    Postman,
    OpenApiSchema,
    AsyncApiSchema,
    GrpcProtobuf,
    GraphqlSchema,
}

/// Returned when a runner name is not one of [`RunnerType::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("<runner> should be one of: {}", RunnerType::choices())]
pub struct UnknownRunner(pub String);

impl RunnerType {
    /// Every runner, in the order they are listed to users.
    pub const ALL: [RunnerType; 8] = [
        RunnerType::Http,
        RunnerType::SoapHttp,
        RunnerType::SoapUi,
        RunnerType::Postman,
        RunnerType::OpenApiSchema,
        RunnerType::AsyncApiSchema,
        RunnerType::GrpcProtobuf,
        RunnerType::GraphqlSchema,
    ];

    /// Wire name, e.g. `OPEN_API_SCHEMA`.
    pub fn as_str(self) -> &'static str {
        match self {
            RunnerType::Http => "HTTP",
            RunnerType::SoapHttp => "SOAP_HTTP",
            RunnerType::SoapUi => "SOAP_UI",
            RunnerType::Postman => "POSTMAN",
            RunnerType::OpenApiSchema => "OPEN_API_SCHEMA",
            RunnerType::AsyncApiSchema => "ASYNC_API_SCHEMA",
            RunnerType::GrpcProtobuf => "GRPC_PROTOBUF",
            RunnerType::GraphqlSchema => "GRAPHQL_SCHEMA",
        }
    }

    fn choices() -> String {
        Self::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RunnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerType {
    type Err = UnknownRunner;

    /// Exact, case-sensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRunner(s.to_string()))
    }
}

//! Gateway HTTP wire types: `{ "prompt" }` in, `{ "response" }` or `{ "error" }` out.

use serde::{Deserialize, Serialize};

/// Route of the prompt passthrough endpoint.
pub const GATEWAY_PATH: &str = "/api/gemini";

/// Error text returned for every failure that is not a provider-reported error.
pub const GENERIC_FAILURE: &str = "Failed to process request";

/// Request body for `POST /api/gemini`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub prompt: String,
}

/// Response body: exactly one of `response` (success) or `error` (failure).
/// Externally tagged, so bodies with both keys or neither fail to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayResponse {
    Response(String),
    Error(String),
}

impl GatewayResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self::Response(text.into())
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Response(_))
    }
}

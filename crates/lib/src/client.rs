//! Client for the gateway's prompt endpoint.
//!
//! Every failure (transport, non-JSON body, proxy-reported error) resolves to
//! [`GatewayOutcome::Failed`]; nothing is returned as an `Err` and the raw error
//! text only goes to the log.

use crate::gateway::{GatewayRequest, GatewayResponse, GATEWAY_PATH};
use async_trait::async_trait;

/// Why a gateway call failed, as far as a view needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayFailure {
    /// The proxy answered with `{error}`.
    Service,
    /// The proxy could not be reached or its body was not a gateway response.
    Transport,
}

impl GatewayFailure {
    /// Short user-facing description; never includes provider error text.
    pub fn user_message(self) -> &'static str {
        match self {
            GatewayFailure::Service => "Failed to get response from AI. Please try again.",
            GatewayFailure::Transport => {
                "Failed to connect to AI service. Please check your connection."
            }
        }
    }
}

/// Settled result of one gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Response(String),
    Failed(GatewayFailure),
}

impl From<GatewayResponse> for GatewayOutcome {
    fn from(res: GatewayResponse) -> Self {
        match res {
            GatewayResponse::Response(text) => GatewayOutcome::Response(text),
            GatewayResponse::Error(_) => GatewayOutcome::Failed(GatewayFailure::Service),
        }
    }
}

/// Sends one prompt and waits for it to settle. Views depend on this, not on HTTP.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send(&self, prompt: &str) -> GatewayOutcome;
}

/// HTTP implementation of [`Gateway`]. No retries and no client-side timeout.
#[derive(Clone)]
pub struct GatewayClient {
    endpoint: String,
    client: reqwest::Client,
}

impl GatewayClient {
    /// `base_url` is the gateway root, e.g. `http://127.0.0.1:15151`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GATEWAY_PATH),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, prompt: &str) -> Result<GatewayResponse, reqwest::Error> {
        let body = GatewayRequest {
            prompt: prompt.to_string(),
        };
        // Status is not checked: the proxy reports failures in the body with a 500.
        let res = self.client.post(&self.endpoint).json(&body).send().await?;
        res.json::<GatewayResponse>().await
    }
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn send(&self, prompt: &str) -> GatewayOutcome {
        match self.post(prompt).await {
            Ok(GatewayResponse::Error(message)) => {
                log::warn!("gateway reported error: {}", message);
                GatewayOutcome::Failed(GatewayFailure::Service)
            }
            Ok(res) => res.into(),
            Err(e) => {
                log::warn!("gateway request to {} failed: {}", self.endpoint, e);
                GatewayOutcome::Failed(GatewayFailure::Transport)
            }
        }
    }
}

//! Gateway HTTP server: health probe and the prompt passthrough to the text-generation provider.

use crate::config::{self, Config};
use crate::gateway::protocol::{GatewayRequest, GatewayResponse, GATEWAY_PATH, GENERIC_FAILURE};
use crate::llm::{GeminiClient, ProviderError, TextGenerator};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the gateway. Immutable after startup; cloned per request.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn TextGenerator>,
}

impl GatewayState {
    pub fn new(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            config: Arc::new(config),
            generator,
        }
    }
}

/// Routes: `GET /` health, `POST /api/gemini` passthrough.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route(GATEWAY_PATH, post(generate_http))
        .with_state(state)
}

/// Run the gateway against the Gemini provider configured in `config.provider`.
/// Binds to config.gateway.bind:config.gateway.port and blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let api_key = config::resolve_api_key(&config);
    let generator = GeminiClient::from_config(&config.provider, api_key);
    serve(config, Arc::new(generator)).await
}

/// Run the gateway with an explicit generator.
pub async fn serve(config: Config, generator: Arc<dyn TextGenerator>) -> Result<()> {
    let bind = config.gateway.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) {
        log::warn!(
            "gateway bound to non-loopback address {}; the proxy has no authentication",
            bind
        );
    }
    let bind_addr = format!("{}:{}", bind, config.gateway.port);
    let app = router(GatewayState::new(config, generator));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Completes on SIGINT or SIGTERM. If a handler cannot be installed, that signal is ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "model": state.config.provider.model,
    }))
}

/// POST /api/gemini: `{prompt}` in, `200 {response}` or `500 {error}` out.
/// Provider-reported errors keep their message; everything else gets the generic failure text.
async fn generate_http(
    State(state): State<GatewayState>,
    body: Bytes,
) -> (StatusCode, Json<GatewayResponse>) {
    let request_id = uuid::Uuid::new_v4();
    let req: GatewayRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            log::error!("gateway {}: invalid request body: {}", request_id, e);
            return failure(GENERIC_FAILURE);
        }
    };
    log::debug!(
        "gateway {}: forwarding prompt ({} bytes)",
        request_id,
        req.prompt.len()
    );
    match state.generator.generate(&req.prompt).await {
        Ok(text) => {
            log::debug!("gateway {}: provider returned {} bytes", request_id, text.len());
            (StatusCode::OK, Json(GatewayResponse::ok(text)))
        }
        Err(ProviderError::Api(message)) => {
            log::warn!("gateway {}: provider error: {}", request_id, message);
            failure(message)
        }
        Err(e) => {
            log::error!("gateway {}: error calling provider: {}", request_id, e);
            failure(GENERIC_FAILURE)
        }
    }
}

fn failure(message: impl Into<String>) -> (StatusCode, Json<GatewayResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(GatewayResponse::err(message)),
    )
}

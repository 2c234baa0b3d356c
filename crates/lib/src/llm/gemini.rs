//! Gemini `generateContent` client (https://generativelanguage.googleapis.com/v1beta by default).
//! Non-streaming only: one prompt in, the first candidate's first text part out.

use crate::config::ProviderConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Produces text for a prompt. The gateway depends on this rather than on a concrete provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Error reported by the provider itself (`{"error": {"message": ...}}`).
    #[error("provider api error: {0}")]
    Api(String),
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Sampling parameters sent as `generationConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

impl From<&ProviderConfig> for GenerationConfig {
    fn from(p: &ProviderConfig) -> Self {
        Self {
            temperature: p.temperature,
            top_k: p.top_k,
            top_p: p.top_p,
            max_output_tokens: p.max_output_tokens,
        }
    }
}

/// Client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    generation: GenerationConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        generation: GenerationConfig,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            generation,
            client: reqwest::Client::new(),
        }
    }

    /// Build from the provider section of the config; `api_key` comes from `config::resolve_api_key`.
    pub fn from_config(provider: &ProviderConfig, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            log::warn!("no provider api key configured (set provider.apiKey or GEMINI_API_KEY)");
        }
        Self::new(
            provider.base_url.clone(),
            provider.model.clone(),
            api_key.unwrap_or_default(),
            GenerationConfig::from(provider),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// POST models/{model}:generateContent. The key is passed as a query parameter.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: self.generation,
        };
        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        // Non-JSON bodies (including error pages) are malformed; only `error.message` is forwarded.
        let data: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Malformed(format!("status {}: {}", status, e)))?;
        data.into_text()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generate_content(prompt).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    /// Absent on non-text parts (`functionCall`, `inlineData`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, or the provider's own error message.
    fn into_text(self) -> Result<String, ProviderError> {
        if let Some(err) = self.error {
            return Err(ProviderError::Api(err.message));
        }
        let candidate = self
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| ProviderError::Malformed("no candidates".to_string()))?;
        candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| ProviderError::Malformed("candidate has no text part".to_string()))
    }
}

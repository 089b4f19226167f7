use crate::{Result, VerityError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::config::GeminiConfig;
use super::wire::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// One request/response exchange with a generative model
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// Built once and shared; it holds no per-request state.
#[derive(Clone)]
pub struct GeminiClient {
    pub(crate) http: Client,
    pub(crate) cfg: GeminiConfig,
}

impl GeminiClient {
    /// A missing key is a warning here; each call then fails with a configuration error
    pub fn new(cfg: GeminiConfig) -> Result<Self> {
        if !cfg.has_credentials() {
            warn!(
                target = "verity::llm",
                "GEMINI_API_KEY is not set; every analysis will fail until it is configured"
            );
        }
        let mut builder = Client::builder();
        if let Some(ms) = cfg.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder
            .build()
            .map_err(|e| VerityError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::default())
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.cfg
    }

    /// Apply provider options from config on top of the caller's request
    fn decorate(&self, request: &GenerateContentRequest) -> GenerateContentRequest {
        let mut req = request.clone();
        if self.cfg.search_grounding && req.tools.is_empty() {
            req.tools.push(json!({ "google_search": {} }));
        }
        if let Some(t) = self.cfg.temperature {
            req.generation_config
                .get_or_insert_with(GenerationConfig::default)
                .temperature
                .get_or_insert(t);
        }
        req
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let key = self
            .cfg
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                VerityError::Configuration(
                    "missing credential: set GEMINI_API_KEY to call the model".to_string(),
                )
            })?;

        let url = self.cfg.generate_url();
        debug!(target = "verity::llm", model = %self.cfg.model, "POST {}", url);

        let body = self.decorate(request);
        let resp = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(target = "verity::llm", error = %e, "generateContent request failed");
                VerityError::request(e.to_string())
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(target = "verity::llm", %status, body = %text, "generateContent error");
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.error.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| {
                    if text.trim().is_empty() {
                        format!("Gemini API error: status={status}")
                    } else {
                        format!("Gemini API error: status={status} body={text}")
                    }
                });
            return Err(VerityError::request(message));
        }

        resp.json::<GenerateContentResponse>().await.map_err(|e| {
            error!(target = "verity::llm", error = %e, "generateContent returned unreadable JSON");
            VerityError::request(format!("Failed to read Gemini response: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GeminiConfig {
        GeminiConfig {
            base_url: "http://127.0.0.1:9/v1beta".to_string(),
            model: "models/gemini-2.5-flash".to_string(),
            api_key: Some("k".to_string()),
            request_timeout_ms: None,
            search_grounding: false,
            temperature: None,
        }
    }

    #[test]
    fn decorate_adds_search_tool_and_temperature() {
        let client = GeminiClient::new(GeminiConfig {
            search_grounding: true,
            temperature: Some(0.2),
            ..cfg()
        })
        .unwrap();
        let req = client.decorate(&GenerateContentRequest::default());
        assert_eq!(req.tools, vec![json!({ "google_search": {} })]);
        assert_eq!(req.generation_config.and_then(|g| g.temperature), Some(0.2));
    }

    #[test]
    fn decorate_leaves_request_alone_by_default() {
        let client = GeminiClient::new(cfg()).unwrap();
        let req = client.decorate(&GenerateContentRequest::default());
        assert_eq!(req, GenerateContentRequest::default());
    }
}

/// LLM Client: the single point of entry for generative-model calls.
///
/// ARCHITECTURAL RULE: No other module may call a model provider directly.
/// The planner only sees the `TextGenerator` capability; provider envelopes
/// stay inside this module.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model API key is not configured")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("response envelope has no text: {0}")]
    MissingText(String),
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    /// Near-deterministic sampling with a bounded output length.
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// Text generation capability. Implement this to swap providers without
/// touching the planner; callers receive the raw model text only.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable model identifier, used in logs.
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

/// Raw `generateContent` response. Every level is optional so that a
/// missing field is reported as a format error instead of a decode panic.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GeminiResponse {
    /// Joins every text part of the first candidate, in order. `None` when
    /// the candidate carries no text at all.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(parts.concat())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini `generateContent` client. No retries: a non-success status is
/// returned to the caller, which owns any retry policy.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::ClientBuild)?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Makes a raw call to the model, returning the full response envelope.
    pub async fn call(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GeminiResponse, LlmError> {
        let request_body = build_request(prompt, config);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Model API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let envelope: GeminiResponse = serde_json::from_str(&body).map_err(LlmError::Envelope)?;

        if let Some(usage) = &envelope.usage_metadata {
            debug!(
                "Model call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(envelope)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, LlmError> {
        let envelope = self.call(prompt, config).await?;
        extract_text(envelope)
    }
}

fn build_request<'a>(prompt: &'a str, config: &'a GenerationConfig) -> GeminiRequest<'a> {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart { text: prompt }],
        }],
        generation_config: config,
    }
}

fn extract_text(envelope: GeminiResponse) -> Result<String, LlmError> {
    match envelope.text() {
        Some(text) => Ok(text),
        None if envelope.candidates.is_empty() => {
            Err(LlmError::MissingText("no candidates returned".to_string()))
        }
        None => Err(LlmError::MissingText(
            "candidates[0].content.parts carry no text".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generation_config_is_low_temperature() {
        let config = GenerationConfig::default();
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert!((config.top_p - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 8192);
    }

    #[test]
    fn test_request_body_wire_shape() {
        let config = GenerationConfig::default();
        let body = serde_json::to_value(build_request("plan my week", &config)).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "plan my week");
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert!(body["generationConfig"].get("topP").is_some());
        assert!(body["generationConfig"].get("top_p").is_none());
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "[]"}], "role": "model"}, "finishReason": "STOP"}
            ],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 4}
        }"#;
        let envelope: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.text().as_deref(), Some("[]"));
        assert_eq!(extract_text(envelope).unwrap(), "[]");
    }

    #[test]
    fn test_split_response_parts_are_joined() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [
                    {"text": "[{\"tanggal\":\"2024-01-15\","},
                    {"text": "\"aktivitas\":\"Review\"}]"}
                ]}}
            ]
        }"#;
        let envelope: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            extract_text(envelope).unwrap(),
            r#"[{"tanggal":"2024-01-15","aktivitas":"Review"}]"#
        );
    }

    #[test]
    fn test_missing_candidates_is_format_error() {
        let envelope: GeminiResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        let err = extract_text(envelope).unwrap_err();
        assert!(matches!(err, LlmError::MissingText(_)));
    }

    #[test]
    fn test_candidate_without_text_is_format_error() {
        let envelope: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(envelope.text().is_none());
        assert!(matches!(
            extract_text(envelope),
            Err(LlmError::MissingText(_))
        ));
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let result = GeminiClient::new(
            "  ".to_string(),
            "https://example.invalid/v1beta".to_string(),
            "gemini-pro".to_string(),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new(
            "key".to_string(),
            "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            "gemini-pro".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }
}

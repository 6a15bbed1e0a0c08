//! Gemini text model
//!
//! Implements [`TextModel`] against the Gemini `generateContent` REST
//! endpoint. Structured output is requested through `generationConfig`
//! (`responseMimeType` plus `responseSchema`).

use crate::config::GeminiConfig;
use crate::error::{BedtimeError, GenerationError, Result};
use crate::generation::{GenerationRequest, TextModel};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API model
///
/// # Examples
///
/// ```
/// use bedtime_stories::config::GeminiConfig;
/// use bedtime_stories::generation::{GeminiModel, TextModel};
///
/// let model = GeminiModel::new(GeminiConfig::default()).unwrap();
/// assert_eq!(model.model_name(), "gemini-2.0-flash");
/// ```
pub struct GeminiModel {
    client: Client,
    config: GeminiConfig,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, if it has any
    fn into_text(self) -> Option<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            tracing::warn!("Gemini blocked the prompt: {}", reason);
        }

        let candidate = self.candidates.into_iter().next()?;
        if let Some(reason) = &candidate.finish_reason {
            tracing::debug!("Gemini finish reason: {}", reason);
        }

        let text: String = candidate
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        (!text.is_empty()).then_some(text)
    }
}

impl GeminiModel {
    /// Create a new Gemini model client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("bedtime-stories/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BedtimeError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini model: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(request: &GenerationRequest) -> GeminiRequest {
        let generation_config =
            if request.response_mime_type.is_some() || request.response_schema.is_some() {
                Some(GeminiGenerationConfig {
                    response_mime_type: request.response_mime_type.clone(),
                    response_schema: request.response_schema.clone(),
                })
            } else {
                None
            };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config,
        }
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<Vec<u8>>> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            BedtimeError::Config(
                "generation.gemini.api_key is not set (BEDTIME_GEMINI_API_KEY)".to_string(),
            )
        })?;

        let url = self.endpoint();
        let body = Self::build_request(request);
        tracing::debug!(
            "Sending Gemini request: model={}, prompt_chars={}",
            self.config.model,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                BedtimeError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(BedtimeError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read Gemini response body: {}", e);
            BedtimeError::Provider(format!("Failed to read Gemini response: {}", e))
        })?;

        if bytes.is_empty() {
            return Ok(None);
        }

        let body = std::str::from_utf8(&bytes)
            .map_err(|_| BedtimeError::Generation(GenerationError::InvalidEncoding))?;
        let parsed: GeminiResponse = serde_json::from_str(body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            BedtimeError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        Ok(parsed.into_text().map(String::into_bytes))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::story_response_schema;
    use serde_json::json;

    #[test]
    fn test_build_request_with_schema() {
        let request = GenerationRequest::json("tell a story", story_response_schema());
        let body = serde_json::to_value(GeminiModel::build_request(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "tell a story");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["properties"]["title"]["type"],
            "STRING"
        );
    }

    #[test]
    fn test_build_request_plain_text_has_no_config() {
        let body =
            serde_json::to_value(GeminiModel::build_request(&GenerationRequest::text("hi")))
                .unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"title\":" }, { "text": "\"x\"}" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("{\"title\":\"x\"}"));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_candidate_without_text_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let model = GeminiModel::new(GeminiConfig {
            api_base: "http://127.0.0.1:9999/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            model.endpoint(),
            "http://127.0.0.1:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}

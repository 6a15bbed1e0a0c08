//! Base text-model trait and request types
//!
//! This module defines the [`TextModel`] trait that generation endpoints
//! implement, along with the request structure and the response schema used
//! to ask for structured JSON output.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// A single prompt sent to a text-generation endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Natural-language instruction
    pub prompt: String,
    /// MIME type the reply must use, e.g. `application/json`
    pub response_mime_type: Option<String>,
    /// Schema the reply must follow, in the endpoint's schema dialect
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    /// Plain-text request with no output constraints
    ///
    /// # Examples
    ///
    /// ```
    /// use bedtime_stories::generation::GenerationRequest;
    ///
    /// let request = GenerationRequest::text("Say goodnight");
    /// assert!(request.response_schema.is_none());
    /// ```
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_mime_type: None,
            response_schema: None,
        }
    }

    /// Request whose reply must be JSON matching `schema`
    pub fn json(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
        }
    }
}

/// Schema for a generated story: an object with string `title` and
/// `content` fields
pub fn story_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "content": { "type": "STRING" }
        },
        "required": ["title", "content"]
    })
}

/// Text-generation endpoint
///
/// One call is one request/response exchange. Cancellation is done by
/// dropping the future.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Send a request and return the raw reply payload
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the endpoint answered without any text payload.
    /// The payload bytes are not yet checked for UTF-8.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the endpoint reports
    /// a failure status
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<Vec<u8>>>;

    /// Name of the model answering requests
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_sets_mime_type() {
        let request = GenerationRequest::json("tell a story", story_response_schema());
        assert_eq!(
            request.response_mime_type.as_deref(),
            Some("application/json")
        );
        assert!(request.response_schema.is_some());
    }

    #[test]
    fn test_story_schema_requires_both_fields() {
        let schema = story_response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["title"]["type"], "STRING");
        assert_eq!(schema["properties"]["content"]["type"], "STRING");
        assert_eq!(schema["required"], json!(["title", "content"]));
    }
}

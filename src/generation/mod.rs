//! Story generation
//!
//! [`StoryGenerator`] is the generation gateway. It turns a duration and
//! optional hints into a prompt, sends it to a [`TextModel`] asking for a
//! `{title, content}` JSON object, and decodes the reply into a [`Story`].
//!
//! A call fails with one of three [`GenerationError`] kinds when the reply
//! is unusable: no payload, a payload that is not UTF-8, or text that is not
//! the expected JSON. None of them are retried.

pub mod base;
pub mod gemini;
pub mod prompt;

pub use base::{story_response_schema, GenerationRequest, TextModel};
pub use gemini::GeminiModel;
pub use prompt::build_story_prompt;

use crate::config::GenerationConfig;
use crate::error::{BedtimeError, GenerationError, Result};
use crate::story::{normalize_optional, ReadingDuration, Story};
use serde::Deserialize;

/// Create a text model based on configuration
///
/// # Errors
///
/// Returns error if the generation type is unknown or the client cannot be
/// built
pub fn create_model(config: &GenerationConfig) -> Result<Box<dyn TextModel>> {
    match config.generation_type.as_str() {
        "gemini" => Ok(Box::new(GeminiModel::new(config.gemini.clone())?)),
        other => Err(BedtimeError::Config(format!("Unknown generation type: {}", other)).into()),
    }
}

/// Shape the model is asked to answer with
#[derive(Debug, Deserialize)]
struct StoryResponse {
    title: String,
    content: String,
}

/// Generation gateway producing stories from a text model
pub struct StoryGenerator {
    model: Box<dyn TextModel>,
}

impl StoryGenerator {
    /// Wrap an existing text model
    pub fn new(model: Box<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Build a generator for the configured endpoint
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        Ok(Self::new(create_model(config)?))
    }

    /// Generate a new story
    ///
    /// The returned story carries the generated title and content, the
    /// caller's duration and hints, a fresh id and the current time. It is
    /// not saved.
    ///
    /// # Errors
    ///
    /// Returns `BedtimeError::Generation` when the reply has no payload, is
    /// not UTF-8, or does not parse as a story; transport failures come
    /// back as whatever the model reports.
    pub async fn generate_story(
        &self,
        duration: ReadingDuration,
        description: Option<&str>,
        favorite_characters: Option<&str>,
    ) -> Result<Story> {
        let description = normalize_optional(description.map(str::to_string));
        let favorite_characters = normalize_optional(favorite_characters.map(str::to_string));

        let prompt = build_story_prompt(
            duration,
            description.as_deref(),
            favorite_characters.as_deref(),
        );
        let request = GenerationRequest::json(prompt, story_response_schema());

        tracing::info!(
            "Generating {} story with {}",
            duration.display_text(),
            self.model.model_name()
        );

        let payload = self
            .model
            .generate(&request)
            .await?
            .ok_or(BedtimeError::Generation(GenerationError::NoResponse))?;

        let story = parse_story_response(&payload, duration, description, favorite_characters)
            .map_err(BedtimeError::Generation)?;
        tracing::debug!(id = %story.id, title = %story.title, "Generated story");
        Ok(story)
    }
}

/// Decode a model reply into a new story
///
/// # Errors
///
/// Returns `GenerationError::InvalidEncoding` if `payload` is not UTF-8 and
/// `GenerationError::ParseFailure` if it is not a JSON object with string
/// `title` and `content` fields, or if the title is blank.
///
/// # Examples
///
/// ```
/// use bedtime_stories::generation::parse_story_response;
/// use bedtime_stories::story::ReadingDuration;
///
/// let story = parse_story_response(
///     br#"{"title":"The Brave Mouse","content":"Once..."}"#,
///     ReadingDuration::Ten,
///     Some("a brave mouse".to_string()),
///     None,
/// )
/// .unwrap();
/// assert_eq!(story.title, "The Brave Mouse");
/// assert_eq!(story.content.as_deref(), Some("Once..."));
/// ```
pub fn parse_story_response(
    payload: &[u8],
    duration: ReadingDuration,
    description: Option<String>,
    favorite_characters: Option<String>,
) -> std::result::Result<Story, GenerationError> {
    let text = std::str::from_utf8(payload).map_err(|_| GenerationError::InvalidEncoding)?;

    let response: StoryResponse = serde_json::from_str(text).map_err(|e| {
        tracing::warn!("Generated text is not a story object: {}", e);
        GenerationError::ParseFailure(e.to_string())
    })?;

    Story::new(
        response.title,
        Some(response.content),
        duration,
        description,
        favorite_characters,
    )
    .map_err(|e| GenerationError::ParseFailure(e.to_string()))
}

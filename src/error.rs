//! Error types for Bedtime Stories
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Bedtime Stories operations
///
/// This enum encompasses all errors that can occur while loading
/// configuration, talking to the story store, or generating stories.
#[derive(Error, Debug)]
pub enum BedtimeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Story store transport or write failures
    #[error("Storage error: {0}")]
    Store(String),

    /// Transport-level failures talking to the text-generation endpoint
    #[error("Provider error: {0}")]
    Provider(String),

    /// The generation endpoint answered but the reply could not become a story
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Invalid user input when constructing a story
    #[error("Invalid story: {0}")]
    Validation(String),

    /// No story matches the given identifier
    #[error("Story not found: {0}")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Ways a generation reply can fail to produce a story
///
/// Each kind is terminal for the call; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The endpoint returned no text payload
    #[error("No response from AI")]
    NoResponse,

    /// The payload was not valid UTF-8 text
    #[error("Invalid response format")]
    InvalidEncoding,

    /// The text did not match the expected `{title, content}` JSON shape
    #[error("Failed to parse story: {0}")]
    ParseFailure(String),
}

/// Reasons a stored record is rejected on read
///
/// These never reach the caller; `list_all` logs them and skips the record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing or empty title")]
    MissingTitle,

    #[error("missing duration")]
    MissingDuration,

    #[error("unsupported duration: {0}")]
    UnsupportedDuration(i64),

    #[error("unreadable duration: {0}")]
    UnreadableDuration(String),

    #[error("missing createdAt")]
    MissingCreatedAt,

    #[error("unparseable createdAt: {0}")]
    InvalidCreatedAt(String),
}

/// Result type alias for Bedtime Stories operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

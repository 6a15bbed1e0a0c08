//! Story domain types
//!
//! A [`Story`] is the record shared by the store and the generator. It is
//! built in memory, saved explicitly, listed newest first, and deleted by id.
//! There is no edit operation.

use crate::error::{BedtimeError, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How long a story takes to read aloud
///
/// The set of values is closed: records carrying any other number of
/// minutes are rejected on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ReadingDuration {
    Five,
    #[default]
    Ten,
    Fifteen,
}

impl ReadingDuration {
    /// Every supported duration, shortest first
    pub const ALL: [ReadingDuration; 3] = [Self::Five, Self::Ten, Self::Fifteen];

    /// Length in minutes
    pub fn minutes(self) -> i64 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Fifteen => 15,
        }
    }

    /// Human-readable label, e.g. "10 minutes"
    ///
    /// # Examples
    ///
    /// ```
    /// use bedtime_stories::story::ReadingDuration;
    ///
    /// assert_eq!(ReadingDuration::Five.display_text(), "5 minutes");
    /// ```
    pub fn display_text(self) -> String {
        format!("{} minutes", self.minutes())
    }
}

impl TryFrom<i64> for ReadingDuration {
    type Error = BedtimeError;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            15 => Ok(Self::Fifteen),
            other => Err(BedtimeError::Validation(format!(
                "unsupported duration {} (expected 5, 10 or 15)",
                other
            ))),
        }
    }
}

impl From<ReadingDuration> for i64 {
    fn from(value: ReadingDuration) -> Self {
        value.minutes()
    }
}

impl FromStr for ReadingDuration {
    type Err = BedtimeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let minutes: i64 = s
            .trim()
            .trim_end_matches("min")
            .trim()
            .parse()
            .map_err(|_| BedtimeError::Validation(format!("invalid duration: {}", s)))?;
        Self::try_from(minutes)
    }
}

impl fmt::Display for ReadingDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.minutes())
    }
}

/// Opaque story identifier, used as the document key in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an identifier read back from a store
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for compact listings
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bedtime story
///
/// `id` and `created_at` are fixed at construction. Optional text fields
/// never hold an empty string; see [`normalize_optional`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub duration: ReadingDuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_characters: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Create a new story with a fresh id, stamped now
    ///
    /// # Errors
    ///
    /// Returns `BedtimeError::Validation` if the title is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use bedtime_stories::story::{ReadingDuration, Story};
    ///
    /// let story = Story::new("The Sleepy Owl", None, ReadingDuration::Five, Some(String::new()), None)
    ///     .unwrap();
    /// assert_eq!(story.duration.minutes(), 5);
    /// assert!(story.description.is_none());
    /// ```
    pub fn new(
        title: impl Into<String>,
        content: Option<String>,
        duration: ReadingDuration,
        description: Option<String>,
        favorite_characters: Option<String>,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(BedtimeError::Validation("title cannot be empty".to_string()).into());
        }

        Ok(Self {
            id: StoryId::generate(),
            title,
            content: normalize_optional(content),
            duration,
            description: normalize_optional(description),
            favorite_characters: normalize_optional(favorite_characters),
            created_at: now(),
        })
    }

    /// Rebuild a story from a stored record, keeping its id and timestamp
    pub(crate) fn from_parts(
        id: StoryId,
        title: String,
        content: Option<String>,
        duration: ReadingDuration,
        description: Option<String>,
        favorite_characters: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            content: normalize_optional(content),
            duration,
            description: normalize_optional(description),
            favorite_characters: normalize_optional(favorite_characters),
            created_at,
        }
    }

    /// A ready-made story for trying out a fresh store
    pub fn sample() -> Self {
        Self {
            id: StoryId::generate(),
            title: "The Sleepy Dragon".to_string(),
            content: Some(
                "Once upon a time, in a cave lined with soft moss, a little dragon \
                 named Ember counted the stars until her eyes grew heavy.\n\n\
                 *Goodnight, Ember.*"
                    .to_string(),
            ),
            duration: ReadingDuration::Five,
            description: Some("A gentle story about a dragon falling asleep".to_string()),
            favorite_characters: Some("Ember".to_string()),
            created_at: now(),
        }
    }
}

/// Current time at the microsecond precision every store keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Map empty or whitespace-only text to `None`
///
/// # Examples
///
/// ```
/// use bedtime_stories::story::normalize_optional;
///
/// assert_eq!(normalize_optional(Some("  ".to_string())), None);
/// assert_eq!(normalize_optional(Some("owls".to_string())), Some("owls".to_string()));
/// ```
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

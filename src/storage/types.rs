use crate::error::RecordError;
use crate::story::{ReadingDuration, Story, StoryId};
use chrono::{DateTime, Utc};

/// A story record as read back from a store, before validation
///
/// Every field a backend may fail to supply is optional here. Turning a
/// record into a [`Story`] is where the read-side rules are enforced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredRecord {
    /// Document key
    pub key: String,
    pub title: Option<String>,
    pub content: Option<String>,
    /// Raw minute count; only 5, 10 and 15 are accepted
    pub duration: Option<i64>,
    /// Stored duration value that is not an integer, as the backend gave it
    pub unreadable_duration: Option<String>,
    pub description: Option<String>,
    pub favorite_characters: Option<String>,
    /// RFC 3339 timestamp text
    pub created_at: Option<String>,
}

impl StoredRecord {
    /// Validate the record and build a [`Story`] from it
    ///
    /// # Errors
    ///
    /// Returns the first [`RecordError`] found: a missing or empty title, a
    /// missing, unreadable or unsupported duration, or a missing or
    /// unparseable `createdAt`.
    pub fn into_story(self) -> std::result::Result<Story, RecordError> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(RecordError::MissingTitle)?;

        let minutes = match (self.duration, self.unreadable_duration) {
            (Some(minutes), _) => minutes,
            (None, Some(raw)) => return Err(RecordError::UnreadableDuration(raw)),
            (None, None) => return Err(RecordError::MissingDuration),
        };
        let duration = ReadingDuration::try_from(minutes)
            .map_err(|_| RecordError::UnsupportedDuration(minutes))?;

        let raw_created = self.created_at.ok_or(RecordError::MissingCreatedAt)?;
        let created_at = DateTime::parse_from_rfc3339(&raw_created)
            .map_err(|_| RecordError::InvalidCreatedAt(raw_created.clone()))?
            .with_timezone(&Utc);

        Ok(Story::from_parts(
            StoryId::from_key(self.key),
            title,
            self.content,
            duration,
            self.description,
            self.favorite_characters,
            created_at,
        ))
    }
}

//! Firestore story store
//!
//! Talks to the Firestore REST API (v1). Each story is one document in the
//! configured collection, keyed by the story id:
//!
//! | story field           | document field        | value type       |
//! |-----------------------|-----------------------|------------------|
//! | `title`               | `title`               | `stringValue`    |
//! | `content`             | `content`             | `stringValue`    |
//! | `duration`            | `duration`            | `integerValue`   |
//! | `description`         | `description`         | `stringValue`    |
//! | `favorite_characters` | `favoriteCharacters`  | `stringValue`    |
//! | `created_at`          | `createdAt`           | `timestampValue` |
//!
//! Absent optional fields are omitted from the document.

use crate::config::FirestoreConfig;
use crate::error::{BedtimeError, Result};
use crate::storage::{collect_stories, StoredRecord, StoryStore};
use crate::story::Story;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Story store backed by a Firestore collection
///
/// # Examples
///
/// ```
/// use bedtime_stories::config::FirestoreConfig;
/// use bedtime_stories::storage::FirestoreStore;
///
/// let config = FirestoreConfig {
///     project_id: "my-project".to_string(),
///     ..Default::default()
/// };
/// let store = FirestoreStore::new(config).unwrap();
/// assert!(store.collection_url().ends_with("/documents/stories"));
/// ```
pub struct FirestoreStore {
    client: Client,
    config: FirestoreConfig,
}

/// One entry of a `runQuery` reply; entries without a document only carry
/// progress metadata
#[derive(Debug, Deserialize)]
struct RunQueryEntry {
    #[serde(default)]
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl FirestoreDocument {
    /// The document id is the last segment of its resource name
    fn key(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn string_field(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)?
            .get("stringValue")?
            .as_str()
            .map(str::to_string)
    }

    /// Integer fields arrive as `integerValue` strings; integral doubles
    /// are accepted too
    ///
    /// `None` when the field is absent. A present value that is not a
    /// readable integer comes back as its raw JSON text.
    fn integer_field(&self, field: &str) -> Option<std::result::Result<i64, String>> {
        let value = self.fields.get(field)?;
        let parsed = if let Some(raw) = value.get("integerValue") {
            match raw {
                Value::String(s) => s.parse().ok(),
                other => other.as_i64(),
            }
        } else {
            value
                .get("doubleValue")
                .and_then(Value::as_f64)
                .filter(|double| double.fract() == 0.0)
                .map(|double| double as i64)
        };
        Some(parsed.ok_or_else(|| value.to_string()))
    }

    fn timestamp_field(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)?
            .get("timestampValue")?
            .as_str()
            .map(str::to_string)
    }

    fn into_record(self) -> StoredRecord {
        let (duration, unreadable_duration) = match self.integer_field("duration") {
            Some(Ok(minutes)) => (Some(minutes), None),
            Some(Err(raw)) => (None, Some(raw)),
            None => (None, None),
        };

        StoredRecord {
            key: self.key().to_string(),
            title: self.string_field("title"),
            content: self.string_field("content"),
            duration,
            unreadable_duration,
            description: self.string_field("description"),
            favorite_characters: self.string_field("favoriteCharacters"),
            created_at: self.timestamp_field("createdAt"),
        }
    }
}

/// Build the `fields` map written for a story
fn story_fields(story: &Story) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("title".into(), json!({ "stringValue": story.title }));
    fields.insert(
        "duration".into(),
        json!({ "integerValue": story.duration.minutes().to_string() }),
    );
    fields.insert(
        "createdAt".into(),
        json!({ "timestampValue": story.created_at.to_rfc3339_opts(SecondsFormat::Micros, true) }),
    );

    let optional = [
        ("content", &story.content),
        ("description", &story.description),
        ("favoriteCharacters", &story.favorite_characters),
    ];
    for (name, value) in optional {
        if let Some(text) = value.as_deref().filter(|t| !t.trim().is_empty()) {
            fields.insert(name.into(), json!({ "stringValue": text }));
        }
    }

    fields
}

impl FirestoreStore {
    /// Create a new Firestore store
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: FirestoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("bedtime-stories/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BedtimeError::Store(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Firestore store: project={}, collection={}",
            config.project_id,
            config.collection
        );

        Ok(Self { client, config })
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            self.config.api_base.trim_end_matches('/'),
            self.config.project_id,
            self.config.database
        )
    }

    /// URL of the story collection
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_root(), self.config.collection)
    }

    /// URL of one story document; the id is percent-encoded as a single
    /// path segment
    fn document_url(&self, story: &Story) -> Result<Url> {
        let mut url = Url::parse(&self.collection_url()).map_err(|e| {
            BedtimeError::Config(format!("Invalid Firestore api_base: {}", e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                BedtimeError::Config(format!(
                    "Firestore api_base cannot hold a path: {}",
                    self.config.api_base
                ))
            })?
            .push(story.id.as_str());
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.config.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        };
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::error!("Firestore {} request failed: {}", action, e);
            BedtimeError::Store(format!("Firestore {} request failed: {}", action, e))
        })?;
        Ok(response)
    }

    async fn status_error(response: reqwest::Response, action: &str) -> anyhow::Error {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("Firestore {} returned error {}: {}", action, status, error_text);
        BedtimeError::Store(format!(
            "Firestore {} returned error {}: {}",
            action, status, error_text
        ))
        .into()
    }
}

#[async_trait]
impl StoryStore for FirestoreStore {
    async fn save(&self, story: &Story) -> Result<()> {
        let url = self.document_url(story)?;
        tracing::debug!(id = %story.id, "Saving story to Firestore: {}", url);

        let body = json!({ "fields": story_fields(story) });
        let response = self.send(self.client.patch(url).json(&body), "save").await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response, "save").await);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Story>> {
        let url = format!("{}:runQuery", self.documents_root());
        tracing::debug!("Listing stories from Firestore: {}", url);

        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.config.collection }],
                "orderBy": [{
                    "field": { "fieldPath": "createdAt" },
                    "direction": "DESCENDING"
                }]
            }
        });

        let response = self.send(self.client.post(&url).json(&query), "list").await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response, "list").await);
        }

        let entries: Vec<RunQueryEntry> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Firestore query response: {}", e);
            BedtimeError::Store(format!("Failed to parse Firestore response: {}", e))
        })?;

        let records: Vec<StoredRecord> = entries
            .into_iter()
            .filter_map(|entry| entry.document)
            .map(FirestoreDocument::into_record)
            .collect();
        let total = records.len();
        let stories = collect_stories(records);

        tracing::debug!("Loaded {} of {} Firestore documents", stories.len(), total);
        Ok(stories)
    }

    async fn delete(&self, story: &Story) -> Result<()> {
        let url = self.document_url(story)?;
        tracing::debug!(id = %story.id, "Deleting story from Firestore: {}", url);

        let response = self.send(self.client.delete(url), "delete").await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(id = %story.id, "Story already absent from Firestore");
            return Ok(());
        }
        if !status.is_success() {
            return Err(Self::status_error(response, "delete").await);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

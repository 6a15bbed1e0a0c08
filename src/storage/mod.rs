//! Story persistence
//!
//! [`StoryStore`] is the persistence gateway: create-or-replace, list and
//! delete, one request per call with errors passed straight back. Two
//! backends implement it, a Firestore collection and a local SQLite file.
//!
//! Reads are lenient: records that fail validation are logged and skipped,
//! never reported as a partial failure.

use crate::config::StoreConfig;
use crate::error::{BedtimeError, Result};
use crate::story::Story;
use async_trait::async_trait;

pub mod firestore;
pub mod sqlite;
pub mod types;

pub use firestore::FirestoreStore;
pub use sqlite::SqliteStore;
pub use types::StoredRecord;

/// Persistence gateway for stories
///
/// Implementations keep no state between calls beyond their connection
/// settings; the backing store is the system of record.
///
/// # Examples
///
/// ```
/// use bedtime_stories::storage::{SqliteStore, StoryStore};
/// use bedtime_stories::story::Story;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = SqliteStore::new_with_path(dir.path().join("stories.db")).unwrap();
///
/// let story = Story::sample();
/// tokio_test::block_on(async {
///     store.save(&story).await.unwrap();
///     assert_eq!(store.list_all().await.unwrap(), vec![story.clone()]);
///     store.delete(&story).await.unwrap();
///     store.delete(&story).await.unwrap();
/// });
/// ```
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Write the full story keyed by its id, replacing any existing record
    async fn save(&self, story: &Story) -> Result<()>;

    /// Every valid story, newest first
    async fn list_all(&self) -> Result<Vec<Story>>;

    /// Remove the story's record; succeeds if it is already gone
    async fn delete(&self, story: &Story) -> Result<()>;

    /// Short backend name for logs and messages
    fn backend_name(&self) -> &'static str;
}

/// Validate raw records and order the survivors newest first
///
/// Rejected records are logged at `warn` with their key and the reason.
/// The sort is stable, so records sharing a timestamp keep the order the
/// backend returned them in.
pub fn collect_stories<I>(records: I) -> Vec<Story>
where
    I: IntoIterator<Item = StoredRecord>,
{
    let mut stories: Vec<Story> = records
        .into_iter()
        .filter_map(|record| {
            let key = record.key.clone();
            match record.into_story() {
                Ok(story) => Some(story),
                Err(reason) => {
                    tracing::warn!(key = %key, %reason, "Skipping invalid story record");
                    None
                }
            }
        })
        .collect();

    stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    stories
}

/// Create a store instance based on configuration
///
/// # Errors
///
/// Returns error if the store type is unknown or the backend cannot be
/// initialized
pub fn create_store(config: &StoreConfig) -> Result<Box<dyn StoryStore>> {
    match config.store_type.as_str() {
        "firestore" => Ok(Box::new(FirestoreStore::new(config.firestore.clone())?)),
        "sqlite" => {
            let store = match &config.sqlite.path {
                Some(path) => SqliteStore::new_with_path(path)?,
                None => SqliteStore::new()?,
            };
            Ok(Box::new(store))
        }
        other => Err(BedtimeError::Config(format!("Unknown store type: {}", other)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn record(key: &str, created_at: &str, duration: i64) -> StoredRecord {
        StoredRecord {
            key: key.to_string(),
            title: Some(format!("Story {}", key)),
            duration: Some(duration),
            created_at: Some(created_at.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_collect_stories_sorts_newest_first() {
        let stories = collect_stories(vec![
            record("a", "2025-01-01T00:00:00Z", 5),
            record("c", "2025-03-01T00:00:00Z", 10),
            record("b", "2025-02-01T00:00:00Z", 15),
        ]);
        let keys: Vec<&str> = stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_collect_stories_skips_invalid_records() {
        let mut untitled = record("untitled", "2025-01-03T00:00:00Z", 10);
        untitled.title = None;

        let stories = collect_stories(vec![
            record("good", "2025-01-01T00:00:00Z", 10),
            record("bad-duration", "2025-01-02T00:00:00Z", 12),
            untitled,
            record("bad-date", "not a date", 5),
        ]);

        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].id.as_str(), "good");
    }

    #[test]
    fn test_create_store_unknown_type() {
        let config = StoreConfig {
            store_type: "redis".to_string(),
            ..Default::default()
        };
        assert!(create_store(&config).is_err());
    }

    #[test]
    fn test_create_store_sqlite_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StoreConfig {
            store_type: "sqlite".to_string(),
            ..Default::default()
        };
        config.sqlite.path = Some(dir.path().join("stories.db"));

        let store = create_store(&config).unwrap();
        assert_eq!(store.backend_name(), "sqlite");
    }

    #[test]
    fn test_create_store_firestore() {
        let mut config = StoreConfig::default();
        config.firestore.project_id = "bedtime-test".to_string();
        let store = create_store(&config).unwrap();
        assert_eq!(store.backend_name(), "firestore");
    }
}

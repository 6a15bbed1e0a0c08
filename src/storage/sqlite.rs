//! Local story store backed by a single SQLite file
//!
//! Rows mirror the document layout used by the Firestore store: only the id
//! is mandatory, everything else is validated on read.

use crate::error::{BedtimeError, Result};
use crate::storage::{collect_stories, StoredRecord, StoryStore};
use crate::story::Story;
use anyhow::Context;
use async_trait::async_trait;
use directories::ProjectDirs;
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQLite story store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Create a store in the user's data directory
    ///
    /// The database lives at `<data dir>/stories.db` and is created on first
    /// use.
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "bedtime-stories", "bedtime")
            .ok_or_else(|| BedtimeError::Store("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| BedtimeError::Store(e.to_string()))?;

        Self::new_with_path(data_dir.join("stories.db"))
    }

    /// Create a store that uses the specified database path
    ///
    /// # Examples
    ///
    /// ```
    /// use bedtime_stories::storage::SqliteStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteStore::new_with_path(dir.path().join("stories.db")).unwrap();
    /// assert!(store.db_path().ends_with("stories.db"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| BedtimeError::Store(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        tracing::info!("Initialized SQLite story store: {}", store.db_path.display());
        Ok(store)
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init(&self) -> Result<()> {
        let conn = open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS stories (
                id TEXT PRIMARY KEY,
                title TEXT,
                content TEXT,
                duration INTEGER,
                description TEXT,
                favorite_characters TEXT,
                created_at TEXT
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| BedtimeError::Store(e.to_string()))?;
        Ok(())
    }

    fn save_blocking(db_path: &Path, story: &Story) -> Result<()> {
        let conn = open(db_path)?;
        conn.execute(
            "INSERT OR REPLACE INTO stories
                (id, title, content, duration, description, favorite_characters, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                story.id.as_str(),
                story.title,
                optional_text(&story.content),
                story.duration.minutes(),
                optional_text(&story.description),
                optional_text(&story.favorite_characters),
                story.created_at.to_rfc3339(),
            ],
        )
        .context("Failed to save story")
        .map_err(|e| BedtimeError::Store(e.to_string()))?;
        Ok(())
    }

    fn list_blocking(db_path: &Path) -> Result<Vec<StoredRecord>> {
        let conn = open(db_path)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, content, duration, description, favorite_characters, created_at
                 FROM stories ORDER BY created_at DESC",
            )
            .context("Failed to prepare query")
            .map_err(|e| BedtimeError::Store(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let (duration, unreadable_duration) = match integer_column(row.get(3)?) {
                    Some(Ok(minutes)) => (Some(minutes), None),
                    Some(Err(raw)) => (None, Some(raw)),
                    None => (None, None),
                };
                Ok(StoredRecord {
                    key: row.get(0)?,
                    title: text_column(row.get(1)?),
                    content: text_column(row.get(2)?),
                    duration,
                    unreadable_duration,
                    description: text_column(row.get(4)?),
                    favorite_characters: text_column(row.get(5)?),
                    created_at: text_column(row.get(6)?),
                })
            })
            .context("Failed to query stories")
            .map_err(|e| BedtimeError::Store(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(
                row.context("Failed to read story row")
                    .map_err(|e| BedtimeError::Store(e.to_string()))?,
            );
        }
        Ok(records)
    }

    fn delete_blocking(db_path: &Path, id: &str) -> Result<()> {
        let conn = open(db_path)?;
        conn.execute("DELETE FROM stories WHERE id = ?", params![id])
            .context("Failed to delete story")
            .map_err(|e| BedtimeError::Store(e.to_string()))?;
        Ok(())
    }
}

fn open(db_path: &Path) -> Result<Connection> {
    Connection::open(db_path)
        .context("Failed to open database")
        .map_err(|e| BedtimeError::Store(e.to_string()).into())
}

fn text_column(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        _ => None,
    }
}

/// `None` for NULL; any other non-integer value comes back as text
fn integer_column(value: Value) -> Option<std::result::Result<i64, String>> {
    match value {
        Value::Null => None,
        Value::Integer(n) => Some(Ok(n)),
        Value::Real(f) if f.fract() == 0.0 => Some(Ok(f as i64)),
        Value::Real(f) => Some(Err(f.to_string())),
        Value::Text(text) => Some(Err(text)),
        Value::Blob(bytes) => Some(Err(format!("<{} byte blob>", bytes.len()))),
    }
}

/// Blank optional text is stored as NULL
fn optional_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

/// Run blocking SQLite work off the async runtime
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| BedtimeError::Store(format!("SQLite task failed: {}", e)))?
}

#[async_trait]
impl StoryStore for SqliteStore {
    async fn save(&self, story: &Story) -> Result<()> {
        tracing::debug!(id = %story.id, "Saving story to SQLite");
        let db_path = self.db_path.clone();
        let story = story.clone();
        run_blocking(move || Self::save_blocking(&db_path, &story)).await
    }

    async fn list_all(&self) -> Result<Vec<Story>> {
        let db_path = self.db_path.clone();
        let records = run_blocking(move || Self::list_blocking(&db_path)).await?;
        let total = records.len();
        let stories = collect_stories(records);
        tracing::debug!("Loaded {} of {} stored stories", stories.len(), total);
        Ok(stories)
    }

    async fn delete(&self, story: &Story) -> Result<()> {
        tracing::debug!(id = %story.id, "Deleting story from SQLite");
        let db_path = self.db_path.clone();
        let id = story.id.as_str().to_string();
        run_blocking(move || Self::delete_blocking(&db_path, &id)).await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::ReadingDuration;
    use crate::test_utils::{temp_sqlite_store, test_story};
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_table() {
        let (_dir, store) = temp_sqlite_store();
        let conn = Connection::open(store.db_path()).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='stories'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_new_with_path_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("stories.db");
        let store = SqliteStore::new_with_path(&nested).unwrap();
        assert!(store.db_path().exists());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_record() {
        let (_dir, store) = temp_sqlite_store();
        let mut story = test_story("First", ReadingDuration::Five);
        store.save(&story).await.unwrap();

        story.title = "Second".to_string();
        store.save(&story).await.unwrap();

        let stories = store.list_all().await.unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].title, "Second");
    }

    #[tokio::test]
    async fn test_text_duration_is_skipped() {
        let (_dir, store) = temp_sqlite_store();
        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute(
            "INSERT INTO stories (id, title, duration, created_at) VALUES (?, ?, ?, ?)",
            params!["odd", "Odd", "ten", "2025-01-01T00:00:00Z"],
        )
        .unwrap();

        let stories = store.list_all().await.unwrap();
        assert!(stories.is_empty());
    }

    #[test]
    fn test_integer_column_accepts_integral_reals() {
        assert_eq!(integer_column(Value::Real(10.0)), Some(Ok(10)));
        assert_eq!(integer_column(Value::Real(10.5)), Some(Err("10.5".to_string())));
        assert_eq!(
            integer_column(Value::Text("ten".to_string())),
            Some(Err("ten".to_string()))
        );
        assert_eq!(integer_column(Value::Null), None);
    }

    #[tokio::test]
    async fn test_blank_optionals_are_stored_as_null() {
        let (_dir, store) = temp_sqlite_store();
        let mut story = test_story("Hollow", ReadingDuration::Ten);
        story.content = Some(String::new());
        story.description = Some("   ".to_string());
        story.favorite_characters = Some("Pip".to_string());
        store.save(&story).await.unwrap();

        let conn = Connection::open(store.db_path()).unwrap();
        let (content, description, characters): (Option<String>, Option<String>, Option<String>) =
            conn.query_row(
                "SELECT content, description, favorite_characters FROM stories WHERE id = ?",
                params![story.id.as_str()],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(content, None);
        assert_eq!(description, None);
        assert_eq!(characters.as_deref(), Some("Pip"));
    }

    #[tokio::test]
    async fn test_save_into_unwritable_database_is_store_error() {
        let (_dir, store) = temp_sqlite_store();
        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute("DROP TABLE stories", []).unwrap();

        let err = store
            .save(&test_story("Lost", ReadingDuration::Five))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BedtimeError>(),
            Some(BedtimeError::Store(_))
        ));
    }
}

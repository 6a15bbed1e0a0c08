//! Test utilities for Bedtime Stories
//!
//! Temporary SQLite stores, ready-made stories and error assertions shared
//! by the unit tests.

use crate::config::Config;
use crate::storage::SqliteStore;
use crate::story::{ReadingDuration, Story};
use tempfile::TempDir;

/// Create a SQLite store in a fresh temporary directory
///
/// The directory must outlive the store, so both are returned.
///
/// # Panics
///
/// Panics if the directory or database cannot be created
pub fn temp_sqlite_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let store =
        SqliteStore::new_with_path(dir.path().join("stories.db")).expect("Failed to open store");
    (dir, store)
}

/// Build a story with the given title and duration and no optional fields
///
/// # Panics
///
/// Panics if the title is blank
pub fn test_story(title: &str, duration: ReadingDuration) -> Story {
    Story::new(title, None, duration, None, None).expect("Failed to build test story")
}

/// Assert that an error's message contains the expected text
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration that passes validation without any network settings
pub fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.store.store_type = "sqlite".to_string();
    config.store.sqlite.path = Some(db_path.to_path_buf());
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BedtimeError;
    use crate::storage::StoryStore;

    #[tokio::test]
    async fn test_temp_sqlite_store_starts_empty() {
        let (_dir, store) = temp_sqlite_store();
        assert!(store.db_path().exists());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: crate::error::Result<()> =
            Err(BedtimeError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: crate::error::Result<()> =
            Err(BedtimeError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_validates() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir.path().join("stories.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_story() {
        let story = test_story("Moon", ReadingDuration::Fifteen);
        assert_eq!(story.duration.minutes(), 15);
        assert!(story.content.is_none());
    }
}
